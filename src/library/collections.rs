use tracing::{info, warn};

use super::model::{Playlist, Track};
use super::store::{StorePaths, load_list, save_list};

/// Favorites and playlists, persisted write-through after every mutation.
///
/// The in-memory lists are the source of truth: a failed save is logged and
/// otherwise ignored, so the next successful save catches the file up.
pub struct Library {
    favorites: Vec<Track>,
    playlists: Vec<Playlist>,
    paths: StorePaths,
}

impl Library {
    /// Load both collections from `paths` (missing files load as empty).
    pub fn open(paths: StorePaths) -> Self {
        let mut favorites: Vec<Track> = load_list(&paths.favorites);
        // Older files may contain duplicates; keep first occurrence.
        let mut seen = std::collections::HashSet::new();
        favorites.retain(|t| seen.insert(t.id.clone()));

        let playlists = load_list(&paths.playlists);
        Self {
            favorites,
            playlists,
            paths,
        }
    }

    pub fn favorites(&self) -> &[Track] {
        &self.favorites
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn is_favorite(&self, track_id: &str) -> bool {
        self.favorites.iter().any(|t| t.id == track_id)
    }

    /// Add `track` to favorites. Returns `false` if it was already there.
    pub fn add_favorite(&mut self, track: Track) -> bool {
        if self.is_favorite(&track.id) {
            return false;
        }
        info!(id = %track.id, "favorited");
        self.favorites.push(track);
        self.save_favorites();
        true
    }

    /// Remove a favorite by id. Returns `false` if no such favorite existed.
    pub fn remove_favorite(&mut self, track_id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|t| t.id != track_id);
        if self.favorites.len() == before {
            return false;
        }
        self.save_favorites();
        true
    }

    /// Create a playlist and return its id. Empty names or track lists are rejected.
    pub fn create_playlist(&mut self, name: &str, tracks: Vec<Track>) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || tracks.is_empty() {
            return None;
        }
        let playlist = Playlist::new(name, tracks);
        let id = playlist.id.clone();
        info!(%id, name, tracks = playlist.len(), "created playlist");
        self.playlists.push(playlist);
        self.save_playlists();
        Some(id)
    }

    /// Replace the name and track list of an existing playlist wholesale.
    pub fn update_playlist(&mut self, id: &str, name: &str, tracks: Vec<Track>) -> bool {
        let name = name.trim();
        if name.is_empty() || tracks.is_empty() {
            return false;
        }
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        playlist.name = name.to_string();
        playlist.tracks = tracks;
        self.save_playlists();
        true
    }

    pub fn delete_playlist(&mut self, id: &str) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.id != id);
        if self.playlists.len() == before {
            return false;
        }
        self.save_playlists();
        true
    }

    fn save_favorites(&self) {
        if let Err(e) = save_list(&self.paths.favorites, &self.favorites) {
            warn!(error = %e, "failed to save favorites");
        }
    }

    fn save_playlists(&self) {
        if let Err(e) = save_list(&self.paths.playlists, &self.playlists) {
            warn!(error = %e, "failed to save playlists");
        }
    }
}
