use crate::library::{Playlist, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    Create,
    Edit { playlist_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    EnteringName,
    SelectingTracks,
}

/// In-progress playlist creation or edit.
///
/// The name typed in the first phase is kept in `name` while tracks are
/// picked in the second.
#[derive(Debug, Clone)]
pub struct PlaylistEditor {
    pub target: EditorTarget,
    pub phase: EditorPhase,
    pub name: String,
    /// Picked tracks in the order they were picked.
    pub selected: Vec<Track>,
    /// Tracks offered for selection.
    pub candidates: Vec<Track>,
}

impl PlaylistEditor {
    pub fn create(favorites: &[Track]) -> Self {
        Self {
            target: EditorTarget::Create,
            phase: EditorPhase::EnteringName,
            name: String::new(),
            selected: Vec::new(),
            candidates: favorites.to_vec(),
        }
    }

    /// Edit an existing playlist. Skips name entry; tracks that are no longer
    /// favorites stay selectable.
    pub fn edit(playlist: &Playlist, favorites: &[Track]) -> Self {
        let mut candidates = favorites.to_vec();
        for t in &playlist.tracks {
            if !candidates.contains(t) {
                candidates.push(t.clone());
            }
        }
        Self {
            target: EditorTarget::Edit {
                playlist_id: playlist.id.clone(),
            },
            phase: EditorPhase::SelectingTracks,
            name: playlist.name.clone(),
            selected: playlist.tracks.clone(),
            candidates,
        }
    }

    pub fn is_selected(&self, track_id: &str) -> bool {
        self.selected.iter().any(|t| t.id == track_id)
    }

    /// Flip membership of candidate `index`.
    pub fn toggle(&mut self, index: usize) {
        let Some(track) = self.candidates.get(index) else {
            return;
        };
        if let Some(pos) = self.selected.iter().position(|t| t.id == track.id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(track.clone());
        }
    }

    /// Leave name entry if the name is not blank.
    pub fn confirm_name(&mut self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        self.phase = EditorPhase::SelectingTracks;
        true
    }
}
