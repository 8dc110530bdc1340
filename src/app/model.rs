//! Application model: screen mode, list state, status line and the effects
//! key presses ask the runtime to carry out.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{SearchSettings, UiSettings};
use crate::library::{DisplayItem, Library, Playlist, Track, home_items};
use crate::session::PlaybackEvent;

use super::editor::PlaylistEditor;
use super::viewport::Viewport;

/// Which screen is active.
#[derive(Debug, Clone)]
pub enum Mode {
    /// Playlists and favorites.
    Home,
    /// Typing a query.
    Search,
    /// Browsing search results.
    Results,
    /// Creating or editing a playlist.
    Editor(PlaylistEditor),
    /// Tracks of one playlist.
    PlaylistView { playlist_id: String },
}

/// Work the runtime performs on behalf of a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Quit,
    Search {
        seq: u64,
        query: String,
        limit: usize,
    },
    FetchMore {
        seq: u64,
        query: String,
        already: usize,
        count: usize,
    },
    Play(Track),
    PlayPlaylist { playlist: Playlist, index: usize },
    TogglePause,
    Stop,
    VolumeUp,
    VolumeDown,
}

/// Results coming back from background work.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    SearchFinished {
        seq: u64,
        query: String,
        result: Result<Vec<Track>, String>,
    },
    MoreFinished {
        seq: u64,
        result: Result<Vec<Track>, String>,
    },
    Playback(PlaybackEvent),
}

impl From<PlaybackEvent> for WorkerEvent {
    fn from(e: PlaybackEvent) -> Self {
        WorkerEvent::Playback(e)
    }
}

/// Titles in status messages are cut to this many characters.
const STATUS_TITLE_CHARS: usize = 50;

pub(super) fn short_title(title: &str) -> String {
    title.chars().take(STATUS_TITLE_CHARS).collect()
}

/// The main application model.
pub struct App {
    pub library: Library,
    pub mode: Mode,
    pub viewport: Viewport,
    /// Search text being typed.
    pub query: String,
    /// Tracks from the last search, extended by fetch-more.
    pub results: Vec<Track>,
    /// Query the current `results` belong to.
    pub results_query: String,
    /// Rows the backend has returned for `results_query`, duplicates included.
    /// Fetch-more continues from here.
    pub fetched: usize,
    pub status: String,
    pub searching: bool,
    pub loading_more: bool,
    pub volume_shown_until: Option<Instant>,
    pub marquee_offset: usize,

    search_seq: u64,
    page_size: usize,
    fetch_more_count: usize,
    volume_display: Duration,
}

impl App {
    pub fn new(library: Library, search: &SearchSettings, ui: &UiSettings) -> Self {
        Self {
            library,
            mode: Mode::Home,
            viewport: Viewport::new(1),
            query: String::new(),
            results: Vec::new(),
            results_query: String::new(),
            fetched: 0,
            status: "Press '/' to search, 'q' to quit".to_string(),
            searching: false,
            loading_more: false,
            volume_shown_until: None,
            marquee_offset: 0,
            search_seq: 0,
            page_size: search.page_size.max(1),
            fetch_more_count: search.fetch_more_count.max(1),
            volume_display: Duration::from_secs(ui.volume_display_secs),
        }
    }

    /// Rows of the list for the current mode.
    pub fn items(&self) -> Vec<DisplayItem> {
        match &self.mode {
            Mode::Home => home_items(self.library.playlists(), self.library.favorites()),
            Mode::Search if self.results.is_empty() => {
                home_items(self.library.playlists(), self.library.favorites())
            }
            Mode::Search | Mode::Results => tracks_as_items(&self.results),
            Mode::PlaylistView { playlist_id } => self
                .library
                .playlist(playlist_id)
                .map(|p| tracks_as_items(&p.tracks))
                .unwrap_or_default(),
            Mode::Editor(editor) => tracks_as_items(&editor.candidates),
        }
    }

    pub fn item_count(&self) -> usize {
        match &self.mode {
            Mode::Home => self.library.playlists().len() + self.library.favorites().len(),
            Mode::Search if self.results.is_empty() => {
                self.library.playlists().len() + self.library.favorites().len()
            }
            Mode::Search | Mode::Results => self.results.len(),
            Mode::PlaylistView { playlist_id } => {
                self.library.playlist(playlist_id).map_or(0, Playlist::len)
            }
            Mode::Editor(editor) => editor.candidates.len(),
        }
    }

    pub fn selected_item(&self) -> Option<DisplayItem> {
        self.items().into_iter().nth(self.viewport.selected)
    }

    pub fn editor(&self) -> Option<&PlaylistEditor> {
        match &self.mode {
            Mode::Editor(e) => Some(e),
            _ => None,
        }
    }

    pub fn viewed_playlist(&self) -> Option<&Playlist> {
        match &self.mode {
            Mode::PlaylistView { playlist_id } => self.library.playlist(playlist_id),
            _ => None,
        }
    }

    /// The list area now holds `visible` rows.
    pub fn on_resize(&mut self, visible: usize) {
        let len = self.item_count();
        self.viewport.resize(visible, len);
    }

    pub fn home_status(&self) -> String {
        if self.library.favorites().is_empty() {
            "No favorites yet".to_string()
        } else {
            "★ Favorites".to_string()
        }
    }

    pub(super) fn enter_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.viewport.reset();
    }

    pub(super) fn go_home(&mut self) {
        self.query.clear();
        self.enter_mode(Mode::Home);
        self.status = self.home_status();
    }

    pub(super) fn next_search_seq(&mut self) -> u64 {
        self.search_seq += 1;
        self.search_seq
    }

    pub(super) fn current_search_seq(&self) -> u64 {
        self.search_seq
    }

    pub(super) fn page_size(&self) -> usize {
        self.page_size
    }

    pub(super) fn fetch_more_count(&self) -> usize {
        self.fetch_more_count
    }

    pub(super) fn show_volume(&mut self) {
        self.volume_shown_until = Some(Instant::now() + self.volume_display);
    }

    pub fn volume_visible(&self, now: Instant) -> bool {
        self.volume_shown_until.is_some_and(|until| now < until)
    }

    pub fn tick_marquee(&mut self) {
        self.marquee_offset = self.marquee_offset.wrapping_add(1);
    }

    /// Fold a background result into the model.
    pub fn apply_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::SearchFinished { seq, query, result } => {
                if seq != self.search_seq {
                    debug!(seq, latest = self.search_seq, "dropping stale search result");
                    return;
                }
                self.searching = false;
                self.loading_more = false;
                match result {
                    Ok(tracks) if !tracks.is_empty() => {
                        self.status = format!(
                            "Showing {} results (scroll down for more)",
                            tracks.len()
                        );
                        self.fetched = tracks.len();
                        self.results = tracks;
                        self.results_query = query;
                        if matches!(self.mode, Mode::Search | Mode::Results) {
                            self.enter_mode(Mode::Results);
                        }
                    }
                    Ok(_) => {
                        self.results.clear();
                        self.results_query.clear();
                        self.fetched = 0;
                        self.status = "No results found".to_string();
                        if matches!(self.mode, Mode::Results) {
                            self.go_home();
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "search failed");
                        self.status = "Search failed".to_string();
                    }
                }
            }
            WorkerEvent::MoreFinished { seq, result } => {
                if seq != self.search_seq {
                    debug!(seq, latest = self.search_seq, "dropping stale fetch-more result");
                    return;
                }
                self.loading_more = false;
                let returned = match result {
                    Ok(tracks) => {
                        let returned = tracks.len();
                        self.fetched += returned;
                        let added = self.append_results(tracks);
                        debug!(returned, added, fetched = self.fetched, "fetched more results");
                        returned
                    }
                    Err(e) => {
                        warn!(error = %e, "fetch more failed");
                        0
                    }
                };
                self.status = if returned > 0 {
                    format!("Showing {} results", self.results.len())
                } else {
                    format!("Showing all {} results found", self.results.len())
                };
            }
            WorkerEvent::Playback(event) => self.apply_playback_event(event),
        }
    }

    /// Append tracks not already listed. Returns how many were added.
    fn append_results(&mut self, tracks: Vec<Track>) -> usize {
        let before = self.results.len();
        for t in tracks {
            if !self.results.iter().any(|r| r.id == t.id) {
                self.results.push(t);
            }
        }
        self.results.len() - before
    }

    fn apply_playback_event(&mut self, event: PlaybackEvent) {
        self.status = match event {
            PlaybackEvent::Started {
                track,
                playlist: None,
            } => {
                self.marquee_offset = 0;
                format!("Playing: {}", short_title(&track.title))
            }
            PlaybackEvent::Started {
                track,
                playlist: Some(_),
            }
            | PlaybackEvent::Advanced { track } => {
                self.marquee_offset = 0;
                format!("Playing from playlist: {}", short_title(&track.title))
            }
            PlaybackEvent::Failed { track, reason } => {
                debug!(id = %track.id, %reason, "play request failed");
                "Failed to load track".to_string()
            }
            PlaybackEvent::Finished { track } => {
                format!("Finished: {}", short_title(&track.title))
            }
            PlaybackEvent::AdvanceFailed { attempts } => {
                debug!(attempts, "playlist advance gave up");
                "Playlist stopped: no playable track".to_string()
            }
        };
    }
}

fn tracks_as_items(tracks: &[Track]) -> Vec<DisplayItem> {
    tracks.iter().cloned().map(DisplayItem::Track).collect()
}
