use super::model::{Playlist, Track};

/// One row of a list view. Home mixes playlists and tracks; every other
/// view only holds tracks.
#[derive(Debug, Clone)]
pub enum DisplayItem {
    Track(Track),
    Playlist(Playlist),
}

impl DisplayItem {
    pub fn title(&self) -> String {
        match self {
            DisplayItem::Track(t) => t.title.clone(),
            DisplayItem::Playlist(p) => format!("{} ({} tracks)", p.name, p.len()),
        }
    }

    /// Seconds; for playlists the sum over their tracks.
    pub fn duration(&self) -> u64 {
        match self {
            DisplayItem::Track(t) => t.duration,
            DisplayItem::Playlist(p) => p.total_duration(),
        }
    }
}

/// Home view contents: playlists first, then favorites.
pub fn home_items(playlists: &[Playlist], favorites: &[Track]) -> Vec<DisplayItem> {
    playlists
        .iter()
        .cloned()
        .map(DisplayItem::Playlist)
        .chain(favorites.iter().cloned().map(DisplayItem::Track))
        .collect()
}

/// Format seconds as `m:ss`.
pub fn format_mss(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// `[m:ss]`, or `[--:--]` for an unknown duration.
pub fn duration_label(secs: u64) -> String {
    if secs == 0 {
        "[--:--]".to_string()
    } else {
        format!("[{}]", format_mss(secs))
    }
}
