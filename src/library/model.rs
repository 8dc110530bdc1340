use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single playable item as returned by a search.
///
/// Equality and hashing only look at `id`: two search hits for the same
/// video are the same track even if the backend reported slightly
/// different metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default = "unknown")]
    pub uploader: String,
    /// Length in whole seconds, `0` when unknown.
    #[serde(default)]
    pub duration: u64,
    /// Opaque reference handed back to the resolver (a watch URL for yt-dlp).
    #[serde(default)]
    pub source: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        uploader: impl Into<String>,
        duration: u64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uploader: uploader.into(),
            duration,
            source: source.into(),
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A directly playable address, tagged with the track it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLocator {
    pub track_id: String,
    pub url: String,
}

/// A named, ordered list of tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
    pub created: DateTime<Utc>,
}

impl Playlist {
    /// Build a playlist with a fresh random id and the current timestamp.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            tracks,
            created: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Sum of known track durations in seconds.
    pub fn total_duration(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

/// 128 random bits rendered as lowercase hex.
pub fn generate_id() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}
