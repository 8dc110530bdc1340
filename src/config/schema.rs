use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of results requested by a fresh search.
    pub page_size: usize,
    /// Number of results requested when scrolling past the end of the list.
    pub fetch_more_count: usize,
    /// Executable used for searching and stream extraction.
    pub ytdlp_path: String,
    /// yt-dlp format selector for the audio stream.
    pub stream_format: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            fetch_more_count: 10,
            ytdlp_path: "yt-dlp".to_string(),
            stream_format: "bestaudio[ext=m4a]/bestaudio/best".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume at startup (0-100).
    pub initial_volume: u8,
    /// Pause between stopping one playlist track and starting the next,
    /// giving the output a chance to release the previous stream.
    pub settle_ms: u64,
    /// How often the render loop asks the session whether the track ended.
    pub status_check_ms: u64,
    /// A track counts as finished this many seconds before its reported end.
    pub end_tolerance_secs: u64,
    /// Upper bound on a stream downloaded into memory before decoding.
    pub max_stream_bytes: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 100,
            settle_ms: 200,
            status_check_ms: 2000,
            end_tolerance_secs: 1,
            max_stream_bytes: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Input poll timeout; also the animation cadence.
    pub tick_ms: u64,
    /// Number of visualizer bars.
    pub visualizer_bars: usize,
    /// Height of the visualizer in rows.
    pub visualizer_height: u16,
    /// How long the volume stays visible after a change.
    pub volume_display_secs: u64,
    /// Scroll speed of long titles in the status line.
    pub marquee_step_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ♫ cadenza ♫ ".to_string(),
            tick_ms: 50,
            visualizer_bars: 15,
            visualizer_height: 4,
            volume_display_secs: 3,
            marquee_step_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where favorites and playlists are kept. Defaults to the XDG data dir.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// Log file. Defaults to `cadenza.log` inside the data dir.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "cadenza=info".to_string(),
            file: None,
        }
    }
}
