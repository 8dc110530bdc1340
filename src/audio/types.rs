use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Decoder;

/// Coarse transport state reported by a playback backend.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BackendState {
    Playing,
    Paused,
    #[default]
    Stopped,
    /// The loaded stream played to its end.
    Ended,
    /// The state could not be read.
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no audio output available: {0}")]
    Unavailable(String),
    #[error("failed to fetch stream: {0}")]
    Fetch(String),
    #[error("failed to decode stream: {0}")]
    Decode(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audio thread is not running")]
    Disconnected,
}

pub(super) type StreamSource = Decoder<std::io::Cursor<Vec<u8>>>;

pub(super) enum AudioCmd {
    /// Drop the current sink and start `source` from the beginning.
    Load { track_id: String, source: StreamSource },
    Pause,
    Resume,
    Stop,
    /// Volume in percent.
    SetVolume(u8),
    Quit,
}

/// Runtime playback information shared with the UI and the session.
#[derive(Debug, Clone, Default)]
pub struct PlaybackInfo {
    pub state: BackendState,
    /// Id of the loaded track, if any.
    pub track_id: Option<String>,
    /// Position in the loaded stream; `None` while nothing is loaded.
    pub elapsed: Option<Duration>,
}

impl PlaybackInfo {
    pub fn elapsed_millis(&self) -> i64 {
        self.elapsed
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(-1)
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Coarse state as last published. A poisoned lock reads as `Other`.
pub(super) fn read_state(handle: &PlaybackHandle) -> BackendState {
    handle
        .lock()
        .map(|info| info.state)
        .unwrap_or(BackendState::Other)
}
