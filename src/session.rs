//! The playback session: what is playing, at what volume, and what plays next.
//!
//! `PlaybackSession` is the synchronous state machine. `SessionHandle` runs it
//! on its own thread so that stream resolution and backend calls never block
//! the render loop; results come back as `PlaybackEvent`s.

mod handle;
mod model;
mod thread;

pub use handle::{NowPlaying, PlaylistPosition, SessionHandle};
pub use model::{PlaybackSession, TransportState, clamp_elapsed, progress_fraction};

use crate::audio::BackendError;
use crate::library::Track;
use crate::resolver::ResolveError;

#[derive(Debug, thiserror::Error)]
pub enum PlayError {
    #[error("could not resolve stream: {0}")]
    Resolution(#[from] ResolveError),
    #[error("playback failed: {0}")]
    Backend(#[from] BackendError),
    #[error("superseded by a newer request")]
    Superseded,
    #[error("nothing is playing from a playlist")]
    NoContext,
    #[error("playlist is empty")]
    EmptyPlaylist,
    #[error("no playable track in playlist after {attempts} attempts")]
    PlaylistExhausted { attempts: usize },
}

/// Outcome of a background playback operation, posted to the render loop.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    /// A requested track started. `playlist` names the bound playlist, if any.
    Started {
        track: Track,
        playlist: Option<String>,
    },
    /// A requested track could not be started; the previous state is kept.
    Failed { track: Track, reason: String },
    /// The playlist moved on to `track` after the previous one ended.
    Advanced { track: Track },
    /// A track played outside a playlist reached its end.
    Finished { track: Track },
    /// Every track of the bound playlist failed; playback is stopped.
    AdvanceFailed { attempts: usize },
}
