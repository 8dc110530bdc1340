//! Audio output.
//!
//! `PlaybackBackend` is the transport the playback session drives.
//! `AudioPlayer` implements it with rodio on a dedicated audio thread,
//! talking over an mpsc command channel and publishing coarse state through
//! a shared `PlaybackInfo`.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{BackendError, BackendState, PlaybackHandle};

use crate::library::StreamLocator;

/// Transport controls and coarse state of an audio output.
pub trait PlaybackBackend: Send {
    /// Replace whatever is loaded with `locator` and start it.
    fn load_and_play(&mut self, locator: &StreamLocator) -> Result<(), BackendError>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    /// Output volume, 0-100.
    fn set_volume(&mut self, volume: u8);

    /// Position in the loaded stream, or -1 when nothing is loaded.
    fn elapsed_millis(&self) -> i64;

    fn state(&self) -> BackendState;

    /// Release the output device. Called once when the owner goes away.
    fn shutdown(&mut self) {}

    /// A second way in for pause, resume, stop and volume that works while
    /// the owner is busy inside `load_and_play`.
    fn remote(&self) -> Option<Box<dyn TransportRemote>> {
        None
    }
}

/// Transport calls that can be made from another thread.
pub trait TransportRemote: Send {
    fn pause(&self);

    fn resume(&self);

    fn stop(&self);

    fn set_volume(&self, volume: u8);
}
