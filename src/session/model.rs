use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{BackendState, PlaybackBackend, TransportRemote};
use crate::config::PlaybackSettings;
use crate::library::{Playlist, Track};
use crate::resolver::StreamResolver;

use super::PlayError;

/// Volume change per `volume_up`/`volume_down`.
pub const VOLUME_STEP: u8 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The playlist the current track was started from, and its position in it.
#[derive(Debug, Clone)]
pub struct PlaylistContext {
    pub playlist: Playlist,
    pub cursor: usize,
}

/// What `check_playback_status` found.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Nothing is loaded or the track is paused.
    Idle,
    /// The current track is still running.
    Running,
    /// The track ended and the playlist advanced to this one.
    Advanced(Track),
    /// The track ended with no playlist bound; playback stopped.
    Finished(Track),
}

/// Report `raw_ms` in whole seconds, never past a known `duration`.
pub fn clamp_elapsed(raw_ms: i64, duration: u64) -> u64 {
    let secs = u64::try_from(raw_ms).unwrap_or(0) / 1000;
    if duration > 0 { secs.min(duration) } else { secs }
}

/// `volume` moved one `VOLUME_STEP` up or down, kept within 0-100.
pub fn step_volume(volume: u8, up: bool) -> u8 {
    if up {
        volume.saturating_add(VOLUME_STEP).min(100)
    } else {
        volume.saturating_sub(VOLUME_STEP)
    }
}

/// Fraction of the track played, `0.0` when the duration is unknown.
pub fn progress_fraction(elapsed: u64, duration: u64) -> f64 {
    if duration == 0 {
        return 0.0;
    }
    (elapsed as f64 / duration as f64).clamp(0.0, 1.0)
}

pub struct PlaybackSession<B, R> {
    backend: B,
    resolver: R,
    current: Option<Track>,
    duration: u64,
    transport: TransportState,
    volume: u8,
    context: Option<PlaylistContext>,
    settle: Duration,
    end_tolerance_secs: u64,
}

impl<B: PlaybackBackend, R: StreamResolver> PlaybackSession<B, R> {
    pub fn new(mut backend: B, resolver: R, settings: &PlaybackSettings) -> Self {
        let volume = settings.initial_volume.min(100);
        backend.set_volume(volume);
        Self {
            backend,
            resolver,
            current: None,
            duration: 0,
            transport: TransportState::Stopped,
            volume,
            context: None,
            settle: Duration::from_millis(settings.settle_ms),
            end_tolerance_secs: settings.end_tolerance_secs,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn context(&self) -> Option<&PlaylistContext> {
        self.context.as_ref()
    }

    /// Transport lane onto the output that bypasses this session.
    pub fn remote(&self) -> Option<Box<dyn TransportRemote>> {
        self.backend.remote()
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Start `track`. Outside a playlist this drops any bound playlist.
    ///
    /// Gives up with `Superseded` when `still_wanted` turns false while the
    /// stream was being resolved. Resolution happens before anything is
    /// stopped, so a failed or superseded resolution leaves the session
    /// exactly as it was. A request superseded while its stream was loading
    /// leaves the session stopped with no playlist bound.
    pub fn play(
        &mut self,
        track: &Track,
        from_playlist: bool,
        still_wanted: impl Fn() -> bool,
    ) -> Result<(), PlayError> {
        let locator = self.resolver.resolve(track)?;
        if !still_wanted() {
            debug!(id = %track.id, "discarding superseded play request");
            return Err(PlayError::Superseded);
        }

        self.stop(!from_playlist);
        self.backend.load_and_play(&locator)?;
        if !still_wanted() {
            debug!(id = %track.id, "discarding stream superseded while loading");
            self.stop(true);
            return Err(PlayError::Superseded);
        }
        self.backend.set_volume(self.volume);

        self.current = Some(track.clone());
        self.duration = track.duration;
        self.transport = TransportState::Playing;
        info!(id = %track.id, title = %track.title, "playing");
        Ok(())
    }

    /// Start track `index` of `playlist` and bind the playlist for auto-advance.
    pub fn play_playlist_track(
        &mut self,
        playlist: Playlist,
        index: usize,
        still_wanted: impl Fn() -> bool,
    ) -> Result<(), PlayError> {
        if playlist.is_empty() {
            return Err(PlayError::EmptyPlaylist);
        }
        let cursor = index.min(playlist.len() - 1);
        let track = playlist.tracks[cursor].clone();

        match self.play(&track, true, still_wanted) {
            Ok(()) => {
                self.context = Some(PlaylistContext { playlist, cursor });
                Ok(())
            }
            Err(e @ (PlayError::Resolution(_) | PlayError::Superseded)) => Err(e),
            Err(e) => {
                self.context = None;
                Err(e)
            }
        }
    }

    /// Halt playback. `clear_context` drops the bound playlist as well.
    pub fn stop(&mut self, clear_context: bool) {
        self.backend.stop();
        self.current = None;
        self.duration = 0;
        self.transport = TransportState::Stopped;
        if clear_context {
            self.context = None;
        }
    }

    /// Pause or resume. Does nothing while stopped.
    pub fn toggle_pause(&mut self) -> TransportState {
        match self.transport {
            TransportState::Playing => {
                self.backend.pause();
                self.transport = TransportState::Paused;
            }
            TransportState::Paused => {
                self.backend.resume();
                self.transport = TransportState::Playing;
            }
            TransportState::Stopped => {}
        }
        self.transport
    }

    pub fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100) as u8;
        self.backend.set_volume(self.volume);
    }

    pub fn volume_up(&mut self) {
        self.set_volume(i32::from(step_volume(self.volume, true)));
    }

    pub fn volume_down(&mut self) {
        self.set_volume(i32::from(step_volume(self.volume, false)));
    }

    /// Seconds into the current track, clamped to its duration when known.
    pub fn elapsed_seconds(&self) -> u64 {
        clamp_elapsed(self.backend.elapsed_millis(), self.duration)
    }

    /// Advance the bound playlist, wrapping at the end.
    ///
    /// A track that fails to start is skipped. At most one attempt per
    /// playlist entry is made; if all fail the session stops and drops the
    /// playlist.
    pub fn play_next_in_playlist(
        &mut self,
        still_wanted: impl Fn() -> bool,
    ) -> Result<(), PlayError> {
        let Some(PlaylistContext { playlist, mut cursor }) = self.context.clone() else {
            return Err(PlayError::NoContext);
        };
        let len = playlist.len();
        if len == 0 {
            self.stop(true);
            return Err(PlayError::EmptyPlaylist);
        }

        let mut attempts = 0;
        while attempts < len {
            let next = (cursor + 1) % len;
            attempts += 1;

            self.stop(false);
            if !self.settle.is_zero() {
                thread::sleep(self.settle);
            }

            let track = &playlist.tracks[next];
            match self.play(track, true, &still_wanted) {
                Ok(()) => {
                    info!(playlist = %playlist.name, cursor = next, "advanced");
                    self.context = Some(PlaylistContext {
                        playlist,
                        cursor: next,
                    });
                    return Ok(());
                }
                Err(PlayError::Superseded) => {
                    // Nothing is loaded any more; the newer request decides what binds.
                    self.context = None;
                    return Err(PlayError::Superseded);
                }
                Err(e) => {
                    warn!(id = %track.id, error = %e, "skipping unplayable playlist track");
                    cursor = next;
                }
            }
        }

        self.stop(true);
        Err(PlayError::PlaylistExhausted { attempts })
    }

    /// Poll for the end of the current track and act on it.
    ///
    /// A track has ended when the backend says so, or when a known duration
    /// is reached within the configured tolerance. With a playlist bound the
    /// session advances; otherwise it stops.
    pub fn check_playback_status(
        &mut self,
        still_wanted: impl Fn() -> bool,
    ) -> Result<StatusOutcome, PlayError> {
        if self.transport != TransportState::Playing {
            return Ok(StatusOutcome::Idle);
        }
        let Some(track) = self.current.clone() else {
            return Ok(StatusOutcome::Idle);
        };

        let near_end = self.duration > 0
            && self.backend.elapsed_millis() >= 0
            && self.elapsed_seconds() >= self.duration.saturating_sub(self.end_tolerance_secs);
        if self.backend.state() != BackendState::Ended && !near_end {
            return Ok(StatusOutcome::Running);
        }

        info!(id = %track.id, "track ended");
        if self.context.is_some() {
            self.play_next_in_playlist(still_wanted)?;
            let next = self.current.clone().ok_or(PlayError::NoContext)?;
            Ok(StatusOutcome::Advanced(next))
        } else {
            self.stop(true);
            Ok(StatusOutcome::Finished(track))
        }
    }

    /// Stop playback and release the backend.
    pub fn shutdown(&mut self) {
        self.stop(true);
        self.backend.shutdown();
    }
}
