use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::debug;

use crate::config::PlaybackSettings;
use crate::library::StreamLocator;

use super::sink::{decode, fetch_stream};
use super::thread::spawn_audio_thread;
use super::types::{
    AudioCmd, BackendError, BackendState, PlaybackHandle, PlaybackInfo, read_state,
};
use super::{PlaybackBackend, TransportRemote};

/// Command lane onto the audio thread, shared by the player and its remotes.
#[derive(Clone)]
struct AudioRemote {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
}

impl AudioRemote {
    fn send(&self, cmd: AudioCmd) -> Result<(), BackendError> {
        self.tx.send(cmd).map_err(|_| BackendError::Disconnected)
    }
}

impl TransportRemote for AudioRemote {
    fn pause(&self) {
        let _ = self.send(AudioCmd::Pause);
    }

    fn resume(&self) {
        let _ = self.send(AudioCmd::Resume);
    }

    fn stop(&self) {
        let _ = self.send(AudioCmd::Stop);
        // Publish right away so a status check racing the audio tick does
        // not see the previous track as ended.
        if let Ok(mut info) = self.playback.lock() {
            *info = PlaybackInfo::default();
        }
    }

    fn set_volume(&self, volume: u8) {
        let _ = self.send(AudioCmd::SetVolume(volume.min(100)));
    }
}

/// rodio-backed `PlaybackBackend`.
///
/// Downloading and decoding happen on the calling thread; the audio thread
/// only swaps sinks.
pub struct AudioPlayer {
    remote: AudioRemote,
    max_stream_bytes: u64,
    join: Option<JoinHandle<()>>,
}

impl AudioPlayer {
    /// Open the default output device. Fails with `Unavailable` when there is none.
    pub fn new(settings: &PlaybackSettings) -> Result<Self, BackendError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(rx, playback_info.clone(), ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = audio_handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = audio_handle.join();
                return Err(BackendError::Unavailable(
                    "audio thread exited during startup".to_string(),
                ));
            }
        }

        let player = Self {
            remote: AudioRemote {
                tx,
                playback: playback_info,
            },
            max_stream_bytes: settings.max_stream_bytes,
            join: Some(audio_handle),
        };
        player
            .remote
            .send(AudioCmd::SetVolume(settings.initial_volume.min(100)))?;
        Ok(player)
    }

    /// Shared state refreshed by the audio thread on every tick.
    pub fn playback_handle(&self) -> PlaybackHandle {
        self.remote.playback.clone()
    }
}

impl PlaybackBackend for AudioPlayer {
    fn load_and_play(&mut self, locator: &StreamLocator) -> Result<(), BackendError> {
        debug!(id = %locator.track_id, "loading stream");
        let bytes = fetch_stream(&locator.url, self.max_stream_bytes)?;
        let source = decode(bytes)?;
        self.remote.send(AudioCmd::Load {
            track_id: locator.track_id.clone(),
            source,
        })
    }

    fn pause(&mut self) {
        self.remote.pause();
    }

    fn resume(&mut self) {
        self.remote.resume();
    }

    fn stop(&mut self) {
        self.remote.stop();
    }

    fn set_volume(&mut self, volume: u8) {
        self.remote.set_volume(volume);
    }

    fn elapsed_millis(&self) -> i64 {
        self.remote
            .playback
            .lock()
            .map(|info| info.elapsed_millis())
            .unwrap_or(-1)
    }

    fn state(&self) -> BackendState {
        read_state(&self.remote.playback)
    }

    fn shutdown(&mut self) {
        let _ = self.remote.send(AudioCmd::Quit);

        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }

    fn remote(&self) -> Option<Box<dyn TransportRemote>> {
        Some(Box::new(self.remote.clone()))
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
