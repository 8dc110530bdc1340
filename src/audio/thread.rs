use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info};

use super::types::{AudioCmd, BackendError, BackendState, PlaybackHandle};

const TICK: Duration = Duration::from_millis(50);

/// Spawn the thread owning the output stream.
///
/// `ready` receives exactly one message: `Ok` once the default device is
/// open, or `Unavailable` if it could not be opened (the thread then exits).
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    ready: Sender<Result<(), BackendError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(BackendError::Unavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when the stream is dropped, which would land on the TUI.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut sink: Option<Sink> = None;
        let mut loaded: Option<String> = None;
        let mut volume = 1.0_f32;

        loop {
            match rx.recv_timeout(TICK) {
                Ok(AudioCmd::Load { track_id, source }) => {
                    if let Some(old) = sink.take() {
                        old.stop();
                    }
                    let new_sink = Sink::connect_new(stream.mixer());
                    new_sink.set_volume(volume);
                    new_sink.append(source);
                    new_sink.play();
                    info!(id = %track_id, "playback started");
                    sink = Some(new_sink);
                    loaded = Some(track_id);
                }
                Ok(AudioCmd::Pause) => {
                    if let Some(s) = sink.as_ref() {
                        s.pause();
                    }
                }
                Ok(AudioCmd::Resume) => {
                    if let Some(s) = sink.as_ref() {
                        s.play();
                    }
                }
                Ok(AudioCmd::Stop) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    loaded = None;
                }
                Ok(AudioCmd::SetVolume(v)) => {
                    volume = f32::from(v.min(100)) / 100.0;
                    if let Some(s) = sink.as_ref() {
                        s.set_volume(volume);
                    }
                }
                Ok(AudioCmd::Quit) | Err(RecvTimeoutError::Disconnected) => {
                    if let Some(s) = sink.take() {
                        s.stop();
                    }
                    publish(&playback_info, None, None);
                    debug!("audio thread exiting");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }

            publish(&playback_info, sink.as_ref(), loaded.as_deref());
        }
    })
}

fn publish(playback_info: &PlaybackHandle, sink: Option<&Sink>, track_id: Option<&str>) {
    let (state, elapsed) = match sink {
        None => (BackendState::Stopped, None),
        Some(s) if s.empty() => (BackendState::Ended, Some(s.get_pos())),
        Some(s) if s.is_paused() => (BackendState::Paused, Some(s.get_pos())),
        Some(s) => (BackendState::Playing, Some(s.get_pos())),
    };

    if let Ok(mut info) = playback_info.lock() {
        info.state = state;
        info.elapsed = elapsed;
        info.track_id = track_id.map(str::to_string);
    }
}
