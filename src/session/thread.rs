use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::audio::PlaybackBackend;
use crate::resolver::StreamResolver;

use super::handle::{NowPlaying, NowPlayingHandle, PlaylistPosition, SessionCmd};
use super::model::{PlaybackSession, StatusOutcome};
use super::{PlayError, PlaybackEvent};

pub(super) fn spawn_session_thread<B, R, E>(
    mut session: PlaybackSession<B, R>,
    rx: Receiver<SessionCmd>,
    latest: Arc<AtomicU64>,
    now_playing: NowPlayingHandle,
    events: Sender<E>,
) -> JoinHandle<()>
where
    B: PlaybackBackend + 'static,
    R: StreamResolver + Send + 'static,
    E: From<PlaybackEvent> + Send + 'static,
{
    thread::spawn(move || {
        let emit = |event: PlaybackEvent| {
            let _ = events.send(E::from(event));
        };
        let is_latest = |ticket: u64| latest.load(Ordering::SeqCst) == ticket;

        while let Ok(cmd) = rx.recv() {
            let event = match cmd {
                SessionCmd::Play { ticket, track } => {
                    if !is_latest(ticket) {
                        debug!(ticket, id = %track.id, "skipping stale play request");
                        continue;
                    }
                    match session.play(&track, false, || is_latest(ticket)) {
                        Ok(()) => Some(PlaybackEvent::Started {
                            track,
                            playlist: None,
                        }),
                        Err(PlayError::Superseded) => None,
                        Err(e) => {
                            warn!(id = %track.id, error = %e, "play failed");
                            Some(PlaybackEvent::Failed {
                                track,
                                reason: e.to_string(),
                            })
                        }
                    }
                }
                SessionCmd::PlayPlaylistTrack {
                    ticket,
                    playlist,
                    index,
                } => {
                    if !is_latest(ticket) {
                        debug!(ticket, playlist = %playlist.name, "skipping stale play request");
                        continue;
                    }
                    let name = playlist.name.clone();
                    let requested = playlist.tracks.get(index).cloned();
                    match session.play_playlist_track(playlist, index, || is_latest(ticket)) {
                        Ok(()) => session.current_track().cloned().map(|track| {
                            PlaybackEvent::Started {
                                track,
                                playlist: Some(name),
                            }
                        }),
                        Err(PlayError::Superseded) => None,
                        Err(e) => {
                            warn!(playlist = %name, index, error = %e, "playlist play failed");
                            requested.map(|track| PlaybackEvent::Failed {
                                track,
                                reason: e.to_string(),
                            })
                        }
                    }
                }
                SessionCmd::Stop => {
                    session.stop(true);
                    None
                }
                SessionCmd::TogglePause => {
                    session.toggle_pause();
                    None
                }
                SessionCmd::VolumeUp => {
                    session.volume_up();
                    None
                }
                SessionCmd::VolumeDown => {
                    session.volume_down();
                    None
                }
                SessionCmd::CheckStatus => {
                    let ticket = latest.load(Ordering::SeqCst);
                    match session.check_playback_status(|| is_latest(ticket)) {
                        Ok(StatusOutcome::Advanced(track)) => {
                            Some(PlaybackEvent::Advanced { track })
                        }
                        Ok(StatusOutcome::Finished(track)) => {
                            Some(PlaybackEvent::Finished { track })
                        }
                        Ok(StatusOutcome::Idle | StatusOutcome::Running) => None,
                        Err(PlayError::Superseded) => None,
                        Err(PlayError::PlaylistExhausted { attempts }) => {
                            Some(PlaybackEvent::AdvanceFailed { attempts })
                        }
                        Err(e) => {
                            warn!(error = %e, "auto-advance failed");
                            Some(PlaybackEvent::AdvanceFailed { attempts: 0 })
                        }
                    }
                }
                SessionCmd::Quit => break,
            };

            // Publish first so whoever reacts to the event sees the new state.
            publish(&now_playing, &session);
            if let Some(event) = event {
                emit(event);
            }
        }

        session.shutdown();
        debug!("session thread exiting");
    })
}

fn publish<B: PlaybackBackend, R: StreamResolver>(
    now_playing: &NowPlayingHandle,
    session: &PlaybackSession<B, R>,
) {
    let snapshot = NowPlaying {
        track: session.current_track().cloned(),
        duration: session.duration(),
        transport: session.transport(),
        volume: session.volume(),
        playlist: session.context().map(|c| PlaylistPosition {
            name: c.playlist.name.clone(),
            cursor: c.cursor,
            len: c.playlist.len(),
        }),
    };
    if let Ok(mut n) = now_playing.lock() {
        *n = snapshot;
    }
}
