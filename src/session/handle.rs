use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::audio::{PlaybackBackend, TransportRemote};
use crate::library::{Playlist, Track};
use crate::resolver::StreamResolver;

use super::PlaybackEvent;
use super::model::{PlaybackSession, TransportState, step_volume};
use super::thread::spawn_session_thread;

pub(super) enum SessionCmd {
    Play { ticket: u64, track: Track },
    PlayPlaylistTrack {
        ticket: u64,
        playlist: Playlist,
        index: usize,
    },
    Stop,
    TogglePause,
    VolumeUp,
    VolumeDown,
    CheckStatus,
    Quit,
}

/// Snapshot of the session published after every command.
///
/// Replaced as a whole, so readers never see a track paired with another
/// track's duration.
#[derive(Debug, Clone, Default)]
pub struct NowPlaying {
    pub track: Option<Track>,
    pub duration: u64,
    pub transport: TransportState,
    pub volume: u8,
    pub playlist: Option<PlaylistPosition>,
}

/// Where the loaded track sits in the bound playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPosition {
    pub name: String,
    /// Zero-based index of the loaded track.
    pub cursor: usize,
    pub len: usize,
}

pub(super) type NowPlayingHandle = Arc<Mutex<NowPlaying>>;

/// Front end of the session thread.
///
/// Every play request takes a ticket from a shared counter; the thread
/// drops requests whose ticket is no longer the newest.
///
/// When the backend offers a remote, pause, volume and stop reach the output
/// and the snapshot at once, and the session thread catches up when it is
/// done with whatever track it is loading.
pub struct SessionHandle {
    tx: Sender<SessionCmd>,
    latest: Arc<AtomicU64>,
    now_playing: NowPlayingHandle,
    remote: Option<Box<dyn TransportRemote>>,
    join: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn spawn<B, R, E>(session: PlaybackSession<B, R>, events: Sender<E>) -> Self
    where
        B: PlaybackBackend + 'static,
        R: StreamResolver + Send + 'static,
        E: From<PlaybackEvent> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));
        let now_playing: NowPlayingHandle = Arc::new(Mutex::new(NowPlaying {
            volume: session.volume(),
            ..NowPlaying::default()
        }));

        let remote = session.remote();
        let join = spawn_session_thread(session, rx, latest.clone(), now_playing.clone(), events);

        Self {
            tx,
            latest,
            now_playing,
            remote,
            join: Some(join),
        }
    }

    pub fn now_playing(&self) -> NowPlaying {
        self.now_playing
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    fn next_ticket(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn send(&self, cmd: SessionCmd) {
        let _ = self.tx.send(cmd);
    }

    /// Run `apply` against the remote and the snapshot, if there is a remote.
    fn ahead(&self, apply: impl FnOnce(&dyn TransportRemote, &mut NowPlaying)) {
        let Some(remote) = self.remote.as_deref() else {
            return;
        };
        if let Ok(mut now) = self.now_playing.lock() {
            apply(remote, &mut *now);
        }
    }

    /// Play `track` on its own, superseding any pending request.
    pub fn play(&self, track: Track) -> u64 {
        let ticket = self.next_ticket();
        self.send(SessionCmd::Play { ticket, track });
        ticket
    }

    /// Play track `index` of `playlist` with the playlist bound.
    pub fn play_playlist_track(&self, playlist: Playlist, index: usize) -> u64 {
        let ticket = self.next_ticket();
        self.send(SessionCmd::PlayPlaylistTrack {
            ticket,
            playlist,
            index,
        });
        ticket
    }

    /// Stop playback. Pending play requests are superseded as well.
    pub fn stop(&self) {
        self.next_ticket();
        self.ahead(|remote, now| {
            remote.stop();
            *now = NowPlaying {
                volume: now.volume,
                ..NowPlaying::default()
            };
        });
        self.send(SessionCmd::Stop);
    }

    pub fn toggle_pause(&self) {
        self.ahead(|remote, now| match now.transport {
            TransportState::Playing => {
                remote.pause();
                now.transport = TransportState::Paused;
            }
            TransportState::Paused => {
                remote.resume();
                now.transport = TransportState::Playing;
            }
            TransportState::Stopped => {}
        });
        self.send(SessionCmd::TogglePause);
    }

    pub fn volume_up(&self) {
        self.nudge_volume(true);
        self.send(SessionCmd::VolumeUp);
    }

    pub fn volume_down(&self) {
        self.nudge_volume(false);
        self.send(SessionCmd::VolumeDown);
    }

    fn nudge_volume(&self, up: bool) {
        self.ahead(|remote, now| {
            now.volume = step_volume(now.volume, up);
            remote.set_volume(now.volume);
        });
    }

    pub fn check_status(&self) {
        self.send(SessionCmd::CheckStatus);
    }

    /// Stop playback and wait for the session thread to release the backend.
    pub fn shutdown(&mut self) {
        self.next_ticket();
        self.send(SessionCmd::Quit);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
