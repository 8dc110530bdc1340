use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Effect, WorkerEvent};
use crate::audio::PlaybackHandle;
use crate::config;
use crate::session::{NowPlaying, SessionHandle, clamp_elapsed};
use crate::ui;
use crate::visualizer::{self, Visualizer};

use super::workers::Workers;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    pub visualizer: Visualizer,
    last_marquee: Instant,
    last_status_check: Instant,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        let now = Instant::now();
        Self {
            visualizer: Visualizer::new(settings.ui.visualizer_bars),
            last_marquee: now,
            last_status_check: now,
        }
    }
}

/// One reading of the session and the output position, taken per frame.
pub struct Sample {
    pub now: NowPlaying,
    /// Milliseconds into the loaded track, -1 when unknown.
    pub raw_elapsed_ms: i64,
}

impl Sample {
    pub fn elapsed_secs(&self) -> u64 {
        clamp_elapsed(self.raw_elapsed_ms, self.now.duration)
    }
}

/// Read the session snapshot and the audio position.
///
/// The position only counts when the audio thread is reporting on the same
/// track the session believes is loaded.
pub fn sample(session: &SessionHandle, playback: Option<&PlaybackHandle>) -> Sample {
    let now = session.now_playing();
    let raw_elapsed_ms = match (&now.track, playback) {
        (Some(track), Some(handle)) => handle
            .lock()
            .ok()
            .filter(|info| info.track_id.as_deref() == Some(track.id.as_str()))
            .map(|info| info.elapsed_millis())
            .unwrap_or(-1),
        _ => -1,
    };
    Sample {
        now,
        raw_elapsed_ms,
    }
}

/// Fold every pending background result into the app.
pub fn drain_inbox(app: &mut App, inbox: &Receiver<WorkerEvent>) {
    while let Ok(event) = inbox.try_recv() {
        app.apply_event(event);
    }
}

/// Carry out an effect. Returns `true` when the app should exit.
pub fn dispatch(
    effect: Effect,
    session: &SessionHandle,
    workers: &Workers,
    visualizer: &mut Visualizer,
) -> bool {
    match effect {
        Effect::Quit => {
            session.stop();
            return true;
        }
        Effect::Search { seq, query, limit } => workers.spawn_search(seq, query, limit),
        Effect::FetchMore {
            seq,
            query,
            already,
            count,
        } => workers.spawn_fetch_more(seq, query, already, count),
        Effect::Play(track) => {
            visualizer.clear();
            let ticket = session.play(track);
            debug!(ticket, "play requested");
        }
        Effect::PlayPlaylist { playlist, index } => {
            visualizer.clear();
            let ticket = session.play_playlist_track(playlist, index);
            debug!(ticket, index, "playlist play requested");
        }
        Effect::TogglePause => session.toggle_pause(),
        Effect::Stop => session.stop(),
        Effect::VolumeUp => session.volume_up(),
        Effect::VolumeDown => session.volume_down(),
    }
    false
}

/// Main terminal event loop: drains worker results, animates, draws and
/// handles input. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &SessionHandle,
    playback: &PlaybackHandle,
    workers: &Workers,
    inbox: &Receiver<WorkerEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.ui.tick_ms);
    let marquee_step = Duration::from_millis(settings.ui.marquee_step_ms);
    let status_every = Duration::from_millis(settings.playback.status_check_ms);

    app.on_resize(ui::visible_lines(
        terminal.size()?.height,
        settings.ui.visualizer_height,
    ));

    loop {
        drain_inbox(app, inbox);

        let snapshot = sample(session, Some(playback));
        state.visualizer.update(&visualizer::Frame {
            transport: snapshot.now.transport,
            volume: snapshot.now.volume,
            elapsed_ms: snapshot.raw_elapsed_ms,
            track_id: snapshot.now.track.as_ref().map(|t| t.id.as_str()),
        });

        let now = Instant::now();
        if now.duration_since(state.last_marquee) >= marquee_step {
            app.tick_marquee();
            state.last_marquee = now;
        }
        if now.duration_since(state.last_status_check) >= status_every {
            session.check_status();
            state.last_status_check = now;
        }

        let view = ui::PlaybackView {
            now: &snapshot.now,
            elapsed: snapshot.elapsed_secs(),
            show_volume: app.volume_visible(now),
        };
        terminal.draw(|f| ui::draw(f, app, &view, &state.visualizer, &settings.ui))?;

        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key_event(key, app, session, workers, state) {
                        break;
                    }
                }
                Event::Resize(_, height) => {
                    app.on_resize(ui::visible_lines(height, settings.ui.visualizer_height));
                    terminal.clear()?;
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    session: &SessionHandle,
    workers: &Workers,
    state: &mut EventLoopState,
) -> bool {
    match app.on_key(key) {
        Some(effect) => dispatch(effect, session, workers, &mut state.visualizer),
        None => false,
    }
}
