use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::event_loop::{dispatch, drain_inbox, sample};
use super::startup::{Cli, parse_args};
use super::workers::Workers;
use crate::app::{App, Mode, WorkerEvent};
use crate::audio::{BackendError, BackendState, PlaybackBackend};
use crate::config::Settings;
use crate::library::{DisplayItem, Library, StorePaths, StreamLocator, Track};
use crate::resolver::{ResolveError, Resolver, SearchBackend};
use crate::session::{PlaybackEvent, PlaybackSession, SessionHandle, TransportState};
use crate::ui;
use crate::visualizer::Visualizer;

#[derive(Default)]
struct StubSearch {
    resolves: AtomicUsize,
}

impl SearchBackend for StubSearch {
    fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Track>, ResolveError> {
        Ok(vec![
            Track::new("a", "Song A", "u", 125, "src://a"),
            Track::new("b", "Song B", "u", 0, "src://b"),
        ])
    }

    fn fetch_more(
        &self,
        _query: &str,
        _already: usize,
        _count: usize,
    ) -> Result<Vec<Track>, ResolveError> {
        Ok(Vec::new())
    }

    fn resolve_stream(&self, track: &Track) -> Result<String, ResolveError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        Ok(format!("stub://{}", track.id))
    }
}

#[derive(Default)]
struct OutputLog {
    loads: Vec<String>,
    state: BackendState,
}

#[derive(Clone, Default)]
struct StubOutput(Arc<Mutex<OutputLog>>);

impl PlaybackBackend for StubOutput {
    fn load_and_play(&mut self, locator: &StreamLocator) -> Result<(), BackendError> {
        let mut log = self.0.lock().unwrap();
        log.loads.push(locator.track_id.clone());
        log.state = BackendState::Playing;
        Ok(())
    }

    fn pause(&mut self) {
        self.0.lock().unwrap().state = BackendState::Paused;
    }

    fn resume(&mut self) {
        self.0.lock().unwrap().state = BackendState::Playing;
    }

    fn stop(&mut self) {
        self.0.lock().unwrap().state = BackendState::Stopped;
    }

    fn set_volume(&mut self, _volume: u8) {}

    fn elapsed_millis(&self) -> i64 {
        -1
    }

    fn state(&self) -> BackendState {
        self.0.lock().unwrap().state
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        assert!(app.on_key(key(KeyCode::Char(c))).is_none());
    }
}

fn next_event(rx: &Receiver<WorkerEvent>) -> WorkerEvent {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("worker event within 5s")
}

#[test]
fn cli_collects_query_words_and_flags() {
    let args = |v: &[&str]| parse_args(v.iter().map(|s| s.to_string()));

    assert_eq!(args(&[]), Cli::default());
    assert_eq!(
        args(&["daft", "punk"]),
        Cli {
            query: Some("daft punk".to_string()),
            dump_config: false,
        }
    );
    assert_eq!(
        args(&["--dump-config"]),
        Cli {
            query: None,
            dump_config: true,
        }
    );
    assert_eq!(args(&["  "]).query, None);
}

#[test]
fn favorite_to_single_track_playlist_replays_on_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.playback.settle_ms = 0;

    let search = Arc::new(StubSearch::default());
    let backend: Arc<dyn SearchBackend> = search.clone();
    let output = StubOutput::default();

    let (tx, rx) = mpsc::channel::<WorkerEvent>();
    let session = PlaybackSession::new(
        output.clone(),
        Resolver::new(backend.clone()),
        &settings.playback,
    );
    let mut handle = SessionHandle::spawn(session, tx.clone());
    let workers = Workers::new(backend, tx);
    let mut visualizer = Visualizer::new(settings.ui.visualizer_bars);

    let library = Library::open(StorePaths::in_dir(dir.path()));
    let mut app = App::new(library, &settings.search, &settings.ui);
    app.on_resize(10);

    // search "test"
    assert!(app.on_key(key(KeyCode::Char('/'))).is_none());
    type_text(&mut app, "test");
    let effect = app.on_key(key(KeyCode::Enter)).unwrap();
    assert!(!dispatch(effect, &handle, &workers, &mut visualizer));
    app.apply_event(next_event(&rx));
    assert!(matches!(app.mode, Mode::Results));
    assert_eq!(app.results.len(), 2);

    // favorite A, then build a playlist from it
    assert!(app.on_key(key(KeyCode::Char('f'))).is_none());
    assert!(app.library.is_favorite("a"));
    app.on_key(key(KeyCode::Esc));
    app.on_key(key(KeyCode::Char('e')));
    type_text(&mut app, "Mix");
    app.on_key(key(KeyCode::Enter));
    app.on_key(key(KeyCode::Char(' ')));
    app.on_key(key(KeyCode::Enter));
    assert_eq!(app.status, "Created playlist: Mix");
    assert!(matches!(app.mode, Mode::Home));
    assert!(matches!(app.items()[0], DisplayItem::Playlist(_)));

    // open it and play the first track
    assert!(app.on_key(key(KeyCode::Enter)).is_none());
    assert!(matches!(app.mode, Mode::PlaylistView { .. }));
    let effect = app.on_key(key(KeyCode::Enter)).unwrap();
    assert!(!dispatch(effect, &handle, &workers, &mut visualizer));

    match next_event(&rx) {
        WorkerEvent::Playback(PlaybackEvent::Started { track, playlist }) => {
            assert_eq!(track.id, "a");
            assert!(playlist.is_some());
        }
        other => panic!("unexpected event {other:?}"),
    }

    let snapshot = sample(&handle, None);
    assert_eq!(snapshot.now.transport, TransportState::Playing);
    assert_eq!(snapshot.now.duration, 125);
    assert_eq!(snapshot.raw_elapsed_ms, -1);
    let position = snapshot.now.playlist.as_ref().unwrap();
    assert_eq!((position.name.as_str(), position.cursor, position.len), ("Mix", 0, 1));
    assert_eq!(ui::status_title(&snapshot.now), " status: Mix 1/1 ");

    // the track runs out: exactly one advance, back to track 0
    output.0.lock().unwrap().state = BackendState::Ended;
    handle.check_status();
    match next_event(&rx) {
        WorkerEvent::Playback(PlaybackEvent::Advanced { track }) => assert_eq!(track.id, "a"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    assert_eq!(search.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(output.0.lock().unwrap().loads, vec!["a", "a"]);

    handle.shutdown();
}

#[test]
fn quit_stops_playback_and_exits() {
    let settings = Settings::default();
    let backend: Arc<dyn SearchBackend> = Arc::new(StubSearch::default());
    let output = StubOutput::default();
    let (tx, rx) = mpsc::channel::<WorkerEvent>();
    let session = PlaybackSession::new(
        output.clone(),
        Resolver::new(backend.clone()),
        &settings.playback,
    );
    let mut handle = SessionHandle::spawn(session, tx.clone());
    let workers = Workers::new(backend, tx);
    let mut visualizer = Visualizer::new(4);

    let track = Track::new("a", "Song A", "u", 125, "src://a");
    assert!(!dispatch(
        crate::app::Effect::Play(track),
        &handle,
        &workers,
        &mut visualizer
    ));
    let _ = next_event(&rx);

    assert!(dispatch(
        crate::app::Effect::Quit,
        &handle,
        &workers,
        &mut visualizer
    ));
    handle.shutdown();
    assert_eq!(output.0.lock().unwrap().state, BackendState::Stopped);
    drop(rx);
}

#[test]
fn drained_inbox_reaches_the_app() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::default();
    let library = Library::open(StorePaths::in_dir(dir.path()));
    let mut app = App::new(library, &settings.search, &settings.ui);

    let (tx, rx) = mpsc::channel::<WorkerEvent>();
    tx.send(WorkerEvent::Playback(PlaybackEvent::Failed {
        track: Track::new("x", "Broken", "u", 10, ""),
        reason: "nope".to_string(),
    }))
    .unwrap();
    drain_inbox(&mut app, &rx);
    assert_eq!(app.status, "Failed to load track");
}
