use std::env;
use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::{App, WorkerEvent};
use crate::audio::AudioPlayer;
use crate::library::{Library, StorePaths};
use crate::resolver::{Resolver, SearchBackend, YtDlp};
use crate::session::{PlaybackSession, SessionHandle};

mod event_loop;
mod logging;
mod settings;
mod startup;
mod workers;

use workers::Workers;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = startup::parse_args(env::args().skip(1));
    let settings = settings::load_settings();

    if cli.dump_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    logging::init(&settings.log_file(), &settings.log.filter);
    info!(data_dir = %settings.data_dir().display(), "starting");

    let library = Library::open(StorePaths::in_dir(&settings.data_dir()));
    let backend: Arc<dyn SearchBackend> = Arc::new(YtDlp::new(&settings.search));

    let audio_player = AudioPlayer::new(&settings.playback)
        .map_err(|e| format!("cadenza: cannot start audio output: {e}"))?;
    let playback = audio_player.playback_handle();

    let (inbox_tx, inbox_rx) = mpsc::channel::<WorkerEvent>();
    let session = PlaybackSession::new(
        audio_player,
        Resolver::new(backend.clone()),
        &settings.playback,
    );
    let mut session = SessionHandle::spawn(session, inbox_tx.clone());
    let workers = Workers::new(backend, inbox_tx);

    let mut app = App::new(library, &settings.search, &settings.ui);

    let mut state = event_loop::EventLoopState::new(&settings);
    if let Some(query) = &cli.query {
        if let Some(effect) = startup::initial_search(&mut app, query) {
            event_loop::dispatch(effect, &session, &workers, &mut state.visualizer);
        }
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &session,
        &playback,
        &workers,
        &inbox_rx,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session.shutdown();
    info!("stopped");

    run_result
}

#[cfg(test)]
mod tests;
