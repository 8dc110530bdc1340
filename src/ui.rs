//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads the model and draws it with `ratatui`; no state
//! changes happen while drawing.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, EditorPhase, EditorTarget, Mode};
use crate::config::UiSettings;
use crate::library::{DisplayItem, duration_label, format_mss};
use crate::session::{NowPlaying, PlaylistPosition, TransportState, progress_fraction};
use crate::visualizer::Visualizer;

const HEADER_HEIGHT: u16 = 3;
const SEARCH_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 4;
const CONTROLS_HEIGHT: u16 = 3;
const MARQUEE_GAP: &str = "   ";
const PROGRESS_WIDTH: usize = 20;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play/open");
    map.insert("space", "pause");
    map.insert("s", "stop");
    map.insert("+/-", "volume");
    map.insert("/", "search");
    map.insert("f", "favorite");
    map.insert("e", "playlist");
    map.insert("esc", "home");
    map.insert("q", "quit");
    map
});

/// Render the controls help for the keys that matter in `mode`.
fn controls_text(mode: &Mode) -> String {
    let order: &[&str] = match mode {
        Mode::Search => return "[enter] search | [esc] back".to_string(),
        Mode::Editor(e) if e.phase == EditorPhase::EnteringName => {
            return "[enter] confirm name | [esc] cancel".to_string();
        }
        Mode::Editor(e) => {
            let delete = match e.target {
                EditorTarget::Edit { .. } => " | [d] delete playlist",
                EditorTarget::Create => "",
            };
            return format!("[j/k] up/down | [space] toggle | [enter] save{delete} | [esc] cancel");
        }
        Mode::Home => &["j/k", "enter", "f", "e", "/", "space", "s", "+/-", "q"],
        Mode::Results => &["j/k", "enter", "f", "/", "esc", "space", "s", "+/-", "q"],
        Mode::PlaylistView { .. } => &["j/k", "enter", "e", "esc", "space", "s", "+/-", "q"],
    };
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}")))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Rows available to the list for a terminal `height` rows tall.
pub fn visible_lines(height: u16, visualizer_height: u16) -> usize {
    let fixed = HEADER_HEIGHT
        + SEARCH_HEIGHT
        + visualizer_height.saturating_add(2)
        + STATUS_HEIGHT
        + CONTROLS_HEIGHT
        + 2;
    usize::from(height.saturating_sub(fixed)).max(1)
}

/// A `width`-wide window onto `text`, scrolled by `offset` characters.
///
/// Text that fits is returned unchanged; longer text wraps around with a
/// short gap.
pub fn marquee(text: &str, width: usize, offset: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width {
        return text.to_string();
    }
    let looped: Vec<char> = chars.iter().copied().chain(MARQUEE_GAP.chars()).collect();
    let start = offset % looped.len();
    looped.iter().cycle().skip(start).take(width).collect()
}

/// `[m:ss] ████░░░░ [m:ss]`, with `--:--` for an unknown duration.
pub fn progress_text(elapsed: u64, duration: u64, width: usize) -> String {
    let filled = (progress_fraction(elapsed, duration) * width as f64) as usize;
    let bar: String = "█".repeat(filled.min(width)) + &"░".repeat(width - filled.min(width));
    let total = if duration > 0 {
        format_mss(duration)
    } else {
        "--:--".to_string()
    };
    format!("[{}] {bar} [{total}]", format_mss(elapsed))
}

/// What the status box needs about playback, sampled once per frame.
pub struct PlaybackView<'a> {
    pub now: &'a NowPlaying,
    /// Seconds, already clamped to the duration.
    pub elapsed: u64,
    pub show_volume: bool,
}

fn now_playing_line(app: &App, view: &PlaybackView<'_>, width: usize) -> String {
    let volume = if view.show_volume {
        format!(" | Vol:{}%", view.now.volume)
    } else {
        String::new()
    };

    let Some(track) = &view.now.track else {
        return format!("■ Stopped{volume}");
    };
    let icon = match view.now.transport {
        TransportState::Paused => "❚❚ ",
        _ => "♫ ",
    };
    let progress = progress_text(view.elapsed, view.now.duration, PROGRESS_WIDTH);
    let used = icon.chars().count() + 3 + progress.chars().count() + volume.chars().count();
    if width <= used + 8 {
        let room = width.saturating_sub(icon.chars().count() + volume.chars().count());
        let title = marquee(&track.title, room, app.marquee_offset);
        return format!("{icon}{title}{volume}");
    }
    let title = marquee(&track.title, width - used, app.marquee_offset);
    format!("{icon}{title} | {progress}{volume}")
}

/// Title of the status box, naming the bound playlist and position in it.
pub fn status_title(now: &NowPlaying) -> String {
    match &now.playlist {
        Some(PlaylistPosition { name, cursor, len }) => {
            format!(" status: {name} {}/{len} ", cursor + 1)
        }
        None => " status ".to_string(),
    }
}

fn row_text(app: &App, item: &DisplayItem, width: usize) -> String {
    let prefix = match (item, &app.mode) {
        (DisplayItem::Playlist(_), _) => "▶ ".to_string(),
        (DisplayItem::Track(t), Mode::Editor(e)) => {
            if e.is_selected(&t.id) { "[x] " } else { "[ ] " }.to_string()
        }
        (DisplayItem::Track(t), _) => {
            if app.library.is_favorite(&t.id) { "★ " } else { "  " }.to_string()
        }
    };
    let label = duration_label(item.duration());
    let room = width
        .saturating_sub(prefix.chars().count() + label.chars().count() + 1)
        .max(1);
    let title: String = item.title().chars().take(room).collect();
    let pad = room.saturating_sub(title.chars().count());
    format!("{prefix}{title}{} {label}", " ".repeat(pad))
}

fn list_title(app: &App) -> String {
    match &app.mode {
        Mode::Home => " playlists & favorites ".to_string(),
        Mode::Search | Mode::Results => format!(" results: {} ", app.results_query),
        Mode::PlaylistView { .. } => match app.viewed_playlist() {
            Some(p) => format!(" playlist: {} ", p.name),
            None => " playlist ".to_string(),
        },
        Mode::Editor(e) => match e.target {
            EditorTarget::Create => " new playlist ".to_string(),
            EditorTarget::Edit { .. } => format!(" edit: {} ", e.name),
        },
    }
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(list_title(app));

    let naming = app
        .editor()
        .filter(|e| e.phase == EditorPhase::EnteringName);
    if let Some(editor) = naming {
        let prompt = Paragraph::new(format!("Playlist name: {}_", editor.name)).block(block);
        frame.render_widget(prompt, area);
        return;
    }

    // Only build rows for the visible window.
    let items = app.items();
    let window = app.viewport.window(items.len());
    let width = usize::from(area.width.saturating_sub(4));
    let rows: Vec<ListItem> = items[window.clone()]
        .iter()
        .map(|item| ListItem::new(row_text(app, item, width)))
        .collect();

    let list = List::new(rows)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if !items.is_empty() {
        state.select(Some(app.viewport.selected.saturating_sub(window.start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn visualizer_lines(visualizer: &Visualizer, height: u16) -> Vec<Line<'static>> {
    let heights = visualizer.heights(height);
    (0..height)
        .map(|row| {
            let level = height - row;
            let text: String = heights
                .iter()
                .map(|h| if *h >= level { "██ " } else { "   " })
                .collect();
            Line::from(text)
        })
        .collect()
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playback: &PlaybackView<'_>,
    visualizer: &Visualizer,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(ui_settings.visualizer_height.saturating_add(2)),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(CONTROLS_HEIGHT),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Search bar
    let search_text = match app.mode {
        Mode::Search => format!("/ {}_", app.query),
        _ if app.searching => format!("/ {} (searching)", app.query),
        _ => "press / to search".to_string(),
    };
    let search = Paragraph::new(search_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" search ")
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(search, chunks[1]);

    draw_list(frame, app, chunks[2]);

    let bars = Paragraph::new(visualizer_lines(visualizer, ui_settings.visualizer_height))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" visualizer "));
    frame.render_widget(bars, chunks[3]);

    // Now playing + last message
    let width = usize::from(chunks[4].width.saturating_sub(4));
    let status = Paragraph::new(vec![
        Line::from(now_playing_line(app, playback, width)).bold(),
        Line::from(app.status.clone()),
    ])
    .block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(status_title(playback.now)),
    );
    frame.render_widget(status, chunks[4]);

    let footer = Paragraph::new(controls_text(&app.mode))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}
