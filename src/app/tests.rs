use super::viewport::Viewport;
use super::*;
use crate::config::{SearchSettings, UiSettings};
use crate::library::{DisplayItem, Library, StorePaths, Track};
use crate::session::PlaybackEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ch(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn t(id: &str, duration: u64) -> Track {
    Track::new(id, format!("Song {id}"), "u", duration, "")
}

fn app_in(dir: &tempfile::TempDir) -> App {
    let library = Library::open(StorePaths::in_dir(dir.path()));
    let mut app = App::new(library, &SearchSettings::default(), &UiSettings::default());
    app.on_resize(5);
    app
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        assert_eq!(app.on_key(ch(c)), None);
    }
}

fn search(app: &mut App, query: &str, found: Vec<Track>) {
    app.on_key(ch('/'));
    type_text(app, query);
    let Some(Effect::Search { seq, query, .. }) = app.on_key(key(KeyCode::Enter)) else {
        panic!("expected a search");
    };
    app.apply_event(WorkerEvent::SearchFinished {
        seq,
        query,
        result: Ok(found),
    });
}

fn check_invariant(vp: &Viewport, len: usize) {
    let h = vp.visible();
    assert!(vp.offset <= len.saturating_sub(h), "{vp:?} len {len}");
    if len > 0 {
        assert!(vp.offset <= vp.selected, "{vp:?}");
        assert!(vp.selected < vp.offset + h, "{vp:?}");
        assert!(vp.selected < len, "{vp:?}");
    }
}

#[test]
fn viewport_invariant_holds_for_any_navigation() {
    for len in 0..=12 {
        for h in 1..=6 {
            // a fixed but irregular walk: 1 = down, 0 = up
            let walk = [1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0];
            let mut vp = Viewport::new(h);
            check_invariant(&vp, len);
            for (i, step) in walk.iter().cycle().take(60).enumerate() {
                if *step == 1 {
                    vp.down(len);
                } else {
                    vp.up();
                }
                check_invariant(&vp, len);
                if i % 17 == 0 {
                    vp.resize(1 + (i % 5), len);
                    check_invariant(&vp, len);
                }
            }
        }
    }
}

#[test]
fn viewport_scrolls_minimally() {
    let mut vp = Viewport::new(3);
    for _ in 0..3 {
        vp.down(10);
    }
    assert_eq!((vp.selected, vp.offset), (3, 1));

    vp.up();
    vp.up();
    assert_eq!((vp.selected, vp.offset), (1, 1));
    vp.up();
    assert_eq!((vp.selected, vp.offset), (0, 0));
    assert!(!vp.up());
}

#[test]
fn viewport_resize_clamps_offset_and_selection() {
    let mut vp = Viewport::new(3);
    for _ in 0..9 {
        vp.down(10);
    }
    assert_eq!((vp.selected, vp.offset), (9, 7));

    vp.resize(8, 10);
    assert_eq!((vp.selected, vp.offset), (9, 2));

    vp.resize(8, 4);
    assert_eq!((vp.selected, vp.offset), (3, 0));
    assert_eq!(vp.window(4), 0..4);
}

#[test]
fn search_flow_switches_to_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);

    app.on_key(ch('/'));
    assert!(matches!(app.mode, Mode::Search));
    // q and space are text while searching
    type_text(&mut app, "q test");

    let effect = app.on_key(key(KeyCode::Enter));
    assert_eq!(
        effect,
        Some(Effect::Search {
            seq: 1,
            query: "q test".to_string(),
            limit: 10,
        })
    );
    assert_eq!(app.status, "Searching...");

    app.apply_event(WorkerEvent::SearchFinished {
        seq: 1,
        query: "q test".to_string(),
        result: Ok(vec![t("a", 125), t("b", 0)]),
    });
    assert!(matches!(app.mode, Mode::Results));
    assert_eq!(app.item_count(), 2);
    assert_eq!(app.status, "Showing 2 results (scroll down for more)");
}

#[test]
fn empty_search_reports_no_results_and_stays() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "zzz", vec![]);

    assert!(matches!(app.mode, Mode::Search));
    assert_eq!(app.status, "No results found");

    app.on_key(key(KeyCode::Esc));
    assert!(matches!(app.mode, Mode::Home));
    assert_eq!(app.status, "No favorites yet");
}

#[test]
fn blank_query_does_not_search() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.on_key(ch('/'));
    type_text(&mut app, "   ");
    assert_eq!(app.on_key(key(KeyCode::Enter)), None);
}

#[test]
fn stale_search_result_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);

    app.on_key(ch('/'));
    type_text(&mut app, "one");
    app.on_key(key(KeyCode::Enter));
    type_text(&mut app, "two");
    app.on_key(key(KeyCode::Enter));

    app.apply_event(WorkerEvent::SearchFinished {
        seq: 1,
        query: "one".to_string(),
        result: Ok(vec![t("old", 1)]),
    });
    assert!(app.results.is_empty());

    app.apply_event(WorkerEvent::SearchFinished {
        seq: 2,
        query: "onetwo".to_string(),
        result: Ok(vec![t("new", 1)]),
    });
    assert_eq!(app.results[0].id, "new");
}

#[test]
fn down_at_last_result_fetches_more_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "test", vec![t("a", 1), t("b", 2)]);

    assert_eq!(app.on_key(key(KeyCode::Down)), None);
    assert_eq!(app.viewport.selected, 1);

    let effect = app.on_key(key(KeyCode::Down));
    assert_eq!(
        effect,
        Some(Effect::FetchMore {
            seq: 1,
            query: "test".to_string(),
            already: 2,
            count: 10,
        })
    );
    assert!(app.loading_more);
    assert_eq!(app.status, "Loading more results...");
    assert_eq!(app.viewport.selected, 1);

    // already loading
    assert_eq!(app.on_key(ch('j')), None);

    app.apply_event(WorkerEvent::MoreFinished {
        seq: 1,
        result: Ok(vec![t("b", 2), t("c", 3)]),
    });
    assert!(!app.loading_more);
    let ids: Vec<_> = app.results.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_eq!(app.status, "Showing 3 results");
    // selection only moves on the next key press
    assert_eq!(app.viewport.selected, 1);
    app.on_key(key(KeyCode::Down));
    assert_eq!(app.viewport.selected, 2);
}

#[test]
fn fetch_more_with_nothing_new_reports_all() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "test", vec![t("a", 1)]);

    app.on_key(key(KeyCode::Down));
    app.apply_event(WorkerEvent::MoreFinished {
        seq: 1,
        result: Ok(Vec::new()),
    });
    assert_eq!(app.results.len(), 1);
    assert_eq!(app.status, "Showing all 1 results found");
}

#[test]
fn fetch_more_offset_counts_duplicates_returned() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "test", vec![t("a", 1), t("b", 2)]);

    app.on_key(key(KeyCode::Down));
    app.on_key(key(KeyCode::Down));
    // the window drifted by one: "b" comes back alongside "c"
    app.apply_event(WorkerEvent::MoreFinished {
        seq: 1,
        result: Ok(vec![t("b", 2), t("c", 3)]),
    });
    assert_eq!(app.results.len(), 3);
    assert_eq!(app.fetched, 4);

    app.on_key(key(KeyCode::Down));
    let Some(Effect::FetchMore { already, .. }) = app.on_key(key(KeyCode::Down)) else {
        panic!("expected a fetch-more");
    };
    assert_eq!(already, 4);

    // only duplicates this time, but the backend is not exhausted yet
    app.apply_event(WorkerEvent::MoreFinished {
        seq: 1,
        result: Ok(vec![t("c", 3)]),
    });
    assert_eq!(app.results.len(), 3);
    assert_eq!(app.fetched, 5);
    assert_eq!(app.status, "Showing 3 results");
}

#[test]
fn favorite_toggle_in_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "test", vec![t("a", 125), t("b", 0)]);

    app.on_key(ch('f'));
    assert!(app.library.is_favorite("a"));
    assert_eq!(app.status, "Added to favorites: Song a");

    app.on_key(ch('f'));
    assert!(!app.library.is_favorite("a"));
    assert_eq!(app.status, "Removed from favorites: Song a");
}

#[test]
fn enter_in_results_requests_play() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    search(&mut app, "test", vec![t("a", 125), t("b", 0)]);
    app.on_key(ch('j'));

    assert_eq!(app.on_key(key(KeyCode::Enter)), Some(Effect::Play(t("b", 0))));
    assert_eq!(app.status, "Loading: Song b...");
}

#[test]
fn home_lists_playlists_before_favorites_and_removes_favorites() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.library.add_favorite(t("a", 10));
    app.library.add_favorite(t("b", 20));
    app.library.create_playlist("Mix", vec![t("a", 10)]);
    app.on_key(key(KeyCode::Esc));

    let titles: Vec<String> = app.items().iter().map(DisplayItem::title).collect();
    assert_eq!(titles, ["Mix (1 tracks)", "Song a", "Song b"]);

    // f on a playlist row does nothing
    app.on_key(ch('f'));
    assert_eq!(app.library.favorites().len(), 2);

    app.on_key(ch('j'));
    app.on_key(ch('j'));
    app.on_key(ch('f'));
    assert_eq!(app.status, "Removed from favorites: Song b");
    assert_eq!(app.item_count(), 2);
    assert_eq!(app.viewport.selected, 1);
}

#[test]
fn creating_a_playlist_needs_favorites() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.on_key(ch('e'));
    assert!(matches!(app.mode, Mode::Home));
    assert_eq!(
        app.status,
        "Add some favorites first before creating a playlist!"
    );
}

#[test]
fn create_playlist_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.library.add_favorite(t("a", 10));
    app.library.add_favorite(t("b", 20));

    app.on_key(ch('e'));
    // every key is part of the name while naming
    type_text(&mut app, "q s/");
    app.on_key(key(KeyCode::Backspace));
    let editor = app.editor().unwrap();
    assert_eq!(editor.name, "q s");
    assert_eq!(editor.phase, EditorPhase::EnteringName);

    app.on_key(key(KeyCode::Enter));
    assert_eq!(app.editor().unwrap().phase, EditorPhase::SelectingTracks);

    app.on_key(key(KeyCode::Enter));
    assert_eq!(app.status, "Select at least one track!");

    app.on_key(ch('j'));
    app.on_key(ch(' '));
    app.on_key(ch('k'));
    app.on_key(ch(' '));
    assert!(app.editor().unwrap().is_selected("a"));
    app.on_key(key(KeyCode::Enter));

    assert!(matches!(app.mode, Mode::Home));
    assert_eq!(app.status, "Created playlist: q s");
    let p = &app.library.playlists()[0];
    let ids: Vec<_> = p.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
}

#[test]
fn blank_name_is_not_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.library.add_favorite(t("a", 10));
    app.on_key(ch('e'));
    type_text(&mut app, "  ");
    app.on_key(key(KeyCode::Enter));
    assert_eq!(app.editor().unwrap().phase, EditorPhase::EnteringName);

    app.on_key(key(KeyCode::Esc));
    assert!(matches!(app.mode, Mode::Home));
    assert_eq!(app.status, "Playlist creation cancelled");
}

#[test]
fn playlist_view_plays_and_edits() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    app.library.add_favorite(t("a", 10));
    let id = app
        .library
        .create_playlist("Mix", vec![t("a", 10), t("gone", 5)])
        .unwrap();
    app.on_key(key(KeyCode::Esc));

    app.on_key(key(KeyCode::Enter));
    assert!(matches!(&app.mode, Mode::PlaylistView { playlist_id } if *playlist_id == id));
    assert_eq!(app.status, "Playlist: Mix");

    app.on_key(ch('j'));
    let Some(Effect::PlayPlaylist { playlist, index }) = app.on_key(key(KeyCode::Enter)) else {
        panic!("expected playlist play");
    };
    assert_eq!(playlist.id, id);
    assert_eq!(index, 1);
    assert_eq!(app.status, "Starting playlist: Mix");

    app.on_key(ch('e'));
    let editor = app.editor().unwrap();
    assert_eq!(editor.phase, EditorPhase::SelectingTracks);
    assert_eq!(editor.name, "Mix");
    // the non-favorite track stays selectable
    let ids: Vec<_> = editor.candidates.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["a", "gone"]);
    assert!(editor.is_selected("gone"));

    app.on_key(ch('j'));
    app.on_key(ch(' '));
    app.on_key(key(KeyCode::Enter));
    assert!(matches!(app.mode, Mode::PlaylistView { .. }));
    assert_eq!(app.status, "Updated playlist: Mix");
    assert_eq!(app.library.playlist(&id).unwrap().len(), 1);

    app.on_key(ch('e'));
    app.on_key(key(KeyCode::Esc));
    assert!(matches!(app.mode, Mode::PlaylistView { .. }));
    assert_eq!(app.status, "Editing cancelled");

    app.on_key(ch('e'));
    app.on_key(ch('d'));
    assert!(matches!(app.mode, Mode::Home));
    assert_eq!(app.status, "Deleted playlist: Mix");
    assert!(app.library.playlists().is_empty());
}

#[test]
fn global_transport_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);

    assert_eq!(app.on_key(ch(' ')), Some(Effect::TogglePause));
    assert_eq!(app.on_key(ch('s')), Some(Effect::Stop));
    assert_eq!(app.status, "Playback stopped");

    assert!(!app.volume_visible(std::time::Instant::now()));
    assert_eq!(app.on_key(ch('=')), Some(Effect::VolumeUp));
    assert!(app.volume_visible(std::time::Instant::now()));
    assert_eq!(app.on_key(ch('_')), Some(Effect::VolumeDown));
    assert_eq!(app.on_key(ch('x')), None);
    assert_eq!(app.on_key(ch('q')), Some(Effect::Quit));
}

#[test]
fn playback_events_update_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_in(&dir);
    let long = Track::new("l", "x".repeat(80), "u", 0, "");

    app.apply_event(PlaybackEvent::Started { track: long, playlist: None }.into());
    assert_eq!(app.status, format!("Playing: {}", "x".repeat(50)));

    app.apply_event(PlaybackEvent::Advanced { track: t("a", 1) }.into());
    assert_eq!(app.status, "Playing from playlist: Song a");

    app.apply_event(
        PlaybackEvent::Failed {
            track: t("a", 1),
            reason: "boom".to_string(),
        }
        .into(),
    );
    assert_eq!(app.status, "Failed to load track");

    app.apply_event(PlaybackEvent::Finished { track: t("a", 1) }.into());
    assert_eq!(app.status, "Finished: Song a");
}
