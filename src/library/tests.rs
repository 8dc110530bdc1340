use super::store::{load_list, save_list};
use super::*;
use std::fs;
use tempfile::tempdir;

fn t(id: &str, duration: u64) -> Track {
    Track::new(id, format!("Title {id}"), "Uploader", duration, format!("src://{id}"))
}

#[test]
fn tracks_compare_by_id_only() {
    let a = Track::new("x", "One", "A", 10, "s1");
    let b = Track::new("x", "Two", "B", 20, "s2");
    assert_eq!(a, b);
    assert_ne!(a, t("y", 10));
}

#[test]
fn add_favorite_twice_keeps_one_entry() {
    let dir = tempdir().unwrap();
    let mut lib = Library::open(StorePaths::in_dir(dir.path()));

    assert!(lib.add_favorite(t("a", 125)));
    assert!(!lib.add_favorite(t("a", 125)));
    assert_eq!(lib.favorites().len(), 1);
    assert!(lib.is_favorite("a"));
}

#[test]
fn remove_missing_favorite_is_a_noop() {
    let dir = tempdir().unwrap();
    let mut lib = Library::open(StorePaths::in_dir(dir.path()));
    lib.add_favorite(t("a", 1));

    assert!(!lib.remove_favorite("nope"));
    assert_eq!(lib.favorites().len(), 1);
    assert!(lib.remove_favorite("a"));
    assert!(lib.favorites().is_empty());
}

#[test]
fn favorites_preserve_insertion_order_and_persist() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::in_dir(dir.path());
    {
        let mut lib = Library::open(paths.clone());
        lib.add_favorite(t("c", 1));
        lib.add_favorite(t("a", 2));
        lib.add_favorite(t("b", 3));
    }

    let lib = Library::open(paths);
    let ids: Vec<&str> = lib.favorites().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn playlist_crud_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let paths = StorePaths::in_dir(dir.path());
    let mut lib = Library::open(paths.clone());

    assert!(lib.create_playlist("", vec![t("a", 1)]).is_none());
    assert!(lib.create_playlist("Empty", Vec::new()).is_none());

    let id = lib.create_playlist("Mix", vec![t("a", 60), t("b", 30)]).unwrap();
    assert_eq!(lib.playlist(&id).unwrap().total_duration(), 90);

    assert!(lib.update_playlist(&id, "Mix 2", vec![t("b", 30)]));
    assert!(!lib.update_playlist("missing", "X", vec![t("b", 30)]));
    assert!(!lib.update_playlist(&id, "  ", vec![t("b", 30)]));

    let reopened = Library::open(paths.clone());
    let p = reopened.playlist(&id).unwrap();
    assert_eq!(p.name, "Mix 2");
    assert_eq!(p.tracks, vec![t("b", 30)]);

    assert!(lib.delete_playlist(&id));
    assert!(!lib.delete_playlist(&id));
    assert!(Library::open(paths).playlists().is_empty());
}

#[test]
fn playlist_ids_are_unique() {
    let a = Playlist::new("a", vec![t("1", 0)]);
    let b = Playlist::new("a", vec![t("1", 0)]);
    assert_ne!(a.id, b.id);
    assert_eq!(a.id.len(), 32);
}

#[test]
fn load_list_treats_missing_and_corrupt_files_as_empty() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(load_list::<Track>(&missing).is_empty());

    let corrupt = dir.path().join("corrupt.json");
    fs::write(&corrupt, b"{ not json").unwrap();
    assert!(load_list::<Track>(&corrupt).is_empty());
}

#[test]
fn save_list_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b").join("favorites.json");
    save_list(&nested, &[t("a", 5)]).unwrap();
    let back: Vec<Track> = load_list(&nested);
    assert_eq!(back, vec![t("a", 5)]);
}

#[test]
fn tracks_without_optional_fields_deserialize_with_defaults() {
    let json = r#"[{"id":"z","title":"Zed"}]"#;
    let tracks: Vec<Track> = serde_json::from_str(json).unwrap();
    assert_eq!(tracks[0].uploader, "Unknown");
    assert_eq!(tracks[0].duration, 0);
    assert!(tracks[0].source.is_empty());
}

#[test]
fn failed_save_keeps_in_memory_state() {
    let dir = tempdir().unwrap();
    // A regular file where the data directory should be makes every save fail.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"").unwrap();
    let mut lib = Library::open(StorePaths::in_dir(&blocker));

    assert!(lib.add_favorite(t("a", 1)));
    assert!(lib.is_favorite("a"));
}

#[test]
fn home_items_list_playlists_before_favorites() {
    let playlists = vec![Playlist::new("Mix", vec![t("a", 60), t("b", 65)])];
    let favorites = vec![t("c", 10)];
    let items = home_items(&playlists, &favorites);

    assert_eq!(items.len(), 2);
    assert!(matches!(items[0], DisplayItem::Playlist(_)));
    assert_eq!(items[0].title(), "Mix (2 tracks)");
    assert_eq!(items[0].duration(), 125);
    assert_eq!(items[1].title(), "Title c");
}

#[test]
fn duration_labels() {
    assert_eq!(format_mss(125), "2:05");
    assert_eq!(duration_label(0), "[--:--]");
    assert_eq!(duration_label(3600), "[60:00]");
}
