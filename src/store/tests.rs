use super::*;
use crate::config::TimelineSettings;
use crate::library::{Album, SelectionList, Track, add_selection};
use crate::pace::{TimelineConfig, Unit, compute_segments};

fn track(id: &str) -> Track {
    Track {
        id: id.into(),
        name: format!("Song {id}"),
        artists: Vec::new(),
        album: Album::default(),
        duration_ms: 200_000,
        uri: format!("spotify:track:{id}"),
    }
}

#[test]
fn empty_store_yields_defaults() {
    let store = MemoryStore::new();
    let settings = TimelineSettings::default();

    let timeline = load_timeline(&store, &settings);
    assert_eq!(timeline, TimelineConfig::default());
    assert_eq!(timeline.unit, Unit::Mi);
    assert_eq!(timeline.goal_length, 13.1);
    assert_eq!(timeline.goal_time_minutes, 120.0);
    assert_eq!(timeline.scale, 50.0);

    assert!(load_selection(&store).is_empty());
    assert_eq!(load_access_token(&store), None);
}

#[test]
fn timeline_round_trips_through_the_store_keys() {
    let mut store = MemoryStore::new();
    let settings = TimelineSettings::default();
    let config = TimelineConfig {
        unit: Unit::Km,
        goal_length: 21.1,
        goal_time_minutes: 105.0,
        scale: 35.0,
    };

    save_timeline(&mut store, &config).unwrap();
    assert_eq!(store.get(UNITS_KEY).as_deref(), Some("\"km\""));
    assert_eq!(store.get(LENGTH_KEY).as_deref(), Some("21.1"));
    assert_eq!(store.get(TIME_GOAL_KEY).as_deref(), Some("105.0"));
    assert_eq!(load_timeline(&store, &settings), config);
}

#[test]
fn degenerate_or_garbled_stored_values_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    let settings = TimelineSettings::default();
    store.set(LENGTH_KEY, "0".into()).unwrap();
    store.set(TIME_GOAL_KEY, "-5".into()).unwrap();
    store.set(UNITS_KEY, "\"furlongs\"".into()).unwrap();
    store.set(SCALE_KEY, "900".into()).unwrap();

    let timeline = load_timeline(&store, &settings);
    assert_eq!(timeline.goal_length, 13.1);
    assert_eq!(timeline.goal_time_minutes, 120.0);
    assert_eq!(timeline.unit, Unit::Mi);
    assert_eq!(timeline.scale, 100.0);
}

#[test]
fn oversized_stored_goal_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    let settings = TimelineSettings::default();
    store.set(LENGTH_KEY, "1e15".into()).unwrap();
    store.set(TIME_GOAL_KEY, "1e300".into()).unwrap();

    let timeline = load_timeline(&store, &settings);
    assert_eq!(timeline.goal_length, 13.1);
    assert_eq!(timeline.goal_time_minutes, 120.0);
    assert_eq!(compute_segments(&timeline, &settings).len(), 14);
}

#[test]
fn selection_and_token_round_trip() {
    let mut store = MemoryStore::new();
    let list = add_selection(&add_selection(&SelectionList::new(), track("a")), track("a"));

    save_selection(&mut store, &list).unwrap();
    assert_eq!(load_selection(&store), list);

    save_access_token(&mut store, "tok").unwrap();
    assert_eq!(load_access_token(&store).as_deref(), Some("tok"));
    clear_access_token(&mut store).unwrap();
    assert_eq!(load_access_token(&store), None);

    save_code_verifier(&mut store, "verifier").unwrap();
    assert_eq!(load_code_verifier(&store).as_deref(), Some("verifier"));
    clear_code_verifier(&mut store).unwrap();
    assert_eq!(load_code_verifier(&store), None);
}

#[test]
fn json_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");

    let list = add_selection(&SelectionList::new(), track("x"));
    {
        let mut store = JsonFileStore::open(&path);
        save_selection(&mut store, &list).unwrap();
        save_access_token(&mut store, "abc").unwrap();
    }
    assert!(path.exists());

    let mut reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.path(), path.as_path());
    assert_eq!(load_selection(&reopened), list);
    assert_eq!(load_access_token(&reopened).as_deref(), Some("abc"));

    reopened.remove(ACCESS_TOKEN_KEY).unwrap();
    let again = JsonFileStore::open(&path);
    assert_eq!(load_access_token(&again), None);
    assert_eq!(load_selection(&again), list);
}

#[test]
fn json_file_store_ignores_a_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let mut store = JsonFileStore::open(&path);
    assert_eq!(store.get(LENGTH_KEY), None);

    store.set(LENGTH_KEY, "10.0".into()).unwrap();
    let reopened = JsonFileStore::open(&path);
    assert_eq!(reopened.get(LENGTH_KEY).as_deref(), Some("10.0"));
}
