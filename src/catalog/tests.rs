use std::cell::RefCell;
use std::time::{Duration, Instant};

use reqwest::StatusCode;

use super::wire::{Paging, SearchResponse, normalize};
use super::*;
use crate::auth::AuthError;
use crate::library::{Album, SelectionList, Track, add_selection};

fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {id}"),
        artists: Vec::new(),
        album: Album::default(),
        duration_ms: 180_000,
        uri: format!("spotify:track:{id}"),
    }
}

#[test]
fn search_page_normalizes_and_drops_incomplete_items() {
    let body = r#"{
        "tracks": {
            "items": [
                {
                    "id": "a1",
                    "name": "Run Boy Run",
                    "artists": [{"name": "Woodkid"}, {"name": null}],
                    "album": {"name": "The Golden Age", "images": [
                        {"url": "https://img/640", "width": 640, "height": 640},
                        {"url": null}
                    ]},
                    "duration_ms": 220000,
                    "uri": "spotify:track:a1"
                },
                null,
                {"id": "b2", "name": "No Duration", "uri": "spotify:track:b2"},
                {"id": "c3", "duration_ms": 1000, "uri": "spotify:track:c3"},
                {"name": "No Id", "duration_ms": 1000, "uri": "spotify:track:x"}
            ]
        }
    }"#;

    let resp: SearchResponse = serde_json::from_str(body).unwrap();
    let tracks = normalize(resp.tracks.unwrap_or_default().items);

    assert_eq!(tracks.len(), 2);
    let first = &tracks[0];
    assert_eq!(first.name, "Run Boy Run");
    assert_eq!(first.primary_artist(), Some("Woodkid"));
    assert_eq!(first.artists.len(), 1);
    assert_eq!(first.album.images.len(), 1);
    assert_eq!(first.image_url(), Some("https://img/640"));
    assert_eq!(first.duration_ms, 220_000);

    // a missing name falls back to the id
    assert_eq!(tracks[1].id, "c3");
    assert_eq!(tracks[1].name, "c3");
    assert!(tracks[1].album.images.is_empty());
}

#[test]
fn search_without_tracks_object_is_empty() {
    let resp: SearchResponse = serde_json::from_str("{}").unwrap();
    assert!(normalize(resp.tracks.unwrap_or_default().items).is_empty());

    let page: Paging = serde_json::from_str(r#"{"items": []}"#).unwrap();
    assert!(normalize(page.items).is_empty());
}

#[test]
fn unauthorized_and_forbidden_map_to_stale_credential() {
    for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
        let err = status_error(status, String::new());
        assert!(err.is_stale_credential(), "{status}");
    }

    let err = status_error(StatusCode::TOO_MANY_REQUESTS, "slow down".to_string());
    assert!(!err.is_stale_credential());
    assert!(matches!(err, CatalogError::Status { status: 429, ref body } if body == "slow down"));
}

#[test]
fn uri_batches_keep_order_across_requests() {
    let tracks: Vec<Track> = (0..230).map(|i| track(&format!("{i:03}"))).collect();
    let batches = uri_batches(&tracks);

    assert_eq!(
        batches.iter().map(Vec::len).collect::<Vec<_>>(),
        vec![100, 100, 30]
    );
    let flat: Vec<&str> = batches.into_iter().flatten().collect();
    let expected: Vec<&str> = tracks.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(flat, expected);
}

#[derive(Default)]
struct RecordingCatalog {
    exported: RefCell<Vec<Vec<String>>>,
}

impl Catalog for RecordingCatalog {
    fn search(&self, _query: &str) -> Result<Vec<Track>, CatalogError> {
        Ok(Vec::new())
    }

    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        Ok(Vec::new())
    }

    fn create_playlist_with_tracks(&self, tracks: &[Track]) -> Result<PlaylistRef, CatalogError> {
        self.exported
            .borrow_mut()
            .push(tracks.iter().map(|t| t.uri.clone()).collect());
        Ok(PlaylistRef {
            id: "pl1".to_string(),
            external_url: Some("https://open.example/pl1".to_string()),
        })
    }
}

#[test]
fn export_sends_selection_in_list_order() {
    let catalog = RecordingCatalog::default();
    let list = ["c", "a", "b"]
        .iter()
        .fold(SelectionList::new(), |l, id| add_selection(&l, track(id)));

    let playlist = export_selection(&catalog, &list).unwrap();
    assert_eq!(playlist.id, "pl1");
    assert_eq!(
        catalog.exported.borrow().as_slice(),
        &[vec![
            "spotify:track:c".to_string(),
            "spotify:track:a".to_string(),
            "spotify:track:b".to_string(),
        ]]
    );
}

#[test]
fn export_of_empty_selection_is_refused() {
    let catalog = RecordingCatalog::default();
    let err = export_selection(&catalog, &SelectionList::new()).unwrap_err();
    assert!(matches!(err, CatalogError::EmptySelection));
    assert!(catalog.exported.borrow().is_empty());
}

/// Echoes the query back as a track id; the token "expired" is rejected.
struct EchoCatalog {
    token: String,
}

impl Catalog for EchoCatalog {
    fn search(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        if self.token == "expired" {
            return Err(CatalogError::StaleCredential(401));
        }
        Ok(vec![track(query)])
    }

    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        self.search("top")
    }

    fn create_playlist_with_tracks(&self, tracks: &[Track]) -> Result<PlaylistRef, CatalogError> {
        Ok(PlaylistRef {
            id: format!("{}-{}", self.token, tracks.len()),
            external_url: None,
        })
    }
}

struct EchoConnector;

impl Connector for EchoConnector {
    fn connect(&self, access_token: &str) -> Box<dyn Catalog> {
        Box::new(EchoCatalog {
            token: access_token.to_string(),
        })
    }

    fn exchange_code(&self, code: &str, verifier: &str) -> Result<String, AuthError> {
        if code == "bad" {
            return Err(AuthError::TokenExchange("invalid_grant".to_string()));
        }
        Ok(format!("token-{code}-{verifier}"))
    }
}

fn next_event(worker: &CatalogWorker) -> CatalogEvent {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(event) = worker.try_recv() {
            return event;
        }
        assert!(Instant::now() < deadline, "worker produced no event");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn worker_answers_searches_with_their_sequence_number() {
    let worker = CatalogWorker::spawn(EchoConnector, Some("live".to_string()));

    worker
        .send(CatalogCmd::Search {
            seq: 7,
            query: "tempo".to_string(),
        })
        .unwrap();
    worker.send(CatalogCmd::TopTracks { seq: 8 }).unwrap();

    match next_event(&worker) {
        CatalogEvent::Results { seq, tracks } => {
            assert_eq!(seq, 7);
            assert_eq!(tracks[0].id, "tempo");
        }
        other => panic!("unexpected event {other:?}"),
    }
    match next_event(&worker) {
        CatalogEvent::Results { seq, tracks } => {
            assert_eq!(seq, 8);
            assert_eq!(tracks[0].id, "top");
        }
        other => panic!("unexpected event {other:?}"),
    }

    worker.shutdown();
}

#[test]
fn worker_reports_rejected_and_missing_credentials_as_stale() {
    let worker = CatalogWorker::spawn(EchoConnector, Some("expired".to_string()));
    worker
        .send(CatalogCmd::Search {
            seq: 1,
            query: "x".to_string(),
        })
        .unwrap();
    assert!(matches!(next_event(&worker), CatalogEvent::StaleCredential));

    worker.send(CatalogCmd::SetToken(None)).unwrap();
    worker.send(CatalogCmd::TopTracks { seq: 2 }).unwrap();
    assert!(matches!(next_event(&worker), CatalogEvent::StaleCredential));

    worker.shutdown();
}

#[test]
fn worker_exchanges_code_and_uses_the_new_token() {
    let worker = CatalogWorker::spawn(EchoConnector, None);

    worker
        .send(CatalogCmd::ExchangeCode {
            code: "bad".to_string(),
            verifier: "v".to_string(),
        })
        .unwrap();
    assert!(matches!(next_event(&worker), CatalogEvent::AuthFailed(_)));

    worker
        .send(CatalogCmd::ExchangeCode {
            code: "c0de".to_string(),
            verifier: "v".to_string(),
        })
        .unwrap();
    match next_event(&worker) {
        CatalogEvent::Authorized { access_token } => assert_eq!(access_token, "token-c0de-v"),
        other => panic!("unexpected event {other:?}"),
    }

    let list = add_selection(&SelectionList::new(), track("a"));
    worker.send(CatalogCmd::Export { selection: list }).unwrap();
    match next_event(&worker) {
        CatalogEvent::PlaylistCreated(playlist) => assert_eq!(playlist.id, "token-c0de-v-1"),
        other => panic!("unexpected event {other:?}"),
    }

    worker.shutdown();
}
