use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::config::CatalogSettings;
use crate::library::{SelectionList, Track};

use super::wire::{Paging, SearchResponse, WirePlaylist, WireUser, normalize};

/// The service accepts at most this many URIs per add-tracks request.
pub const ADD_TRACKS_BATCH: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("credential rejected by the service (HTTP {0})")]
    StaleCredential(u16),
    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not signed in")]
    NoCredential,
    #[error("the selection is empty, nothing to export")]
    EmptySelection,
}

impl CatalogError {
    pub fn is_stale_credential(&self) -> bool {
        matches!(self, Self::StaleCredential(_) | Self::NoCredential)
    }
}

/// A playlist created on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    /// Link that opens the playlist in the service's own app.
    pub external_url: Option<String>,
}

/// What the app needs from a music catalog.
pub trait Catalog {
    fn search(&self, query: &str) -> Result<Vec<Track>, CatalogError>;
    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError>;
    /// Create a private playlist holding `tracks` in the given order.
    fn create_playlist_with_tracks(&self, tracks: &[Track]) -> Result<PlaylistRef, CatalogError>;
}

/// Export the selection as a playlist, preserving its order.
pub fn export_selection(
    catalog: &dyn Catalog,
    selection: &SelectionList,
) -> Result<PlaylistRef, CatalogError> {
    if selection.is_empty() {
        return Err(CatalogError::EmptySelection);
    }
    catalog.create_playlist_with_tracks(&selection.tracks())
}

/// Split track URIs into request-sized batches without reordering them.
pub fn uri_batches(tracks: &[Track]) -> Vec<Vec<&str>> {
    tracks
        .chunks(ADD_TRACKS_BATCH)
        .map(|chunk| chunk.iter().map(|t| t.uri.as_str()).collect())
        .collect()
}

/// Map a non-success status to the matching error.
pub fn status_error(status: StatusCode, body: String) -> CatalogError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CatalogError::StaleCredential(status.as_u16())
        }
        _ => CatalogError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

/// Web API client authenticated with a bearer token.
pub struct SpotifyClient {
    http: Client,
    api_base: String,
    token: String,
    market: String,
    limit: u32,
    playlist_name: String,
}

impl SpotifyClient {
    pub fn new(http: Client, settings: &CatalogSettings, token: String) -> Self {
        Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token,
            market: settings.market.clone(),
            limit: settings.search_limit,
            playlist_name: settings.playlist_name.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CatalogError> {
        let resp = request.bearer_auth(&self.token).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, body));
        }
        Ok(resp.json()?)
    }

    pub fn current_user_id(&self) -> Result<String, CatalogError> {
        let user: WireUser = self.send(self.http.get(self.url("/v1/me")))?;
        Ok(user.id)
    }
}

impl Catalog for SpotifyClient {
    fn search(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let limit = self.limit.to_string();
        let request = self.http.get(self.url("/v1/search")).query(&[
            ("q", query),
            ("type", "track"),
            ("market", self.market.as_str()),
            ("limit", limit.as_str()),
        ]);
        let resp: SearchResponse = self.send(request)?;
        let tracks = normalize(resp.tracks.unwrap_or_default().items);
        debug!("search returned {} tracks", tracks.len());
        Ok(tracks)
    }

    fn top_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        let limit = self.limit.to_string();
        let request = self
            .http
            .get(self.url("/v1/me/top/tracks"))
            .query(&[("time_range", "medium_term"), ("limit", limit.as_str())]);
        let page: Paging = self.send(request)?;
        Ok(normalize(page.items))
    }

    fn create_playlist_with_tracks(&self, tracks: &[Track]) -> Result<PlaylistRef, CatalogError> {
        let user_id = self.current_user_id()?;
        let playlist: WirePlaylist = self.send(
            self.http
                .post(self.url(&format!("/v1/users/{user_id}/playlists")))
                .json(&json!({ "name": self.playlist_name, "public": false })),
        )?;

        // Appending batch after batch keeps the list order end to end.
        for batch in uri_batches(tracks) {
            let _: serde_json::Value = self.send(
                self.http
                    .post(self.url(&format!("/v1/playlists/{}/tracks", playlist.id)))
                    .json(&json!({ "uris": batch })),
            )?;
        }

        info!(
            "created playlist {} with {} tracks",
            playlist.id,
            tracks.len()
        );
        Ok(PlaylistRef {
            id: playlist.id,
            external_url: playlist.external_urls.spotify,
        })
    }
}
