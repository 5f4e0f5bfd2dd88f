//! Response shapes of the web API and their normalization into `Track`.
//!
//! Everything is optional on the wire; items missing an id, URI or duration
//! are dropped here so the rest of the app only sees complete tracks.

use serde::Deserialize;
use tracing::debug;

use crate::library::{Album, Artist, Image, Track};

#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<Paging>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct Paging {
    #[serde(default)]
    pub items: Vec<Option<WireTrack>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireTrack {
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artists: Vec<WireArtist>,
    #[serde(default)]
    album: Option<WireAlbum>,
    duration_ms: Option<u64>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAlbum {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    images: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    url: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireUser {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WirePlaylist {
    pub id: String,
    #[serde(default)]
    pub external_urls: WireExternalUrls,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct WireExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

impl WireTrack {
    pub(super) fn into_track(self) -> Option<Track> {
        let id = self.id.filter(|s| !s.is_empty())?;
        let uri = self.uri.filter(|s| !s.is_empty())?;
        let duration_ms = self.duration_ms?;

        let album = self
            .album
            .map(|a| Album {
                name: a.name.unwrap_or_default(),
                images: a
                    .images
                    .into_iter()
                    .filter_map(|i| {
                        Some(Image {
                            url: i.url?,
                            width: i.width,
                            height: i.height,
                        })
                    })
                    .collect(),
            })
            .unwrap_or_default();

        Some(Track {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            artists: self
                .artists
                .into_iter()
                .filter_map(|a| a.name.map(|name| Artist { name }))
                .collect(),
            album,
            duration_ms,
            uri,
        })
    }
}

/// Keep the well-formed tracks of a page, in order.
pub(super) fn normalize(items: Vec<Option<WireTrack>>) -> Vec<Track> {
    let total = items.len();
    let tracks: Vec<Track> = items
        .into_iter()
        .flatten()
        .filter_map(WireTrack::into_track)
        .collect();
    if tracks.len() != total {
        debug!("dropped {} malformed catalog items", total - tracks.len());
    }
    tracks
}
