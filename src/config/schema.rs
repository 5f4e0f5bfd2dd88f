use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/pacelist/config.toml` or `~/.config/pacelist/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PACELIST__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub search: SearchSettings,
    pub timeline: TimelineSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Client identifier registered with the music service.
    pub client_id: String,
    /// Port of the localhost listener that receives the authorization callback.
    pub redirect_port: u16,
    /// Base URL of the web API (no trailing slash).
    pub api_base: String,
    /// Base URL of the accounts service that issues tokens.
    pub accounts_base: String,
    /// Market code used to filter search results.
    pub market: String,
    /// Maximum number of results per search / top-tracks request (1..=50).
    pub search_limit: u32,
    /// Name given to exported playlists.
    pub playlist_name: String,
}

impl CatalogSettings {
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.redirect_port)
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            client_id: "53e1f4e1efd445baa97318152d948ed0".to_string(),
            redirect_port: 19285,
            api_base: "https://api.spotify.com".to_string(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            market: "GB".to_string(),
            search_limit: 50,
            playlist_name: "Generated Playlist".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search is issued (milliseconds).
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Pixels per minute of running when `scale == default_scale`.
    pub base_pixels_per_minute: f64,
    pub default_scale: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Increment applied by the scale keys.
    pub scale_step: f64,
    /// Increment applied to the goal length (in the selected unit).
    pub length_step: f64,
    /// Increment applied to the goal time (minutes).
    pub time_step_minutes: f64,
    /// How many pixels one terminal row stands for.
    pub pixels_per_row: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            base_pixels_per_minute: 50.0,
            default_scale: 50.0,
            min_scale: 5.0,
            max_scale: 100.0,
            scale_step: 5.0,
            length_step: 0.1,
            time_step_minutes: 1.0,
            pixels_per_row: 10.0,
        }
    }
}

impl TimelineSettings {
    /// Clamp `scale` into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if !scale.is_finite() {
            return self.default_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// Which track fields to show for search results and selections, and in what order.
    ///
    /// Example: ["artist", "title"]
    pub track_fields: Vec<TrackDisplayField>,

    /// Separator used to join `track_fields`.
    pub track_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ run to the beat ~ ".to_string(),
            track_fields: vec![TrackDisplayField::Artist, TrackDisplayField::Title],
            track_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// "Artist - Title", the same text the search list shows.
    Display,
    #[serde(alias = "name")]
    Title,
    Artist,
    Album,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where preferences and the selection are persisted.
    /// Falls back to `$XDG_DATA_HOME/pacelist/state.json`.
    pub path: Option<PathBuf>,
}

impl StorageSettings {
    pub fn state_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(default_state_path)
    }

    /// The log file lives next to the state file.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.state_path()
            .and_then(|p| p.parent().map(|d| d.join("pacelist.log")))
    }
}

/// Compute `$XDG_DATA_HOME/pacelist/state.json` or
/// `~/.local/share/pacelist/state.json` when `XDG_DATA_HOME` is not set.
pub fn default_state_path() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("pacelist").join("state.json"))
}
