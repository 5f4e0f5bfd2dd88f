use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::TimelineSettings;
use crate::library::SelectionList;
use crate::pace::{
    MAX_GOAL_LENGTH, MAX_GOAL_TIME_MINUTES, TimelineConfig, Unit, check_goal_value,
};

use super::kv::{KeyValueStore, StoreError};

pub const UNITS_KEY: &str = "units";
pub const LENGTH_KEY: &str = "length";
pub const TIME_GOAL_KEY: &str = "time_goal_mins";
pub const SCALE_KEY: &str = "scale";
pub const SELECTED_TRACKS_KEY: &str = "selected_tracks";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const CODE_VERIFIER_KEY: &str = "code_verifier";

/// Decode the value under `key`, treating undecodable values as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("ignoring stored {key}: {e}");
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_string(value)?)
}

/// Load the goal parameters, replacing missing, degenerate or oversized
/// values with defaults.
pub fn load_timeline(store: &dyn KeyValueStore, settings: &TimelineSettings) -> TimelineConfig {
    let defaults = TimelineConfig::default();

    let goal_or = |key: &str, field: &'static str, max: f64, fallback: f64| {
        match read_json::<f64>(store, key) {
            Some(v) => match check_goal_value(field, v, max) {
                Ok(()) => v,
                Err(e) => {
                    warn!("stored {key} rejected, using default: {e}");
                    fallback
                }
            },
            None => fallback,
        }
    };

    TimelineConfig {
        unit: read_json::<Unit>(store, UNITS_KEY).unwrap_or(defaults.unit),
        goal_length: goal_or(
            LENGTH_KEY,
            "goal length",
            MAX_GOAL_LENGTH,
            defaults.goal_length,
        ),
        goal_time_minutes: goal_or(
            TIME_GOAL_KEY,
            "goal time",
            MAX_GOAL_TIME_MINUTES,
            defaults.goal_time_minutes,
        ),
        scale: settings.clamp_scale(
            read_json::<f64>(store, SCALE_KEY).unwrap_or(settings.default_scale),
        ),
    }
}

pub fn save_timeline(
    store: &mut dyn KeyValueStore,
    config: &TimelineConfig,
) -> Result<(), StoreError> {
    write_json(store, UNITS_KEY, &config.unit)?;
    write_json(store, LENGTH_KEY, &config.goal_length)?;
    write_json(store, TIME_GOAL_KEY, &config.goal_time_minutes)?;
    write_json(store, SCALE_KEY, &config.scale)?;
    Ok(())
}

pub fn load_selection(store: &dyn KeyValueStore) -> SelectionList {
    read_json(store, SELECTED_TRACKS_KEY).unwrap_or_default()
}

pub fn save_selection(
    store: &mut dyn KeyValueStore,
    selection: &SelectionList,
) -> Result<(), StoreError> {
    write_json(store, SELECTED_TRACKS_KEY, selection)
}

pub fn load_access_token(store: &dyn KeyValueStore) -> Option<String> {
    read_json::<String>(store, ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
}

pub fn save_access_token(store: &mut dyn KeyValueStore, token: &str) -> Result<(), StoreError> {
    write_json(store, ACCESS_TOKEN_KEY, token)
}

pub fn clear_access_token(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(ACCESS_TOKEN_KEY)
}

pub fn load_code_verifier(store: &dyn KeyValueStore) -> Option<String> {
    read_json(store, CODE_VERIFIER_KEY)
}

pub fn save_code_verifier(
    store: &mut dyn KeyValueStore,
    verifier: &str,
) -> Result<(), StoreError> {
    write_json(store, CODE_VERIFIER_KEY, verifier)
}

pub fn clear_code_verifier(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(CODE_VERIFIER_KEY)
}
