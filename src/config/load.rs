use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `PACELIST__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("PACELIST")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let t = &self.timeline;
        if !(t.min_scale > 0.0 && t.min_scale <= t.max_scale) {
            return Err("timeline.min_scale must be > 0 and <= timeline.max_scale".to_string());
        }
        if !(t.default_scale >= t.min_scale && t.default_scale <= t.max_scale) {
            return Err("timeline.default_scale must lie within [min_scale, max_scale]".to_string());
        }
        if t.base_pixels_per_minute <= 0.0 || t.pixels_per_row <= 0.0 {
            return Err(
                "timeline.base_pixels_per_minute and timeline.pixels_per_row must be > 0"
                    .to_string(),
            );
        }
        if !(1..=50).contains(&self.catalog.search_limit) {
            return Err("catalog.search_limit must be between 1 and 50".to_string());
        }
        if self.catalog.client_id.trim().is_empty() {
            return Err("catalog.client_id must not be empty".to_string());
        }
        Ok(())
    }

    /// Render these settings as a TOML document, suitable as a starting config file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Resolve the config path from `PACELIST_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("PACELIST_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/pacelist/config.toml`
/// or `~/.config/pacelist/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("pacelist").join("config.toml"))
}
