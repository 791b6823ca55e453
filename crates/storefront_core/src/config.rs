use std::{fs, io, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::{DEFAULT_LIMIT, DEFAULT_SORT};
use tracing::warn;
use url::Url;

use crate::{error::ConfigError, state::Filters};

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorefrontSettings {
    pub api_base_url: String,
    pub default_limit: u32,
    pub default_sort: String,
    pub request_timeout_ms: Option<u64>,
    pub skeleton_count: usize,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".into(),
            default_limit: DEFAULT_LIMIT,
            default_sort: DEFAULT_SORT.into(),
            request_timeout_ms: Some(10_000),
            skeleton_count: 4,
        }
    }
}

impl StorefrontSettings {
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.api_base_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: self.api_base_url.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn default_filters(&self) -> Filters {
        Filters {
            limit: self.default_limit,
            sort: self.default_sort.clone(),
            ..Filters::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base_url()?;
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_limit",
                reason: "must be at least 1".into(),
            });
        }
        if self.default_sort.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "default_sort",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Reads `storefront.toml` from the working directory (if present), then
/// applies environment overrides.
pub fn load_settings() -> Result<StorefrontSettings, ConfigError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<StorefrontSettings, ConfigError> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<StorefrontSettings>(&raw).map_err(|source| {
            ConfigError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => StorefrontSettings::default(),
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            })
        }
    };

    if let Some(v) = env("STOREFRONT_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__DEFAULT_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.default_limit = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__DEFAULT_LIMIT"),
        }
    }

    if let Some(v) = env("APP__DEFAULT_SORT") {
        settings.default_sort = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_ms = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_MS"),
        }
    }

    if let Some(v) = env("APP__SKELETON_COUNT") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.skeleton_count = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__SKELETON_COUNT"),
        }
    }

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
