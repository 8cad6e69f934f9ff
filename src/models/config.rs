//! Configuration model loaded from external sources.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::domain::location::Coordinates;

/// Base URL of the hosted dog search service.
pub const DEFAULT_BASE_URL: &str = "https://frontend-take-home-service.fetch.com";

/// Prefix of environment variables overriding file settings,
/// e.g. `PAWMATCH__GEOLOCATION__TIMEOUT_SECS=5`.
pub const ENV_PREFIX: &str = "PAWMATCH";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
/// Settings of the search client and the command-line tools.
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub geolocation: GeolocationConfig,
    /// Fixed device position used where no positioning hardware is available.
    pub position: Option<Coordinates>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            geolocation: GeolocationConfig::default(),
            position: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeolocationConfig {
    pub timeout_secs: u64,
    /// Oldest cached position fix that is still accepted.
    pub maximum_age_secs: u64,
    /// Half-width of the nearby search box in degrees.
    pub box_degrees: f64,
    pub max_zip_codes: usize,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            maximum_age_secs: 300,
            box_degrees: 0.5,
            max_zip_codes: 100,
        }
    }
}

impl ClientConfig {
    /// Loads `.env`, then the optional YAML file at `path`, then
    /// `PAWMATCH__*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {err}");
        }

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
