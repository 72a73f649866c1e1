use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thisslime::TracingError;
use tracing::{info, trace, warn};

use crate::{game::Settings, towns::Town};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openaq: OpenAqConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    const DEFAULT_PATH: &'static str = "./ennis-air.toml";
    const PATH_VAR: &'static str = "ENNIS_AIR_TOML";
    const ENV_PREFIX: &'static str = "ENNIS_AIR";

    /// Where to look for the config file: the explicit path if there is one,
    /// then `ENNIS_AIR_TOML`, then `./ennis-air.toml`.
    ///
    /// The returned flag says whether the file must exist.
    fn path(explicit: Option<&Path>) -> (PathBuf, bool) {
        if let Some(path) = explicit {
            trace!(?path, "using config path from command line");
            (path.to_owned(), true)
        } else if let Ok(path) = std::env::var(Self::PATH_VAR) {
            info!(path, "looking for config file with {}...", Self::PATH_VAR);
            (PathBuf::from(path), true)
        } else {
            (PathBuf::from(Self::DEFAULT_PATH), false)
        }
    }

    /// Loads the config file, then applies `ENNIS_AIR_*` environment overrides
    /// (`__` separates sections, e.g. `ENNIS_AIR_SERVER__ADDRESS`).
    #[tracing::instrument(skip_all, name = "config")]
    pub fn load(explicit: Option<&Path>) -> Result<Self, Error> {
        Self::load_with_prefix(explicit, Self::ENV_PREFIX)
    }

    fn load_with_prefix(explicit: Option<&Path>, env_prefix: &str) -> Result<Self, Error> {
        let (path, required) = Self::path(explicit);

        let config: Self = ::config::Config::builder()
            .add_source(
                ::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)?;

        config.validate()?;
        trace!(?config, "loaded");

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        self.openaq.validate()?;
        self.game.settings()?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, TracingError)]
#[span]
pub enum Error {
    #[error("file read error: {0}")]
    #[event(level = ERROR)]
    Read(::config::ConfigError),

    #[error("parsing error: {0}")]
    #[event(level = ERROR)]
    Parse(::config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] InvalidConfigError),
}

#[derive(Debug, thiserror::Error, TracingError)]
#[error("invalid value for {key}: {reason}")]
#[event(level = ERROR)]
pub struct InvalidConfigError {
    key: &'static str,
    reason: String,
}

impl InvalidConfigError {
    fn new(key: &'static str, reason: impl Into<String>) -> Self {
        Self {
            key,
            reason: reason.into(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000)),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OpenAqConfig {
    pub base_url: url::Url,
    /// Name of the environment variable holding the API key.
    pub api_key_var: String,
    pub timeout_ms: u64,
    pub radius_meters: u32,
    pub limit: u32,
    pub pm25_parameter_id: u32,
}

impl OpenAqConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<(), InvalidConfigError> {
        if self.base_url.cannot_be_a_base() {
            return Err(InvalidConfigError::new(
                "openaq.base_url",
                format!("{} can't be used as a base url", self.base_url),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(InvalidConfigError::new(
                "openaq.timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.api_key_var.is_empty() {
            warn!("openaq.api_key_var is empty, upstream requests will be unauthenticated");
        }

        Ok(())
    }
}

impl Default for OpenAqConfig {
    fn default() -> Self {
        Self {
            base_url: url::Url::parse("https://api.openaq.org")
                .expect("hard-coded url should be valid"),
            api_key_var: "OPENAQ_API_KEY".to_owned(),
            timeout_ms: 10_000,
            radius_meters: 25_000,
            limit: 5,
            pm25_parameter_id: 2,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub reference_town: String,
    pub max_guesses: usize,
    pub notification_secs: u64,
    /// Where `play` finds a running proxy.
    pub server_url: url::Url,
}

impl GameConfig {
    pub fn settings(&self) -> Result<Settings, InvalidConfigError> {
        let reference = Town::find(&self.reference_town).ok_or_else(|| {
            InvalidConfigError::new(
                "game.reference_town",
                format!("{} is not a known town", self.reference_town),
            )
        })?;

        if self.max_guesses == 0 {
            return Err(InvalidConfigError::new(
                "game.max_guesses",
                "must be greater than zero",
            ));
        }

        Ok(Settings {
            reference,
            max_guesses: self.max_guesses,
            notification_duration: Duration::from_secs(self.notification_secs),
        })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            reference_town: "Ennis".to_owned(),
            max_guesses: 5,
            notification_secs: 3,
            server_url: url::Url::parse("http://127.0.0.1:3000")
                .expect("hard-coded url should be valid"),
        }
    }
}
