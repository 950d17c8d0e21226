//! Optional TOML configuration for the command-line front end.
//!
//! The command line converts with the fallback table only, so
//! `[currency] cache_ttl_hours` is accepted but has no effect here.
//!
//! ```toml
//! [currency.fallback_rates]
//! CZK = "24.6"
//! ILS = "3.95"
//!
//! [defaults]
//! regimes = ["germany-salaried", "spain-madrid"]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use salary_core::currency::CurrencySettings;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Only `fallback_rates` is used by the command line.
    pub currency: CurrencySettings,
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Regimes compared when none are named on the command line.
    pub regimes: Vec<String>,
}

impl AppConfig {
    /// Reads the configuration at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigFileError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&contents).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
