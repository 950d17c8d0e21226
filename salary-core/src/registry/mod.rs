//! Lookup of regimes by string key.
//!
//! Typical lifetime:
//! 1. Build with [`RegimeRegistry::builtin`] (or `new` plus `register`).
//! 2. Optionally publish it once with [`RegimeRegistry::install`].
//! 3. Resolve regimes with `get`, from any number of threads.

pub mod regimes;

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

use crate::currency::RateProvider;
use crate::models::{ConfigError, TaxRegimeConfig};

static GLOBAL: OnceLock<RegimeRegistry> = OnceLock::new();

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown regime '{key}'; available: {available:?}")]
    NotFound { key: String, available: Vec<String> },

    #[error("the global regime registry is already installed")]
    AlreadyInstalled,

    #[error("the global regime registry has not been installed")]
    NotInstalled,
}

/// Regimes keyed by name, kept in registration order.
#[derive(Debug, Default)]
pub struct RegimeRegistry {
    keys: Vec<String>,
    regimes: HashMap<String, TaxRegimeConfig>,
}

impl RegimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in regime.
    ///
    /// `rates` converts thresholds written in local currencies to EUR.
    ///
    /// ```
    /// use salary_core::currency::FallbackRates;
    /// use salary_core::registry::RegimeRegistry;
    ///
    /// let registry = RegimeRegistry::builtin(&FallbackRates::default()).unwrap();
    /// assert_eq!(registry.get_keys()[0], "germany-salaried");
    /// assert!(registry.get("spain-madrid").is_ok());
    /// ```
    pub fn builtin(rates: &dyn RateProvider) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        regimes::register_builtin(&mut registry, rates)?;
        debug!(regimes = registry.len(), "built-in regimes registered");
        Ok(registry)
    }

    /// Adds a regime. A regime already registered under `key` is replaced in
    /// place and keeps its position.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        regime: TaxRegimeConfig,
    ) {
        let key = key.into();
        if !self.regimes.contains_key(&key) {
            self.keys.push(key.clone());
        }
        self.regimes.insert(key, regime);
    }

    /// # Errors
    ///
    /// [`RegistryError::NotFound`] naming `key` and every registered key.
    pub fn get(
        &self,
        key: &str,
    ) -> Result<&TaxRegimeConfig, RegistryError> {
        self.regimes.get(key).ok_or_else(|| RegistryError::NotFound {
            key: key.to_string(),
            available: self.keys.clone(),
        })
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.regimes.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn get_keys(&self) -> &[String] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaxRegimeConfig)> {
        self.keys
            .iter()
            .filter_map(|key| self.regimes.get(key).map(|regime| (key.as_str(), regime)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Publishes this registry as the process-wide instance. Only the first
    /// call succeeds.
    pub fn install(self) -> Result<&'static RegimeRegistry, RegistryError> {
        GLOBAL
            .set(self)
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        global()
    }
}

/// The registry published by [`RegimeRegistry::install`].
pub fn global() -> Result<&'static RegimeRegistry, RegistryError> {
    GLOBAL.get().ok_or(RegistryError::NotInstalled)
}
