//! Exchange-rate lookup.
//!
//! Regimes whose thresholds are written in a local currency convert them to
//! EUR once, at build time, through a [`RateProvider`]. The engine also uses
//! a provider to annotate results with the local rate.

mod cache;
mod fallback;

use std::collections::BTreeMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Currency;

pub use cache::{CachedRate, CachedRateProvider, DEFAULT_CACHE_TTL_HOURS, RateCache, RateSource};
pub use fallback::FallbackRates;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("no exchange rate available for {from} -> {to}")]
    RateUnavailable { from: Currency, to: Currency },

    #[error("exchange rate for {from} -> {to} must be positive, got {rate}")]
    InvalidRate {
        from: Currency,
        to: Currency,
        rate: Decimal,
    },

    #[error("arithmetic overflow converting {from} -> {to}")]
    Overflow { from: Currency, to: Currency },

    #[error("rate source failed: {0}")]
    Source(String),
}

/// Source of exchange rates between two currencies.
///
/// Implementors supply [`RateProvider::quote`] for distinct pairs; the
/// provided [`RateProvider::rate`] short-circuits identical currencies to
/// one and rejects non-positive quotes.
pub trait RateProvider: Send + Sync {
    /// Units of `to` per one unit of `from`, for `from != to`.
    fn quote(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError>;

    fn rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let rate = self.quote(from, to)?;
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate { from, to, rate });
        }
        Ok(rate)
    }

    fn convert(
        &self,
        amount: Decimal,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError> {
        self.converter(from, to)?.convert(amount)
    }

    /// Resolves the rate once and binds it to the pair.
    fn converter(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<CurrencyConverter, CurrencyError> {
        Ok(CurrencyConverter {
            from,
            to,
            rate: self.rate(from, to)?,
        })
    }
}

/// A currency pair with a resolved rate.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::Currency;
/// use salary_core::currency::{FallbackRates, RateProvider};
///
/// let czk_to_eur = FallbackRates::default().converter(Currency::CZK, Currency::EUR).unwrap();
/// assert_eq!(czk_to_eur.convert(dec!(30840)).unwrap(), dec!(1233.60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyConverter {
    from: Currency,
    to: Currency,
    rate: Decimal,
}

impl CurrencyConverter {
    pub fn from(&self) -> Currency {
        self.from
    }

    pub fn to(&self) -> Currency {
        self.to
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn convert(
        &self,
        amount: Decimal,
    ) -> Result<Decimal, CurrencyError> {
        amount.checked_mul(self.rate).ok_or(CurrencyError::Overflow {
            from: self.from,
            to: self.to,
        })
    }
}

/// `[currency]` settings: cache lifetime and fallback-table overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySettings {
    /// Lifetime of fetched rates. Only applies to a [`CachedRateProvider`]
    /// built with [`CachedRateProvider::from_settings`] around a [`RateSource`].
    pub cache_ttl_hours: u32,
    /// Units per EUR, overriding the built-in approximations.
    pub fallback_rates: BTreeMap<Currency, Decimal>,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self {
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            fallback_rates: BTreeMap::new(),
        }
    }
}

impl CurrencySettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::hours(i64::from(self.cache_ttl_hours))
    }

    /// The built-in fallback table with the configured overrides applied.
    pub fn fallback(&self) -> Result<FallbackRates, CurrencyError> {
        FallbackRates::default().with_overrides(&self.fallback_rates)
    }
}
