use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::currency::{CurrencyError, RateProvider};
use crate::models::Currency;

/// Approximate units-per-EUR table used when no live rate is available.
///
/// Cross rates go through EUR: `rate(from, to) = per_eur[to] / per_eur[from]`.
/// Deterministic, so it doubles as the provider for tests and offline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRates {
    per_eur: BTreeMap<Currency, Decimal>,
}

impl Default for FallbackRates {
    fn default() -> Self {
        Self {
            per_eur: BTreeMap::from([
                (Currency::EUR, Decimal::ONE),
                (Currency::CZK, dec!(25)),
                (Currency::ILS, dec!(4)),
                (Currency::USD, dec!(1.08)),
                (Currency::GBP, dec!(0.85)),
                (Currency::BGN, dec!(1.95583)),
                (Currency::RON, dec!(4.97)),
            ]),
        }
    }
}

impl FallbackRates {
    /// Builds a table from units-per-EUR entries. EUR is always 1.
    pub fn new(per_eur: BTreeMap<Currency, Decimal>) -> Result<Self, CurrencyError> {
        Self {
            per_eur: BTreeMap::from([(Currency::EUR, Decimal::ONE)]),
        }
        .with_overrides(&per_eur)
    }

    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<Currency, Decimal>,
    ) -> Result<Self, CurrencyError> {
        for (&currency, &rate) in overrides {
            if currency == Currency::EUR {
                continue;
            }
            if rate <= Decimal::ZERO {
                return Err(CurrencyError::InvalidRate {
                    from: Currency::EUR,
                    to: currency,
                    rate,
                });
            }
            self.per_eur.insert(currency, rate);
        }
        Ok(self)
    }

    pub fn units_per_eur(
        &self,
        currency: Currency,
    ) -> Option<Decimal> {
        self.per_eur.get(&currency).copied()
    }

    /// Cross rate through EUR, if both currencies are in the table.
    pub fn lookup(
        &self,
        from: Currency,
        to: Currency,
    ) -> Option<Decimal> {
        let from_per_eur = self.units_per_eur(from)?;
        let to_per_eur = self.units_per_eur(to)?;
        to_per_eur.checked_div(from_per_eur)
    }
}

impl RateProvider for FallbackRates {
    fn quote(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Decimal, CurrencyError> {
        self.lookup(from, to)
            .ok_or(CurrencyError::RateUnavailable { from, to })
    }
}
