//! Built-in regimes.
//!
//! Figures are illustrative 2024/2025 values, not tax advice. Thresholds
//! published in a local currency are converted to EUR when the regime is
//! built.

pub mod bulgaria;
pub mod czechia;
pub mod france;
pub mod germany;
pub mod israel;
pub mod portugal;
pub mod romania;
pub mod spain;

use rust_decimal::Decimal;

use crate::currency::{CurrencyConverter, CurrencyError, RateProvider};
use crate::models::{BracketConfig, ConfigError};
use crate::registry::RegimeRegistry;

/// Registers every built-in regime under its canonical key.
pub fn register_builtin(
    registry: &mut RegimeRegistry,
    rates: &dyn RateProvider,
) -> Result<(), ConfigError> {
    registry.register("germany-salaried", germany::salaried()?);
    registry.register("czechia-salaried", czechia::salaried(rates)?);
    registry.register("czechia-freelancer", czechia::freelancer(rates)?);
    registry.register("israel-salaried", israel::salaried(rates)?);
    registry.register("spain-madrid", spain::madrid()?);
    registry.register("spain-barcelona", spain::barcelona()?);
    registry.register("spain-valencia", spain::valencia()?);
    registry.register("romania-freelancer-micro", romania::freelancer_micro()?);
    registry.register("bulgaria-freelancer", bulgaria::freelancer(rates)?);
    registry.register("portugal-salaried", portugal::salaried()?);
    registry.register("portugal-freelancer", portugal::freelancer()?);
    registry.register("france-salaried", france::salaried()?);
    Ok(())
}

/// Builds a contiguous schedule from `(upper_bound, rate)` tiers, closed by
/// an unbounded bracket at `top_rate`.
pub(crate) fn schedule(
    tiers: &[(Decimal, Decimal)],
    top_rate: Decimal,
) -> Vec<BracketConfig> {
    let mut brackets = Vec::with_capacity(tiers.len() + 1);
    let mut lower = Decimal::ZERO;
    for &(upper, rate) in tiers {
        brackets.push(BracketConfig::new(lower, upper, rate));
        lower = upper;
    }
    brackets.push(BracketConfig::unbounded(lower, top_rate));
    brackets
}

/// Like [`schedule`], with every bound converted first.
pub(crate) fn converted_schedule(
    converter: &CurrencyConverter,
    tiers: &[(Decimal, Decimal)],
    top_rate: Decimal,
) -> Result<Vec<BracketConfig>, ConfigError> {
    let converted = tiers
        .iter()
        .map(|&(upper, rate)| Ok((converter.convert(upper)?, rate)))
        .collect::<Result<Vec<_>, CurrencyError>>()?;
    Ok(schedule(&converted, top_rate))
}
