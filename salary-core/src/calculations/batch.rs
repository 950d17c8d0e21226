//! Independent calculations fanned out across threads.
//!
//! Every calculation owns its context and result, so batches run on the
//! [`rayon`] pool without locking. Outputs are returned in input order and
//! the first failing calculation fails the batch.

use rayon::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::calculations::{CalculationError, UniversalCalculator};
use crate::models::{TaxRegimeConfig, TaxResult};
use crate::registry::RegimeRegistry;

/// Same gross salary under several regimes.
///
/// Every key is resolved before any calculation runs.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::compare;
/// use salary_core::currency::FallbackRates;
/// use salary_core::registry::RegimeRegistry;
///
/// let registry = RegimeRegistry::builtin(&FallbackRates::default()).unwrap();
/// let results = compare(&registry, dec!(60000), &["spain-madrid", "germany-salaried"]).unwrap();
///
/// assert_eq!(results[0].country, "Madrid Salaried Employee");
/// assert_eq!(results[1].country, "Germany Salaried Employee");
/// ```
pub fn compare<K>(
    registry: &RegimeRegistry,
    gross_salary: Decimal,
    keys: &[K],
) -> Result<Vec<TaxResult>, CalculationError>
where
    K: AsRef<str> + Sync,
{
    let regimes = keys
        .iter()
        .map(|key| registry.get(key.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(regimes = regimes.len(), gross = %gross_salary, "comparing regimes");

    regimes
        .par_iter()
        .map(|regime| UniversalCalculator::new(regime).calculate(gross_salary))
        .collect()
}

/// One regime over a series of gross salaries.
pub fn progression(
    regime: &TaxRegimeConfig,
    grid: &[Decimal],
) -> Result<Vec<TaxResult>, CalculationError> {
    debug!(regime = %regime.label(), points = grid.len(), "computing progression");

    let calculator = UniversalCalculator::new(regime);
    grid.par_iter()
        .map(|&gross_salary| calculator.calculate(gross_salary))
        .collect()
}

/// Upper limit on the number of points [`salary_grid`] produces.
pub const MAX_GRID_POINTS: usize = 10_000;

/// Gross salaries from `start` to `end` inclusive, `step` apart.
///
/// # Errors
///
/// [`CalculationError::InvalidGrid`] if `start` is negative, `step` is not
/// positive, `end` is below `start` or the grid would exceed
/// [`MAX_GRID_POINTS`].
pub fn salary_grid(
    start: Decimal,
    end: Decimal,
    step: Decimal,
) -> Result<Vec<Decimal>, CalculationError> {
    if start < Decimal::ZERO {
        return Err(CalculationError::InvalidGrid(format!("start {start} is negative")));
    }
    if step <= Decimal::ZERO {
        return Err(CalculationError::InvalidGrid(format!("step {step} must be positive")));
    }
    if end < start {
        return Err(CalculationError::InvalidGrid(format!("end {end} is below start {start}")));
    }

    let points = (end - start)
        .checked_div(step)
        .and_then(|intervals| intervals.floor().to_usize())
        .and_then(|intervals| intervals.checked_add(1))
        .filter(|&points| points <= MAX_GRID_POINTS)
        .ok_or_else(|| {
            CalculationError::InvalidGrid(format!(
                "{start} to {end} in steps of {step} exceeds {MAX_GRID_POINTS} points"
            ))
        })?;

    let mut grid = Vec::with_capacity(points);
    let mut gross = start;
    while gross <= end {
        grid.push(gross);
        gross = gross
            .checked_add(step)
            .ok_or(CalculationError::Overflow { operation: "salary grid" })?;
    }
    Ok(grid)
}
