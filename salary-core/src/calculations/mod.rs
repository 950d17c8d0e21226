//! Net-salary calculation.
//!
//! [`UniversalCalculator`] runs one regime against one gross salary; the
//! [`batch`] helpers fan independent calculations out across threads.

pub mod batch;
pub mod common;
mod context;
mod engine;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::registry::RegistryError;

pub use batch::{MAX_GRID_POINTS, compare, progression, salary_grid};
pub use context::CalculationContext;
pub use engine::{UniversalCalculator, calculate_net_salary};

/// Errors that abort a single calculation.
///
/// A failed calculation returns no partial result and leaves the regime and
/// registry untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("gross salary must be non-negative, got {0}")]
    NegativeGrossSalary(Decimal),

    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("invalid salary grid: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
