//! Net-salary calculation across national tax regimes.
//!
//! A regime is data: one tax-base strategy and an ordered list of deduction
//! strategies. [`calculations::UniversalCalculator`] interprets any regime,
//! and [`registry::RegimeRegistry`] holds the built-in ones.

pub mod calculations;
pub mod currency;
pub mod models;
pub mod registry;
pub mod strategies;

pub use calculations::{CalculationError, UniversalCalculator, calculate_net_salary};
pub use models::*;
pub use registry::{RegimeRegistry, RegistryError};
