use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::CurrencyError;

/// Errors raised while building strategies or regimes.
///
/// These surface at construction time, before any calculation runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("deduction '{name}': rate must be between 0 and 1, got {rate}")]
    InvalidRate { name: String, rate: Decimal },

    #[error("deduction '{name}' requires a ceiling")]
    MissingCeiling { name: String },

    #[error("deduction '{name}': ceiling must be non-negative, got {ceiling}")]
    NegativeCeiling { name: String, ceiling: Decimal },

    #[error("deduction '{name}': floor {floor} must be non-negative and below ceiling {ceiling}")]
    InvalidFloor {
        name: String,
        floor: Decimal,
        ceiling: Decimal,
    },

    #[error("deduction '{name}': a floor is only supported by capped-percentage deductions")]
    UnsupportedFloor { name: String },

    #[error("deduction '{name}': base multiplier must be positive, got {multiplier}")]
    InvalidBaseMultiplier { name: String, multiplier: Decimal },

    #[error("deduction '{name}': phase-in needs a rate in (0, 1] and a non-negative threshold, got {rate} above {threshold}")]
    InvalidPhaseIn {
        name: String,
        threshold: Decimal,
        rate: Decimal,
    },

    #[error("deduction '{name}': discount must be non-negative, got {discount}")]
    NegativeDiscount { name: String, discount: Decimal },

    #[error("deduction '{name}': no tax brackets provided")]
    NoTaxBrackets { name: String },

    #[error("deduction '{name}': first bracket must start at 0, got {lower_bound}")]
    FirstBracketNotZero { name: String, lower_bound: Decimal },

    #[error("deduction '{name}': bracket {index} starts at {lower_bound}, expected {expected}")]
    BracketGap {
        name: String,
        index: usize,
        lower_bound: Decimal,
        expected: Decimal,
    },

    #[error("deduction '{name}': bracket {index} has an empty or inverted range")]
    EmptyBracket { name: String, index: usize },

    #[error("deduction '{name}': only the last bracket may be unbounded (bracket {index})")]
    UnboundedBracketNotLast { name: String, index: usize },

    #[error("deduction '{name}': the last bracket must be unbounded")]
    BoundedTopBracket { name: String },

    #[error("taxable rate must be in (0, 1], got {0}")]
    InvalidTaxableRate(Decimal),

    #[error("expense cap must be non-negative, got {0}")]
    NegativeExpenseCap(Decimal),

    #[error("invalid phase-out band: {0}")]
    InvalidPhaseOut(String),

    #[error("regime '{0}' has no deductions")]
    NoDeductions(String),

    #[error("currency conversion failed while building regime: {0}")]
    Currency(#[from] CurrencyError),
}
