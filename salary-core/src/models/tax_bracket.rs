use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationError;
use crate::calculations::common::checked_mul;
use crate::models::ConfigError;

/// One slice of a progressive schedule as applied to a concrete base.
///
/// `tax_amount` is always `taxable_amount * rate`; the only way to build a
/// bracket is [`TaxBracket::new`], which derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    lower_bound: Decimal,
    upper_bound: Decimal,
    rate: Decimal,
    taxable_amount: Decimal,
    tax_amount: Decimal,
}

impl TaxBracket {
    /// Builds a bracket and computes its tax.
    ///
    /// `upper_bound` is what gets displayed; for an unbounded top bracket the
    /// caller passes the full base amount.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::TaxBracket;
    ///
    /// let bracket = TaxBracket::new(dec!(0), dec!(12450), dec!(0.19), dec!(10000)).unwrap();
    /// assert_eq!(bracket.tax_amount(), dec!(1900));
    /// ```
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Decimal,
        rate: Decimal,
        taxable_amount: Decimal,
    ) -> Result<Self, CalculationError> {
        let tax_amount = checked_mul(taxable_amount, rate, "bracket tax")?;
        Ok(Self {
            lower_bound,
            upper_bound,
            rate,
            taxable_amount,
            tax_amount,
        })
    }

    pub fn lower_bound(&self) -> Decimal {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> Decimal {
        self.upper_bound
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn taxable_amount(&self) -> Decimal {
        self.taxable_amount
    }

    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }
}

/// A configured bracket of a progressive schedule.
///
/// `upper_bound` of `None` marks the unbounded top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketConfig {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl BracketConfig {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(
        lower_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound: None,
            rate,
        }
    }
}

/// Checks that a schedule starts at zero, is contiguous and ascending, and
/// ends in a single unbounded bracket.
///
/// Under these conditions walking the brackets taxes every unit of a
/// non-negative base exactly once.
pub fn validate_schedule(
    name: &str,
    brackets: &[BracketConfig],
) -> Result<(), ConfigError> {
    let Some(first) = brackets.first() else {
        return Err(ConfigError::NoTaxBrackets {
            name: name.to_string(),
        });
    };
    if first.lower_bound != Decimal::ZERO {
        return Err(ConfigError::FirstBracketNotZero {
            name: name.to_string(),
            lower_bound: first.lower_bound,
        });
    }

    let last_index = brackets.len() - 1;
    let mut expected_lower = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(ConfigError::InvalidRate {
                name: name.to_string(),
                rate: bracket.rate,
            });
        }
        if bracket.lower_bound != expected_lower {
            return Err(ConfigError::BracketGap {
                name: name.to_string(),
                index,
                lower_bound: bracket.lower_bound,
                expected: expected_lower,
            });
        }
        match bracket.upper_bound {
            Some(upper) if upper <= bracket.lower_bound => {
                return Err(ConfigError::EmptyBracket {
                    name: name.to_string(),
                    index,
                });
            }
            Some(_) if index == last_index => {
                return Err(ConfigError::BoundedTopBracket {
                    name: name.to_string(),
                });
            }
            Some(upper) => expected_lower = upper,
            None if index != last_index => {
                return Err(ConfigError::UnboundedBracketNotLast {
                    name: name.to_string(),
                    index,
                });
            }
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn two_tier() -> Vec<BracketConfig> {
        vec![
            BracketConfig::new(dec!(0), dec!(50000), dec!(0.15)),
            BracketConfig::unbounded(dec!(50000), dec!(0.23)),
        ]
    }

    #[test]
    fn tax_bracket_derives_tax_amount() {
        let bracket = TaxBracket::new(dec!(50000), dec!(100000), dec!(0.23), dec!(25000)).unwrap();

        assert_eq!(bracket.tax_amount(), dec!(5750));
        assert_eq!(bracket.taxable_amount() * bracket.rate(), bracket.tax_amount());
    }

    #[test]
    fn validate_schedule_accepts_contiguous_schedule() {
        assert_eq!(validate_schedule("Income Tax", &two_tier()), Ok(()));
    }

    #[test]
    fn validate_schedule_accepts_single_flat_bracket() {
        let flat = vec![BracketConfig::unbounded(dec!(0), dec!(0.10))];

        assert_eq!(validate_schedule("Income Tax", &flat), Ok(()));
    }

    #[test]
    fn validate_schedule_rejects_empty_schedule() {
        assert_eq!(
            validate_schedule("Income Tax", &[]),
            Err(ConfigError::NoTaxBrackets {
                name: "Income Tax".to_string()
            })
        );
    }

    #[test]
    fn validate_schedule_rejects_nonzero_start() {
        let brackets = vec![BracketConfig::unbounded(dec!(100), dec!(0.10))];

        assert!(matches!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::FirstBracketNotZero { .. })
        ));
    }

    #[test]
    fn validate_schedule_rejects_gap() {
        let brackets = vec![
            BracketConfig::new(dec!(0), dec!(10000), dec!(0.10)),
            BracketConfig::unbounded(dec!(12000), dec!(0.20)),
        ];

        assert_eq!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::BracketGap {
                name: "Income Tax".to_string(),
                index: 1,
                lower_bound: dec!(12000),
                expected: dec!(10000),
            })
        );
    }

    #[test]
    fn validate_schedule_rejects_bounded_top_bracket() {
        let brackets = vec![BracketConfig::new(dec!(0), dec!(10000), dec!(0.10))];

        assert!(matches!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::BoundedTopBracket { .. })
        ));
    }

    #[test]
    fn validate_schedule_rejects_early_unbounded_bracket() {
        let brackets = vec![
            BracketConfig::unbounded(dec!(0), dec!(0.10)),
            BracketConfig::unbounded(dec!(0), dec!(0.20)),
        ];

        assert!(matches!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::UnboundedBracketNotLast { index: 0, .. })
        ));
    }

    #[test]
    fn validate_schedule_rejects_inverted_bracket() {
        let brackets = vec![
            BracketConfig::new(dec!(0), dec!(0), dec!(0.10)),
            BracketConfig::unbounded(dec!(0), dec!(0.20)),
        ];

        assert!(matches!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::EmptyBracket { index: 0, .. })
        ));
    }

    #[test]
    fn validate_schedule_rejects_rate_above_one() {
        let brackets = vec![BracketConfig::unbounded(dec!(0), dec!(1.5))];

        assert!(matches!(
            validate_schedule("Income Tax", &brackets),
            Err(ConfigError::InvalidRate { .. })
        ));
    }
}
