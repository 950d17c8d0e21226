use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ConfigError;

/// Label of the progressive income-tax deduction.
///
/// The engine records the amount of a deduction with exactly this name as
/// the income tax that later deductions (solidarity surcharges, percentages
/// of income tax) are computed from.
pub const INCOME_TAX: &str = "Income Tax";

/// Which amount a deduction is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionBase {
    /// The gross salary.
    Gross,
    /// The taxable base produced by the regime's tax-base strategy.
    Taxable,
    /// The income tax computed earlier in the same calculation.
    IncomeTax,
}

impl DeductionBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gross => "gross",
            Self::Taxable => "taxable",
            Self::IncomeTax => "income_tax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gross" => Some(Self::Gross),
            "taxable" | "tax_base" => Some(Self::Taxable),
            "income_tax" => Some(Self::IncomeTax),
            _ => None,
        }
    }
}

impl fmt::Display for DeductionBase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied deduction: a tax, social contribution or fund payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    name: String,
    amount: Decimal,
    rate: Decimal,
    description: String,
    calculation_details: String,
}

impl Deduction {
    /// Builds a deduction. Negative amounts are clamped to zero.
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        rate: Decimal,
        description: impl Into<String>,
        calculation_details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount: amount.max(Decimal::ZERO),
            rate,
            description: description.into(),
            calculation_details: calculation_details.into(),
        }
    }

    /// A zero-amount deduction; the engine leaves these out of the result.
    pub fn zero(
        config: &DeductionConfig,
        calculation_details: impl Into<String>,
    ) -> Self {
        Self::new(
            config.name.clone(),
            Decimal::ZERO,
            Decimal::ZERO,
            config.description.clone(),
            calculation_details,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn calculation_details(&self) -> &str {
        &self.calculation_details
    }
}

/// Declarative settings shared by every deduction strategy.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::{DeductionBase, DeductionConfig};
///
/// let pension = DeductionConfig::new("Pension Insurance", dec!(0.093))
///     .with_description("Mandatory pension insurance contribution")
///     .with_ceiling(dec!(96000))
///     .social_security();
///
/// assert_eq!(pension.applies_to, DeductionBase::Gross);
/// assert!(pension.counts_as_social_security);
/// assert!(pension.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    pub name: String,
    pub description: String,
    pub rate: Decimal,
    pub applies_to: DeductionBase,
    pub ceiling: Option<Decimal>,
    pub floor: Option<Decimal>,
    /// Whether the amount feeds the social-security total that
    /// after-social-security tax bases subtract from gross.
    pub counts_as_social_security: bool,
}

impl DeductionConfig {
    /// A gross-based deduction with no ceiling or floor.
    pub fn new(
        name: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            rate,
            applies_to: DeductionBase::Gross,
            ceiling: None,
            floor: None,
            counts_as_social_security: false,
        }
    }

    pub fn with_description(
        mut self,
        description: impl Into<String>,
    ) -> Self {
        self.description = description.into();
        self
    }

    pub fn applies_to(
        mut self,
        base: DeductionBase,
    ) -> Self {
        self.applies_to = base;
        self
    }

    pub fn with_ceiling(
        mut self,
        ceiling: Decimal,
    ) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn with_floor(
        mut self,
        floor: Decimal,
    ) -> Self {
        self.floor = Some(floor);
        self
    }

    pub fn social_security(mut self) -> Self {
        self.counts_as_social_security = true;
        self
    }

    /// Validates the rate and the ceiling/floor window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `rate` is not in [0, 1]
    /// - `ceiling` is negative
    /// - `floor` is negative or not below `ceiling`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate < Decimal::ZERO || self.rate > Decimal::ONE {
            return Err(ConfigError::InvalidRate {
                name: self.name.clone(),
                rate: self.rate,
            });
        }
        if let Some(ceiling) = self.ceiling {
            if ceiling < Decimal::ZERO {
                return Err(ConfigError::NegativeCeiling {
                    name: self.name.clone(),
                    ceiling,
                });
            }
        }
        if let Some(floor) = self.floor {
            let ceiling = self.ceiling.unwrap_or(Decimal::MAX);
            if floor < Decimal::ZERO || floor >= ceiling {
                return Err(ConfigError::InvalidFloor {
                    name: self.name.clone(),
                    floor,
                    ceiling,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // Deduction tests
    // =========================================================================

    #[test]
    fn deduction_clamps_negative_amount() {
        let deduction = Deduction::new("Refund", dec!(-10), dec!(0.1), "", "");

        assert_eq!(deduction.amount(), Decimal::ZERO);
    }

    #[test]
    fn zero_deduction_keeps_config_labels() {
        let config = DeductionConfig::new("Solidarity Surcharge", dec!(0.055))
            .with_description("Surcharge on income tax");

        let deduction = Deduction::zero(&config, "Condition not met");

        assert_eq!(deduction.name(), "Solidarity Surcharge");
        assert_eq!(deduction.description(), "Surcharge on income tax");
        assert_eq!(deduction.amount(), Decimal::ZERO);
        assert_eq!(deduction.calculation_details(), "Condition not met");
    }

    // =========================================================================
    // DeductionConfig tests
    // =========================================================================

    #[test]
    fn validate_accepts_ceiling_and_floor_window() {
        let config = DeductionConfig::new("Supplementary Pension (Bracket 2)", dec!(0.0864))
            .with_ceiling(dec!(376800))
            .with_floor(dec!(47100));

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_rate_out_of_range() {
        let config = DeductionConfig::new("Broken", dec!(1.2));

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRate {
                name: "Broken".to_string(),
                rate: dec!(1.2)
            })
        );
    }

    #[test]
    fn validate_rejects_floor_at_or_above_ceiling() {
        let config = DeductionConfig::new("Broken", dec!(0.1))
            .with_ceiling(dec!(1000))
            .with_floor(dec!(1000));

        assert!(matches!(config.validate(), Err(ConfigError::InvalidFloor { .. })));
    }

    #[test]
    fn validate_rejects_negative_ceiling() {
        let config = DeductionConfig::new("Broken", dec!(0.1)).with_ceiling(dec!(-1));

        assert!(matches!(config.validate(), Err(ConfigError::NegativeCeiling { .. })));
    }

    #[test]
    fn deduction_base_parses_tax_base_alias() {
        assert_eq!(DeductionBase::parse("tax_base"), Some(DeductionBase::Taxable));
        assert_eq!(DeductionBase::parse("income_tax"), Some(DeductionBase::IncomeTax));
        assert_eq!(DeductionBase::parse("net"), None);
    }
}
