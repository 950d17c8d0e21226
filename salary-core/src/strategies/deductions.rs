//! Deduction strategies.
//!
//! Every strategy selects its base through
//! [`DeductionStrategy::get_base_amount`] and turns it into one
//! [`Deduction`]. A base of zero or less always produces a zero-amount
//! deduction, which the engine leaves out of the result.

use rust_decimal::Decimal;
use tracing::trace;

use crate::calculations::common::{checked_mul, format_amount, format_rate, max, safe_ratio};
use crate::calculations::{CalculationContext, CalculationError};
use crate::models::{BracketConfig, ConfigError, Deduction, DeductionConfig, TaxBracket, validate_schedule};
use crate::strategies::{DeductionStrategy, select_base};

const NO_BASE: &str = "No base amount";

fn trace_line(
    base: Decimal,
    rate: Decimal,
    amount: Decimal,
) -> String {
    format!(
        "{} × {} = {}",
        format_amount(base),
        format_rate(rate),
        format_amount(amount)
    )
}

fn cap_note(
    base: Decimal,
    ceiling: Option<Decimal>,
) -> String {
    match ceiling {
        Some(ceiling) if base > ceiling => format!(" (capped at {})", format_amount(ceiling)),
        _ => String::new(),
    }
}

// =============================================================================
// FlatRateDeduction
// =============================================================================

/// `rate` applied to the base, optionally limited to `ceiling`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::DeductionConfig;
/// use salary_core::calculations::CalculationContext;
/// use salary_core::strategies::{DeductionStrategy, FlatRateDeduction};
///
/// let pension = FlatRateDeduction::new(
///     DeductionConfig::new("Pension Insurance", dec!(0.093)).with_ceiling(dec!(96000)),
/// )
/// .unwrap();
///
/// let deduction = pension.calculate(dec!(120000), &mut CalculationContext::new()).unwrap();
/// assert_eq!(deduction.amount(), dec!(8928));
/// assert_eq!(deduction.calculation_details(), "96,000 × 9.3% = 8,928 (capped at 96,000)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRateDeduction {
    config: DeductionConfig,
}

impl FlatRateDeduction {
    pub fn new(config: DeductionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.floor.is_some() {
            return Err(ConfigError::UnsupportedFloor { name: config.name });
        }
        Ok(Self { config })
    }
}

impl DeductionStrategy for FlatRateDeduction {
    fn config(&self) -> &DeductionConfig {
        &self.config
    }

    fn calculate(
        &self,
        base_amount: Decimal,
        _context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError> {
        if base_amount <= Decimal::ZERO {
            return Ok(Deduction::zero(&self.config, NO_BASE));
        }

        let effective_base = match self.config.ceiling {
            Some(ceiling) => base_amount.min(ceiling),
            None => base_amount,
        };
        let amount = checked_mul(effective_base, self.config.rate, "flat-rate deduction")?;
        let details = trace_line(effective_base, self.config.rate, amount)
            + &cap_note(base_amount, self.config.ceiling);

        Ok(Deduction::new(
            self.config.name.clone(),
            amount,
            self.config.rate,
            self.config.description.clone(),
            details,
        ))
    }
}

// =============================================================================
// CappedPercentageDeduction
// =============================================================================

/// `rate` applied to the part of the base between `floor` (default 0) and
/// the mandatory `ceiling`.
///
/// The amount never exceeds `(ceiling - floor) * rate` and is zero whenever
/// the base is at or below the floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedPercentageDeduction {
    config: DeductionConfig,
    ceiling: Decimal,
}

impl CappedPercentageDeduction {
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCeiling`] if the configuration has no
    /// ceiling, or any error from [`DeductionConfig::validate`].
    pub fn new(config: DeductionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ceiling = config.ceiling.ok_or_else(|| ConfigError::MissingCeiling {
            name: config.name.clone(),
        })?;
        Ok(Self { config, ceiling })
    }
}

impl DeductionStrategy for CappedPercentageDeduction {
    fn config(&self) -> &DeductionConfig {
        &self.config
    }

    fn calculate(
        &self,
        base_amount: Decimal,
        _context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError> {
        if base_amount <= Decimal::ZERO {
            return Ok(Deduction::zero(&self.config, NO_BASE));
        }

        let capped_base = base_amount.min(self.ceiling);
        let floor = self.config.floor.unwrap_or(Decimal::ZERO);
        let taxed = max(capped_base - floor, Decimal::ZERO);

        if taxed.is_zero() {
            return Ok(Deduction::zero(
                &self.config,
                format!("Below floor of {}", format_amount(floor)),
            ));
        }

        let amount = checked_mul(taxed, self.config.rate, "capped deduction")?;
        let mut details = if floor.is_zero() {
            trace_line(taxed, self.config.rate, amount)
        } else {
            format!(
                "({} - {}) × {} = {}",
                format_amount(capped_base),
                format_amount(floor),
                format_rate(self.config.rate),
                format_amount(amount)
            )
        };
        details.push_str(&cap_note(base_amount, Some(self.ceiling)));

        Ok(Deduction::new(
            self.config.name.clone(),
            amount,
            self.config.rate,
            self.config.description.clone(),
            details,
        ))
    }
}

// =============================================================================
// PercentageOfBaseDeduction
// =============================================================================

/// `rate` applied to a fraction (`base_multiplier`) of the selected base,
/// e.g. social security on 50% of taxable income.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentageOfBaseDeduction {
    config: DeductionConfig,
    base_multiplier: Decimal,
}

impl PercentageOfBaseDeduction {
    pub fn new(
        config: DeductionConfig,
        base_multiplier: Decimal,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.floor.is_some() {
            return Err(ConfigError::UnsupportedFloor { name: config.name });
        }
        if base_multiplier <= Decimal::ZERO {
            return Err(ConfigError::InvalidBaseMultiplier {
                name: config.name,
                multiplier: base_multiplier,
            });
        }
        Ok(Self {
            config,
            base_multiplier,
        })
    }

    pub fn base_multiplier(&self) -> Decimal {
        self.base_multiplier
    }
}

impl DeductionStrategy for PercentageOfBaseDeduction {
    fn config(&self) -> &DeductionConfig {
        &self.config
    }

    fn get_base_amount(
        &self,
        gross_salary: Decimal,
        tax_base: Decimal,
        context: &CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        let selected = select_base(self.config.applies_to, gross_salary, tax_base, context);
        checked_mul(selected, self.base_multiplier, "base multiplier")
    }

    fn calculate(
        &self,
        base_amount: Decimal,
        _context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError> {
        if base_amount <= Decimal::ZERO {
            return Ok(Deduction::zero(&self.config, NO_BASE));
        }

        let amount = checked_mul(base_amount, self.config.rate, "percentage of base")?;
        let details = format!(
            "Base: {} of {} income, {}",
            format_rate(self.base_multiplier),
            self.config.applies_to,
            trace_line(base_amount, self.config.rate, amount)
        );

        Ok(Deduction::new(
            self.config.name.clone(),
            amount,
            self.config.rate,
            self.config.description.clone(),
            details,
        ))
    }
}

// =============================================================================
// ProgressiveTaxDeduction
// =============================================================================

/// Progressive tax over an ordered bracket schedule, with an optional flat
/// discount subtracted from the total.
///
/// Records the applied brackets and the post-discount tax in the context so
/// that later deductions can build on the income tax.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::{BracketConfig, DeductionBase, DeductionConfig};
/// use salary_core::calculations::CalculationContext;
/// use salary_core::strategies::{DeductionStrategy, ProgressiveTaxDeduction};
///
/// let income_tax = ProgressiveTaxDeduction::new(
///     DeductionConfig::new("Income Tax", dec!(0)).applies_to(DeductionBase::Taxable),
///     vec![
///         BracketConfig::new(dec!(0), dec!(50000), dec!(0.15)),
///         BracketConfig::unbounded(dec!(50000), dec!(0.23)),
///     ],
///     None,
/// )
/// .unwrap();
///
/// let mut context = CalculationContext::new();
/// let deduction = income_tax.calculate(dec!(80000), &mut context).unwrap();
///
/// assert_eq!(deduction.amount(), dec!(14400));
/// assert_eq!(context.income_tax_brackets.len(), 2);
/// assert_eq!(context.income_tax_amount, Some(dec!(14400)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveTaxDeduction {
    config: DeductionConfig,
    brackets: Vec<BracketConfig>,
    discount: Decimal,
}

impl ProgressiveTaxDeduction {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the schedule is not a contiguous ascending
    /// schedule starting at zero and ending unbounded, or the discount is
    /// negative.
    pub fn new(
        config: DeductionConfig,
        brackets: Vec<BracketConfig>,
        discount: Option<Decimal>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_schedule(&config.name, &brackets)?;
        let discount = discount.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO {
            return Err(ConfigError::NegativeDiscount {
                name: config.name,
                discount,
            });
        }
        Ok(Self {
            config,
            brackets,
            discount,
        })
    }

    pub fn brackets(&self) -> &[BracketConfig] {
        &self.brackets
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    fn apply_brackets(
        &self,
        base_amount: Decimal,
    ) -> Result<(Decimal, Vec<TaxBracket>), CalculationError> {
        let mut total_tax = Decimal::ZERO;
        let mut remaining = base_amount;
        let mut applied = Vec::new();

        for bracket in &self.brackets {
            if remaining <= Decimal::ZERO {
                break;
            }

            let (taxable, display_upper) = match bracket.upper_bound {
                Some(upper) => (remaining.min(upper - bracket.lower_bound), upper),
                None => (remaining, base_amount),
            };
            if taxable <= Decimal::ZERO {
                continue;
            }

            let tax_bracket =
                TaxBracket::new(bracket.lower_bound, display_upper, bracket.rate, taxable)?;
            total_tax += tax_bracket.tax_amount();
            remaining -= taxable;
            applied.push(tax_bracket);
        }

        Ok((total_tax, applied))
    }
}

impl DeductionStrategy for ProgressiveTaxDeduction {
    fn config(&self) -> &DeductionConfig {
        &self.config
    }

    fn calculate(
        &self,
        base_amount: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError> {
        if base_amount <= Decimal::ZERO {
            context.income_tax_brackets = Vec::new();
            context.income_tax_amount = Some(Decimal::ZERO);
            return Ok(Deduction::zero(&self.config, "No taxable income"));
        }

        let (tax_before_discount, applied) = self.apply_brackets(base_amount)?;
        let total_tax = max(tax_before_discount - self.discount, Decimal::ZERO);

        trace!(
            name = %self.config.name,
            base = %base_amount,
            brackets = applied.len(),
            tax = %total_tax,
            "progressive tax computed"
        );

        let details = if self.discount > Decimal::ZERO {
            format!(
                "Tax: {}, Discount: {}, Final: {}",
                format_amount(tax_before_discount),
                format_amount(self.discount),
                format_amount(total_tax)
            )
        } else {
            format!(
                "Total tax from {} applicable bracket(s) = {}",
                applied.len(),
                format_amount(total_tax)
            )
        };

        context.income_tax_brackets = applied;
        context.income_tax_amount = Some(total_tax);

        Ok(Deduction::new(
            self.config.name.clone(),
            total_tax,
            safe_ratio(total_tax, base_amount),
            self.config.description.clone(),
            details,
        ))
    }
}

// =============================================================================
// ConditionalDeduction
// =============================================================================

/// Predicate over the calculation context.
#[derive(Debug, Clone, Copy)]
pub enum Condition {
    /// Income tax computed so far is strictly above the threshold.
    IncomeTaxAbove(Decimal),
    /// Social-security total is strictly above the threshold.
    SocialSecurityAbove(Decimal),
    /// Arbitrary check supplied by the regime definition.
    Custom(fn(&CalculationContext) -> bool),
}

impl Condition {
    pub fn is_met(
        &self,
        context: &CalculationContext,
    ) -> bool {
        match self {
            Self::IncomeTaxAbove(threshold) => context.income_tax() > *threshold,
            Self::SocialSecurityAbove(threshold) => context.social_security_total > *threshold,
            Self::Custom(check) => check(context),
        }
    }
}

/// Limit on a conditional amount just above its threshold.
///
/// The amount never exceeds `rate * (base - threshold)`, so it grows from
/// zero instead of jumping to the full rate once the condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseIn {
    pub threshold: Decimal,
    pub rate: Decimal,
}

/// `rate` applied to the base only when the condition holds, e.g. a
/// solidarity surcharge on income tax above a threshold.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::CalculationContext;
/// use salary_core::strategies::{Condition, ConditionalDeduction, DeductionStrategy};
/// use salary_core::{DeductionBase, DeductionConfig};
///
/// let surcharge = ConditionalDeduction::new(
///     DeductionConfig::new("Solidarity Surcharge", dec!(0.055)).applies_to(DeductionBase::IncomeTax),
///     Condition::IncomeTaxAbove(dec!(1000)),
/// )
/// .unwrap()
/// .with_phase_in(dec!(1000), dec!(0.119))
/// .unwrap();
///
/// let mut context = CalculationContext::new();
/// context.income_tax_amount = Some(dec!(1100));
/// let deduction = surcharge.calculate(dec!(1100), &mut context).unwrap();
///
/// // 100 x 11.9% is below 1,100 x 5.5%
/// assert_eq!(deduction.amount(), dec!(11.9));
/// ```
#[derive(Debug, Clone)]
pub struct ConditionalDeduction {
    config: DeductionConfig,
    condition: Condition,
    phase_in: Option<PhaseIn>,
}

impl ConditionalDeduction {
    pub fn new(
        config: DeductionConfig,
        condition: Condition,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.floor.is_some() {
            return Err(ConfigError::UnsupportedFloor { name: config.name });
        }
        Ok(Self {
            config,
            condition,
            phase_in: None,
        })
    }

    /// Limits the amount to `rate * (base - threshold)`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPhaseIn`] if `rate` is not in (0, 1] or
    /// `threshold` is negative.
    pub fn with_phase_in(
        mut self,
        threshold: Decimal,
        rate: Decimal,
    ) -> Result<Self, ConfigError> {
        if threshold < Decimal::ZERO || rate <= Decimal::ZERO || rate > Decimal::ONE {
            return Err(ConfigError::InvalidPhaseIn {
                name: self.config.name,
                threshold,
                rate,
            });
        }
        self.phase_in = Some(PhaseIn { threshold, rate });
        Ok(self)
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn phase_in(&self) -> Option<PhaseIn> {
        self.phase_in
    }
}

impl DeductionStrategy for ConditionalDeduction {
    fn config(&self) -> &DeductionConfig {
        &self.config
    }

    fn calculate(
        &self,
        base_amount: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError> {
        if !self.condition.is_met(context) {
            return Ok(Deduction::zero(&self.config, "Condition not met"));
        }
        if base_amount <= Decimal::ZERO {
            return Ok(Deduction::zero(&self.config, NO_BASE));
        }

        let full = checked_mul(base_amount, self.config.rate, "conditional deduction")?;
        let mut details = trace_line(base_amount, self.config.rate, full);

        let amount = match self.phase_in {
            Some(phase_in) => {
                let excess = max(base_amount - phase_in.threshold, Decimal::ZERO);
                let limit = checked_mul(excess, phase_in.rate, "phase-in limit")?;
                if limit < full {
                    details = format!(
                        "({} - {}) × {} = {} (phase-in below the full {})",
                        format_amount(base_amount),
                        format_amount(phase_in.threshold),
                        format_rate(phase_in.rate),
                        format_amount(limit),
                        format_amount(full)
                    );
                    limit
                } else {
                    full
                }
            }
            None => full,
        };

        Ok(Deduction::new(
            self.config.name.clone(),
            amount,
            self.config.rate,
            self.config.description.clone(),
            details,
        ))
    }
}
