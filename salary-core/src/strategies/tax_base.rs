//! Tax-base strategies.
//!
//! | Strategy | Taxable base |
//! |----------|--------------|
//! | [`StandardTaxBase`] | gross |
//! | [`AfterSocialSecurityTaxBase`] | gross - social security |
//! | [`FlatRateExpenseTaxBase`] | gross x rate, excess above the cap fully taxable |
//! | [`EmploymentIncomeReductionTaxBase`] | gross - social security - phased-out reduction |

use rust_decimal::Decimal;

use crate::calculations::common::{checked_mul, format_amount, format_rate, max};
use crate::calculations::{CalculationContext, CalculationError};
use crate::models::ConfigError;
use crate::strategies::TaxBaseStrategy;

/// Taxable base equals gross salary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardTaxBase;

impl TaxBaseStrategy for StandardTaxBase {
    fn compute(
        &self,
        gross_salary: Decimal,
        _context: &mut CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        Ok(gross_salary)
    }

    fn describe(&self) -> String {
        "Taxable income = gross salary".to_string()
    }
}

/// Taxable base is gross salary minus the social-security total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AfterSocialSecurityTaxBase;

impl TaxBaseStrategy for AfterSocialSecurityTaxBase {
    fn compute(
        &self,
        gross_salary: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        Ok(gross_salary - context.social_security_total)
    }

    fn depends_on_social_security(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "Taxable income = gross salary - social security contributions".to_string()
    }
}

/// Flat-rate expense deduction with a cap.
///
/// Up to `expense_cap` only `taxable_rate` of income is taxable; income above
/// the cap is fully taxable.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::CalculationContext;
/// use salary_core::strategies::{FlatRateExpenseTaxBase, TaxBaseStrategy};
///
/// let base = FlatRateExpenseTaxBase::new(dec!(0.40), dec!(80000)).unwrap();
/// let mut context = CalculationContext::new();
///
/// assert_eq!(base.compute(dec!(50000), &mut context).unwrap(), dec!(20000));
/// assert_eq!(base.compute(dec!(100000), &mut context).unwrap(), dec!(52000));
/// assert!(context.expense_cap_applied);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRateExpenseTaxBase {
    taxable_rate: Decimal,
    expense_cap: Decimal,
}

impl FlatRateExpenseTaxBase {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `taxable_rate` is not in (0, 1] or
    /// `expense_cap` is negative.
    pub fn new(
        taxable_rate: Decimal,
        expense_cap: Decimal,
    ) -> Result<Self, ConfigError> {
        if taxable_rate <= Decimal::ZERO || taxable_rate > Decimal::ONE {
            return Err(ConfigError::InvalidTaxableRate(taxable_rate));
        }
        if expense_cap < Decimal::ZERO {
            return Err(ConfigError::NegativeExpenseCap(expense_cap));
        }
        Ok(Self {
            taxable_rate,
            expense_cap,
        })
    }

    pub fn taxable_rate(&self) -> Decimal {
        self.taxable_rate
    }

    pub fn expense_cap(&self) -> Decimal {
        self.expense_cap
    }
}

impl TaxBaseStrategy for FlatRateExpenseTaxBase {
    fn compute(
        &self,
        gross_salary: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        let expense_rate = Decimal::ONE - self.taxable_rate;
        let cap_applied = gross_salary > self.expense_cap;

        let (taxable, expenses) = if cap_applied {
            let taxable_up_to_cap = checked_mul(self.expense_cap, self.taxable_rate, "expense cap")?;
            (
                taxable_up_to_cap + (gross_salary - self.expense_cap),
                checked_mul(self.expense_cap, expense_rate, "expense cap")?,
            )
        } else {
            (
                checked_mul(gross_salary, self.taxable_rate, "flat-rate base")?,
                checked_mul(gross_salary, expense_rate, "flat-rate expenses")?,
            )
        };

        context.deductible_expenses = Some(expenses);
        context.expense_cap_applied = cap_applied;
        Ok(taxable)
    }

    fn describe(&self) -> String {
        format!(
            "Taxable income = {} of gross up to {}, 100% above",
            format_rate(self.taxable_rate),
            format_amount(self.expense_cap)
        )
    }
}

/// Reduction band for [`EmploymentIncomeReductionTaxBase`].
///
/// The reduction is `max` at or below `lower`, `min` at or above `upper`,
/// and falls linearly in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutBand {
    pub lower: Decimal,
    pub upper: Decimal,
    pub max_reduction: Decimal,
    pub min_reduction: Decimal,
}

impl PhaseOutBand {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upper <= self.lower {
            return Err(ConfigError::InvalidPhaseOut(format!(
                "upper threshold {} must be above lower threshold {}",
                self.upper, self.lower
            )));
        }
        if self.min_reduction < Decimal::ZERO || self.min_reduction > self.max_reduction {
            return Err(ConfigError::InvalidPhaseOut(format!(
                "reductions must satisfy 0 <= min ({}) <= max ({})",
                self.min_reduction, self.max_reduction
            )));
        }
        Ok(())
    }

    /// Reduction for a given net income, clamped to `[min, max]`.
    pub fn reduction(
        &self,
        net_income: Decimal,
    ) -> Result<Decimal, CalculationError> {
        if net_income <= self.lower {
            return Ok(self.max_reduction);
        }
        if net_income >= self.upper {
            return Ok(self.min_reduction);
        }

        let slope = (self.max_reduction - self.min_reduction) / (self.upper - self.lower);
        let phased = self.max_reduction - checked_mul(net_income - self.lower, slope, "phase-out")?;
        Ok(phased.clamp(self.min_reduction, self.max_reduction))
    }
}

/// Regional employment-income reduction.
///
/// Social security is subtracted from gross first; the resulting net income
/// is then reduced by an amount that phases out as income grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmploymentIncomeReductionTaxBase {
    band: PhaseOutBand,
}

impl EmploymentIncomeReductionTaxBase {
    pub fn new(band: PhaseOutBand) -> Result<Self, ConfigError> {
        band.validate()?;
        Ok(Self { band })
    }

    pub fn band(&self) -> &PhaseOutBand {
        &self.band
    }
}

impl TaxBaseStrategy for EmploymentIncomeReductionTaxBase {
    fn compute(
        &self,
        gross_salary: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        let net_income = gross_salary - context.social_security_total;
        let reduction = self.band.reduction(net_income)?;

        context.net_employment_income = Some(net_income);
        context.employment_income_reduction = Some(reduction);

        // The reduction can exceed small incomes; the base never goes negative.
        Ok(max(net_income - reduction, Decimal::ZERO))
    }

    fn depends_on_social_security(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!(
            "Taxable income = gross - social security - employment reduction ({} to {})",
            format_amount(self.band.max_reduction),
            format_amount(self.band.min_reduction)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn band() -> PhaseOutBand {
        PhaseOutBand {
            lower: dec!(14000),
            upper: dec!(20000),
            max_reduction: dec!(8000),
            min_reduction: dec!(2000),
        }
    }

    // =========================================================================
    // StandardTaxBase tests
    // =========================================================================

    #[test]
    fn standard_base_is_gross() {
        let mut context = CalculationContext::new();

        let base = StandardTaxBase.compute(dec!(50000), &mut context).unwrap();

        assert_eq!(base, dec!(50000));
        assert_eq!(context, CalculationContext::new());
    }

    // =========================================================================
    // AfterSocialSecurityTaxBase tests
    // =========================================================================

    #[test]
    fn after_social_security_subtracts_total() {
        let mut context = CalculationContext {
            social_security_total: dec!(10750),
            ..CalculationContext::default()
        };

        let base = AfterSocialSecurityTaxBase
            .compute(dec!(50000), &mut context)
            .unwrap();

        assert_eq!(base, dec!(39250));
    }

    #[test]
    fn after_social_security_defaults_to_gross() {
        let mut context = CalculationContext::new();

        let base = AfterSocialSecurityTaxBase
            .compute(dec!(50000), &mut context)
            .unwrap();

        assert_eq!(base, dec!(50000));
        assert!(AfterSocialSecurityTaxBase.depends_on_social_security());
    }

    // =========================================================================
    // FlatRateExpenseTaxBase tests
    // =========================================================================

    #[test]
    fn flat_rate_expense_below_cap() {
        let strategy = FlatRateExpenseTaxBase::new(dec!(0.40), dec!(80000)).unwrap();
        let mut context = CalculationContext::new();

        let base = strategy.compute(dec!(50000), &mut context).unwrap();

        assert_eq!(base, dec!(20000));
        assert_eq!(context.deductible_expenses, Some(dec!(30000)));
        assert!(!context.expense_cap_applied);
    }

    #[test]
    fn flat_rate_expense_at_cap_is_not_capped() {
        let strategy = FlatRateExpenseTaxBase::new(dec!(0.40), dec!(80000)).unwrap();
        let mut context = CalculationContext::new();

        let base = strategy.compute(dec!(80000), &mut context).unwrap();

        assert_eq!(base, dec!(32000));
        assert!(!context.expense_cap_applied);
    }

    #[test]
    fn flat_rate_expense_above_cap_taxes_excess_fully() {
        let strategy = FlatRateExpenseTaxBase::new(dec!(0.40), dec!(80000)).unwrap();
        let mut context = CalculationContext::new();

        let base = strategy.compute(dec!(100000), &mut context).unwrap();

        // 80,000 x 0.40 + 20,000
        assert_eq!(base, dec!(52000));
        assert_eq!(context.deductible_expenses, Some(dec!(48000)));
        assert!(context.expense_cap_applied);
    }

    #[test]
    fn flat_rate_expense_rejects_invalid_rate() {
        assert_eq!(
            FlatRateExpenseTaxBase::new(dec!(0), dec!(80000)),
            Err(ConfigError::InvalidTaxableRate(dec!(0)))
        );
        assert_eq!(
            FlatRateExpenseTaxBase::new(dec!(0.4), dec!(-1)),
            Err(ConfigError::NegativeExpenseCap(dec!(-1)))
        );
    }

    // =========================================================================
    // PhaseOutBand tests
    // =========================================================================

    #[test]
    fn phase_out_is_max_below_lower_threshold() {
        assert_eq!(band().reduction(dec!(10000)), Ok(dec!(8000)));
        assert_eq!(band().reduction(dec!(14000)), Ok(dec!(8000)));
    }

    #[test]
    fn phase_out_is_min_above_upper_threshold() {
        assert_eq!(band().reduction(dec!(20000)), Ok(dec!(2000)));
        assert_eq!(band().reduction(dec!(90000)), Ok(dec!(2000)));
    }

    #[test]
    fn phase_out_interpolates_linearly() {
        // Halfway through the band: 8000 - 3000 x (6000 / 6000)
        assert_eq!(band().reduction(dec!(17000)), Ok(dec!(5000)));
    }

    #[test]
    fn phase_out_rejects_inverted_band() {
        let inverted = PhaseOutBand {
            lower: dec!(20000),
            upper: dec!(14000),
            ..band()
        };

        assert!(matches!(inverted.validate(), Err(ConfigError::InvalidPhaseOut(_))));
    }

    #[test]
    fn phase_out_rejects_min_above_max() {
        let inverted = PhaseOutBand {
            min_reduction: dec!(9000),
            ..band()
        };

        assert!(EmploymentIncomeReductionTaxBase::new(inverted).is_err());
    }

    // =========================================================================
    // EmploymentIncomeReductionTaxBase tests
    // =========================================================================

    #[test]
    fn employment_reduction_subtracts_social_security_and_reduction() {
        let strategy = EmploymentIncomeReductionTaxBase::new(band()).unwrap();
        let mut context = CalculationContext {
            social_security_total: dec!(3000),
            ..CalculationContext::default()
        };

        let base = strategy.compute(dec!(50000), &mut context).unwrap();

        assert_eq!(base, dec!(45000));
        assert_eq!(context.net_employment_income, Some(dec!(47000)));
        assert_eq!(context.employment_income_reduction, Some(dec!(2000)));
    }

    #[test]
    fn employment_reduction_never_goes_negative() {
        let strategy = EmploymentIncomeReductionTaxBase::new(band()).unwrap();
        let mut context = CalculationContext::new();

        let base = strategy.compute(dec!(5000), &mut context).unwrap();

        assert_eq!(base, Decimal::ZERO);
        assert_eq!(context.employment_income_reduction, Some(dec!(8000)));
    }
}
