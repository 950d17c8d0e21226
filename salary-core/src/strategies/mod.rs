//! Composable calculation steps.
//!
//! A regime is one [`TaxBaseStrategy`] plus an ordered list of
//! [`DeductionStrategy`] values. Strategies are immutable once built and
//! shared by every calculation that uses the regime; all per-call state lives
//! in the [`CalculationContext`].

pub mod deductions;
pub mod tax_base;

use std::fmt;

use rust_decimal::Decimal;

use crate::calculations::{CalculationContext, CalculationError};
use crate::models::{Deduction, DeductionBase, DeductionConfig};

pub use deductions::{
    CappedPercentageDeduction, Condition, ConditionalDeduction, FlatRateDeduction,
    PercentageOfBaseDeduction, PhaseIn, ProgressiveTaxDeduction,
};
pub use tax_base::{
    AfterSocialSecurityTaxBase, EmploymentIncomeReductionTaxBase, FlatRateExpenseTaxBase,
    PhaseOutBand, StandardTaxBase,
};

/// Computes the taxable base from gross salary.
pub trait TaxBaseStrategy: fmt::Debug + Send + Sync {
    /// Returns the taxable base. May record side values in `context`.
    fn compute(
        &self,
        gross_salary: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Decimal, CalculationError>;

    /// Whether the base subtracts social security, so gross-based deductions
    /// must run before it.
    fn depends_on_social_security(&self) -> bool {
        false
    }

    /// Short human-readable formula, used in explanations.
    fn describe(&self) -> String;
}

/// Computes one line-item deduction.
pub trait DeductionStrategy: fmt::Debug + Send + Sync {
    fn config(&self) -> &DeductionConfig;

    /// Selects the amount this deduction is computed from.
    fn get_base_amount(
        &self,
        gross_salary: Decimal,
        tax_base: Decimal,
        context: &CalculationContext,
    ) -> Result<Decimal, CalculationError> {
        Ok(select_base(self.config().applies_to, gross_salary, tax_base, context))
    }

    /// Computes the deduction. A zero or negative base yields a zero amount.
    fn calculate(
        &self,
        base_amount: Decimal,
        context: &mut CalculationContext,
    ) -> Result<Deduction, CalculationError>;
}

pub(crate) fn select_base(
    applies_to: DeductionBase,
    gross_salary: Decimal,
    tax_base: Decimal,
    context: &CalculationContext,
) -> Decimal {
    match applies_to {
        DeductionBase::Gross => gross_salary,
        DeductionBase::Taxable => tax_base,
        DeductionBase::IncomeTax => context.income_tax(),
    }
}
