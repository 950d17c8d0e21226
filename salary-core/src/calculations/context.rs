use rust_decimal::Decimal;

use crate::models::TaxBracket;

/// State shared by the strategies of one calculation.
///
/// A context is created by the engine for a single call and dropped when the
/// call returns. Fields are written by earlier steps and read by later ones,
/// so a deduction reading `income_tax_amount` must be configured after the
/// progressive deduction that writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationContext {
    /// Running sum of deductions tagged as social security.
    pub social_security_total: Decimal,

    /// Most recent income-tax amount, after any discount.
    pub income_tax_amount: Option<Decimal>,

    /// Brackets staged by the last progressive deduction.
    pub income_tax_brackets: Vec<TaxBracket>,

    /// Expenses deducted by a flat-rate expense base.
    pub deductible_expenses: Option<Decimal>,

    /// Whether the flat-rate expense cap was exceeded.
    pub expense_cap_applied: bool,

    /// Income after social security, before a regional reduction.
    pub net_employment_income: Option<Decimal>,

    /// Reduction subtracted by a regional employment-income base.
    pub employment_income_reduction: Option<Decimal>,
}

impl CalculationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded income tax, or zero when none has been computed yet.
    pub fn income_tax(&self) -> Decimal {
        self.income_tax_amount.unwrap_or(Decimal::ZERO)
    }
}
