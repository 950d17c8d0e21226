use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::safe_ratio;
use crate::models::{Currency, Deduction, TaxBracket};

/// Itemized outcome of one net-salary calculation.
///
/// After every mutation `net_salary == gross_salary - total_deductions` and
/// `total_deductions` is the sum of the listed deduction amounts.
/// [`TaxResult::add_deduction`] is the only way to grow the deduction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_salary: Decimal,
    pub tax_base: Decimal,
    pub net_salary: Decimal,
    pub total_deductions: Decimal,
    deductions: Vec<Deduction>,
    pub income_tax_brackets: Vec<TaxBracket>,
    pub country: String,
    pub employment_type: String,
    pub description: String,
    /// Units of `local_currency` per EUR, when the regime is expressed in a
    /// currency other than EUR.
    pub local_currency: Option<Currency>,
    pub local_currency_rate: Option<Decimal>,
    pub calculation_explanations: BTreeMap<String, String>,
}

impl TaxResult {
    /// An empty result: nothing deducted yet, so net equals gross.
    pub fn new(
        gross_salary: Decimal,
        country: impl Into<String>,
        employment_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            gross_salary,
            tax_base: Decimal::ZERO,
            net_salary: gross_salary,
            total_deductions: Decimal::ZERO,
            deductions: Vec::new(),
            income_tax_brackets: Vec::new(),
            country: country.into(),
            employment_type: employment_type.into(),
            description: description.into(),
            local_currency: None,
            local_currency_rate: None,
            calculation_explanations: BTreeMap::new(),
        }
    }

    /// Appends a deduction and recomputes totals.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use salary_core::{Deduction, TaxResult};
    ///
    /// let mut result = TaxResult::new(dec!(50000), "Czechia", "Salaried Employee", "");
    /// result.add_deduction(Deduction::new("Social Security", dec!(3250), dec!(0.065), "", ""));
    ///
    /// assert_eq!(result.total_deductions, dec!(3250));
    /// assert_eq!(result.net_salary, dec!(46750));
    /// ```
    pub fn add_deduction(
        &mut self,
        deduction: Deduction,
    ) {
        self.total_deductions += deduction.amount();
        self.net_salary = self.gross_salary - self.total_deductions;
        self.deductions.push(deduction);
    }

    pub fn deductions(&self) -> &[Deduction] {
        &self.deductions
    }

    /// First deduction with the given name.
    pub fn deduction(
        &self,
        name: &str,
    ) -> Option<&Deduction> {
        self.deductions.iter().find(|d| d.name() == name)
    }

    /// Tax owed across all recorded brackets, before any flat discount.
    pub fn total_income_tax(&self) -> Decimal {
        self.income_tax_brackets
            .iter()
            .map(TaxBracket::tax_amount)
            .sum()
    }

    /// Share of gross salary taken by deductions; zero for a zero gross.
    pub fn effective_tax_rate(&self) -> Decimal {
        safe_ratio(self.total_deductions, self.gross_salary)
    }

    /// Share of gross salary kept as net; zero for a zero gross.
    pub fn net_ratio(&self) -> Decimal {
        safe_ratio(self.net_salary, self.gross_salary)
    }
}
