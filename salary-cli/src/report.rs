//! Console rendering of calculation results.

use std::fmt;

use salary_core::calculations::common::{format_amount, format_money, format_rate};
use salary_core::{RegimeRegistry, TaxResult};

const LABEL_WIDTH: usize = 36;
const AMOUNT_WIDTH: usize = 12;

/// Full itemized report for one calculation.
pub struct ResultReport<'a>(pub &'a TaxResult);

impl fmt::Display for ResultReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let result = self.0;

        writeln!(f, "{}", heading(result))?;
        if !result.description.is_empty() {
            writeln!(f, "{}", result.description)?;
        }
        writeln!(f)?;

        line(f, "Gross salary", &format_money(result.gross_salary))?;
        line(f, "Tax base", &format_money(result.tax_base))?;

        if !result.deductions().is_empty() {
            writeln!(f, "\nDeductions")?;
            for deduction in result.deductions() {
                writeln!(
                    f,
                    "  {:<w$}{:>a$}   {}",
                    deduction.name(),
                    format_money(deduction.amount()),
                    deduction.calculation_details(),
                    w = LABEL_WIDTH - 2,
                    a = AMOUNT_WIDTH,
                )?;
            }
        }

        if !result.income_tax_brackets.is_empty() {
            writeln!(f, "\nIncome tax brackets")?;
            for bracket in &result.income_tax_brackets {
                let range = format!(
                    "{} - {} at {}",
                    format_amount(bracket.lower_bound()),
                    format_amount(bracket.upper_bound()),
                    format_rate(bracket.rate())
                );
                writeln!(
                    f,
                    "  {:<w$}{:>a$}   on {}",
                    range,
                    format_money(bracket.tax_amount()),
                    format_amount(bracket.taxable_amount()),
                    w = LABEL_WIDTH - 2,
                    a = AMOUNT_WIDTH,
                )?;
            }
        }

        writeln!(f)?;
        line(f, "Total deductions", &format_money(result.total_deductions))?;
        line(f, "Net salary", &format_money(result.net_salary))?;
        line(f, "Effective rate", &format_rate(result.effective_tax_rate()))?;

        if let (Some(currency), Some(rate)) = (result.local_currency, result.local_currency_rate) {
            line(f, "Local currency", &format!("{currency} ({rate} per EUR)"))?;
        }

        if !result.calculation_explanations.is_empty() {
            writeln!(f, "\nNotes")?;
            for explanation in result.calculation_explanations.values() {
                writeln!(f, "  {explanation}")?;
            }
        }
        Ok(())
    }
}

/// One row per regime, in the order given.
pub struct ComparisonTable<'a>(pub &'a [TaxResult]);

impl fmt::Display for ComparisonTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:<w$}{:>a$}{:>a$}{:>a$}",
            "Regime",
            "Deductions",
            "Net",
            "Rate",
            w = LABEL_WIDTH,
            a = AMOUNT_WIDTH,
        )?;
        for result in self.0 {
            writeln!(
                f,
                "{:<w$}{:>a$}{:>a$}{:>a$}",
                heading(result),
                format_amount(result.total_deductions),
                format_amount(result.net_salary),
                format_rate(result.effective_tax_rate()),
                w = LABEL_WIDTH,
                a = AMOUNT_WIDTH,
            )?;
        }
        Ok(())
    }
}

/// Net salary across a gross-salary grid for one regime.
pub struct ProgressionTable<'a>(pub &'a [TaxResult]);

impl fmt::Display for ProgressionTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if let Some(first) = self.0.first() {
            writeln!(f, "{}\n", heading(first))?;
        }
        writeln!(
            f,
            "{:>a$}{:>a$}{:>a$}{:>a$}",
            "Gross",
            "Tax base",
            "Net",
            "Rate",
            a = AMOUNT_WIDTH,
        )?;
        for result in self.0 {
            writeln!(
                f,
                "{:>a$}{:>a$}{:>a$}{:>a$}",
                format_amount(result.gross_salary),
                format_amount(result.tax_base),
                format_amount(result.net_salary),
                format_rate(result.effective_tax_rate()),
                a = AMOUNT_WIDTH,
            )?;
        }
        Ok(())
    }
}

/// Registered regime keys with their labels.
pub struct RegimeList<'a>(pub &'a RegimeRegistry);

impl fmt::Display for RegimeList<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (key, regime) in self.0.iter() {
            writeln!(f, "{key:<28}{}", regime.label())?;
        }
        Ok(())
    }
}

fn heading(result: &TaxResult) -> String {
    if result.employment_type.is_empty() {
        result.country.clone()
    } else {
        format!("{} ({})", result.country, result.employment_type)
    }
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
) -> fmt::Result {
    writeln!(f, "{:<w$}{:>a$}", label, value, w = LABEL_WIDTH, a = AMOUNT_WIDTH)
}
