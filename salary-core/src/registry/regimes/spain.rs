use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{ConfigError, Country, DeductionBase, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig};
use crate::registry::regimes::schedule;
use crate::strategies::{EmploymentIncomeReductionTaxBase, FlatRateDeduction, PhaseOutBand, ProgressiveTaxDeduction};

/// Employment-income reduction, 2025.
fn reduction_band() -> PhaseOutBand {
    PhaseOutBand {
        lower: dec!(14047.5),
        upper: dec!(19747.5),
        max_reduction: dec!(6498),
        min_reduction: dec!(2000),
    }
}

/// Regional part of the IRPF schedule; the bounds are shared by all regions.
struct RegionalRates {
    region: &'static str,
    rates: [Decimal; 5],
    top_rate: Decimal,
    income_tax_description: &'static str,
    description: &'static str,
}

fn salaried(rates: RegionalRates) -> Result<TaxRegimeConfig, ConfigError> {
    let [r1, r2, r3, r4, r5] = rates.rates;
    let brackets = schedule(
        &[
            (dec!(12450), r1),
            (dec!(20200), r2),
            (dec!(35200), r3),
            (dec!(60000), r4),
            (dec!(300000), r5),
        ],
        rates.top_rate,
    );

    let regime = TaxRegimeConfig::new(
        Country::Spain,
        EmploymentType::Salaried,
        Box::new(EmploymentIncomeReductionTaxBase::new(reduction_band())?),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Social Security", dec!(0.0648))
                    .with_description("Social security contributions (employee portion) + MEI")
                    .with_ceiling(dec!(58914))
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0))
                    .with_description(rates.income_tax_description)
                    .applies_to(DeductionBase::Taxable),
                brackets,
                None,
            )?),
        ],
    )?
    .with_region(rates.region)
    .with_title(format!("{} Salaried Employee", rates.region))
    .with_description(rates.description);

    Ok(regime)
}

pub fn madrid() -> Result<TaxRegimeConfig, ConfigError> {
    salaried(RegionalRates {
        region: "Madrid",
        rates: [dec!(0.19), dec!(0.24), dec!(0.30), dec!(0.37), dec!(0.45)],
        top_rate: dec!(0.47),
        income_tax_description: "Progressive income tax (IRPF)",
        description: "Salaried employee in the Community of Madrid. State plus \
                      Madrid regional IRPF rates from 19% to 47%, social \
                      security of 6.48% capped at 58,914 and the employment \
                      income reduction.",
    })
}

pub fn barcelona() -> Result<TaxRegimeConfig, ConfigError> {
    salaried(RegionalRates {
        region: "Barcelona",
        rates: [dec!(0.19), dec!(0.24), dec!(0.315), dec!(0.385), dec!(0.46)],
        top_rate: dec!(0.48),
        income_tax_description: "Progressive income tax (IRPF) with Catalonia rates",
        description: "Salaried employee in Catalonia. State plus Catalan \
                      regional IRPF rates from 19% to 48%, social security of \
                      6.48% capped at 58,914 and the employment income \
                      reduction.",
    })
}

pub fn valencia() -> Result<TaxRegimeConfig, ConfigError> {
    salaried(RegionalRates {
        region: "Valencia",
        rates: [dec!(0.19), dec!(0.24), dec!(0.305), dec!(0.375), dec!(0.455)],
        top_rate: dec!(0.475),
        income_tax_description: "Progressive income tax (IRPF) with Valencia rates",
        description: "Salaried employee in the Valencian Community. State plus \
                      Valencian regional IRPF rates from 19% to 47.5%, social \
                      security of 6.48% capped at 58,914 and the employment \
                      income reduction.",
    })
}
