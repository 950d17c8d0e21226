use rust_decimal_macros::dec;

use crate::currency::RateProvider;
use crate::models::{
    ConfigError, Country, Currency, DeductionBase, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig,
};
use crate::registry::regimes::converted_schedule;
use crate::strategies::{
    FlatRateDeduction, FlatRateExpenseTaxBase, PercentageOfBaseDeduction, ProgressiveTaxDeduction, StandardTaxBase,
};

const UPPER_BRACKET_CZK: rust_decimal::Decimal = dec!(1867728);

/// Salaried employee: 15% / 23% income tax on gross plus flat employee
/// contributions.
pub fn salaried(rates: &dyn RateProvider) -> Result<TaxRegimeConfig, ConfigError> {
    let czk = rates.converter(Currency::CZK, Currency::EUR)?;
    let brackets = converted_schedule(&czk, &[(UPPER_BRACKET_CZK, dec!(0.15))], dec!(0.23))?;

    let regime = TaxRegimeConfig::new(
        Country::Czechia,
        EmploymentType::Salaried,
        Box::new(StandardTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Social Security", dec!(0.065))
                    .with_description("Mandatory social security contribution")
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Health Insurance", dec!(0.045))
                    .with_description("Mandatory health insurance contribution")
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0)).with_description("Two-tier income tax"),
                brackets,
                None,
            )?),
        ],
    )?
    .with_currencies(Currency::CZK, Currency::CZK)
    .with_title("Czechia Salaried Employee")
    .with_description(
        "Czech salaried employee. 15% income tax up to CZK 1,867,728 and 23% \
         above, 6.5% social security and 4.5% health insurance on gross salary.",
    );

    Ok(regime)
}

/// Freelancer using the 60% flat-rate expense allowance.
///
/// Expenses are capped at CZK 2,000,000 of income; income tax gets the
/// standard taxpayer discount and contributions are paid on half of the
/// taxable base.
pub fn freelancer(rates: &dyn RateProvider) -> Result<TaxRegimeConfig, ConfigError> {
    let czk = rates.converter(Currency::CZK, Currency::EUR)?;
    let brackets = converted_schedule(&czk, &[(UPPER_BRACKET_CZK, dec!(0.15))], dec!(0.23))?;
    let expense_cap = czk.convert(dec!(2000000))?;
    let taxpayer_discount = czk.convert(dec!(30840))?;

    let regime = TaxRegimeConfig::new(
        Country::Czechia,
        EmploymentType::Freelancer,
        Box::new(FlatRateExpenseTaxBase::new(dec!(0.40), expense_cap)?),
        vec![
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0))
                    .with_description("Income tax on 40% of gross income with standard discount")
                    .applies_to(DeductionBase::Taxable),
                brackets,
                Some(taxpayer_discount),
            )?),
            Box::new(PercentageOfBaseDeduction::new(
                DeductionConfig::new("Social Security", dec!(0.292))
                    .with_description("Social security contribution on 50% of taxable income")
                    .applies_to(DeductionBase::Taxable)
                    .social_security(),
                dec!(0.50),
            )?),
            Box::new(PercentageOfBaseDeduction::new(
                DeductionConfig::new("Health Insurance", dec!(0.135))
                    .with_description("Health insurance contribution on 50% of taxable income")
                    .applies_to(DeductionBase::Taxable)
                    .social_security(),
                dec!(0.50),
            )?),
        ],
    )?
    .with_currencies(Currency::CZK, Currency::CZK)
    .with_title("Czechia Freelancer")
    .with_description(
        "Czech freelancer (OSVC) with 60% flat-rate expenses up to CZK 2,000,000 \
         of income. Income above the cap is fully taxable. Income tax receives \
         the CZK 30,840 taxpayer discount; social security (29.2%) and health \
         insurance (13.5%) are paid on 50% of the taxable base.",
    );

    Ok(regime)
}
