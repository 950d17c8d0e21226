use rust_decimal_macros::dec;

use crate::models::{BracketConfig, ConfigError, Country, DeductionBase, DeductionConfig, EmploymentType, TaxRegimeConfig};
use crate::registry::regimes::schedule;
use crate::strategies::{
    FlatRateDeduction, FlatRateExpenseTaxBase, PercentageOfBaseDeduction, ProgressiveTaxDeduction, StandardTaxBase,
};

const INCOME_TAX_IRS: &str = "Income Tax (IRS)";

fn irs_brackets() -> Vec<BracketConfig> {
    schedule(
        &[
            (dec!(7703), dec!(0.1325)),
            (dec!(11623), dec!(0.18)),
            (dec!(16472), dec!(0.23)),
            (dec!(21321), dec!(0.26)),
            (dec!(27146), dec!(0.3275)),
            (dec!(39791), dec!(0.37)),
            (dec!(51997), dec!(0.435)),
            (dec!(81199), dec!(0.45)),
        ],
        dec!(0.48),
    )
}

pub fn salaried() -> Result<TaxRegimeConfig, ConfigError> {
    let regime = TaxRegimeConfig::new(
        Country::Portugal,
        EmploymentType::Salaried,
        Box::new(StandardTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Social Security (TSU)", dec!(0.11))
                    .with_description("Social security contributions (employee portion)")
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX_IRS, dec!(0)).with_description("Progressive income tax"),
                irs_brackets(),
                None,
            )?),
        ],
    )?
    .with_title("Portugal Salaried Employee")
    .with_description(
        "Portuguese salaried employee. Nine-bracket IRS schedule from 13.25% to \
         48% on gross salary and 11% employee social security (TSU).",
    );

    Ok(regime)
}

/// Simplified-regime freelancer: 75% of income is deemed expenses, with no
/// practical cap.
pub fn freelancer() -> Result<TaxRegimeConfig, ConfigError> {
    let regime = TaxRegimeConfig::new(
        Country::Portugal,
        EmploymentType::Freelancer,
        Box::new(FlatRateExpenseTaxBase::new(dec!(0.25), dec!(999999999))?),
        vec![
            Box::new(PercentageOfBaseDeduction::new(
                DeductionConfig::new("Social Security", dec!(0.214))
                    .with_description("Social security on 70% of gross income (freelancer rate)")
                    .social_security(),
                dec!(0.70),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX_IRS, dec!(0))
                    .with_description("Progressive income tax on 25% of income (75% deemed expenses)")
                    .applies_to(DeductionBase::Taxable),
                irs_brackets(),
                None,
            )?),
        ],
    )?
    .with_title("Portugal Freelancer")
    .with_description(
        "Portuguese freelancer under the simplified regime. Only 25% of income \
         is taxable under the IRS schedule; social security of 21.4% is paid \
         on 70% of gross income.",
    );

    Ok(regime)
}
