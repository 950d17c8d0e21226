use rust_decimal_macros::dec;

use crate::currency::RateProvider;
use crate::models::{ConfigError, Country, Currency, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig};
use crate::registry::regimes::converted_schedule;
use crate::strategies::{CappedPercentageDeduction, FlatRateDeduction, ProgressiveTaxDeduction, StandardTaxBase};

/// Salaried employee. Brackets and the training-fund cap are published in
/// ILS.
pub fn salaried(rates: &dyn RateProvider) -> Result<TaxRegimeConfig, ConfigError> {
    let ils = rates.converter(Currency::ILS, Currency::EUR)?;

    let brackets = converted_schedule(
        &ils,
        &[
            (dec!(83040), dec!(0.10)),
            (dec!(119040), dec!(0.14)),
            (dec!(185040), dec!(0.20)),
            (dec!(260040), dec!(0.31)),
            (dec!(560280), dec!(0.35)),
            (dec!(721560), dec!(0.47)),
        ],
        dec!(0.50),
    )?;
    let training_fund_cap = ils.convert(dec!(188544))?;

    let regime = TaxRegimeConfig::new(
        Country::Israel,
        EmploymentType::Salaried,
        Box::new(StandardTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("National Insurance", dec!(0.04))
                    .with_description("Mandatory national insurance contribution (Bituach Leumi)")
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Health Tax", dec!(0.05))
                    .with_description("Mandatory health tax contribution (Mas Briut)")
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Pension", dec!(0.06))
                    .with_description("Pension fund contribution (Gemel Pensia)"),
            )?),
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("Keren Hishtalmut", dec!(0.025))
                    .with_description("Advanced training fund contribution")
                    .with_ceiling(training_fund_cap),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0)).with_description("Progressive income tax"),
                brackets,
                None,
            )?),
        ],
    )?
    .with_currencies(Currency::ILS, Currency::ILS)
    .with_title("Israel Salaried Employee")
    .with_description(
        "Israeli salaried employee. Progressive income tax from 10% to 50% on \
         gross salary, national insurance, health tax, pension and a capped \
         training fund contribution.",
    );

    Ok(regime)
}
