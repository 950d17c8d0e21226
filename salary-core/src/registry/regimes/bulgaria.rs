use rust_decimal_macros::dec;

use crate::currency::RateProvider;
use crate::models::{ConfigError, Country, Currency, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig};
use crate::registry::regimes::schedule;
use crate::strategies::{FlatRateDeduction, ProgressiveTaxDeduction, StandardTaxBase};

/// Sole trader with flat 10% income tax. Contribution ceilings are set in
/// BGN.
pub fn freelancer(rates: &dyn RateProvider) -> Result<TaxRegimeConfig, ConfigError> {
    let bgn = rates.converter(Currency::BGN, Currency::EUR)?;
    let contribution_ceiling = bgn.convert(dec!(72000))?;

    let regime = TaxRegimeConfig::new(
        Country::Bulgaria,
        EmploymentType::Freelancer,
        Box::new(StandardTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Social Security", dec!(0.198))
                    .with_description("Social security contributions (self-declared income basis)")
                    .with_ceiling(contribution_ceiling)
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Health Insurance", dec!(0.08))
                    .with_description("Health insurance contributions (self-declared income basis)")
                    .with_ceiling(contribution_ceiling)
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0)).with_description("Flat 10% income tax on profit"),
                schedule(&[], dec!(0.10)),
                None,
            )?),
        ],
    )?
    .with_currencies(Currency::BGN, Currency::BGN)
    .with_title("Bulgaria Freelancer")
    .with_description(
        "Bulgarian sole trader (ET). Flat 10% income tax; social security \
         (19.8%) and health insurance (8%) up to the BGN 72,000 annual \
         contribution ceiling.",
    );

    Ok(regime)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::UniversalCalculator;
    use crate::currency::FallbackRates;

    #[test]
    fn single_flat_bracket() {
        let regime = freelancer(&FallbackRates::default()).unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(30000)).unwrap();

        assert_eq!(result.income_tax_brackets.len(), 1);
        assert_eq!(result.deduction(INCOME_TAX).unwrap().amount(), dec!(3000));
        assert_eq!(result.income_tax_brackets[0].upper_bound(), dec!(30000));
    }

    #[test]
    fn contributions_capped_at_converted_ceiling() {
        let regime = freelancer(&FallbackRates::default()).unwrap();

        let low = UniversalCalculator::new(&regime).calculate(dec!(200000)).unwrap();
        let high = UniversalCalculator::new(&regime).calculate(dec!(400000)).unwrap();

        assert_eq!(
            low.deduction("Social Security").unwrap().amount(),
            high.deduction("Social Security").unwrap().amount()
        );
    }
}
