use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{ConfigError, Country, DeductionBase, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig};
use crate::registry::regimes::schedule;
use crate::strategies::{
    AfterSocialSecurityTaxBase, Condition, ConditionalDeduction, FlatRateDeduction, ProgressiveTaxDeduction,
};

/// Income tax above which the solidarity surcharge starts.
const SOLIDARITY_THRESHOLD: Decimal = dec!(1000);

/// Single employee without children (tax class 1).
///
/// Social insurance is paid on gross up to the contribution ceilings and
/// subtracted before income tax. The solidarity surcharge applies only once
/// income tax exceeds 1,000 and is limited to 11.9% of the excess, so it
/// phases in rather than jumping to the full 5.5%.
pub fn salaried() -> Result<TaxRegimeConfig, ConfigError> {
    let brackets = schedule(
        &[
            (dec!(12096), dec!(0)),
            (dec!(22096), dec!(0.24)),
            (dec!(32096), dec!(0.32)),
            (dec!(42096), dec!(0.37)),
            (dec!(52096), dec!(0.40)),
            (dec!(62096), dec!(0.41)),
            (dec!(68480), dec!(0.42)),
            (dec!(277825), dec!(0.42)),
        ],
        dec!(0.45),
    );

    let regime = TaxRegimeConfig::new(
        Country::Germany,
        EmploymentType::Salaried,
        Box::new(AfterSocialSecurityTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Pension Insurance", dec!(0.093))
                    .with_description("Mandatory pension insurance contribution")
                    .with_ceiling(dec!(96000))
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Health Insurance", dec!(0.091))
                    .with_description("Mandatory health insurance contribution")
                    .with_ceiling(dec!(62100))
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Unemployment Insurance", dec!(0.013))
                    .with_description("Mandatory unemployment insurance contribution")
                    .with_ceiling(dec!(96000))
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Long-Term Care Insurance", dec!(0.02))
                    .with_description("Mandatory long-term care insurance contribution")
                    .with_ceiling(dec!(62100))
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0))
                    .with_description("Progressive income tax")
                    .applies_to(DeductionBase::Taxable),
                brackets,
                None,
            )?),
            Box::new(
                ConditionalDeduction::new(
                    DeductionConfig::new("Solidarity Surcharge", dec!(0.055))
                        .with_description("Solidarity surcharge on income tax above 1,000")
                        .applies_to(DeductionBase::IncomeTax),
                    Condition::IncomeTaxAbove(SOLIDARITY_THRESHOLD),
                )?
                .with_phase_in(SOLIDARITY_THRESHOLD, dec!(0.119))?,
            ),
        ],
    )?
    .with_title("Germany Salaried Employee")
    .with_description(
        "German salaried employee, tax class 1. Tax-free allowance of 12,096, \
         marginal rates from 24% to 45%, social insurance capped at the 2024 \
         contribution ceilings and deducted before income tax.",
    );

    Ok(regime)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::UniversalCalculator;

    #[test]
    fn taxable_income_excludes_social_insurance() {
        let regime = salaried().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(60000)).unwrap();

        // 60,000 x (9.3% + 9.1% + 1.3% + 2%)
        assert_eq!(result.tax_base, dec!(46980));
        assert_eq!(result.deductions()[0].name(), "Pension Insurance");
        // 5.5% of 11,253.60 income tax, the phase-in limit is higher
        assert_eq!(result.deduction("Solidarity Surcharge").unwrap().amount(), dec!(618.948));
    }

    #[test]
    fn contributions_stop_at_ceilings() {
        let regime = salaried().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(200000)).unwrap();

        assert_eq!(result.deduction("Pension Insurance").unwrap().amount(), dec!(8928));
        assert_eq!(result.deduction("Health Insurance").unwrap().amount(), dec!(5651.1));
        assert_eq!(result.deduction("Unemployment Insurance").unwrap().amount(), dec!(1248));
        assert_eq!(result.deduction("Long-Term Care Insurance").unwrap().amount(), dec!(1242));
    }

    #[test]
    fn solidarity_surcharge_phases_in_above_threshold() {
        let regime = salaried().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(20800)).unwrap();

        // (16,286.40 - 12,096) x 24% = 1,005.696 income tax; (1,005.696 - 1,000) x 11.9%
        assert_eq!(result.deduction(INCOME_TAX).unwrap().amount(), dec!(1005.696));
        assert_eq!(result.deduction("Solidarity Surcharge").unwrap().amount(), dec!(0.677824));
    }

    #[test]
    fn net_salary_never_drops_across_solidarity_threshold() {
        let regime = salaried().unwrap();
        let calculator = UniversalCalculator::new(&regime);
        let mut previous = Decimal::ZERO;

        for euro in 20000..=22000 {
            let net = calculator.calculate(Decimal::from(euro)).unwrap().net_salary;

            assert!(net >= previous, "net fell at gross {euro}");
            previous = net;
        }
    }

    #[test]
    fn allowance_leaves_low_income_untaxed() {
        let regime = salaried().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(15000)).unwrap();

        assert!(result.tax_base < dec!(12096));
        assert_eq!(result.deduction(INCOME_TAX), None);
        assert_eq!(result.total_income_tax(), Decimal::ZERO);
    }
}
