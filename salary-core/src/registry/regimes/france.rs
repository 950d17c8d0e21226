use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{ConfigError, Country, DeductionBase, DeductionConfig, EmploymentType, INCOME_TAX, TaxRegimeConfig};
use crate::registry::regimes::schedule;
use crate::strategies::{
    AfterSocialSecurityTaxBase, CappedPercentageDeduction, FlatRateDeduction, ProgressiveTaxDeduction,
};

/// Annual social security ceiling (PASS).
const PASS: Decimal = dec!(47100);
/// Upper limit of the second supplementary-pension bracket, 8x PASS.
const EIGHT_PASS: Decimal = dec!(376800);

/// Salaried employee, single part of household income.
pub fn salaried() -> Result<TaxRegimeConfig, ConfigError> {
    let brackets = schedule(
        &[
            (dec!(10225), dec!(0)),
            (dec!(26070), dec!(0.11)),
            (dec!(74545), dec!(0.30)),
            (dec!(160336), dec!(0.41)),
        ],
        dec!(0.45),
    );

    let regime = TaxRegimeConfig::new(
        Country::France,
        EmploymentType::Salaried,
        Box::new(AfterSocialSecurityTaxBase),
        vec![
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("Old-Age Insurance (Base)", dec!(0.069))
                    .with_description("Pension contributions up to SS ceiling")
                    .with_ceiling(PASS)
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Old-Age Insurance (Supplementary)", dec!(0.004))
                    .with_description("Pension contributions on full salary")
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("CSG (General Social Contribution)", dec!(0.0904))
                    .with_description("Funds social security (partially tax-deductible)")
                    .social_security(),
            )?),
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("CRDS (Social Debt Repayment)", dec!(0.0049))
                    .with_description("Repayment of social security debt")
                    .social_security(),
            )?),
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("Supplementary Pension (Bracket 1)", dec!(0.0315))
                    .with_description("Agirc-Arrco pension - up to ceiling")
                    .with_ceiling(PASS)
                    .social_security(),
            )?),
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("Supplementary Pension (Bracket 2)", dec!(0.0864))
                    .with_description("Agirc-Arrco pension - above ceiling")
                    .with_ceiling(EIGHT_PASS)
                    .with_floor(PASS)
                    .social_security(),
            )?),
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("CEG (Balance Contribution - B1)", dec!(0.0086))
                    .with_description("Contribution for pension balance")
                    .with_ceiling(PASS)
                    .social_security(),
            )?),
            Box::new(CappedPercentageDeduction::new(
                DeductionConfig::new("CEG (Balance Contribution - B2)", dec!(0.0108))
                    .with_description("Contribution for pension balance - above ceiling")
                    .with_ceiling(EIGHT_PASS)
                    .with_floor(PASS)
                    .social_security(),
            )?),
            Box::new(ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0))
                    .with_description("Progressive income tax (Impot sur le Revenu)")
                    .applies_to(DeductionBase::Taxable),
                brackets,
                None,
            )?),
        ],
    )?
    .with_title("France Salaried Employee")
    .with_description(
        "French salaried employee, one tax part. Social contributions split at \
         the 47,100 social security ceiling (PASS) and 8x PASS, deducted before \
         the progressive income tax from 0% to 45%.",
    );

    Ok(regime)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::UniversalCalculator;

    #[test]
    fn second_bracket_contributions_start_above_pass() {
        let regime = salaried().unwrap();

        let below = UniversalCalculator::new(&regime).calculate(dec!(40000)).unwrap();
        let above = UniversalCalculator::new(&regime).calculate(dec!(60000)).unwrap();

        assert_eq!(below.deduction("Supplementary Pension (Bracket 2)"), None);
        assert_eq!(below.deduction("CEG (Balance Contribution - B2)"), None);
        assert_eq!(
            above.deduction("Supplementary Pension (Bracket 2)").unwrap().amount(),
            dec!(1114.56)
        );
    }

    #[test]
    fn tax_base_subtracts_every_contribution() {
        let regime = salaried().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(40000)).unwrap();

        let contributions: Decimal = result
            .deductions()
            .iter()
            .filter(|d| d.name() != INCOME_TAX)
            .map(|d| d.amount())
            .sum();
        assert_eq!(result.tax_base, dec!(40000) - contributions);
    }
}
