use rust_decimal_macros::dec;

use crate::models::{ConfigError, Country, Currency, DeductionConfig, EmploymentType, TaxRegimeConfig};
use crate::strategies::{FlatRateDeduction, StandardTaxBase};

/// Microenterprise: 1% revenue tax plus a minimal health contribution.
pub fn freelancer_micro() -> Result<TaxRegimeConfig, ConfigError> {
    let regime = TaxRegimeConfig::new(
        Country::Romania,
        EmploymentType::Freelancer,
        Box::new(StandardTaxBase),
        vec![
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Microenterprise Tax", dec!(0.01))
                    .with_description("1% tax on gross revenue (microenterprise regime)"),
            )?),
            // Approximates the fixed minimum-wage-based contribution.
            Box::new(FlatRateDeduction::new(
                DeductionConfig::new("Minimum Health Insurance", dec!(0.006))
                    .with_description("Mandatory health insurance on minimum wage basis")
                    .social_security(),
            )?),
        ],
    )?
    .with_currencies(Currency::RON, Currency::EUR)
    .with_title("Romania Freelancer (Micro)")
    .with_description(
        "Romanian microenterprise (SRL) with one employee. 1% tax on revenue \
         and a minimal health insurance contribution; no progressive income tax.",
    );

    Ok(regime)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::UniversalCalculator;

    #[test]
    fn revenue_tax_and_health() {
        let regime = freelancer_micro().unwrap();

        let result = UniversalCalculator::new(&regime).calculate(dec!(100000)).unwrap();

        assert_eq!(result.total_deductions, dec!(1600));
        assert!(result.income_tax_brackets.is_empty());
    }
}
