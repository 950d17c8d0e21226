use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, trace, warn};

use crate::calculations::common::format_amount;
use crate::calculations::{CalculationContext, CalculationError};
use crate::currency::RateProvider;
use crate::models::{Currency, DeductionBase, INCOME_TAX, TaxRegimeConfig, TaxResult};
use crate::registry::RegimeRegistry;
use crate::strategies::{DeductionStrategy, TaxBaseStrategy};

/// Runs a regime's strategies against a gross salary.
///
/// Stages, in order:
/// 1. If the tax base depends on social security, every gross-based
///    deduction runs first so the social-security total is known.
/// 2. The tax-base strategy computes the taxable base.
/// 3. The remaining deductions run in configured order.
/// 4. Brackets and explanations are copied from the context into the result.
///
/// Each call owns its context and result, so one calculator (or many over
/// the same regime) can be used from several threads at once.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::UniversalCalculator;
/// use salary_core::currency::FallbackRates;
/// use salary_core::registry::RegimeRegistry;
///
/// let rates = FallbackRates::default();
/// let registry = RegimeRegistry::builtin(&rates).unwrap();
/// let regime = registry.get("czechia-salaried").unwrap();
///
/// let result = UniversalCalculator::new(regime)
///     .with_rate_provider(&rates)
///     .calculate(dec!(50000))
///     .unwrap();
///
/// assert_eq!(result.tax_base, dec!(50000));
/// assert_eq!(result.net_salary, dec!(37000));
/// assert_eq!(result.local_currency_rate, Some(dec!(25)));
/// ```
#[derive(Clone, Copy)]
pub struct UniversalCalculator<'a> {
    regime: &'a TaxRegimeConfig,
    rates: Option<&'a dyn RateProvider>,
}

impl<'a> UniversalCalculator<'a> {
    pub fn new(regime: &'a TaxRegimeConfig) -> Self {
        Self { regime, rates: None }
    }

    /// Attaches a provider used to annotate results with the local rate.
    pub fn with_rate_provider(
        mut self,
        rates: &'a dyn RateProvider,
    ) -> Self {
        self.rates = Some(rates);
        self
    }

    pub fn regime(&self) -> &'a TaxRegimeConfig {
        self.regime
    }

    /// Calculates net salary for `gross_salary` (annual, EUR).
    ///
    /// # Errors
    ///
    /// - [`CalculationError::NegativeGrossSalary`] for a negative input
    /// - [`CalculationError::Overflow`] if any strategy overflows
    ///
    /// No partial result is returned on error.
    pub fn calculate(
        &self,
        gross_salary: Decimal,
    ) -> Result<TaxResult, CalculationError> {
        if gross_salary < Decimal::ZERO {
            return Err(CalculationError::NegativeGrossSalary(gross_salary));
        }

        let regime = self.regime;
        let (country, employment_type) = match regime.title() {
            Some(title) => (title.to_string(), String::new()),
            None => (regime.country().to_string(), regime.employment_type().to_string()),
        };
        let mut result = TaxResult::new(gross_salary, country, employment_type, regime.description());
        self.annotate_local_currency(&mut result);

        let mut context = CalculationContext::new();
        let strategies = regime.deduction_strategies();
        let base_strategy = regime.tax_base_strategy();
        let mut executed = vec![false; strategies.len()];

        if base_strategy.depends_on_social_security() {
            for (index, strategy) in strategies.iter().enumerate() {
                if strategy.config().applies_to != DeductionBase::Gross {
                    continue;
                }
                // Gross-based deductions never read the tax base, which is not known yet.
                let base = strategy.get_base_amount(gross_salary, gross_salary, &context)?;
                apply(strategy.as_ref(), base, &mut context, &mut result)?;
                executed[index] = true;
            }
            debug!(
                regime = %regime.label(),
                social_security = %context.social_security_total,
                "social security pre-pass complete"
            );
        }

        let tax_base = base_strategy.compute(gross_salary, &mut context)?;
        result.tax_base = tax_base;

        for (index, strategy) in strategies.iter().enumerate() {
            if executed[index] {
                continue;
            }
            let base = strategy.get_base_amount(gross_salary, tax_base, &context)?;
            apply(strategy.as_ref(), base, &mut context, &mut result)?;
        }

        result.income_tax_brackets = std::mem::take(&mut context.income_tax_brackets);
        result.net_salary = result.gross_salary - result.total_deductions;
        result.calculation_explanations = explanations(base_strategy, tax_base, &context);

        debug!(
            regime = %regime.label(),
            gross = %gross_salary,
            tax_base = %tax_base,
            net = %result.net_salary,
            "calculation complete"
        );

        Ok(result)
    }

    fn annotate_local_currency(
        &self,
        result: &mut TaxResult,
    ) {
        let threshold_currency = self.regime.threshold_currency();
        if threshold_currency == Currency::EUR {
            return;
        }
        let Some(rates) = self.rates else {
            return;
        };

        match rates.rate(Currency::EUR, threshold_currency) {
            Ok(rate) => {
                result.local_currency = Some(self.regime.local_currency());
                result.local_currency_rate = Some(rate);
            }
            Err(err) => {
                warn!(
                    regime = %self.regime.label(),
                    currency = %threshold_currency,
                    error = %err,
                    "local currency rate unavailable, result left unannotated"
                );
            }
        }
    }
}

/// Resolves `key` and calculates in one step.
///
/// # Errors
///
/// [`CalculationError::Registry`] if `key` is not registered, otherwise as
/// [`UniversalCalculator::calculate`].
pub fn calculate_net_salary(
    registry: &RegimeRegistry,
    key: &str,
    gross_salary: Decimal,
) -> Result<TaxResult, CalculationError> {
    let regime = registry.get(key)?;
    UniversalCalculator::new(regime).calculate(gross_salary)
}

fn apply(
    strategy: &dyn DeductionStrategy,
    base_amount: Decimal,
    context: &mut CalculationContext,
    result: &mut TaxResult,
) -> Result<(), CalculationError> {
    let deduction = strategy.calculate(base_amount, context)?;

    if strategy.config().counts_as_social_security {
        context.social_security_total += deduction.amount();
    }
    if deduction.name() == INCOME_TAX {
        context.income_tax_amount = Some(deduction.amount());
    }

    if deduction.amount() > Decimal::ZERO {
        result.add_deduction(deduction);
    } else {
        trace!(
            name = deduction.name(),
            details = deduction.calculation_details(),
            "zero deduction omitted"
        );
    }
    Ok(())
}

fn explanations(
    base_strategy: &dyn TaxBaseStrategy,
    tax_base: Decimal,
    context: &CalculationContext,
) -> BTreeMap<String, String> {
    let mut explanations = BTreeMap::new();
    explanations.insert(
        "tax_base".to_string(),
        format!("{} = {}", base_strategy.describe(), format_amount(tax_base)),
    );

    if let Some(expenses) = context.deductible_expenses {
        let mut text = format!("Deductible expenses: {}", format_amount(expenses));
        if context.expense_cap_applied {
            text.push_str(" (expense cap applied, income above the cap is fully taxable)");
        }
        explanations.insert("expenses".to_string(), text);
    }

    if let (Some(reduction), Some(net_income)) = (
        context.employment_income_reduction,
        context.net_employment_income,
    ) {
        explanations.insert(
            "employment_reduction".to_string(),
            format!(
                "Employment income reduction: {} on net employment income of {}",
                format_amount(reduction),
                format_amount(net_income)
            ),
        );
    }

    if base_strategy.depends_on_social_security() {
        explanations.insert(
            "social_security".to_string(),
            format!(
                "Social security deducted before income tax: {}",
                format_amount(context.social_security_total)
            ),
        );
    }

    explanations
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::currency::{CurrencyError, FallbackRates};
    use crate::models::{BracketConfig, ConfigError, Country, DeductionConfig, EmploymentType};
    use crate::registry::RegistryError;
    use crate::strategies::{
        AfterSocialSecurityTaxBase, CappedPercentageDeduction, Condition, ConditionalDeduction, FlatRateDeduction,
        PercentageOfBaseDeduction, ProgressiveTaxDeduction, StandardTaxBase,
    };

    fn flat(config: DeductionConfig) -> Box<dyn DeductionStrategy> {
        Box::new(FlatRateDeduction::new(config).unwrap())
    }

    fn income_tax(applies_to: DeductionBase) -> Box<dyn DeductionStrategy> {
        Box::new(
            ProgressiveTaxDeduction::new(
                DeductionConfig::new(INCOME_TAX, dec!(0)).applies_to(applies_to),
                vec![
                    BracketConfig::new(dec!(0), dec!(50000), dec!(0.15)),
                    BracketConfig::unbounded(dec!(50000), dec!(0.23)),
                ],
                None,
            )
            .unwrap(),
        )
    }

    fn regime(
        tax_base: Box<dyn TaxBaseStrategy>,
        deductions: Vec<Box<dyn DeductionStrategy>>,
    ) -> TaxRegimeConfig {
        TaxRegimeConfig::new(Country::Czechia, EmploymentType::Salaried, tax_base, deductions).unwrap()
    }

    // =========================================================================
    // Pipeline tests
    // =========================================================================

    #[test]
    fn standard_pipeline_itemizes_deductions() {
        let regime = regime(
            Box::new(StandardTaxBase),
            vec![
                flat(DeductionConfig::new("Social Security", dec!(0.065)).social_security()),
                flat(DeductionConfig::new("Health Insurance", dec!(0.045)).social_security()),
                income_tax(DeductionBase::Gross),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(50000)).unwrap();

        let names: Vec<_> = result.deductions().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Social Security", "Health Insurance", INCOME_TAX]);
        assert_eq!(result.tax_base, dec!(50000));
        assert_eq!(result.total_deductions, dec!(13000));
        assert_eq!(result.net_salary, dec!(37000));
        assert_eq!(result.income_tax_brackets.len(), 1);
    }

    #[test]
    fn pre_pass_runs_gross_deductions_before_tax_base() {
        // Income tax is listed first but still sees the reduced base.
        let regime = regime(
            Box::new(AfterSocialSecurityTaxBase),
            vec![
                income_tax(DeductionBase::Taxable),
                flat(DeductionConfig::new("Pension", dec!(0.1)).social_security()),
                flat(DeductionConfig::new("Health", dec!(0.05)).social_security()),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(40000)).unwrap();

        assert_eq!(result.tax_base, dec!(34000));
        assert_eq!(result.deduction(INCOME_TAX).unwrap().amount(), dec!(5100));
        let names: Vec<_> = result.deductions().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Pension", "Health", INCOME_TAX]);
    }

    #[test]
    fn untagged_deductions_do_not_reduce_base() {
        let regime = regime(
            Box::new(AfterSocialSecurityTaxBase),
            vec![
                flat(DeductionConfig::new("Pension", dec!(0.1)).social_security()),
                flat(DeductionConfig::new("Church Fee", dec!(0.01))),
                income_tax(DeductionBase::Taxable),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(40000)).unwrap();

        assert_eq!(result.tax_base, dec!(36000));
    }

    #[test]
    fn income_tax_feeds_later_deductions() {
        let regime = regime(
            Box::new(StandardTaxBase),
            vec![
                income_tax(DeductionBase::Gross),
                Box::new(
                    ConditionalDeduction::new(
                        DeductionConfig::new("Solidarity Surcharge", dec!(0.055)).applies_to(DeductionBase::IncomeTax),
                        Condition::IncomeTaxAbove(dec!(1000)),
                    )
                    .unwrap(),
                ),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(20000)).unwrap();

        // 20,000 x 15% = 3,000; 3,000 x 5.5%
        assert_eq!(result.deduction("Solidarity Surcharge").unwrap().amount(), dec!(165));
    }

    #[test]
    fn zero_deductions_are_omitted() {
        let regime = regime(
            Box::new(StandardTaxBase),
            vec![
                flat(DeductionConfig::new("Zero Rate Levy", dec!(0))),
                flat(DeductionConfig::new("Social Security", dec!(0.065))),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(10000)).unwrap();

        assert_eq!(result.deductions().len(), 1);
        assert_eq!(result.deduction("Zero Rate Levy"), None);
    }

    #[test]
    fn zero_gross_has_no_deductions() {
        let regime = regime(
            Box::new(AfterSocialSecurityTaxBase),
            vec![
                flat(DeductionConfig::new("Pension", dec!(0.1)).social_security()),
                income_tax(DeductionBase::Taxable),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(Decimal::ZERO).unwrap();

        assert!(result.deductions().is_empty());
        assert_eq!(result.net_salary, Decimal::ZERO);
        assert_eq!(result.effective_tax_rate(), Decimal::ZERO);
    }

    // =========================================================================
    // Error tests
    // =========================================================================

    #[test]
    fn negative_gross_is_rejected() {
        let regime = regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)]);

        let result = UniversalCalculator::new(&regime).calculate(dec!(-1));

        assert_eq!(result, Err(CalculationError::NegativeGrossSalary(dec!(-1))));
    }

    #[test]
    fn overflow_aborts_calculation() {
        let regime = regime(
            Box::new(StandardTaxBase),
            vec![Box::new(
                PercentageOfBaseDeduction::new(DeductionConfig::new("Levy", dec!(0.1)), dec!(2)).unwrap(),
            )],
        );

        let result = UniversalCalculator::new(&regime).calculate(Decimal::MAX);

        assert_eq!(
            result,
            Err(CalculationError::Overflow {
                operation: "base multiplier"
            })
        );
    }

    #[test]
    fn unknown_key_surfaces_registry_error() {
        let mut registry = RegimeRegistry::new();
        registry.register("czechia-salaried", regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)]));

        let result = calculate_net_salary(&registry, "narnia", dec!(50000));

        assert_eq!(
            result,
            Err(CalculationError::Registry(RegistryError::NotFound {
                key: "narnia".to_string(),
                available: vec!["czechia-salaried".to_string()],
            }))
        );
    }

    // =========================================================================
    // Labels, currency and explanations
    // =========================================================================

    #[test]
    fn title_replaces_country_and_employment_labels() {
        let untitled = regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)]);
        let titled = regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)])
            .with_title("Czechia Salaried Employee");

        let plain = UniversalCalculator::new(&untitled).calculate(dec!(1000)).unwrap();
        let labelled = UniversalCalculator::new(&titled).calculate(dec!(1000)).unwrap();

        assert_eq!((plain.country.as_str(), plain.employment_type.as_str()), ("Czechia", "Salaried Employee"));
        assert_eq!((labelled.country.as_str(), labelled.employment_type.as_str()), ("Czechia Salaried Employee", ""));
    }

    #[test]
    fn local_currency_rate_is_attached() {
        let regime = regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)])
            .with_currencies(Currency::CZK, Currency::CZK);
        let rates = FallbackRates::default();

        let annotated = UniversalCalculator::new(&regime)
            .with_rate_provider(&rates)
            .calculate(dec!(1000))
            .unwrap();
        let bare = UniversalCalculator::new(&regime).calculate(dec!(1000)).unwrap();

        assert_eq!(annotated.local_currency, Some(Currency::CZK));
        assert_eq!(annotated.local_currency_rate, Some(dec!(25)));
        assert_eq!(bare.local_currency, None);
    }

    #[test]
    fn rate_failure_does_not_abort() {
        struct Offline;

        impl RateProvider for Offline {
            fn quote(
                &self,
                from: Currency,
                to: Currency,
            ) -> Result<Decimal, CurrencyError> {
                Err(CurrencyError::RateUnavailable { from, to })
            }
        }

        let regime = regime(Box::new(StandardTaxBase), vec![income_tax(DeductionBase::Gross)])
            .with_currencies(Currency::ILS, Currency::ILS);

        let result = UniversalCalculator::new(&regime)
            .with_rate_provider(&Offline)
            .calculate(dec!(1000))
            .unwrap();

        assert_eq!(result.local_currency_rate, None);
        assert_eq!(result.net_salary, dec!(850));
    }

    #[test]
    fn explanations_describe_base() {
        let regime = regime(
            Box::new(AfterSocialSecurityTaxBase),
            vec![
                flat(DeductionConfig::new("Pension", dec!(0.1)).social_security()),
                income_tax(DeductionBase::Taxable),
            ],
        );

        let result = UniversalCalculator::new(&regime).calculate(dec!(40000)).unwrap();

        assert_eq!(
            result.calculation_explanations["tax_base"],
            "Taxable income = gross salary - social security contributions = 36,000"
        );
        assert_eq!(
            result.calculation_explanations["social_security"],
            "Social security deducted before income tax: 4,000"
        );
        assert!(!result.calculation_explanations.contains_key("expenses"));
    }

    #[test]
    fn repeated_calculation_is_identical() {
        let regime = regime(
            Box::new(AfterSocialSecurityTaxBase),
            vec![
                flat(DeductionConfig::new("Pension", dec!(0.093)).with_ceiling(dec!(96000)).social_security()),
                income_tax(DeductionBase::Taxable),
            ],
        );
        let calculator = UniversalCalculator::new(&regime);

        assert_eq!(calculator.calculate(dec!(123456.78)), calculator.calculate(dec!(123456.78)));
    }

    #[test]
    fn capped_deduction_without_ceiling_fails_regime_build() {
        let build = || -> Result<TaxRegimeConfig, ConfigError> {
            TaxRegimeConfig::new(
                Country::Israel,
                EmploymentType::Salaried,
                Box::new(StandardTaxBase),
                vec![Box::new(CappedPercentageDeduction::new(DeductionConfig::new(
                    "Keren Hishtalmut",
                    dec!(0.025),
                ))?)],
            )
        };

        assert!(matches!(build(), Err(ConfigError::MissingCeiling { .. })));
    }
}
