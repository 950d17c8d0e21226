use std::fmt;

use crate::models::{ConfigError, Country, Currency, EmploymentType};
use crate::strategies::{DeductionStrategy, TaxBaseStrategy};

/// Declarative rule set for one country, employment type and optional
/// region: a tax-base strategy plus an ordered list of deductions.
///
/// Built once and shared read-only by every calculation; there is no way to
/// change a regime after construction.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::{Country, DeductionConfig, EmploymentType, TaxRegimeConfig};
/// use salary_core::strategies::{FlatRateDeduction, StandardTaxBase};
///
/// let regime = TaxRegimeConfig::new(
///     Country::Romania,
///     EmploymentType::Freelancer,
///     Box::new(StandardTaxBase),
///     vec![Box::new(
///         FlatRateDeduction::new(DeductionConfig::new("Microenterprise Tax", dec!(0.01))).unwrap(),
///     )],
/// )
/// .unwrap()
/// .with_title("Romania Freelancer (Micro)");
///
/// assert_eq!(regime.deduction_strategies().len(), 1);
/// assert_eq!(regime.label(), "Romania Freelancer (Micro)");
/// ```
pub struct TaxRegimeConfig {
    country: Country,
    employment_type: EmploymentType,
    local_currency: Currency,
    threshold_currency: Currency,
    region: Option<String>,
    title: Option<String>,
    description: String,
    tax_base_strategy: Box<dyn TaxBaseStrategy>,
    deduction_strategies: Vec<Box<dyn DeductionStrategy>>,
}

impl TaxRegimeConfig {
    /// Creates a EUR-denominated regime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDeductions`] if `deduction_strategies` is empty.
    pub fn new(
        country: Country,
        employment_type: EmploymentType,
        tax_base_strategy: Box<dyn TaxBaseStrategy>,
        deduction_strategies: Vec<Box<dyn DeductionStrategy>>,
    ) -> Result<Self, ConfigError> {
        if deduction_strategies.is_empty() {
            return Err(ConfigError::NoDeductions(format!(
                "{} {}",
                country, employment_type
            )));
        }
        Ok(Self {
            country,
            employment_type,
            local_currency: Currency::EUR,
            threshold_currency: Currency::EUR,
            region: None,
            title: None,
            description: String::new(),
            tax_base_strategy,
            deduction_strategies,
        })
    }

    /// Sets the currency salaries are paid in and the currency the
    /// configured thresholds were originally expressed in.
    pub fn with_currencies(
        mut self,
        local_currency: Currency,
        threshold_currency: Currency,
    ) -> Self {
        self.local_currency = local_currency;
        self.threshold_currency = threshold_currency;
        self
    }

    pub fn with_region(
        mut self,
        region: impl Into<String>,
    ) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Display title; replaces the country and employment-type labels on
    /// results.
    pub fn with_title(
        mut self,
        title: impl Into<String>,
    ) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(
        mut self,
        description: impl Into<String>,
    ) -> Self {
        self.description = description.into();
        self
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn employment_type(&self) -> EmploymentType {
        self.employment_type
    }

    pub fn local_currency(&self) -> Currency {
        self.local_currency
    }

    pub fn threshold_currency(&self) -> Currency {
        self.threshold_currency
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tax_base_strategy(&self) -> &dyn TaxBaseStrategy {
        self.tax_base_strategy.as_ref()
    }

    pub fn deduction_strategies(&self) -> &[Box<dyn DeductionStrategy>] {
        &self.deduction_strategies
    }

    /// Title if set, otherwise "Country (Employment Type)".
    pub fn label(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} ({})", self.country, self.employment_type),
        }
    }
}

impl fmt::Debug for TaxRegimeConfig {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TaxRegimeConfig")
            .field("country", &self.country)
            .field("employment_type", &self.employment_type)
            .field("local_currency", &self.local_currency)
            .field("region", &self.region)
            .field("title", &self.title)
            .field("tax_base_strategy", &self.tax_base_strategy)
            .field("deductions", &self.deduction_strategies.len())
            .finish()
    }
}
