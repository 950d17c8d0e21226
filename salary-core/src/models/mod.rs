mod config_error;
mod deduction;
mod jurisdiction;
mod regime_config;
mod tax_bracket;
mod tax_result;

pub use config_error::ConfigError;
pub use deduction::{Deduction, DeductionBase, DeductionConfig, INCOME_TAX};
pub use jurisdiction::{Country, Currency, EmploymentType};
pub use regime_config::TaxRegimeConfig;
pub use tax_bracket::{BracketConfig, TaxBracket, validate_schedule};
pub use tax_result::TaxResult;
