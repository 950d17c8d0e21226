use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a gross salary argument is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ParseSalaryError {
    #[error("salary is empty")]
    Empty,

    #[error("invalid salary '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("salary must not be negative, got {0}")]
    Negative(Decimal),
}

/// Trims whitespace and removes commas (thousands separator).
fn normalize_salary_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses an annual gross salary.
///
/// Accepts commas as thousands separators (e.g. `"65,000.50"`). Empty,
/// non-numeric and negative input is rejected rather than coerced.
pub fn parse_salary(s: &str) -> Result<Decimal, ParseSalaryError> {
    let normalized = normalize_salary_input(s);
    if normalized.is_empty() {
        return Err(ParseSalaryError::Empty);
    }

    let salary: Decimal = normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid salary: {}", e);
        ParseSalaryError::Invalid {
            input: s.to_string(),
            source: e,
        }
    })?;

    if salary < Decimal::ZERO {
        return Err(ParseSalaryError::Negative(salary));
    }
    Ok(salary)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_salary_accepts_comma_thousands_separator() {
        assert_eq!(parse_salary("65,000").unwrap(), dec!(65000));
        assert_eq!(parse_salary("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_salary_trims_whitespace() {
        assert_eq!(parse_salary("  50000.5 ").unwrap(), dec!(50000.5));
    }

    #[test]
    fn parse_salary_accepts_zero() {
        assert_eq!(parse_salary("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_salary_rejects_empty() {
        assert_eq!(parse_salary(""), Err(ParseSalaryError::Empty));
        assert_eq!(parse_salary("   "), Err(ParseSalaryError::Empty));
    }

    #[test]
    fn parse_salary_rejects_non_numeric() {
        assert!(matches!(parse_salary("fifty thousand"), Err(ParseSalaryError::Invalid { .. })));
        assert!(matches!(parse_salary("50k"), Err(ParseSalaryError::Invalid { .. })));
    }

    #[test]
    fn parse_salary_rejects_negative() {
        assert_eq!(parse_salary("-1,000"), Err(ParseSalaryError::Negative(dec!(-1000))));
    }
}
