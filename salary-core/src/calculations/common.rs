//! Common monetary helpers shared by strategies, the engine and renderers.
//!
//! Calculation arithmetic is exact; rounding only happens when a value is
//! turned into text for a calculation trace or an explanation.

use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculations::CalculationError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns `numerator / denominator`, or zero when the denominator is zero
/// or negative.
///
/// Used for display ratios such as the effective rate of a progressive tax,
/// where an empty base must not turn into a division error.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::safe_ratio;
///
/// assert_eq!(safe_ratio(dec!(250), dec!(1000)), dec!(0.25));
/// assert_eq!(safe_ratio(dec!(250), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn safe_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Multiplies two values, reporting overflow as a [`CalculationError`].
pub fn checked_mul(
    a: Decimal,
    b: Decimal,
    operation: &'static str,
) -> Result<Decimal, CalculationError> {
    a.checked_mul(b)
        .ok_or(CalculationError::Overflow { operation })
}

/// Formats an amount rounded to whole units with thousands separators.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::format_amount;
///
/// assert_eq!(format_amount(dec!(1234567.5)), "1,234,568");
/// assert_eq!(format_amount(dec!(-950.2)), "-950");
/// ```
pub fn format_amount(value: Decimal) -> String {
    let whole = value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .unwrap_or_default();
    whole.to_formatted_string(&Locale::en)
}

/// Formats an amount to cents with thousands separators, rounding half-up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::format_money;
///
/// assert_eq!(format_money(dec!(74709.12)), "74,709.12");
/// assert_eq!(format_money(dec!(618.948)), "618.95");
/// assert_eq!(format_money(dec!(-0.125)), "-0.13");
/// ```
pub fn format_money(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let whole = rounded.trunc().to_i128().unwrap_or_default().unsigned_abs();
    let cents = (rounded.fract().abs() * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();
    format!("{sign}{}.{cents:02}", whole.to_formatted_string(&Locale::en))
}

/// Formats a `0..=1` fraction as a percentage, e.g. `0.065` as `6.5%`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::format_rate;
///
/// assert_eq!(format_rate(dec!(0.065)), "6.5%");
/// assert_eq!(format_rate(dec!(0.15)), "15%");
/// assert_eq!(format_rate(dec!(0.1325)), "13.25%");
/// ```
pub fn format_rate(rate: Decimal) -> String {
    let percent = (rate * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{percent}%")
}
