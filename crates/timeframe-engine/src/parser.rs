//! Duration parser -- converts literals such as `"15m"` or `"2D"` into milliseconds.
//!
//! Accepted shape (after trimming surrounding whitespace) is one or more ASCII
//! digits followed by exactly one unit symbol from [`TimeUnit::from_symbol`].
//! Signs, decimals, embedded whitespace and multi-letter units are rejected.

use crate::error::{Result, TimeframeError};
use crate::unit::TimeUnit;

/// Split a literal into its quantity and unit.
///
/// # Errors
/// Returns `TimeframeError::Format` if the literal is empty, the unit symbol is
/// unknown, or the quantity is not a plain run of digits.
pub fn parse_literal(literal: &str) -> Result<(u64, TimeUnit)> {
    let trimmed = literal.trim();

    let mut chars = trimmed.chars();
    let symbol = chars
        .next_back()
        .ok_or_else(|| TimeframeError::format(literal, "is empty"))?;
    let quantity = chars.as_str();

    let unit = TimeUnit::from_symbol(symbol).ok_or_else(|| {
        TimeframeError::format(literal, format!("has unknown unit '{}'", symbol))
    })?;

    if quantity.is_empty() || !quantity.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeframeError::format(
            literal,
            "must be a whole quantity followed by a unit (e.g. 15m)",
        ));
    }

    let quantity: u64 = quantity
        .parse()
        .map_err(|_| TimeframeError::format(literal, "has a quantity that is too large"))?;

    Ok((quantity, unit))
}

/// Parse a literal into its duration in milliseconds.
///
/// `quantity * seconds_per_unit * 1000`, overflow-checked.
///
/// # Errors
/// Returns `TimeframeError::Format` when [`parse_literal`] rejects the input or
/// the duration does not fit in an `i64`.
pub fn parse_duration_ms(literal: &str) -> Result<i64> {
    let (quantity, unit) = parse_literal(literal)?;

    i64::try_from(quantity)
        .ok()
        .and_then(|q| q.checked_mul(unit.milliseconds()))
        .ok_or_else(|| TimeframeError::format(literal, "overflows the millisecond range"))
}
