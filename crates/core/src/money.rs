//! Decimal money helpers.
//!
//! Luxora trades in a single currency (USD). Amounts are `rust_decimal`
//! values stored as `NUMERIC(12, 2)` and serialized as strings so no
//! precision is lost on the way to the browser.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for stored amounts.
pub const CENT_SCALE: u32 = 2;

/// Round an amount to whole cents, half away from zero. The result always
/// carries two decimal places, so `25` becomes `25.00`.
///
/// ```
/// use luxora_core::money::round_cents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_cents(Decimal::new(10005, 3)), Decimal::new(1001, 2));
/// ```
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(CENT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENT_SCALE);
    rounded
}

/// Format an amount for display, e.g. `$1,249.50`.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${grouped}.{cents}")
    } else {
        format!("${grouped}.{cents}")
    }
}

/// Apply a whole-number percentage to an amount, rounded to cents.
#[must_use]
pub fn percent_of(amount: Decimal, percent: u32) -> Decimal {
    round_cents(amount * Decimal::from(percent) / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(Decimal::new(1_2345, 4)), Decimal::new(123, 2));
        assert_eq!(round_cents(Decimal::new(125, 3)), Decimal::new(13, 2));
        assert_eq!(round_cents(Decimal::new(-125, 3)), Decimal::new(-13, 2));
        assert_eq!(round_cents(Decimal::new(25, 0)).to_string(), "25.00");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Decimal::ZERO), "$0.00");
        assert_eq!(format_usd(Decimal::new(95, 0)), "$95.00");
        assert_eq!(format_usd(Decimal::new(124_950, 2)), "$1,249.50");
        assert_eq!(format_usd(Decimal::new(123_456_789, 2)), "$1,234,567.89");
        assert_eq!(format_usd(Decimal::new(-2500, 2)), "-$25.00");
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(Decimal::new(200, 0), 8), Decimal::new(16, 0));
        assert_eq!(percent_of(Decimal::new(1999, 2), 15), Decimal::new(300, 2));
    }
}
