//! Fixed-point cash amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Cash balance credited to a freshly registered account.
pub const DEFAULT_STARTING_CASH: Decimal = dec!(10000.00);

/// Number of fraction digits kept for every stored amount.
pub const CASH_SCALE: u32 = 2;

/// Round an amount to whole cents (midpoint away from zero) with exactly two
/// fraction digits.
pub fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(CASH_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CASH_SCALE);
    rounded
}

/// `price * quantity`, or `None` on overflow.
pub fn line_value(price: Decimal, quantity: i64) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Format as US dollars, e.g. `$1,234.56` or `-$5.00`.
pub fn format_usd(value: Decimal) -> String {
    let cents = to_cents(value);
    let text = cents.abs().to_string();
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if cents.is_sign_negative() && !cents.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{frac}")
}
