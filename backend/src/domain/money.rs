//! Currency presentation helpers.
//!
//! Domain values stay exact; only strings produced here are rounded.

use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SYMBOL: &str = "¥";

/// Format an amount as `¥1,234.50` (two decimals, half away from zero)
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}{}.{}", sign, CURRENCY_SYMBOL, grouped, fraction)
}

/// Plain decimal text without trailing zeros, used in exported files
pub fn plain_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}
