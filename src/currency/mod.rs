//! Fixed-point money helpers for the single display currency.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Three-letter code prefixed to every displayed amount.
pub const CURRENCY_CODE: &str = "MYR";

/// Number of fraction digits amounts are stored and displayed with.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest accepted amount, in whole currency units. Keeps every record at
/// scale 2 and leaves headroom for monthly and yearly sums.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000;

/// Upper bound for a single amount, `MYR 1000000000000.00`.
pub fn max_amount() -> Decimal {
    Decimal::new(MAX_AMOUNT_UNITS, 0)
}

/// Whether a normalized amount is storable: strictly positive and within [`max_amount`].
pub fn amount_in_range(value: Decimal) -> bool {
    value > Decimal::ZERO && value <= max_amount()
}

/// Rounds `value` to two fraction digits and pins the scale so it always
/// serializes as e.g. `"10.00"`.
pub fn normalize_amount(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// Parses user-entered amount text. Accepts plain and scientific notation,
/// surrounding whitespace is ignored. Returns `None` for blank or non-numeric text.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Formats an amount as `MYR 12.50`.
pub fn format_money(amount: Decimal) -> String {
    format!("{} {}", CURRENCY_CODE, normalize_amount(amount))
}
