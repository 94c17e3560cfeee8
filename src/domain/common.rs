//! Shared traits and calendar constants for expense primitives.

use rust_decimal::Decimal;

/// Exposes a stable identifier for entities stored in the repository.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a common contract for retrieving fixed-point amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Short month labels used for the chart categories, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Long month name for a 0-indexed month. Out-of-range indexes yield an empty string.
pub fn month_name(month0: u32) -> &'static str {
    MONTH_NAMES.get(month0 as usize).copied().unwrap_or("")
}
