//! Domain model for a single expense entry.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::{format_money, normalize_amount};
use crate::domain::common::{Amounted, Displayable, Identifiable};

/// Date format used for persisted and user-entered dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// One persisted expense. `amount` is kept at exactly two fraction digits and
/// serialized as a string (`"10.00"`), `date` as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        title: impl AsRef<str>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.as_ref().trim().to_string(),
            amount: normalize_amount(amount),
            date,
        }
    }

    /// Replaces the editable fields, normalizing them the same way `new` does.
    pub fn apply(&mut self, title: &str, amount: Decimal, date: NaiveDate) {
        self.title = title.trim().to_string();
        self.amount = normalize_amount(amount);
        self.date = date;
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// 0-indexed calendar month (January is 0).
    pub fn month0(&self) -> u32 {
        self.date.month0()
    }

    pub fn in_year(&self, year: i32) -> bool {
        self.year() == year
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Amounted for Expense {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!("{} ({}, {})", self.title, format_money(self.amount), self.date)
    }
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE_FORMAT).ok()
}
