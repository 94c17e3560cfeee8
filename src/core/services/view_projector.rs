//! Pure projections from the expense collection to what the screen shows.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::currency::{format_money, normalize_amount};
use crate::domain::{month_name, Amounted, Expense};

/// Per-month sums, index 0 is January.
pub type MonthlyTotals = [Decimal; 12];

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// One list entry as rendered for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub id: String,
    pub title: String,
    /// `MYR 12.50`
    pub amount_label: String,
    /// `DD/MM/YYYY`
    pub date_label: String,
    pub month_name: &'static str,
    pub year: i32,
    pub day: u32,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.clone(),
            title: expense.title.clone(),
            amount_label: format_money(expense.amount),
            date_label: expense.date.format(DISPLAY_DATE_FORMAT).to_string(),
            month_name: month_name(expense.month0()),
            year: expense.year(),
            day: expense.date.day(),
        }
    }
}

/// List region content: either a placeholder or the rows to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Empty,
    Items(Vec<ExpenseRow>),
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ListView::Empty)
    }

    pub fn rows(&self) -> &[ExpenseRow] {
        match self {
            ListView::Empty => &[],
            ListView::Items(rows) => rows,
        }
    }
}

pub struct ViewProjector;

impl ViewProjector {
    /// Expenses of `year`, most recent date first. Equal dates keep their
    /// collection order.
    pub fn filtered_sorted(expenses: &[Expense], year: i32) -> Vec<&Expense> {
        let mut filtered: Vec<&Expense> = expenses
            .iter()
            .filter(|expense| expense.in_year(year))
            .collect();
        filtered.sort_by(|a, b| b.date.cmp(&a.date));
        filtered
    }

    pub fn monthly_totals(expenses: &[Expense], year: i32) -> MonthlyTotals {
        let mut months = [Decimal::ZERO; 12];
        for expense in expenses.iter().filter(|expense| expense.in_year(year)) {
            let bucket = &mut months[expense.month0() as usize];
            *bucket = saturating_sum(*bucket, expense.amount);
        }
        months.map(normalize_amount)
    }

    pub fn year_total(expenses: &[Expense], year: i32) -> Decimal {
        let total = expenses
            .iter()
            .filter(|expense| expense.in_year(year))
            .map(Amounted::amount)
            .fold(Decimal::ZERO, saturating_sum);
        normalize_amount(total)
    }

    pub fn year_total_label(expenses: &[Expense], year: i32) -> String {
        format_money(Self::year_total(expenses, year))
    }

    pub fn list_view(expenses: &[Expense], year: i32) -> ListView {
        let rows: Vec<ExpenseRow> = Self::filtered_sorted(expenses, year)
            .into_iter()
            .map(ExpenseRow::from)
            .collect();
        if rows.is_empty() {
            ListView::Empty
        } else {
            ListView::Items(rows)
        }
    }
}

/// Sums clamp at the representable maximum instead of overflowing.
fn saturating_sum(acc: Decimal, amount: Decimal) -> Decimal {
    acc.checked_add(amount).unwrap_or(Decimal::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(id: &str, amount: &str, y: i32, m: u32, d: u32) -> Expense {
        Expense::new(
            id,
            id,
            amount.parse().unwrap(),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        )
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("jan", "5.00", 2024, 1, 10),
            expense("may-a", "10.25", 2024, 5, 3),
            expense("old", "99.00", 2023, 5, 3),
            expense("may-b", "4.75", 2024, 5, 3),
            expense("dec", "1.10", 2024, 12, 31),
        ]
    }

    #[test]
    fn filtered_sorted_is_descending_and_stable() {
        let expenses = sample();
        let ids: Vec<_> = ViewProjector::filtered_sorted(&expenses, 2024)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["dec", "may-a", "may-b", "jan"]);
    }

    #[test]
    fn monthly_totals_bucket_by_month_and_match_year_total() {
        let expenses = sample();
        let totals = ViewProjector::monthly_totals(&expenses, 2024);

        assert_eq!(totals[0].to_string(), "5.00");
        assert_eq!(totals[4].to_string(), "15.00");
        assert_eq!(totals[11].to_string(), "1.10");
        assert_eq!(totals[6], Decimal::ZERO);

        let summed: Decimal = totals.iter().copied().sum();
        assert_eq!(summed, ViewProjector::year_total(&expenses, 2024));
        assert_eq!(
            ViewProjector::year_total_label(&expenses, 2024),
            "MYR 21.10"
        );
    }

    #[test]
    fn oversized_records_saturate_instead_of_overflowing() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let expenses = vec![
            Expense::new("a", "a", Decimal::MAX, date),
            Expense::new("b", "b", Decimal::MAX, date),
        ];

        assert_eq!(ViewProjector::monthly_totals(&expenses, 2024)[2], Decimal::MAX);
        assert_eq!(ViewProjector::year_total(&expenses, 2024), Decimal::MAX);
    }

    #[test]
    fn list_view_signals_empty_year() {
        let expenses = sample();
        assert!(ViewProjector::list_view(&expenses, 2020).is_empty());
        assert_eq!(ViewProjector::year_total_label(&expenses, 2020), "MYR 0.00");
    }

    #[test]
    fn rows_carry_display_labels() {
        let expenses = sample();
        let view = ViewProjector::list_view(&expenses, 2023);
        let row = &view.rows()[0];
        assert_eq!(row.amount_label, "MYR 99.00");
        assert_eq!(row.date_label, "03/05/2023");
        assert_eq!(row.month_name, "May");
        assert_eq!((row.year, row.day), (2023, 3));
    }
}
