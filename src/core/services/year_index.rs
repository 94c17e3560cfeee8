use std::collections::BTreeSet;

use crate::domain::Expense;

/// Derives the selectable years and keeps the selection valid.
pub struct YearIndex;

impl YearIndex {
    /// Distinct years of all expenses plus `current_year`, most recent first.
    pub fn years<'a, I>(expenses: I, current_year: i32) -> Vec<i32>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut years: BTreeSet<i32> = expenses.into_iter().map(Expense::year).collect();
        years.insert(current_year);
        years.into_iter().rev().collect()
    }

    /// Keeps `candidate` when it is still available, otherwise falls back to the
    /// most recent available year. With nothing available the candidate is kept.
    pub fn resolve_selection(candidate: i32, available: &[i32]) -> i32 {
        if available.contains(&candidate) {
            candidate
        } else {
            available.first().copied().unwrap_or(candidate)
        }
    }
}
