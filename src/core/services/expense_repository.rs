//! Owning, persisted collection of expenses.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::ids::IdGenerator;
use crate::currency::{amount_in_range, max_amount, normalize_amount};
use crate::domain::{Expense, Identifiable};
use crate::errors::TrackerError;
use crate::storage::ExpenseStore;

use super::ServiceResult;

/// Sole owner of the expense collection. Every mutation writes the full
/// collection through the store before returning; a failed write leaves the
/// in-memory collection as it was.
pub struct ExpenseRepository {
    expenses: Vec<Expense>,
    store: ExpenseStore,
    ids: Box<dyn IdGenerator>,
}

impl ExpenseRepository {
    /// Creates an empty repository without reading the store.
    pub fn new(store: ExpenseStore, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            expenses: Vec::new(),
            store,
            ids,
        }
    }

    /// Creates a repository seeded from the store, treating unreadable data as empty.
    pub fn open(store: ExpenseStore, ids: Box<dyn IdGenerator>) -> Self {
        let expenses = store.load_or_empty();
        tracing::debug!(count = expenses.len(), "expenses restored");
        Self {
            expenses,
            store,
            ids,
        }
    }

    /// Re-reads the store, replacing the in-memory collection (fail closed).
    pub fn reload(&mut self) {
        self.expenses = self.store.load_or_empty();
    }

    /// Appends a new expense and returns it.
    pub fn add(&mut self, title: &str, amount: Decimal, date: NaiveDate) -> ServiceResult<Expense> {
        Self::check_fields(title, amount)?;
        let expense = Expense::new(self.ids.next_id(), title, amount, date);
        self.expenses.push(expense.clone());
        if let Err(err) = self.persist() {
            self.expenses.pop();
            return Err(err);
        }
        tracing::info!(
            id = %expense.id,
            date = %expense.date,
            amount = %expense.amount,
            "expense added"
        );
        Ok(expense)
    }

    /// Rewrites the fields of the expense identified by `id`.
    ///
    /// An unknown id is skipped silently: `Ok(false)` and nothing is written.
    pub fn update(
        &mut self,
        id: &str,
        title: &str,
        amount: Decimal,
        date: NaiveDate,
    ) -> ServiceResult<bool> {
        Self::check_fields(title, amount)?;
        let Some(index) = self.position(id) else {
            tracing::debug!(%id, "update skipped, expense not found");
            return Ok(false);
        };
        let previous = self.expenses[index].clone();
        self.expenses[index].apply(title, amount, date);
        if let Err(err) = self.persist() {
            self.expenses[index] = previous;
            return Err(err);
        }
        tracing::info!(%id, "expense updated");
        Ok(true)
    }

    /// Removes the expense identified by `id`, reporting whether anything was removed.
    pub fn remove(&mut self, id: &str) -> ServiceResult<bool> {
        let Some(index) = self.position(id) else {
            tracing::warn!(%id, "delete requested for unknown expense");
            return Ok(false);
        };
        let removed = self.expenses.remove(index);
        if let Err(err) = self.persist() {
            self.expenses.insert(index, removed);
            return Err(err);
        }
        tracing::info!(%id, "expense removed");
        Ok(true)
    }

    /// Empties the collection.
    pub fn clear(&mut self) -> ServiceResult<()> {
        let previous = std::mem::take(&mut self.expenses);
        if let Err(err) = self.persist() {
            self.expenses = previous;
            return Err(err);
        }
        tracing::info!(count = previous.len(), "all expenses cleared");
        Ok(())
    }

    /// All expenses dated within `year`, in collection order.
    pub fn by_year(&self, year: i32) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|expense| expense.in_year(year))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id() == id)
    }

    pub fn all(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.expenses.iter().position(|expense| expense.id() == id)
    }

    fn persist(&self) -> ServiceResult<()> {
        self.store.save(&self.expenses)
    }

    fn check_fields(title: &str, amount: Decimal) -> ServiceResult<()> {
        if title.trim().is_empty() {
            return Err(TrackerError::InvalidInput("title must not be empty".into()));
        }
        if !amount_in_range(normalize_amount(amount)) {
            return Err(TrackerError::InvalidInput(format!(
                "amount must be greater than 0 and at most {}",
                max_amount()
            )));
        }
        Ok(())
    }
}
