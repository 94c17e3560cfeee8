pub mod json_backend;
pub mod memory;

use crate::{currency::amount_in_range, domain::Expense, errors::Result};

pub use json_backend::FileStore;
pub use memory::MemoryStore;

/// Well-known key the expense collection is persisted under.
pub const EXPENSES_KEY: &str = "expenses_v1";

/// Abstraction over a persistent string slot store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when the key was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Overwrites the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Persists whole-collection snapshots of expenses under a single key.
pub struct ExpenseStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl ExpenseStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, EXPENSES_KEY)
    }

    pub fn with_key(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored collection. An absent key is an empty collection;
    /// malformed content is reported as a serialization error. Amounts are
    /// re-normalized and records with a blank title or an out-of-range amount
    /// are skipped.
    pub fn load(&self) -> Result<Vec<Expense>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<Expense> = serde_json::from_str(&raw)?;
        let total = stored.len();
        let expenses: Vec<Expense> = stored.into_iter().filter_map(sanitize).collect();
        if expenses.len() < total {
            tracing::warn!(
                key = %self.key,
                dropped = total - expenses.len(),
                "skipping stored expenses that break record rules"
            );
        }
        Ok(expenses)
    }

    /// Startup variant of [`ExpenseStore::load`] that fails closed: any read or
    /// parse failure is logged and yields an empty collection.
    pub fn load_or_empty(&self) -> Vec<Expense> {
        match self.load() {
            Ok(expenses) => expenses,
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "discarding unreadable expense data");
                Vec::new()
            }
        }
    }

    /// Serializes the full collection and overwrites the stored value.
    pub fn save(&self, expenses: &[Expense]) -> Result<()> {
        let json = serde_json::to_string(expenses)?;
        self.backend.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = expenses.len(), "expenses saved");
        Ok(())
    }
}

fn sanitize(stored: Expense) -> Option<Expense> {
    let expense = Expense::new(stored.id, stored.title, stored.amount, stored.date);
    (!expense.title.is_empty() && amount_in_range(expense.amount)).then_some(expense)
}
