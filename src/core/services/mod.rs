pub mod expense_repository;
pub mod view_projector;
pub mod year_index;

pub use expense_repository::ExpenseRepository;
pub use view_projector::{ExpenseRow, ListView, MonthlyTotals, ViewProjector};
pub use year_index::YearIndex;

pub type ServiceResult<T> = crate::errors::Result<T>;
