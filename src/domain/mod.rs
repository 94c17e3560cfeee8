pub mod common;
pub mod expense;

pub use common::{month_name, Amounted, Displayable, Identifiable, MONTH_LABELS};
pub use expense::{parse_iso_date, Expense, ISO_DATE_FORMAT};
