#![doc(test(attr(deny(warnings))))]

//! Expense Core keeps an expense collection, its persisted copy, the year filter,
//! and the monthly chart consistent with each other after every mutation.

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod form;
pub mod storage;
pub mod utils;

pub use app::{Confirmer, Dashboard, ExpenseTracker, Notice};
pub use errors::{Result, TrackerError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Core tracing initialized.");
    });
}
