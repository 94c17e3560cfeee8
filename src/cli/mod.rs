//! Terminal front end for the expense tracker.

pub mod output;
mod shell;
pub mod terminal_chart;

use thiserror::Error;

use crate::errors::TrackerError;

pub use shell::run_cli;

/// User-facing CLI error wrapper.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error("Terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the shell reads commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    /// Commands are read line by line from stdin; confirmations are accepted.
    Script,
}

impl CliMode {
    pub fn from_env() -> Self {
        if std::env::var_os("EXPENSE_CORE_CLI_SCRIPT").is_some() {
            CliMode::Script
        } else {
            CliMode::Interactive
        }
    }
}
