//! CLI error types

use ivol_models::analytical::AnalyticalError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Positional argument is not a number
    #[error("Not a valid number: {0}")]
    InvalidNumber(String),

    /// Positional argument parsed to a non-finite value
    #[error("Number out of range: {0}")]
    OutOfRange(String),

    /// Pricing or validation failure
    #[error(transparent)]
    Calculation(#[from] AnalyticalError),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
