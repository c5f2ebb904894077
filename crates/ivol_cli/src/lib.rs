//! # ivol_cli (S: Service)
//!
//! Command-line entry points for the implied volatility engines.
//!
//! # Binaries
//!
//! - `bs_implied_vol [options] OptionPrice StockPrice Strike Time RiskFreeRate DividendYield`
//! - `heston_implied_vol [options] OptionPrice StockPrice Strike Time RiskFreeRate DividendYield`
//!
//! On success each prints the implied volatility as a single `%.6f` line on
//! stdout and exits with code 0. Any parsing, validation or calculation
//! failure prints one `Error:` line on stderr and exits with code 1.
//!
//! # Configuration
//!
//! The Heston calculator reads transform overrides from the command line
//! and from `FFT_N`, `FFT_LOG_STRIKE_RANGE`, `FFT_ALPHA`, `FFT_ETA` and
//! `FFT_CACHE_TOLERANCE`. Flags take precedence over the environment.
//! Invalid overrides are reported as warnings and ignored.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::process::ExitCode;

use clap::error::ErrorKind;

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{CliError, Result};

/// Report a clap parse failure and pick the exit code.
///
/// `--help` and `--version` print to stdout and succeed; every other parse
/// error becomes a single `Error:` line.
pub fn report_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            let rendered = err.to_string();
            let first = rendered.lines().next().unwrap_or_default();
            eprintln!("Error: {}", first.trim_start_matches("error: "));
            ExitCode::FAILURE
        }
    }
}

/// Print the result of a command and pick the exit code.
pub fn finish(result: Result<f64>) -> ExitCode {
    match result {
        Ok(vol) => {
            println!("{:.6}", vol);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
