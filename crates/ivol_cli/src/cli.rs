//! Command-line argument definitions.
//!
//! Positional arguments are taken as strings and parsed strictly by
//! [`QuoteArgs::parse`], so that malformed numbers produce the CLI's own
//! error lines and negative numbers reach input validation.

use clap::{Args, Parser};
use ivol_models::CallQuote;

use crate::config::FftOverrides;
use crate::error::{CliError, Result};
use crate::logging::Verbosity;

const BS_AFTER_HELP: &str = "\
Example: bs_implied_vol 10.45 100.0 100.0 1.0 0.05 0.0";

const HESTON_AFTER_HELP: &str = "\
Environment (lower precedence than flags):
  FFT_N, FFT_LOG_STRIKE_RANGE, FFT_ALPHA, FFT_ETA, FFT_CACHE_TOLERANCE

Example: heston_implied_vol --fft-n=8192 5.0 100.0 100.0 0.25 0.05 0.02

Note: Parameters are automatically adapted based on option characteristics";

/// Diagnostic output flags.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LogArgs {
    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Enable verbose debug output
    #[arg(long)]
    pub verbose_debug: bool,
}

impl LogArgs {
    /// Verbosity selected by the flags; `--verbose-debug` implies `--debug`.
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose_debug {
            Verbosity::Trace
        } else if self.debug {
            Verbosity::Debug
        } else {
            Verbosity::Quiet
        }
    }
}

/// Transform configuration overrides.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FftArgs {
    /// Set FFT points (power of 2, default: 4096)
    #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
    pub fft_n: Option<String>,

    /// Set log strike range (default: 3.0)
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub log_strike_range: Option<String>,

    /// Set Carr-Madan alpha parameter (default: 1.5)
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub alpha: Option<String>,

    /// Set grid spacing parameter (default: 0.05)
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub eta: Option<String>,

    /// Set parameter tolerance for cache reuse (default: 1e-5)
    #[arg(long, value_name = "X", allow_hyphen_values = true)]
    pub cache_tolerance: Option<String>,
}

impl FftArgs {
    /// Overrides given on the command line.
    pub fn overrides(&self) -> FftOverrides {
        FftOverrides {
            n: self.fft_n.clone(),
            log_strike_range: self.log_strike_range.clone(),
            alpha: self.alpha.clone(),
            eta: self.eta.clone(),
            cache_tolerance: self.cache_tolerance.clone(),
        }
    }
}

/// The six positional quote arguments.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct QuoteArgs {
    /// Observed call price
    #[arg(value_name = "OptionPrice")]
    pub option_price: String,

    /// Spot price of the underlying
    #[arg(value_name = "StockPrice")]
    pub stock_price: String,

    /// Strike price
    #[arg(value_name = "Strike")]
    pub strike: String,

    /// Time to expiry in years
    #[arg(value_name = "Time")]
    pub time: String,

    /// Continuously compounded risk-free rate
    #[arg(value_name = "RiskFreeRate")]
    pub rate: String,

    /// Continuously compounded dividend yield
    #[arg(value_name = "DividendYield")]
    pub dividend_yield: String,
}

impl QuoteArgs {
    /// Parse the arguments into a market price and a validated quote.
    ///
    /// # Errors
    /// `CliError::InvalidNumber` / `CliError::OutOfRange` for malformed
    /// numbers, `CliError::Calculation` for an invalid quote.
    pub fn parse(&self) -> Result<(f64, CallQuote)> {
        let price = parse_number(&self.option_price)?;
        let spot = parse_number(&self.stock_price)?;
        let strike = parse_number(&self.strike)?;
        let expiry = parse_number(&self.time)?;
        let rate = parse_number(&self.rate)?;
        let dividend = parse_number(&self.dividend_yield)?;

        let quote = CallQuote::new(spot, strike, expiry, rate, dividend)?;
        Ok((price, quote))
    }
}

/// Strictly parse a decimal number.
///
/// The whole argument must be a number; values that overflow to infinity
/// and the literals `inf` and `NaN` are out of range.
pub fn parse_number(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .map_err(|_| CliError::InvalidNumber(raw.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CliError::OutOfRange(raw.to_string()))
    }
}

/// Black-Scholes implied volatility of a European call
#[derive(Parser, Debug)]
#[command(name = "bs_implied_vol", version, long_about = None)]
#[command(allow_negative_numbers = true, after_help = BS_AFTER_HELP)]
pub struct BsCli {
    /// Diagnostic output
    #[command(flatten)]
    pub log: LogArgs,

    /// Quote
    #[command(flatten)]
    pub quote: QuoteArgs,
}

/// Heston stochastic-volatility implied volatility of a European call
#[derive(Parser, Debug)]
#[command(name = "heston_implied_vol", version, long_about = None)]
#[command(allow_negative_numbers = true, after_help = HESTON_AFTER_HELP)]
pub struct HestonCli {
    /// Diagnostic output
    #[command(flatten)]
    pub log: LogArgs,

    /// Transform overrides
    #[command(flatten)]
    pub fft: FftArgs,

    /// Quote
    #[command(flatten)]
    pub quote: QuoteArgs,
}
