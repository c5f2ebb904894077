//! Error types for analytical pricing operations.
//!
//! This module provides:
//! - `AnalyticalError`: Errors from Black-Scholes pricing and implied
//!   volatility inversion

use ivol_core::types::PricingError;
use thiserror::Error;

/// Analytical pricing errors.
///
/// # Variants
/// - `InvalidSpot`, `InvalidStrike`, `InvalidExpiry`, `InvalidVolatility`,
///   `InvalidRate`, `InvalidDividend`, `InvalidPrice`: input outside its domain
/// - `ArbitrageViolation`: market price below the no-arbitrage lower bound
/// - `NoBracket`: market price outside the prices spanned by the volatility
///   bracket
/// - `NumericalInstability`: Computation encountered numerical issues
///
/// # Examples
/// ```
/// use ivol_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// assert!(err.is_invalid_input());
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Invalid spot price (non-positive or not finite).
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Invalid strike price (non-positive or not finite).
    #[error("Invalid strike price: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Invalid time to expiry (non-positive or not finite).
    #[error("Invalid time to expiry: T = {expiry}")]
    InvalidExpiry {
        /// The invalid expiry value
        expiry: f64,
    },

    /// Invalid volatility (non-positive or not finite).
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Invalid risk-free rate (not finite).
    #[error("Invalid risk-free rate: r = {rate}")]
    InvalidRate {
        /// The invalid rate value
        rate: f64,
    },

    /// Invalid dividend yield (negative or not finite).
    #[error("Invalid dividend yield: q = {dividend}")]
    InvalidDividend {
        /// The invalid dividend yield
        dividend: f64,
    },

    /// Invalid market price (non-positive or not finite).
    #[error("Invalid market price: {price}")]
    InvalidPrice {
        /// The invalid market price
        price: f64,
    },

    /// Market price below `max(0, S·e^{-qT} − K·e^{-rT})`.
    #[error("Market price {price} violates no-arbitrage lower bound {lower_bound}")]
    ArbitrageViolation {
        /// Observed market price
        price: f64,
        /// No-arbitrage lower bound
        lower_bound: f64,
    },

    /// Market price not bracketed by the model prices at the volatility bounds.
    #[error("Market price {price} outside bracket [{low}, {high}]")]
    NoBracket {
        /// Observed market price
        price: f64,
        /// Model price at the lower volatility bound
        low: f64,
        /// Model price at the upper volatility bound
        high: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {message}")]
    NumericalInstability {
        /// Description of the numerical issue
        message: String,
    },
}

impl AnalyticalError {
    /// Returns `true` when the error is caused by an input outside its
    /// domain. These errors are surfaced immediately with no fallback.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalyticalError::InvalidSpot { .. }
                | AnalyticalError::InvalidStrike { .. }
                | AnalyticalError::InvalidExpiry { .. }
                | AnalyticalError::InvalidVolatility { .. }
                | AnalyticalError::InvalidRate { .. }
                | AnalyticalError::InvalidDividend { .. }
                | AnalyticalError::InvalidPrice { .. }
        )
    }
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        if err.is_invalid_input() {
            return PricingError::InvalidInput(err.to_string());
        }
        match err {
            AnalyticalError::NumericalInstability { .. } => {
                PricingError::NumericalInstability(err.to_string())
            }
            _ => PricingError::ModelFailure(err.to_string()),
        }
    }
}
