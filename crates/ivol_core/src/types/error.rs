//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors surfaced by pricing entry points
//! - `SolverError`: Errors from root-finding solvers
//! - `TransformError`: Errors from Fourier transform planning and execution

use std::fmt;
use thiserror::Error;

/// Categorised pricing errors.
///
/// Top-level error for pricing entry points. Lower-level errors from the
/// model crates convert into this type.
///
/// # Variants
/// - `InvalidInput`: Invalid market data or parameters
/// - `NumericalInstability`: Computation produced unusable numbers
/// - `ModelFailure`: Model assumptions violated
///
/// # Examples
/// ```
/// use ivol_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("Negative spot price".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: Negative spot price");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Invalid input data or parameters
    InvalidInput(String),

    /// Numerical instability during computation
    NumericalInstability(String),

    /// Model failed to produce valid result
    ModelFailure(String),
}

impl PricingError {
    /// Returns `true` for errors caused by the caller's inputs.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PricingError::InvalidInput(_))
    }
}

impl fmt::Display for PricingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            PricingError::NumericalInstability(msg) => {
                write!(f, "Numerical instability: {}", msg)
            }
            PricingError::ModelFailure(msg) => write!(f, "Model failure: {}", msg),
        }
    }
}

impl std::error::Error for PricingError {}

/// Root-finding solver errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `NumericalInstability`: Function returned a non-finite value
/// - `InvalidConfig`: Tolerance or iteration limit unusable
///
/// # Examples
/// ```
/// use ivol_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Function evaluation produced NaN or infinity.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Solver configuration rejected before iterating.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Fourier transform errors.
///
/// # Examples
/// ```
/// use ivol_core::types::TransformError;
///
/// let err = TransformError::LengthMismatch { expected: 8, got: 4 };
/// assert!(format!("{}", err).contains("expected 8"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformError {
    /// Transform length is not a supported size.
    #[error("Invalid transform length {n}: must be a power of two >= 2")]
    InvalidLength {
        /// Requested length
        n: usize,
    },

    /// Frequency scale is not finite and positive.
    #[error("Invalid frequency scale {beta}: must be finite and positive")]
    InvalidScale {
        /// Requested scale
        beta: f64,
    },

    /// Input buffer length does not match the planned length.
    #[error("Input length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Planned transform length
        expected: usize,
        /// Supplied buffer length
        got: usize,
    },
}
