//! Error types for transform pricing.

use ivol_core::types::{PricingError, TransformError};
use thiserror::Error;

use crate::models::HestonError;

/// Transform pricing errors.
///
/// Every fallible step of the Carr-Madan pipeline reports one of these
/// values. The engine treats any of them as a failed configuration and moves
/// to the next step of the retry ladder.
///
/// # Examples
/// ```
/// use ivol_models::fourier::FftError;
///
/// let err = FftError::NonFinite { count: 3000, n: 4096 };
/// assert!(format!("{}", err).contains("3000 of 4096"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FftError {
    /// A configuration value is outside its valid range.
    #[error("Invalid FFT configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        /// Name of the rejected field
        field: &'static str,
        /// Rejected value
        value: f64,
        /// Constraint that was violated
        reason: &'static str,
    },

    /// Too many transform outputs were not finite.
    #[error("Transform produced {count} of {n} non-finite values")]
    NonFinite {
        /// Number of non-finite outputs
        count: usize,
        /// Transform length
        n: usize,
    },

    /// The cached prices bracketing a strike are not finite.
    #[error("Cached prices around strike {strike} are not finite")]
    CacheCorrupt {
        /// Queried strike
        strike: f64,
    },

    /// A lookup was attempted on an empty cache.
    #[error("Strike grid cache is empty")]
    EmptyCache,

    /// The fractional DFT rejected its plan or input.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Heston parameters failed validation.
    #[error(transparent)]
    Heston(#[from] HestonError),
}

impl FftError {
    /// Returns `true` for errors caused by the caller's configuration or
    /// parameters rather than by the numerics.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, FftError::InvalidConfig { .. } | FftError::Heston(_))
    }
}

impl From<FftError> for PricingError {
    fn from(err: FftError) -> Self {
        if err.is_invalid_input() {
            PricingError::InvalidInput(err.to_string())
        } else {
            PricingError::NumericalInstability(err.to_string())
        }
    }
}
