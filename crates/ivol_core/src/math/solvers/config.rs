//! Solver configuration types.

use crate::types::SolverError;
use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerance (e.g., `f64`)
///
/// # Example
///
/// ```
/// use ivol_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
/// assert_eq!(config.max_iterations, 100);
///
/// let price_match = SolverConfig::<f64>::price_matching();
/// assert_eq!(price_match.tolerance, 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance for root finding.
    ///
    /// The solver stops when `|f(x)| < tolerance`.
    pub tolerance: T,

    /// Maximum number of iterations before giving up.
    ///
    /// If the solver doesn't converge within this limit,
    /// it returns `SolverError::MaxIterationsExceeded`.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Default values:
    /// - `tolerance`: 1e-10
    /// - `max_iterations`: 100
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a new configuration with specified values.
    ///
    /// Values are checked by [`SolverConfig::validate`] when a solver runs.
    pub fn new(tolerance: T, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Tolerance of 1e-6 in price units with 100 iterations.
    ///
    /// This is the setting the implied-volatility bisection uses: one
    /// millionth of a currency unit is below any quoted tick size.
    pub fn price_matching() -> Self {
        Self {
            tolerance: T::from(1e-6).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }

    /// Check that the tolerance is finite and positive and that at least one
    /// iteration is allowed.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance.is_finite() && self.tolerance > T::zero()) {
            return Err(SolverError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance.to_f64().unwrap_or(f64::NAN)
            )));
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
