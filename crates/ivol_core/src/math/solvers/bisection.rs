//! Bisection root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Bisection root finder.
///
/// Halves a sign-changing bracket until `|f(x)| < tolerance`. Slower than
/// Brent-type methods but needs nothing beyond continuity, so it behaves
/// predictably on flat or nearly flat functions such as deep out-of-the-money
/// option prices as a function of volatility.
///
/// Both increasing and decreasing functions are supported, and the bracket
/// endpoints may be given in either order.
///
/// # Example
///
/// ```
/// use ivol_core::math::solvers::{BisectionSolver, SolverConfig};
///
/// let solver = BisectionSolver::new(SolverConfig::default());
///
/// // Solve x³ - x - 2 = 0 in bracket [1, 2]
/// let f = |x: f64| x * x * x - x - 2.0;
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BisectionSolver<T: Float> {
    /// Solver configuration
    config: SolverConfig<T>,
}

impl<T: Float> BisectionSolver<T> {
    /// Create a new bisection solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// # Returns
    ///
    /// * `Ok(x)` - Point where `|f(x)| < tolerance`, or the midpoint once the
    ///   bracket can no longer be split in floating point
    /// * `Err(SolverError::NoBracket)` - `f(a)` and `f(b)` have the same sign
    /// * `Err(SolverError::NumericalInstability)` - `f` returned NaN or infinity
    /// * `Err(SolverError::MaxIterationsExceeded)` - Failed to converge
    /// * `Err(SolverError::InvalidConfig)` - Unusable tolerance or iteration limit
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        self.config.validate()?;
        let tol = self.config.tolerance;

        let (mut lo, mut hi) = if a <= b { (a, b) } else { (b, a) };
        let mut f_lo = evaluate(&f, lo)?;
        let f_hi = evaluate(&f, hi)?;

        if f_lo.abs() < tol {
            return Ok(lo);
        }
        if f_hi.abs() < tol {
            return Ok(hi);
        }
        if (f_lo > T::zero()) == (f_hi > T::zero()) {
            return Err(SolverError::NoBracket {
                a: lo.to_f64().unwrap_or(f64::NAN),
                b: hi.to_f64().unwrap_or(f64::NAN),
            });
        }

        let two = T::one() + T::one();
        for _iteration in 0..self.config.max_iterations {
            let mid = lo + (hi - lo) / two;
            let f_mid = evaluate(&f, mid)?;

            if f_mid.abs() < tol {
                return Ok(mid);
            }
            // Bracket exhausted at floating-point resolution
            if mid <= lo || mid >= hi {
                return Ok(mid);
            }

            if (f_mid > T::zero()) == (f_lo > T::zero()) {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }
}

fn evaluate<T, F>(f: &F, x: T) -> Result<T, SolverError>
where
    T: Float,
    F: Fn(T) -> T,
{
    let y = f(x);
    if y.is_finite() {
        Ok(y)
    } else {
        Err(SolverError::NumericalInstability(format!(
            "f({}) is not finite",
            x.to_f64().unwrap_or(f64::NAN)
        )))
    }
}
