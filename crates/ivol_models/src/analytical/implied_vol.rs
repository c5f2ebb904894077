//! Black-Scholes implied volatility by bisection.
//!
//! The call price is strictly increasing in σ, so a sign-changing bracket
//! `[σ_lo, σ_hi]` contains exactly one root of `C(σ) − m`. The solver
//! rejects quotes below the no-arbitrage lower bound and quotes outside
//! `[C(σ_lo), C(σ_hi)]` before iterating.

use ivol_core::math::solvers::{BisectionSolver, SolverConfig};
use ivol_core::types::SolverError;

use super::black_scholes::BlackScholes;
use super::error::AnalyticalError;
use crate::quote::CallQuote;

/// Lower end of the volatility bracket.
pub const VOL_LOWER: f64 = 0.001;

/// Upper end of the volatility bracket.
pub const VOL_UPPER: f64 = 2.0;

/// Bisection implied-volatility solver.
///
/// Defaults: bracket `[0.001, 2.0]`, at most 100 iterations, stop when the
/// model price is within 1e-6 of the market price.
///
/// # Examples
/// ```
/// use ivol_models::analytical::ImpliedVolSolver;
/// use ivol_models::CallQuote;
///
/// let solver = ImpliedVolSolver::default();
/// let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// let vol = solver.solve(10.45, &quote).unwrap();
/// assert!((vol - 0.2).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolSolver {
    config: SolverConfig<f64>,
    lower: f64,
    upper: f64,
}

impl Default for ImpliedVolSolver {
    fn default() -> Self {
        Self {
            config: SolverConfig::price_matching(),
            lower: VOL_LOWER,
            upper: VOL_UPPER,
        }
    }
}

impl ImpliedVolSolver {
    /// Solver with a custom tolerance and iteration limit on the default bracket.
    pub fn new(config: SolverConfig<f64>) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the volatility bracket.
    pub fn with_bracket(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// The volatility bracket `(σ_lo, σ_hi)`.
    pub fn bracket(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig<f64> {
        &self.config
    }

    /// Find σ such that the Black-Scholes price of `quote` equals `price`.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidPrice` if `price` is not finite and positive
    /// - any [`CallQuote::validate`] error
    /// - `AnalyticalError::ArbitrageViolation` if `price` is below the
    ///   no-arbitrage lower bound
    /// - `AnalyticalError::NoBracket` if `price` lies outside
    ///   `[C(σ_lo), C(σ_hi)]`
    /// - `AnalyticalError::NumericalInstability` if bisection fails to converge
    pub fn solve(&self, price: f64, quote: &CallQuote) -> Result<f64, AnalyticalError> {
        if !(price.is_finite() && price > 0.0) {
            return Err(AnalyticalError::InvalidPrice { price });
        }
        quote.validate()?;

        let lower_bound = quote.lower_bound();
        if price < lower_bound {
            return Err(AnalyticalError::ArbitrageViolation { price, lower_bound });
        }

        let low = BlackScholes::call_price(quote, self.lower)?;
        let high = BlackScholes::call_price(quote, self.upper)?;
        if price < low || price > high {
            return Err(AnalyticalError::NoBracket { price, low, high });
        }

        let objective = |vol: f64| {
            BlackScholes::call_price(quote, vol).map_or(f64::NAN, |model| model - price)
        };

        BisectionSolver::new(self.config)
            .find_root(objective, self.lower, self.upper)
            .map_err(|err| match err {
                SolverError::NoBracket { .. } => AnalyticalError::NoBracket { price, low, high },
                other => AnalyticalError::NumericalInstability {
                    message: other.to_string(),
                },
            })
    }
}
