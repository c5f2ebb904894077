//! Calibration result type.

use crate::models::HestonParams;

/// Best candidate found by a grid search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOutcome {
    /// Candidate with the smallest absolute price error
    pub params: HestonParams,
    /// `|C_model − m|` for `params`; infinite when no candidate was priced
    pub residual: f64,
    /// Number of candidates priced
    pub evaluations: usize,
    /// Whether the search stopped on the early-exit threshold
    pub converged: bool,
}

impl CalibrationOutcome {
    /// Residual relative to the market price.
    pub fn relative_residual(&self, market_price: f64) -> f64 {
        self.residual / market_price
    }
}
