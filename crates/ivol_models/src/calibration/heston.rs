//! Heston calibration to a single call price.
//!
//! ## Seeding
//!
//! From the Black-Scholes anchor `σ_bs`, moneyness `K/S` and expiry `T`:
//!
//! | | value |
//! |---|---|
//! | `v0 = θ` | `σ_bs²`, ×1.1 for `K/S > 1.05`, ×1.05 for `K/S < 0.95` |
//! | `κ` | 1.0; 3.0 for `T < 0.1`; 0.5 for `T > 1` |
//! | `(σ, ρ)` | `(0.6, −0.75)` OTM, `(0.4, −0.5)` ITM, `(0.5, −0.6)` otherwise |
//! | `σ` scale | ×0.8 for `T > 1`, ×1.3 for `T < 0.1` |
//!
//! ## Search
//!
//! Nested loops `v0 → κ → σ → ρ` (`ρ` innermost), each visiting its
//! candidates from the seed outwards, with `θ = v0` throughout. At most
//! [`MAX_EVALUATIONS`] candidates are priced; the search stops as soon as
//! the best residual drops below `0.005·m`.

use tracing::debug;

use super::result::CalibrationOutcome;
use crate::models::HestonParams;
use crate::quote::CallQuote;

/// Maximum number of candidates priced per calibration.
pub const MAX_EVALUATIONS: usize = 50;

/// Default early-exit threshold as a fraction of the market price.
const EARLY_EXIT_RATIO: f64 = 0.005;

const V0_FACTORS: [f64; 5] = [1.0, 0.85, 1.15, 0.7, 1.3];
const KAPPA_FACTORS: [f64; 3] = [1.0, 1.5, 0.5];
const SIGMA_FACTORS: [f64; 3] = [1.0, 0.8, 1.2];
const RHO_OFFSETS: [f64; 5] = [0.0, -0.1, 0.1, -0.2, 0.2];

const RHO_MIN: f64 = -0.9;
const RHO_MAX: f64 = 0.0;

/// Initial Heston parameters for a quote with Black-Scholes volatility
/// `anchor_vol`.
///
/// # Examples
/// ```
/// use ivol_models::calibration::seed_parameters;
/// use ivol_models::CallQuote;
///
/// let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// let seed = seed_parameters(&quote, 0.2);
/// assert!((seed.v0 - 0.04).abs() < 1e-12);
/// assert_eq!(seed.kappa, 1.0);
/// assert_eq!((seed.sigma, seed.rho), (0.5, -0.6));
/// ```
pub fn seed_parameters(quote: &CallQuote, anchor_vol: f64) -> HestonParams {
    let moneyness = quote.moneyness();
    let expiry = quote.expiry;

    let mut variance = anchor_vol * anchor_vol;
    if moneyness > 1.05 {
        variance *= 1.1;
    } else if moneyness < 0.95 {
        variance *= 1.05;
    }

    let kappa = if expiry < 0.1 {
        3.0
    } else if expiry > 1.0 {
        0.5
    } else {
        1.0
    };

    let (mut sigma, rho) = if moneyness > 1.05 {
        (0.6, -0.75)
    } else if moneyness < 0.95 {
        (0.4, -0.5)
    } else {
        (0.5, -0.6)
    };
    if expiry > 1.0 {
        sigma *= 0.8;
    } else if expiry < 0.1 {
        sigma *= 1.3;
    }

    HestonParams {
        v0: variance,
        kappa,
        theta: variance,
        sigma,
        rho,
    }
}

/// Candidate parameters around a seed, in search order.
///
/// Yields `5 × 3 × 3 × 5 = 225` candidates; `ρ` varies fastest and is
/// clamped to `[−0.9, 0]`.
#[derive(Debug, Clone)]
pub struct ParameterGrid {
    seed: HestonParams,
    index: usize,
}

impl ParameterGrid {
    const LEN: usize =
        V0_FACTORS.len() * KAPPA_FACTORS.len() * SIGMA_FACTORS.len() * RHO_OFFSETS.len();

    /// Grid around `seed`.
    pub fn new(seed: HestonParams) -> Self {
        Self { seed, index: 0 }
    }

    fn candidate(&self, index: usize) -> HestonParams {
        let rho_i = index % RHO_OFFSETS.len();
        let rest = index / RHO_OFFSETS.len();
        let sigma_i = rest % SIGMA_FACTORS.len();
        let rest = rest / SIGMA_FACTORS.len();
        let kappa_i = rest % KAPPA_FACTORS.len();
        let v0_i = rest / KAPPA_FACTORS.len();

        let v0 = self.seed.v0 * V0_FACTORS[v0_i];
        HestonParams {
            v0,
            kappa: self.seed.kappa * KAPPA_FACTORS[kappa_i],
            theta: v0,
            sigma: self.seed.sigma * SIGMA_FACTORS[sigma_i],
            rho: (self.seed.rho + RHO_OFFSETS[rho_i]).clamp(RHO_MIN, RHO_MAX),
        }
    }
}

impl Iterator for ParameterGrid {
    type Item = HestonParams;

    fn next(&mut self) -> Option<HestonParams> {
        if self.index >= Self::LEN {
            return None;
        }
        let params = self.candidate(self.index);
        self.index += 1;
        Some(params)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = Self::LEN - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ParameterGrid {}

/// Grid-search calibrator.
///
/// # Examples
/// ```
/// use ivol_models::calibration::{seed_parameters, HestonCalibrator};
/// use ivol_models::CallQuote;
///
/// let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// let seed = seed_parameters(&quote, 0.2);
///
/// // Pricer whose error shrinks with v0; the first 50 candidates reach
/// // the 0.85 factor but not the 0.7 one
/// let outcome = HestonCalibrator::default()
///     .calibrate(1.0, &seed, |p| Ok::<_, ()>(1.0 + p.v0))
///     .unwrap();
/// assert_eq!(outcome.evaluations, 50);
/// assert!((outcome.params.v0 - 0.04 * 0.85).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonCalibrator {
    max_evaluations: usize,
    early_exit_ratio: f64,
}

impl Default for HestonCalibrator {
    fn default() -> Self {
        Self {
            max_evaluations: MAX_EVALUATIONS,
            early_exit_ratio: EARLY_EXIT_RATIO,
        }
    }
}

impl HestonCalibrator {
    /// Create a calibrator with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of candidates priced.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set the early-exit threshold as a fraction of the market price.
    pub fn with_early_exit_ratio(mut self, ratio: f64) -> Self {
        self.early_exit_ratio = ratio;
        self
    }

    /// Maximum number of candidates priced.
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Search the grid around `seed` for the candidate whose model price is
    /// closest to `market_price`.
    ///
    /// `price` returns the model price for a candidate. Non-finite prices
    /// never become the best candidate. The first error returned by `price`
    /// aborts the search and is propagated.
    pub fn calibrate<F, E>(
        &self,
        market_price: f64,
        seed: &HestonParams,
        mut price: F,
    ) -> Result<CalibrationOutcome, E>
    where
        F: FnMut(&HestonParams) -> Result<f64, E>,
    {
        let threshold = self.early_exit_ratio * market_price;
        let mut best = CalibrationOutcome {
            params: *seed,
            residual: f64::INFINITY,
            evaluations: 0,
            converged: false,
        };

        for candidate in ParameterGrid::new(*seed).take(self.max_evaluations) {
            let model_price = price(&candidate)?;
            best.evaluations += 1;

            let residual = (model_price - market_price).abs();
            if residual < best.residual {
                best.params = candidate;
                best.residual = residual;
                debug!(
                    evaluation = best.evaluations,
                    v0 = candidate.v0,
                    kappa = candidate.kappa,
                    sigma = candidate.sigma,
                    rho = candidate.rho,
                    model_price,
                    residual,
                    "improved calibration candidate"
                );
            }
            if best.residual < threshold {
                best.converged = true;
                break;
            }
        }

        Ok(best)
    }
}
