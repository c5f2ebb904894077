//! Carr-Madan call prices on a log-strike grid.

use std::f64::consts::PI;

use ivol_core::math::fourier::FractionalDft;
use ivol_core::types::TransformError;
use num_complex::Complex64;
use tracing::trace;

use super::config::FftConfig;
use super::error::FftError;
use super::precompute::Precomputation;
use crate::models::HestonParams;
use crate::quote::MarketState;

/// Call prices on the grid `K_i = S·exp(−R + i·2R/n)`, `i = 0..n`.
///
/// Strikes are strictly increasing. Queries between two nodes are
/// interpolated linearly in `K`; queries outside the grid return the price
/// at the nearest end.
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeGrid {
    strikes: Vec<f64>,
    prices: Vec<f64>,
}

impl StrikeGrid {
    /// Grid nodes `K_i`.
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Call prices `C(K_i)`.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.strikes.len()
    }

    /// Whether the grid has no nodes.
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    /// Call price at `strike`.
    ///
    /// # Errors
    ///
    /// * `FftError::EmptyCache` - the grid has no nodes
    /// * `FftError::CacheCorrupt` - the price returned or the bracketing
    ///   prices are not finite
    pub fn price_at(&self, strike: f64) -> Result<f64, FftError> {
        let (first, last) = match (self.strikes.first(), self.strikes.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Err(FftError::EmptyCache),
        };

        let price = if strike <= first {
            self.prices[0]
        } else if strike >= last {
            self.prices[self.prices.len() - 1]
        } else {
            // first < strike < last, so 1 <= upper <= len - 1
            let upper = self.strikes.partition_point(|&k| k <= strike);
            let (k0, k1) = (self.strikes[upper - 1], self.strikes[upper]);
            let (c0, c1) = (self.prices[upper - 1], self.prices[upper]);
            if !(c0.is_finite() && c1.is_finite()) {
                return Err(FftError::CacheCorrupt { strike });
            }
            c0 + (strike - k0) / (k1 - k0) * (c1 - c0)
        };

        if price.is_finite() {
            Ok(price)
        } else {
            Err(FftError::CacheCorrupt { strike })
        }
    }
}

/// Price calls on the whole log-strike grid with one fractional DFT.
///
/// `precomputed` must hold the tables for `config`'s `(n, η, α)` and the
/// market's spot; `dft` must be planned for length `n` and scale
/// [`FftConfig::frequency_scale`].
///
/// Non-finite transform outputs are replaced by zero. When more than half
/// of them are non-finite the grid is rejected.
///
/// # Errors
///
/// * `FftError::Heston` / `FftError::InvalidConfig` - invalid inputs
/// * `FftError::Transform` - table or plan length differs from `n`
/// * `FftError::NonFinite` - more than `n/2` outputs are not finite
pub fn build_strike_grid(
    params: &HestonParams,
    market: &MarketState,
    config: &FftConfig,
    precomputed: &Precomputation,
    dft: &FractionalDft,
) -> Result<StrikeGrid, FftError> {
    params.validate()?;
    config.validate()?;

    let n = config.n();
    if precomputed.len() != n {
        return Err(TransformError::LengthMismatch {
            expected: n,
            got: precomputed.len(),
        }
        .into());
    }

    let alpha = config.alpha();
    let eta = config.eta();
    let range = config.log_strike_range();
    let discount = market.discount_factor();
    let denominator_real = alpha * alpha + alpha;

    let input: Vec<Complex64> = precomputed
        .frequencies()
        .iter()
        .zip(precomputed.weights())
        .zip(precomputed.spot_phase())
        .map(|((&v, &weight), &phase)| {
            let phi = params.characteristic_function(Complex64::new(v, -(alpha + 1.0)), market);
            let denominator = Complex64::new(denominator_real - v * v, (2.0 * alpha + 1.0) * v);
            let psi = phi * discount / denominator;
            psi * (weight * eta) * phase * Complex64::from_polar(1.0, v * range)
        })
        .collect();

    let output = dft.transform(&input)?;

    let log_spot = market.spot.ln();
    let spacing = config.strike_spacing();
    let mut non_finite = 0usize;
    let mut strikes = Vec::with_capacity(n);
    let mut prices = Vec::with_capacity(n);

    for (i, y) in output.iter().enumerate() {
        let log_strike = log_spot - range + spacing * i as f64;
        let real = if y.is_finite() {
            y.re
        } else {
            non_finite += 1;
            trace!(index = i, "non-finite transform output replaced by zero");
            0.0
        };
        strikes.push(log_strike.exp());
        prices.push((real * (-alpha * log_strike).exp() / PI).max(0.0));
    }

    if non_finite > n / 2 {
        return Err(FftError::NonFinite {
            count: non_finite,
            n,
        });
    }

    Ok(StrikeGrid { strikes, prices })
}
