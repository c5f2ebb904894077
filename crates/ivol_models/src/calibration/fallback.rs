//! Post-processing and fallback volatilities for the Heston path.
//!
//! Every volatility leaving this module lies in `[VOL_FLOOR, VOL_CAP]`.

use std::f64::consts::PI;

use tracing::debug;

use super::result::CalibrationOutcome;
use crate::quote::CallQuote;

/// Smallest volatility returned by the Heston path.
pub const VOL_FLOOR: f64 = 0.05;

/// Largest volatility returned by the Heston path.
pub const VOL_CAP: f64 = 1.5;

/// Returned when the anchor fails and the ATM approximation is implausible.
pub const DEFAULT_VOL: f64 = 0.30;

/// Returned when every transform configuration failed and the anchor is
/// unusable.
pub const LAST_RESORT_VOL: f64 = 0.25;

/// Upper limit for accepting the ATM approximation.
const ATM_APPROX_CAP: f64 = 1.0;

/// Residual, relative to the market price, above which the calibrated
/// volatility is blended with the anchor.
pub const POOR_FIT_RATIO: f64 = 0.1;

/// Clamp into `[VOL_FLOOR, VOL_CAP]`; non-finite values become
/// [`LAST_RESORT_VOL`].
pub fn clamp_vol(vol: f64) -> f64 {
    if vol.is_finite() {
        vol.clamp(VOL_FLOOR, VOL_CAP)
    } else {
        LAST_RESORT_VOL
    }
}

/// At-the-money approximation `√(2π/T) · m / S`.
pub fn atm_approximation(market_price: f64, quote: &CallQuote) -> f64 {
    (2.0 * PI / quote.expiry).sqrt() * market_price / quote.spot
}

/// Volatility used when the Black-Scholes anchor cannot be computed.
///
/// The ATM approximation when it lies in `[0.05, 1.0]`, otherwise
/// [`DEFAULT_VOL`].
///
/// # Examples
/// ```
/// use ivol_models::calibration::fallback::{anchor_failure_vol, DEFAULT_VOL};
/// use ivol_models::CallQuote;
///
/// let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// // √(2π) · 8 / 100 ≈ 0.2005
/// assert!((anchor_failure_vol(8.0, &quote) - 0.2005).abs() < 1e-3);
/// assert_eq!(anchor_failure_vol(80.0, &quote), DEFAULT_VOL);
/// ```
pub fn anchor_failure_vol(market_price: f64, quote: &CallQuote) -> f64 {
    let approx = atm_approximation(market_price, quote);
    if (VOL_FLOOR..=ATM_APPROX_CAP).contains(&approx) {
        approx
    } else {
        DEFAULT_VOL
    }
}

/// Volatility used when every transform configuration failed: the anchor
/// clamped into range, or [`LAST_RESORT_VOL`] when there is no usable
/// anchor.
pub fn ladder_exhausted_vol(anchor_vol: f64) -> f64 {
    if anchor_vol.is_finite() && anchor_vol > 0.0 {
        clamp_vol(anchor_vol)
    } else {
        LAST_RESORT_VOL
    }
}

/// Strike and term adjustment added to the calibrated volatility.
///
/// - Strike: `+0.05·(K/S − 1.2)` above 1.2, `+0.03·(0.8 − K/S)` below 0.8
/// - Term: `+0.02·(0.1 − T)/0.1` below 0.1, `−0.01·(T − 1)` above 1
pub fn skew_adjustment(quote: &CallQuote) -> f64 {
    let moneyness = quote.moneyness();
    let expiry = quote.expiry;

    let strike_term = if moneyness > 1.2 {
        0.05 * (moneyness - 1.2)
    } else if moneyness < 0.8 {
        0.03 * (0.8 - moneyness)
    } else {
        0.0
    };

    let term = if expiry < 0.1 {
        0.02 * (0.1 - expiry) / 0.1
    } else if expiry > 1.0 {
        -0.01 * (expiry - 1.0)
    } else {
        0.0
    };

    strike_term + term
}

/// Turn a calibration outcome into the returned volatility.
///
/// With residual at most `0.1·m` the result is `√v0 + adjustment`, clamped.
/// Above that the fit is blended with the anchor:
/// `w·√v0 + (1 − w)·σ_bs + adjustment/2` with `w = 1 − min(1, residual/m)`,
/// replaced by the clamped anchor when it leaves `[0.05, 1.5]`.
pub fn finalize(
    outcome: &CalibrationOutcome,
    anchor_vol: f64,
    market_price: f64,
    quote: &CallQuote,
) -> f64 {
    let model_vol = outcome.params.v0.sqrt();
    let adjustment = skew_adjustment(quote);

    if outcome.residual > POOR_FIT_RATIO * market_price {
        let weight = 1.0 - outcome.relative_residual(market_price).min(1.0);
        let blended = weight * model_vol + (1.0 - weight) * anchor_vol + 0.5 * adjustment;
        debug!(
            residual = outcome.residual,
            weight, blended, "poor calibration, blending with anchor"
        );
        if (VOL_FLOOR..=VOL_CAP).contains(&blended) {
            blended
        } else {
            ladder_exhausted_vol(anchor_vol)
        }
    } else {
        clamp_vol(model_vol + adjustment)
    }
}
