//! Transform grid configuration.

use std::f64::consts::PI;

use super::error::FftError;
use crate::quote::CallQuote;

/// One step of the retry ladder: grid size, damping and frequency spacing
/// swapped in after a failed transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderStep {
    /// Grid size
    pub n: usize,
    /// Damping exponent
    pub alpha: f64,
    /// Frequency spacing
    pub eta: f64,
}

/// Configurations tried, in order, after the adapted configuration fails.
pub const RETRY_LADDER: [LadderStep; 2] = [
    LadderStep {
        n: 8192,
        alpha: 1.0,
        eta: 0.1,
    },
    LadderStep {
        n: 2048,
        alpha: 1.25,
        eta: 0.075,
    },
];

/// Moneyness above which the grid is widened.
const WIDE_MONEYNESS_HIGH: f64 = 1.5;
/// Moneyness below which the grid is widened.
const WIDE_MONEYNESS_LOW: f64 = 0.7;
/// Expiry below which the frequency grid is refined.
const SHORT_EXPIRY: f64 = 0.1;
/// Expiry above which the frequency grid is coarsened.
const LONG_EXPIRY: f64 = 2.0;

/// Carr-Madan grid configuration.
///
/// | Field | Default | Meaning |
/// |---|---|---|
/// | `n` | 4096 | grid size, a power of two |
/// | `eta` | 0.05 | spacing of the frequency grid |
/// | `alpha` | 1.5 | damping exponent |
/// | `log_strike_range` | 3.0 | half-width `R` of the log-strike grid around `ln S` |
/// | `cache_tolerance` | 1e-5 | absolute tolerance for cache key comparison |
///
/// # Examples
/// ```
/// use ivol_models::fourier::FftConfig;
///
/// let config = FftConfig::default().with_n(8192).unwrap();
/// assert_eq!(config.n(), 8192);
/// assert!(FftConfig::default().with_n(1000).is_err());
/// assert!((config.strike_spacing() - 6.0 / 8192.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FftConfig {
    n: usize,
    eta: f64,
    alpha: f64,
    log_strike_range: f64,
    cache_tolerance: f64,
}

impl Default for FftConfig {
    fn default() -> Self {
        Self {
            n: 4096,
            eta: 0.05,
            alpha: 1.5,
            log_strike_range: 3.0,
            cache_tolerance: 1e-5,
        }
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<f64, FftError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FftError::InvalidConfig {
            field,
            value,
            reason: "must be finite and positive",
        })
    }
}

fn check_grid_size(n: usize) -> Result<usize, FftError> {
    if n >= 4 && n.is_power_of_two() {
        Ok(n)
    } else {
        Err(FftError::InvalidConfig {
            field: "n",
            value: n as f64,
            reason: "must be a power of two >= 4",
        })
    }
}

impl FftConfig {
    /// Build a configuration, validating every field.
    pub fn new(
        n: usize,
        eta: f64,
        alpha: f64,
        log_strike_range: f64,
        cache_tolerance: f64,
    ) -> Result<Self, FftError> {
        let config = Self {
            n,
            eta,
            alpha,
            log_strike_range,
            cache_tolerance,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its valid range.
    pub fn validate(&self) -> Result<(), FftError> {
        check_grid_size(self.n)?;
        check_positive("eta", self.eta)?;
        check_positive("alpha", self.alpha)?;
        check_positive("log_strike_range", self.log_strike_range)?;
        check_positive("cache_tolerance", self.cache_tolerance)?;
        Ok(())
    }

    /// Replace the grid size.
    pub fn with_n(mut self, n: usize) -> Result<Self, FftError> {
        self.n = check_grid_size(n)?;
        Ok(self)
    }

    /// Replace the frequency spacing.
    pub fn with_eta(mut self, eta: f64) -> Result<Self, FftError> {
        self.eta = check_positive("eta", eta)?;
        Ok(self)
    }

    /// Replace the damping exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Result<Self, FftError> {
        self.alpha = check_positive("alpha", alpha)?;
        Ok(self)
    }

    /// Replace the log-strike half-width.
    pub fn with_log_strike_range(mut self, range: f64) -> Result<Self, FftError> {
        self.log_strike_range = check_positive("log_strike_range", range)?;
        Ok(self)
    }

    /// Replace the cache key tolerance.
    pub fn with_cache_tolerance(mut self, tolerance: f64) -> Result<Self, FftError> {
        self.cache_tolerance = check_positive("cache_tolerance", tolerance)?;
        Ok(self)
    }

    /// Grid size.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Frequency spacing.
    #[inline]
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Damping exponent.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Half-width of the log-strike grid.
    #[inline]
    pub fn log_strike_range(&self) -> f64 {
        self.log_strike_range
    }

    /// Absolute tolerance for cache key comparison.
    #[inline]
    pub fn cache_tolerance(&self) -> f64 {
        self.cache_tolerance
    }

    /// Log-strike spacing of a plain length-`n` DFT, `2π / (nη)`.
    pub fn lambda(&self) -> f64 {
        2.0 * PI / (self.n as f64 * self.eta)
    }

    /// Log-strike spacing of the output grid, `2R / n`.
    pub fn strike_spacing(&self) -> f64 {
        2.0 * self.log_strike_range / self.n as f64
    }

    /// Scale of the fractional DFT mapping the frequency grid onto the
    /// log-strike grid, `η · (2R/n) / 2π`.
    pub fn frequency_scale(&self) -> f64 {
        self.eta * self.strike_spacing() / (2.0 * PI)
    }

    /// Configuration adjusted to the quote's moneyness and expiry.
    ///
    /// - `K/S > 1.5` or `K/S < 0.7`: `n = 8192`, `R = 4`
    /// - `T < 0.1`: `η = 0.025`, `α = 1.25`
    /// - `T > 2`: `η = 0.1`
    ///
    /// The rules touch disjoint fields, so the result does not depend on
    /// the order they are applied in.
    pub fn adapted_for(&self, quote: &CallQuote) -> Self {
        let mut adapted = *self;
        let moneyness = quote.moneyness();
        if moneyness > WIDE_MONEYNESS_HIGH || moneyness < WIDE_MONEYNESS_LOW {
            adapted.n = 8192;
            adapted.log_strike_range = 4.0;
        }
        if quote.expiry < SHORT_EXPIRY {
            adapted.eta = 0.025;
            adapted.alpha = 1.25;
        } else if quote.expiry > LONG_EXPIRY {
            adapted.eta = 0.1;
        }
        adapted
    }

    /// Configuration with the ladder step's grid size, damping and spacing.
    pub fn with_ladder_step(&self, step: &LadderStep) -> Self {
        Self {
            n: step.n,
            alpha: step.alpha,
            eta: step.eta,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quote(strike: f64, expiry: f64) -> CallQuote {
        CallQuote::new(100.0, strike, expiry, 0.05, 0.0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let c = FftConfig::default();
        assert_eq!(c.n(), 4096);
        assert_eq!(c.eta(), 0.05);
        assert_eq!(c.alpha(), 1.5);
        assert_eq!(c.log_strike_range(), 3.0);
        assert_eq!(c.cache_tolerance(), 1e-5);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_derived_quantities() {
        let c = FftConfig::default();
        assert_relative_eq!(c.lambda(), 2.0 * PI / 204.8, epsilon = 1e-15);
        assert_relative_eq!(c.strike_spacing(), 6.0 / 4096.0, epsilon = 1e-15);
        assert_relative_eq!(
            c.frequency_scale(),
            0.05 * 6.0 / 4096.0 / (2.0 * PI),
            epsilon = 1e-18
        );
    }

    #[test]
    fn test_setters_reject_invalid() {
        let c = FftConfig::default();
        assert!(c.with_n(3000).is_err());
        assert!(c.with_n(2).is_err());
        assert!(c.with_eta(0.0).is_err());
        assert!(c.with_alpha(-1.0).is_err());
        assert!(c.with_log_strike_range(f64::INFINITY).is_err());
        assert!(c.with_cache_tolerance(f64::NAN).is_err());
        assert_eq!(c.with_alpha(1.25).unwrap().alpha(), 1.25);
    }

    #[test]
    fn test_new_validates() {
        assert!(FftConfig::new(4096, 0.05, 1.5, 3.0, 1e-5).is_ok());
        match FftConfig::new(4096, -0.05, 1.5, 3.0, 1e-5) {
            Err(FftError::InvalidConfig { field, .. }) => assert_eq!(field, "eta"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_adapted_atm_one_year_unchanged() {
        let c = FftConfig::default();
        assert_eq!(c.adapted_for(&quote(100.0, 1.0)), c);
    }

    #[test]
    fn test_adapted_wide_moneyness() {
        let c = FftConfig::default();
        for strike in [160.0, 60.0] {
            let a = c.adapted_for(&quote(strike, 1.0));
            assert_eq!(a.n(), 8192);
            assert_eq!(a.log_strike_range(), 4.0);
            assert_eq!(a.eta(), c.eta());
        }
        // thresholds are strict
        assert_eq!(c.adapted_for(&quote(150.0, 1.0)).n(), 4096);
        assert_eq!(c.adapted_for(&quote(70.0, 1.0)).n(), 4096);
    }

    #[test]
    fn test_adapted_expiry() {
        let c = FftConfig::default();
        let short = c.adapted_for(&quote(130.0, 0.08));
        assert_eq!(short.eta(), 0.025);
        assert_eq!(short.alpha(), 1.25);
        assert_eq!(short.n(), 4096);

        let long = c.adapted_for(&quote(100.0, 3.0));
        assert_eq!(long.eta(), 0.1);
        assert_eq!(long.alpha(), 1.5);
    }

    #[test]
    fn test_adapted_is_idempotent() {
        let c = FftConfig::default();
        let q = quote(200.0, 0.05);
        let once = c.adapted_for(&q);
        assert_eq!(once.adapted_for(&q), once);
    }

    #[test]
    fn test_ladder_step_keeps_range_and_tolerance() {
        let c = FftConfig::default().with_log_strike_range(4.0).unwrap();
        let stepped = c.with_ladder_step(&RETRY_LADDER[1]);
        assert_eq!(stepped.n(), 2048);
        assert_eq!(stepped.alpha(), 1.25);
        assert_eq!(stepped.eta(), 0.075);
        assert_eq!(stepped.log_strike_range(), 4.0);
        assert_eq!(stepped.cache_tolerance(), 1e-5);
        assert!(stepped.validate().is_ok());
    }
}
