//! Black-Scholes pricing of European calls with continuous dividend yield.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·e^(-qT)·N(d₁) - K·e^(-rT)·N(d₂)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r - q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! ## Guards
//!
//! - σ√T below machine epsilon: intrinsic value `max(0, S·e^(-qT) − K·e^(-rT))`
//! - non-finite d₁ or d₂: boundary value (discounted spot when d₁ → +∞,
//!   zero otherwise)
//! - the result is clamped to be non-negative

use num_traits::Float;

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;
use crate::quote::CallQuote;

/// Black-Scholes model for European call pricing.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`)
///
/// # Examples
/// ```
/// use ivol_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2).unwrap();
/// let price = bs.price_call(100.0, 1.0).unwrap();
/// assert!((price - 10.4506).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes<T: Float> {
    /// Spot price (S)
    spot: T,
    /// Risk-free interest rate (r)
    rate: T,
    /// Continuous dividend yield (q)
    dividend: T,
    /// Volatility (σ)
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot is not finite and positive
    /// - `AnalyticalError::InvalidVolatility` if volatility is not finite and positive
    /// - `AnalyticalError::InvalidRate` if rate is not finite
    /// - `AnalyticalError::InvalidDividend` if dividend is negative or not finite
    ///
    /// # Examples
    /// ```
    /// use ivol_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2).is_ok());
    /// assert!(BlackScholes::new(-100.0_f64, 0.05, 0.0, 0.2).is_err());
    /// assert!(BlackScholes::new(100.0_f64, 0.05, 0.0, 0.0).is_err());
    /// ```
    pub fn new(spot: T, rate: T, dividend: T, volatility: T) -> Result<Self, AnalyticalError> {
        let zero = T::zero();
        let as_f64 = |x: T| x.to_f64().unwrap_or(f64::NAN);

        if !(spot.is_finite() && spot > zero) {
            return Err(AnalyticalError::InvalidSpot { spot: as_f64(spot) });
        }
        if !(volatility.is_finite() && volatility > zero) {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: as_f64(volatility),
            });
        }
        if !rate.is_finite() {
            return Err(AnalyticalError::InvalidRate {
                rate: as_f64(rate),
            });
        }
        if !(dividend.is_finite() && dividend >= zero) {
            return Err(AnalyticalError::InvalidDividend {
                dividend: as_f64(dividend),
            });
        }

        Ok(Self {
            spot,
            rate,
            dividend,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// d₁ = (ln(S/K) + (r − q + σ²/2)T) / (σ√T)
    ///
    /// No guards: may be infinite or NaN for degenerate inputs.
    #[inline]
    pub fn d1(&self, strike: T, expiry: T) -> T {
        let half = T::from(0.5).unwrap_or_else(T::nan);
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let log_moneyness = (self.spot / strike).ln();
        let drift =
            (self.rate - self.dividend + half * self.volatility * self.volatility) * expiry;
        (log_moneyness + drift) / vol_sqrt_t
    }

    /// d₂ = d₁ − σ√T
    #[inline]
    pub fn d2(&self, strike: T, expiry: T) -> T {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// European call price.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidStrike` if strike is not finite and positive
    /// - `AnalyticalError::InvalidExpiry` if expiry is not finite and positive
    pub fn price_call(&self, strike: T, expiry: T) -> Result<T, AnalyticalError> {
        self.check_contract(strike, expiry)?;
        let zero = T::zero();

        let discounted_spot = self.spot * (-self.dividend * expiry).exp();
        let discounted_strike = strike * (-self.rate * expiry).exp();

        if self.volatility * expiry.sqrt() < T::epsilon() {
            return Ok((discounted_spot - discounted_strike).max(zero));
        }

        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        if !(d1.is_finite() && d2.is_finite()) {
            return Ok(if d1 > zero { discounted_spot } else { zero });
        }

        let price = discounted_spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2);
        Ok(price.max(zero))
    }

    /// Vega ∂C/∂σ = S·e^(-qT)·φ(d₁)·√T.
    pub fn vega(&self, strike: T, expiry: T) -> Result<T, AnalyticalError> {
        self.check_contract(strike, expiry)?;
        let d1 = self.d1(strike, expiry);
        if !d1.is_finite() {
            return Ok(T::zero());
        }
        Ok(self.spot * (-self.dividend * expiry).exp() * norm_pdf(d1) * expiry.sqrt())
    }

    fn check_contract(&self, strike: T, expiry: T) -> Result<(), AnalyticalError> {
        let zero = T::zero();
        if !(strike.is_finite() && strike > zero) {
            return Err(AnalyticalError::InvalidStrike {
                strike: strike.to_f64().unwrap_or(f64::NAN),
            });
        }
        if !(expiry.is_finite() && expiry > zero) {
            return Err(AnalyticalError::InvalidExpiry {
                expiry: expiry.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }
}

impl BlackScholes<f64> {
    /// Price `quote` at `volatility`.
    ///
    /// # Examples
    /// ```
    /// use ivol_models::analytical::BlackScholes;
    /// use ivol_models::CallQuote;
    ///
    /// let quote = CallQuote::new(100.0, 110.0, 0.5, 0.03, 0.01).unwrap();
    /// let price = BlackScholes::call_price(&quote, 0.3).unwrap();
    /// assert!(price > 0.0 && price < quote.upper_bound());
    /// ```
    pub fn call_price(quote: &CallQuote, volatility: f64) -> Result<f64, AnalyticalError> {
        Self::new(quote.spot, quote.rate, quote.dividend, volatility)?
            .price_call(quote.strike, quote.expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn quote(strike: f64, expiry: f64) -> CallQuote {
        CallQuote::new(100.0, strike, expiry, 0.05, 0.0).unwrap()
    }

    // ==========================================================
    // Pricing Tests
    // ==========================================================

    #[test]
    fn test_atm_reference_price() {
        // Hull, 10.4506 for S=K=100, r=5%, σ=20%, T=1
        let price = BlackScholes::call_price(&quote(100.0, 1.0), 0.2).unwrap();
        assert_relative_eq!(price, 10.4506, epsilon = 1e-3);
    }

    #[test]
    fn test_dividend_lowers_call() {
        let no_div = BlackScholes::call_price(&quote(100.0, 1.0), 0.2).unwrap();
        let with_div = BlackScholes::call_price(
            &CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.03).unwrap(),
            0.2,
        )
        .unwrap();
        assert!(with_div < no_div);
    }

    #[test]
    fn test_vanishing_total_vol_is_intrinsic() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 1e-20).unwrap();
        let price = bs.price_call(90.0, 1.0).unwrap();
        assert_relative_eq!(price, 100.0 - 90.0 * (-0.05_f64).exp(), epsilon = 1e-12);

        let otm = bs.price_call(120.0, 1.0).unwrap();
        assert_eq!(otm, 0.0);
    }

    #[test]
    fn test_overflowing_d1_returns_boundary() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 1e200).unwrap();
        let price = bs.price_call(100.0, 1.0).unwrap();
        assert_eq!(price, 100.0);
    }

    #[test]
    fn test_deep_otm_is_zero_not_negative() {
        let price = BlackScholes::call_price(&quote(1e6, 0.01), 0.1).unwrap();
        assert_eq!(price, 0.0);
    }

    #[test]
    fn test_vega_positive_at_the_money() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2).unwrap();
        let vega = bs.vega(100.0, 1.0).unwrap();
        assert_relative_eq!(vega, 37.524, epsilon = 1e-2);
    }

    // ==========================================================
    // Validation Tests
    // ==========================================================

    #[test]
    fn test_invalid_inputs() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0, 0.2).unwrap();
        assert!(matches!(
            bs.price_call(0.0, 1.0),
            Err(AnalyticalError::InvalidStrike { .. })
        ));
        assert!(matches!(
            bs.price_call(100.0, 0.0),
            Err(AnalyticalError::InvalidExpiry { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0_f64, 0.05, 0.0, -0.2),
            Err(AnalyticalError::InvalidVolatility { .. })
        ));
        assert!(matches!(
            BlackScholes::new(100.0_f64, 0.05, -0.1, 0.2),
            Err(AnalyticalError::InvalidDividend { .. })
        ));
    }

    // ==========================================================
    // Property-based tests
    // ==========================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_within_no_arbitrage_bounds(
            spot in 10.0f64..500.0,
            strike in 10.0f64..500.0,
            expiry in 0.01f64..5.0,
            rate in 0.0f64..0.2,
            dividend in 0.0f64..0.1,
            vol in 0.01f64..2.0,
        ) {
            let q = CallQuote::new(spot, strike, expiry, rate, dividend).unwrap();
            let price = BlackScholes::call_price(&q, vol).unwrap();
            // A&S erfc error scales with the discounted notionals
            let slack = 1e-6 * (q.discounted_spot() + q.discounted_strike());
            prop_assert!(price >= q.lower_bound() - slack);
            prop_assert!(price <= q.upper_bound() + slack);
        }

        #[test]
        fn prop_strictly_increasing_in_vol(
            strike in 50.0f64..200.0,
            expiry in 0.1f64..3.0,
            vol in 0.05f64..1.9,
        ) {
            let q = quote(strike, expiry);
            let low = BlackScholes::call_price(&q, vol).unwrap();
            let high = BlackScholes::call_price(&q, vol + 0.05).unwrap();
            prop_assert!(high >= low);
            // Below this the deep OTM price underflows to zero at both vols
            if low > 1e-8 {
                prop_assert!(high > low);
            }
        }

        #[test]
        fn prop_intrinsic_limit(
            strike in 50.0f64..200.0,
            expiry in 0.1f64..3.0,
        ) {
            let q = quote(strike, expiry);
            let price = BlackScholes::call_price(&q, 1e-9).unwrap();
            prop_assert!((price - q.lower_bound()).abs() < 1e-6);
        }
    }
}
