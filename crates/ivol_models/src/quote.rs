//! Option quote value types.
//!
//! [`CallQuote`] describes a European call: spot, strike, time to expiry
//! (years), continuously compounded risk-free rate and dividend yield.
//! [`MarketState`] is the strike-independent part of a quote and is what the
//! transform pricer and its caches key on.
//!
//! ## No-arbitrage bounds
//!
//! ```text
//! max(0, S·e^{-qT} − K·e^{-rT}) ≤ C ≤ S·e^{-qT}
//! ```

use crate::analytical::AnalyticalError;

/// Strike-independent market state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketState {
    /// Spot price (S)
    pub spot: f64,
    /// Time to expiry in years (T)
    pub expiry: f64,
    /// Risk-free rate, continuously compounded (r)
    pub rate: f64,
    /// Dividend yield, continuously compounded (q)
    pub dividend: f64,
}

impl MarketState {
    /// Create a validated market state.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot is not finite and positive
    /// - `AnalyticalError::InvalidExpiry` if expiry is not finite and positive
    /// - `AnalyticalError::InvalidRate` if rate is not finite
    /// - `AnalyticalError::InvalidDividend` if dividend is negative or not finite
    pub fn new(spot: f64, expiry: f64, rate: f64, dividend: f64) -> Result<Self, AnalyticalError> {
        let state = Self {
            spot,
            expiry,
            rate,
            dividend,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), AnalyticalError> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(AnalyticalError::InvalidSpot { spot: self.spot });
        }
        if !(self.expiry.is_finite() && self.expiry > 0.0) {
            return Err(AnalyticalError::InvalidExpiry {
                expiry: self.expiry,
            });
        }
        if !self.rate.is_finite() {
            return Err(AnalyticalError::InvalidRate { rate: self.rate });
        }
        if !(self.dividend.is_finite() && self.dividend >= 0.0) {
            return Err(AnalyticalError::InvalidDividend {
                dividend: self.dividend,
            });
        }
        Ok(())
    }

    /// e^{-rT}
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.expiry).exp()
    }

    /// S·e^{-qT}
    #[inline]
    pub fn discounted_spot(&self) -> f64 {
        self.spot * (-self.dividend * self.expiry).exp()
    }

    /// S·e^{(r-q)T}
    #[inline]
    pub fn forward(&self) -> f64 {
        self.spot * ((self.rate - self.dividend) * self.expiry).exp()
    }
}

/// European call quote.
///
/// # Examples
/// ```
/// use ivol_models::CallQuote;
///
/// let quote = CallQuote::new(100.0, 110.0, 0.5, 0.03, 0.01).unwrap();
/// assert!((quote.moneyness() - 1.1).abs() < 1e-12);
/// assert_eq!(quote.lower_bound(), 0.0);
///
/// assert!(CallQuote::new(100.0, -5.0, 0.5, 0.03, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallQuote {
    /// Spot price (S)
    pub spot: f64,
    /// Strike price (K)
    pub strike: f64,
    /// Time to expiry in years (T)
    pub expiry: f64,
    /// Risk-free rate, continuously compounded (r)
    pub rate: f64,
    /// Dividend yield, continuously compounded (q)
    pub dividend: f64,
}

impl CallQuote {
    /// Create a validated quote.
    ///
    /// # Errors
    /// Any [`MarketState::validate`] error, or
    /// `AnalyticalError::InvalidStrike` if strike is not finite and positive.
    pub fn new(
        spot: f64,
        strike: f64,
        expiry: f64,
        rate: f64,
        dividend: f64,
    ) -> Result<Self, AnalyticalError> {
        let quote = Self {
            spot,
            strike,
            expiry,
            rate,
            dividend,
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), AnalyticalError> {
        self.market().validate()?;
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(AnalyticalError::InvalidStrike {
                strike: self.strike,
            });
        }
        Ok(())
    }

    /// Strike-independent part of the quote.
    #[inline]
    pub fn market(&self) -> MarketState {
        MarketState {
            spot: self.spot,
            expiry: self.expiry,
            rate: self.rate,
            dividend: self.dividend,
        }
    }

    /// Moneyness K/S.
    #[inline]
    pub fn moneyness(&self) -> f64 {
        self.strike / self.spot
    }

    /// S·e^{-qT}
    #[inline]
    pub fn discounted_spot(&self) -> f64 {
        self.market().discounted_spot()
    }

    /// K·e^{-rT}
    #[inline]
    pub fn discounted_strike(&self) -> f64 {
        self.strike * self.market().discount_factor()
    }

    /// No-arbitrage lower bound `max(0, S·e^{-qT} − K·e^{-rT})`.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        (self.discounted_spot() - self.discounted_strike()).max(0.0)
    }

    /// No-arbitrage upper bound `S·e^{-qT}`.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.discounted_spot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_quote() {
        let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
        assert_eq!(quote.moneyness(), 1.0);
        assert_relative_eq!(quote.discounted_strike(), 100.0 * (-0.05_f64).exp());
        assert_relative_eq!(quote.lower_bound(), 100.0 - 100.0 * (-0.05_f64).exp());
        assert_eq!(quote.upper_bound(), 100.0);
    }

    #[test]
    fn test_lower_bound_floors_at_zero() {
        let quote = CallQuote::new(100.0, 200.0, 0.1, 0.05, 0.0).unwrap();
        assert_eq!(quote.lower_bound(), 0.0);
    }

    #[test]
    fn test_dividend_reduces_bounds() {
        let quote = CallQuote::new(100.0, 50.0, 2.0, 0.0, 0.03).unwrap();
        assert_relative_eq!(quote.upper_bound(), 100.0 * (-0.06_f64).exp());
        assert_relative_eq!(quote.lower_bound(), 100.0 * (-0.06_f64).exp() - 50.0);
    }

    #[test]
    fn test_invalid_fields() {
        assert!(matches!(
            CallQuote::new(0.0, 100.0, 1.0, 0.05, 0.0),
            Err(AnalyticalError::InvalidSpot { .. })
        ));
        assert!(matches!(
            CallQuote::new(100.0, 0.0, 1.0, 0.05, 0.0),
            Err(AnalyticalError::InvalidStrike { .. })
        ));
        assert!(matches!(
            CallQuote::new(100.0, 100.0, -1.0, 0.05, 0.0),
            Err(AnalyticalError::InvalidExpiry { .. })
        ));
        assert!(matches!(
            CallQuote::new(100.0, 100.0, 1.0, f64::NAN, 0.0),
            Err(AnalyticalError::InvalidRate { .. })
        ));
        assert!(matches!(
            CallQuote::new(100.0, 100.0, 1.0, 0.05, -0.01),
            Err(AnalyticalError::InvalidDividend { .. })
        ));
        assert!(CallQuote::new(f64::INFINITY, 100.0, 1.0, 0.05, 0.0).is_err());
    }

    #[test]
    fn test_negative_rate_allowed() {
        assert!(CallQuote::new(100.0, 100.0, 1.0, -0.01, 0.0).is_ok());
    }

    #[test]
    fn test_market_state_forward() {
        let market = MarketState::new(100.0, 2.0, 0.05, 0.02).unwrap();
        assert_relative_eq!(market.forward(), 100.0 * 0.06_f64.exp());
        assert_relative_eq!(market.discount_factor(), (-0.1_f64).exp());
    }
}
