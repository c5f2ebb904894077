//! Single-slot strike-grid cache.
//!
//! Successive prices for the same market state, Heston parameters and grid
//! configuration reuse the last grid instead of running the transform again.
//! Any key change replaces the slot.

use super::carr_madan::StrikeGrid;
use super::config::FftConfig;
use super::error::FftError;
use crate::models::HestonParams;
use crate::quote::MarketState;

/// Everything a strike grid depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridKey {
    /// Spot, expiry, rate and dividend yield
    pub market: MarketState,
    /// Heston parameters
    pub params: HestonParams,
    /// Grid size
    pub n: usize,
    /// Log-strike half-width
    pub log_strike_range: f64,
    /// Damping exponent
    pub alpha: f64,
    /// Frequency spacing
    pub eta: f64,
}

impl GridKey {
    /// Key for pricing `params` on `market` with `config`.
    pub fn new(market: MarketState, params: HestonParams, config: &FftConfig) -> Self {
        Self {
            market,
            params,
            n: config.n(),
            log_strike_range: config.log_strike_range(),
            alpha: config.alpha(),
            eta: config.eta(),
        }
    }

    /// Whether both keys describe the same grid.
    ///
    /// `n` must be equal; every scalar field may differ by at most
    /// `tolerance` in absolute value.
    pub fn matches(&self, other: &GridKey, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        let (m, o) = (&self.market, &other.market);
        let (p, q) = (&self.params, &other.params);

        self.n == other.n
            && close(m.spot, o.spot)
            && close(m.expiry, o.expiry)
            && close(m.rate, o.rate)
            && close(m.dividend, o.dividend)
            && close(p.v0, q.v0)
            && close(p.kappa, q.kappa)
            && close(p.theta, q.theta)
            && close(p.sigma, q.sigma)
            && close(p.rho, q.rho)
            && close(self.log_strike_range, other.log_strike_range)
            && close(self.alpha, other.alpha)
            && close(self.eta, other.eta)
    }
}

/// Last strike grid and the key it was built for.
#[derive(Debug, Clone, Default)]
pub struct StrikeGridCache {
    slot: Option<(GridKey, StrikeGrid)>,
}

impl StrikeGridCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cached grid was built for `key`.
    pub fn contains(&self, key: &GridKey, tolerance: f64) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|(cached, _)| cached.matches(key, tolerance))
    }

    /// Replace the slot.
    pub fn store(&mut self, key: GridKey, grid: StrikeGrid) {
        self.slot = Some((key, grid));
    }

    /// Interpolated price from the cached grid.
    ///
    /// # Errors
    ///
    /// `FftError::EmptyCache` when nothing is cached, otherwise any
    /// [`StrikeGrid::price_at`] error.
    pub fn price_at(&self, strike: f64) -> Result<f64, FftError> {
        match &self.slot {
            Some((_, grid)) => grid.price_at(strike),
            None => Err(FftError::EmptyCache),
        }
    }

    /// Drop the cached grid.
    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Whether a grid is cached.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
