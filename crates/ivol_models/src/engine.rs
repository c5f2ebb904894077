//! Pricing engine and consumer entry points.
//!
//! [`PricingEngine`] owns the transform caches (precomputation tables,
//! fractional DFT plan and the single-slot strike grid) and exposes the four
//! consumer operations. The free functions at the bottom of this module run
//! against a thread-local engine with the default configuration.
//!
//! ## Heston implied volatility
//!
//! ```text
//! 1. Black-Scholes anchor (invalid input is returned as an error; any other
//!    failure returns the ATM approximation or 0.30)
//! 2. Seed parameters from the anchor, moneyness and expiry
//! 3. Grid search on the adapted configuration
//! 4. Skew / term adjustment and anchor blending
//! 5. On transform failure: retry with each ladder configuration, then the
//!    clamped anchor, then 0.25
//! ```

use std::cell::RefCell;

use ivol_core::math::fourier::FractionalDft;
use ivol_core::types::PricingError;
use tracing::{debug, trace, warn};

use crate::analytical::{AnalyticalError, BlackScholes, ImpliedVolSolver};
use crate::calibration::fallback::{anchor_failure_vol, finalize, ladder_exhausted_vol};
use crate::calibration::{seed_parameters, HestonCalibrator};
use crate::fourier::{
    build_strike_grid, FftConfig, FftError, GridKey, PrecomputeCache, StrikeGrid,
    StrikeGridCache, RETRY_LADDER,
};
use crate::models::HestonParams;
use crate::quote::{CallQuote, MarketState};

/// Number of transform configurations tried per query: the adapted one and
/// each ladder step.
const ATTEMPTS: usize = 1 + RETRY_LADDER.len();

/// Counters for the engine's cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Strike grids computed by a transform
    pub grid_builds: usize,
    /// Prices served from the cached strike grid
    pub cache_hits: usize,
    /// Precomputation tables built
    pub precompute_builds: usize,
    /// Fractional DFT plans built
    pub plan_builds: usize,
}

/// Owner of the transform caches.
///
/// # Examples
/// ```
/// use ivol_models::{CallQuote, PricingEngine};
/// use ivol_models::models::HestonParams;
///
/// let mut engine = PricingEngine::with_defaults();
/// let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// let params = HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
///
/// let first = engine.heston_call(&quote, &params).unwrap();
/// let second = engine.heston_call(&quote, &params).unwrap();
/// assert_eq!(first.to_bits(), second.to_bits());
/// assert_eq!(engine.stats().grid_builds, 1);
/// assert_eq!(engine.stats().cache_hits, 1);
/// ```
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: FftConfig,
    solver: ImpliedVolSolver,
    calibrator: HestonCalibrator,
    grid_cache: StrikeGridCache,
    precompute: PrecomputeCache,
    plan: Option<FractionalDft>,
    stats: EngineStats,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(FftConfig::default())
    }
}

impl PricingEngine {
    /// Engine with a base transform configuration.
    ///
    /// Each query adapts the base configuration to the quote before pricing.
    pub fn new(config: FftConfig) -> Self {
        Self {
            config,
            solver: ImpliedVolSolver::default(),
            calibrator: HestonCalibrator::default(),
            grid_cache: StrikeGridCache::new(),
            precompute: PrecomputeCache::new(),
            plan: None,
            stats: EngineStats::default(),
        }
    }

    /// Engine with [`FftConfig::default`].
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Replace the Black-Scholes implied-vol solver.
    pub fn with_solver(mut self, solver: ImpliedVolSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Replace the Heston calibrator.
    pub fn with_calibrator(mut self, calibrator: HestonCalibrator) -> Self {
        self.calibrator = calibrator;
        self
    }

    /// Base transform configuration.
    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    /// Replace the base transform configuration and drop every cache.
    pub fn set_config(&mut self, config: FftConfig) {
        self.config = config;
        self.clear_caches();
    }

    /// Cache activity since construction or the last [`reset`](Self::reset).
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Drop every cache and zero the counters.
    pub fn reset(&mut self) {
        self.clear_caches();
        self.stats = EngineStats::default();
    }

    fn clear_caches(&mut self) {
        self.grid_cache.clear();
        self.precompute.clear();
        self.plan = None;
    }

    /// Black-Scholes call price.
    pub fn bs_call(&self, quote: &CallQuote, volatility: f64) -> Result<f64, AnalyticalError> {
        BlackScholes::call_price(quote, volatility)
    }

    /// Black-Scholes implied volatility.
    ///
    /// # Errors
    /// See [`ImpliedVolSolver::solve`].
    pub fn bs_implied_vol(&self, price: f64, quote: &CallQuote) -> Result<f64, AnalyticalError> {
        self.solver.solve(price, quote)
    }

    /// Heston call price.
    ///
    /// Prices on the configuration adapted to the quote, retries with each
    /// ladder configuration when a transform fails, and falls back to the
    /// Black-Scholes price with `σ = √v0` when all of them fail.
    ///
    /// # Errors
    /// `PricingError::InvalidInput` for an invalid quote or invalid
    /// parameters.
    pub fn heston_call(
        &mut self,
        quote: &CallQuote,
        params: &HestonParams,
    ) -> Result<f64, PricingError> {
        quote.validate()?;
        params.validate()?;

        for (attempt, config) in self.attempt_configs(quote).iter().enumerate() {
            match self.price_with_config(quote, params, config) {
                Ok(price) => return Ok(price),
                Err(err) => {
                    debug!(attempt, error = %err, "transform pricing failed");
                    self.grid_cache.clear();
                }
            }
        }

        warn!("all transform configurations failed, using Black-Scholes with sqrt(v0)");
        Ok(BlackScholes::call_price(quote, params.initial_vol())?)
    }

    /// Heston implied volatility.
    ///
    /// The returned value always lies in `[0.05, 1.5]`.
    ///
    /// # Errors
    /// Only input errors: a non-positive or non-finite price, or an invalid
    /// quote. Every numerical failure is absorbed by the fallback policy.
    pub fn heston_implied_vol(
        &mut self,
        price: f64,
        quote: &CallQuote,
    ) -> Result<f64, AnalyticalError> {
        let anchor = match self.solver.solve(price, quote) {
            Ok(vol) => vol,
            Err(err) if err.is_invalid_input() => return Err(err),
            Err(err) => {
                let vol = anchor_failure_vol(price, quote);
                warn!(error = %err, vol, "Black-Scholes anchor failed, using fallback volatility");
                return Ok(vol);
            }
        };
        debug!(anchor, "Black-Scholes anchor");

        let seed = seed_parameters(quote, anchor);
        let calibrator = self.calibrator;

        for (attempt, config) in self.attempt_configs(quote).iter().enumerate() {
            let outcome = calibrator.calibrate(price, &seed, |params| {
                self.price_with_config(quote, params, config)
            });
            match outcome {
                Ok(outcome) => {
                    let vol = finalize(&outcome, anchor, price, quote);
                    debug!(
                        attempt,
                        evaluations = outcome.evaluations,
                        residual = outcome.residual,
                        v0 = outcome.params.v0,
                        vol,
                        "calibration finished"
                    );
                    return Ok(vol);
                }
                Err(err) => {
                    debug!(attempt, error = %err, "calibration aborted by transform failure");
                    self.grid_cache.clear();
                }
            }
        }

        let vol = ladder_exhausted_vol(anchor);
        warn!(vol, "all transform configurations failed, using Black-Scholes anchor");
        Ok(vol)
    }

    /// Adapted configuration followed by the ladder configurations.
    fn attempt_configs(&self, quote: &CallQuote) -> [FftConfig; ATTEMPTS] {
        let adapted = self.config.adapted_for(quote);
        if adapted != self.config {
            debug!(
                n = adapted.n(),
                log_strike_range = adapted.log_strike_range(),
                alpha = adapted.alpha(),
                eta = adapted.eta(),
                "adapted FFT parameters to option characteristics"
            );
        }

        let mut configs = [adapted; ATTEMPTS];
        for (slot, step) in configs[1..].iter_mut().zip(RETRY_LADDER.iter()) {
            *slot = adapted.with_ladder_step(step);
        }
        configs
    }

    /// Price from the strike grid for `config`, building it on a cache miss.
    fn price_with_config(
        &mut self,
        quote: &CallQuote,
        params: &HestonParams,
        config: &FftConfig,
    ) -> Result<f64, FftError> {
        let market = quote.market();
        let key = GridKey::new(market, *params, config);

        if self.grid_cache.contains(&key, config.cache_tolerance()) {
            self.stats.cache_hits += 1;
            trace!("strike grid cache hit");
        } else {
            let grid = self.build_grid(&market, params, config)?;
            self.grid_cache.store(key, grid);
        }
        self.grid_cache.price_at(quote.strike)
    }

    fn build_grid(
        &mut self,
        market: &MarketState,
        params: &HestonParams,
        config: &FftConfig,
    ) -> Result<StrikeGrid, FftError> {
        let n = config.n();
        let beta = config.frequency_scale();

        let plan = match self.plan.take() {
            Some(plan) if plan.len() == n && plan.beta() == beta => plan,
            _ => {
                self.stats.plan_builds += 1;
                FractionalDft::new(n, beta)?
            }
        };

        let (precomputed, built) = self.precompute.get_or_build(
            n,
            config.eta(),
            config.alpha(),
            market.spot,
            config.cache_tolerance(),
        );
        if built {
            self.stats.precompute_builds += 1;
        }

        let grid = build_strike_grid(params, market, config, precomputed, &plan);
        self.plan = Some(plan);
        let grid = grid?;

        self.stats.grid_builds += 1;
        debug!(n, alpha = config.alpha(), eta = config.eta(), "built strike grid");
        Ok(grid)
    }
}

thread_local! {
    static ENGINE: RefCell<PricingEngine> = RefCell::new(PricingEngine::with_defaults());
}

/// Run `f` against this thread's default engine.
pub fn with_thread_engine<R>(f: impl FnOnce(&mut PricingEngine) -> R) -> R {
    ENGINE.with(|engine| f(&mut engine.borrow_mut()))
}

/// Black-Scholes call price.
///
/// # Examples
/// ```
/// let price = ivol_models::bs_call(100.0, 100.0, 1.0, 0.05, 0.0, 0.2).unwrap();
/// assert!((price - 10.4506).abs() < 1e-3);
/// ```
pub fn bs_call(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    volatility: f64,
) -> Result<f64, AnalyticalError> {
    let quote = CallQuote::new(spot, strike, expiry, rate, dividend)?;
    BlackScholes::call_price(&quote, volatility)
}

/// Black-Scholes implied volatility of a call price.
///
/// # Examples
/// ```
/// let vol = ivol_models::bs_implied_vol(10.45, 100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
/// assert!((vol - 0.2).abs() < 1e-4);
/// ```
pub fn bs_implied_vol(
    price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
) -> Result<f64, AnalyticalError> {
    let quote = CallQuote::new(spot, strike, expiry, rate, dividend)?;
    ImpliedVolSolver::default().solve(price, &quote)
}

/// Heston call price on this thread's default engine.
#[allow(clippy::too_many_arguments)]
pub fn heston_call(
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
    v0: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    rho: f64,
) -> Result<f64, PricingError> {
    let quote = CallQuote::new(spot, strike, expiry, rate, dividend)?;
    let params = HestonParams::new(v0, kappa, theta, sigma, rho)?;
    with_thread_engine(|engine| engine.heston_call(&quote, &params))
}

/// Heston implied volatility on this thread's default engine.
///
/// The returned value always lies in `[0.05, 1.5]`.
pub fn heston_implied_vol(
    price: f64,
    spot: f64,
    strike: f64,
    expiry: f64,
    rate: f64,
    dividend: f64,
) -> Result<f64, AnalyticalError> {
    let quote = CallQuote::new(spot, strike, expiry, rate, dividend)?;
    with_thread_engine(|engine| engine.heston_implied_vol(price, &quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn atm() -> CallQuote {
        CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap()
    }

    fn params() -> HestonParams {
        HestonParams::new(0.04, 1.5, 0.04, 0.3, -0.7).unwrap()
    }

    // ================================================================
    // Configuration ladder
    // ================================================================

    #[test]
    fn test_attempt_configs() {
        let engine = PricingEngine::with_defaults();
        let quote = CallQuote::new(100.0, 200.0, 0.05, 0.05, 0.0).unwrap();
        let configs = engine.attempt_configs(&quote);

        assert_eq!(configs[0].n(), 8192);
        assert_eq!(configs[0].log_strike_range(), 4.0);
        assert_eq!(configs[0].eta(), 0.025);
        assert_eq!((configs[1].n(), configs[1].alpha(), configs[1].eta()), (8192, 1.0, 0.1));
        assert_eq!(
            (configs[2].n(), configs[2].alpha(), configs[2].eta()),
            (2048, 1.25, 0.075)
        );
        assert!(configs.iter().all(|c| c.log_strike_range() == 4.0));
    }

    // ================================================================
    // Cache behaviour
    // ================================================================

    #[test]
    fn test_heston_call_reuses_grid_across_strikes() {
        let mut engine = PricingEngine::with_defaults();
        for strike in [90.0, 100.0, 110.0] {
            let quote = CallQuote::new(100.0, strike, 1.0, 0.05, 0.0).unwrap();
            engine.heston_call(&quote, &params()).unwrap();
        }
        let stats = engine.stats();
        assert_eq!(stats.grid_builds, 1);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.plan_builds, 1);
        assert_eq!(stats.precompute_builds, 1);
    }

    #[test]
    fn test_parameter_change_rebuilds_grid_only() {
        let mut engine = PricingEngine::with_defaults();
        engine.heston_call(&atm(), &params()).unwrap();
        let other = HestonParams::new(0.05, 1.5, 0.05, 0.4, -0.5).unwrap();
        engine.heston_call(&atm(), &other).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.grid_builds, 2);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.plan_builds, 1);
        assert_eq!(stats.precompute_builds, 1);
    }

    #[test]
    fn test_reset() {
        let mut engine = PricingEngine::with_defaults();
        engine.heston_call(&atm(), &params()).unwrap();
        engine.reset();
        assert_eq!(engine.stats(), EngineStats::default());
        engine.heston_call(&atm(), &params()).unwrap();
        assert_eq!(engine.stats().grid_builds, 1);
        assert_eq!(engine.stats().plan_builds, 1);
    }

    #[test]
    fn test_set_config_drops_caches() {
        let mut engine = PricingEngine::with_defaults();
        engine.heston_call(&atm(), &params()).unwrap();
        engine.set_config(FftConfig::default().with_n(2048).unwrap());
        engine.heston_call(&atm(), &params()).unwrap();
        let stats = engine.stats();
        assert_eq!(stats.grid_builds, 2);
        assert_eq!(stats.plan_builds, 2);
    }

    // ================================================================
    // Pricing
    // ================================================================

    #[test]
    fn test_heston_call_invalid_inputs() {
        let mut engine = PricingEngine::with_defaults();
        let bad = HestonParams {
            rho: -1.5,
            ..params()
        };
        assert!(engine.heston_call(&atm(), &bad).unwrap_err().is_invalid_input());

        let bad_quote = CallQuote {
            expiry: 0.0,
            ..atm()
        };
        assert!(engine
            .heston_call(&bad_quote, &params())
            .unwrap_err()
            .is_invalid_input());
        assert_eq!(engine.stats().grid_builds, 0);
    }

    #[test]
    fn test_heston_call_within_bounds() {
        let mut engine = PricingEngine::with_defaults();
        for strike in [60.0, 80.0, 100.0, 120.0, 160.0] {
            let quote = CallQuote::new(100.0, strike, 1.0, 0.05, 0.0).unwrap();
            let price = engine.heston_call(&quote, &params()).unwrap();
            assert!(price >= quote.lower_bound() - 1e-3, "K={} price={}", strike, price);
            assert!(price <= quote.upper_bound(), "K={} price={}", strike, price);
        }
    }

    #[test]
    fn test_bs_methods_delegate() {
        let engine = PricingEngine::with_defaults();
        let price = engine.bs_call(&atm(), 0.2).unwrap();
        assert_relative_eq!(engine.bs_implied_vol(price, &atm()).unwrap(), 0.2, epsilon = 1e-4);
    }

    // ================================================================
    // Heston implied volatility
    // ================================================================

    #[test]
    fn test_heston_iv_invalid_price() {
        let mut engine = PricingEngine::with_defaults();
        let err = engine.heston_implied_vol(-1.0, &atm()).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(engine.stats().grid_builds, 0);
    }

    #[test]
    fn test_heston_iv_arbitrage_uses_fallback() {
        // lower bound ≈ 52.4; ATM approximation √(2π)·0.3 ≈ 0.75
        let mut engine = PricingEngine::with_defaults();
        let quote = CallQuote::new(100.0, 50.0, 1.0, 0.05, 0.0).unwrap();
        let vol = engine.heston_implied_vol(30.0, &quote).unwrap();
        assert_relative_eq!(vol, (2.0 * std::f64::consts::PI).sqrt() * 0.3, epsilon = 1e-12);
        assert_eq!(engine.stats().grid_builds, 0);
    }

    #[test]
    fn test_heston_iv_no_bracket_uses_default() {
        let mut engine = PricingEngine::with_defaults();
        let vol = engine.heston_implied_vol(80.0, &atm()).unwrap();
        assert_eq!(vol, crate::calibration::fallback::DEFAULT_VOL);
    }

    #[test]
    fn test_custom_solver_and_calibrator() {
        // C(0.1) < 10.45 for the ATM quote, so the narrowed bracket misses it
        let mut engine = PricingEngine::with_defaults()
            .with_solver(ImpliedVolSolver::default().with_bracket(0.001, 0.1));
        let vol = engine.heston_implied_vol(10.45, &atm()).unwrap();
        assert_eq!(vol, crate::calibration::fallback::atm_approximation(10.45, &atm()));
        assert_eq!(engine.stats().grid_builds, 0);

        let mut engine = PricingEngine::with_defaults()
            .with_calibrator(HestonCalibrator::new().with_max_evaluations(1));
        let vol = engine.heston_implied_vol(10.45, &atm()).unwrap();
        assert!((0.05..=1.5).contains(&vol));
        assert_eq!(engine.stats().grid_builds, 1);
    }

    // ================================================================
    // Retry ladder
    // ================================================================

    /// First ladder step as a base configuration.
    fn first_ladder_config() -> FftConfig {
        let step = RETRY_LADDER[0];
        FftConfig::default()
            .with_n(step.n)
            .and_then(|c| c.with_alpha(step.alpha))
            .and_then(|c| c.with_eta(step.eta))
            .unwrap()
    }

    /// Base configuration whose damping overflows S^(α+1).
    fn overflowing_config() -> FftConfig {
        FftConfig::default().with_alpha(200.0).unwrap()
    }

    /// Spot large enough that S^(α+1) overflows on every ladder step.
    fn huge_spot_quote() -> CallQuote {
        CallQuote::new(1e160, 1e160, 1.0, 0.05, 0.0).unwrap()
    }

    #[test]
    fn test_heston_call_recovers_on_ladder() {
        let mut engine = PricingEngine::new(overflowing_config());
        let price = engine.heston_call(&atm(), &params()).unwrap();

        let mut reference = PricingEngine::new(first_ladder_config());
        assert_eq!(price, reference.heston_call(&atm(), &params()).unwrap());

        let stats = engine.stats();
        assert_eq!(stats.plan_builds, 2);
        assert_eq!(stats.precompute_builds, 2);
        assert_eq!(stats.grid_builds, 1);
    }

    #[test]
    fn test_heston_iv_recovers_on_ladder() {
        let mut engine = PricingEngine::new(overflowing_config());
        let vol = engine.heston_implied_vol(10.45, &atm()).unwrap();

        let mut reference = PricingEngine::new(first_ladder_config());
        assert_eq!(vol, reference.heston_implied_vol(10.45, &atm()).unwrap());
        assert!((0.18..=0.24).contains(&vol), "vol = {}", vol);

        let stats = engine.stats();
        assert_eq!(stats.plan_builds, 2);
        assert_eq!(stats.precompute_builds, 2);
    }

    #[test]
    fn test_heston_call_exhausted_ladder_uses_black_scholes() {
        let mut engine = PricingEngine::with_defaults();
        let quote = huge_spot_quote();
        let price = engine.heston_call(&quote, &params()).unwrap();

        let expected = BlackScholes::call_price(&quote, params().initial_vol()).unwrap();
        assert_eq!(price, expected);

        let stats = engine.stats();
        assert_eq!(stats.grid_builds, 0);
        assert_eq!(stats.plan_builds, 3);
        assert_eq!(stats.precompute_builds, 3);
    }

    #[test]
    fn test_heston_iv_exhausted_ladder_uses_anchor() {
        let quote = huge_spot_quote();

        let mut engine = PricingEngine::with_defaults();
        let price = BlackScholes::call_price(&quote, 0.25).unwrap();
        let vol = engine.heston_implied_vol(price, &quote).unwrap();
        assert_relative_eq!(vol, 0.25, epsilon = 1e-9);
        assert_eq!(engine.stats().grid_builds, 0);
        assert_eq!(engine.stats().plan_builds, 3);

        // anchor above the cap is clamped
        let price = BlackScholes::call_price(&quote, 1.8).unwrap();
        let vol = engine.heston_implied_vol(price, &quote).unwrap();
        assert_eq!(vol, crate::calibration::fallback::VOL_CAP);
    }

    #[test]
    fn test_free_functions() {
        let price = bs_call(100.0, 100.0, 1.0, 0.05, 0.0, 0.2).unwrap();
        assert_relative_eq!(
            bs_implied_vol(price, 100.0, 100.0, 1.0, 0.05, 0.0).unwrap(),
            0.2,
            epsilon = 1e-4
        );
        let heston = heston_call(100.0, 100.0, 1.0, 0.05, 0.0, 0.04, 1.5, 0.04, 0.3, -0.7).unwrap();
        assert!(heston > 0.0 && heston < 100.0);
        assert!(heston_call(100.0, 100.0, 1.0, 0.05, 0.0, -0.04, 1.5, 0.04, 0.3, -0.7).is_err());
        assert!(bs_implied_vol(-1.0, 100.0, 100.0, 1.0, 0.05, 0.0)
            .unwrap_err()
            .is_invalid_input());
    }
}
