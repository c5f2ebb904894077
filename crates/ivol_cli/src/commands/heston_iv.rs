//! Heston implied volatility command

use ivol_models::PricingEngine;
use tracing::debug;

use crate::cli::HestonCli;
use crate::config::build_config;
use crate::error::Result;

/// Run the Heston calculator and return the implied volatility.
///
/// The transform configuration is assembled from defaults, environment and
/// flags before the quote is priced.
pub fn run(cli: &HestonCli) -> Result<f64> {
    let config = build_config(&cli.fft);
    debug!(
        "FFT Configuration - N: {}, Range: {:.1}, Alpha: {:.2}, Eta: {:.4}, Tolerance: {:.1e}",
        config.n(),
        config.log_strike_range(),
        config.alpha(),
        config.eta(),
        config.cache_tolerance()
    );

    let (price, quote) = cli.quote.parse()?;
    let mut engine = PricingEngine::new(config);
    let vol = engine.heston_implied_vol(price, &quote)?;

    debug!(
        "Pricing statistics - grid builds: {}, cache hits: {}",
        engine.stats().grid_builds,
        engine.stats().cache_hits
    );
    Ok(vol)
}
