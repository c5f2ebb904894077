//! Transform configuration assembly.
//!
//! Handles loading overrides from environment variables and CLI arguments.
//! Precedence (highest first): CLI flag, environment variable, default.

use ivol_models::fourier::FftConfig;
use tracing::warn;

use crate::cli::FftArgs;

/// Environment variable for the number of FFT points
pub const ENV_FFT_N: &str = "FFT_N";
/// Environment variable for the log-strike half-width
pub const ENV_FFT_LOG_STRIKE_RANGE: &str = "FFT_LOG_STRIKE_RANGE";
/// Environment variable for the damping exponent
pub const ENV_FFT_ALPHA: &str = "FFT_ALPHA";
/// Environment variable for the frequency spacing
pub const ENV_FFT_ETA: &str = "FFT_ETA";
/// Environment variable for the cache reuse tolerance
pub const ENV_FFT_CACHE_TOLERANCE: &str = "FFT_CACHE_TOLERANCE";

/// Unparsed overrides from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FftOverrides {
    /// Number of FFT points
    pub n: Option<String>,
    /// Log-strike half-width
    pub log_strike_range: Option<String>,
    /// Damping exponent
    pub alpha: Option<String>,
    /// Frequency spacing
    pub eta: Option<String>,
    /// Cache reuse tolerance
    pub cache_tolerance: Option<String>,
}

impl FftOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            n: lookup(ENV_FFT_N),
            log_strike_range: lookup(ENV_FFT_LOG_STRIKE_RANGE),
            alpha: lookup(ENV_FFT_ALPHA),
            eta: lookup(ENV_FFT_ETA),
            cache_tolerance: lookup(ENV_FFT_CACHE_TOLERANCE),
        }
    }

    /// Apply these overrides on top of `config`.
    ///
    /// A value that does not parse, or that the configuration rejects, is
    /// reported with a warning and the current value is kept.
    pub fn apply(&self, config: FftConfig) -> FftConfig {
        let mut config = config;

        if let Some(raw) = &self.n {
            let current = config.n();
            config = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| config.with_n(n).ok())
                .unwrap_or_else(|| {
                    warn!("FFT size must be a power of 2. Using default: {}", current);
                    config
                });
        }
        if let Some(raw) = &self.log_strike_range {
            let current = config.log_strike_range();
            config = parse_positive(raw)
                .and_then(|range| config.with_log_strike_range(range).ok())
                .unwrap_or_else(|| {
                    warn!("Log strike range must be positive. Using default: {:.1}", current);
                    config
                });
        }
        if let Some(raw) = &self.alpha {
            let current = config.alpha();
            config = parse_positive(raw)
                .and_then(|alpha| config.with_alpha(alpha).ok())
                .unwrap_or_else(|| {
                    warn!("Alpha must be positive. Using default: {:.2}", current);
                    config
                });
        }
        if let Some(raw) = &self.eta {
            let current = config.eta();
            config = parse_positive(raw)
                .and_then(|eta| config.with_eta(eta).ok())
                .unwrap_or_else(|| {
                    warn!("Eta must be positive. Using default: {:.4}", current);
                    config
                });
        }
        if let Some(raw) = &self.cache_tolerance {
            let current = config.cache_tolerance();
            config = parse_positive(raw)
                .and_then(|tolerance| config.with_cache_tolerance(tolerance).ok())
                .unwrap_or_else(|| {
                    warn!("Cache tolerance must be positive. Using default: {:.1e}", current);
                    config
                });
        }

        config
    }
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Build the effective configuration: defaults, then environment, then flags.
pub fn build_config(args: &FftArgs) -> FftConfig {
    build_config_with(args, &FftOverrides::from_env())
}

/// Build the effective configuration from explicit environment overrides.
pub fn build_config_with(args: &FftArgs, env: &FftOverrides) -> FftConfig {
    let config = env.apply(FftConfig::default());
    args.overrides().apply(config)
}
