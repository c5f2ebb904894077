//! Per-quote Heston calibration.
//!
//! This module provides:
//! - [`seed_parameters`]: initial Heston parameters from the Black-Scholes
//!   anchor, moneyness and expiry
//! - [`ParameterGrid`]: the bounded candidate grid around the seed
//! - [`HestonCalibrator`]: grid search for the candidate closest to the
//!   market price
//! - [`fallback`]: skew and term adjustment, blending with the anchor and
//!   the default volatilities used when the pipeline cannot produce one
//!
//! # Architecture
//!
//! ```text
//! market price ─► BS anchor ─► seed ─► grid search ─► adjust / blend ─► vol
//!                    │                     │
//!                    ▼                     ▼
//!              ATM approx / 0.30     retry ladder / anchor / 0.25
//! ```

pub mod fallback;
pub mod heston;
mod result;

pub use heston::{seed_parameters, HestonCalibrator, ParameterGrid, MAX_EVALUATIONS};
pub use result::CalibrationOutcome;
