//! Carr-Madan transform pricing for the Heston model.
//!
//! This module provides:
//! - [`FftConfig`]: grid size, frequency spacing, damping, log-strike range
//!   and cache tolerance, with the adaptive selector and the retry ladder
//! - [`Precomputation`]: Simpson weights and spot phase factors shared across
//!   calibration steps for one quote
//! - [`build_strike_grid`]: one fractional DFT producing call prices on the
//!   whole log-strike grid
//! - [`StrikeGridCache`]: single-slot cache of the last grid with
//!   interpolation in strike
//!
//! ## Pipeline
//!
//! ```text
//! psi_j = e^{-rT} phi(v_j - (alpha + 1) i) / (alpha^2 + alpha - v_j^2 + i (2 alpha + 1) v_j)
//! x_j   = psi_j * w_j * eta * e^{-i v_j ln S} * e^{i v_j R}
//! Y_i   = sum_j x_j e^{-2 pi i beta j i},   beta = eta * (2R/N) / (2 pi)
//! C_i   = max(0, Re(Y_i) e^{-alpha k_i} / pi),   k_i = ln S - R + (2R/N) i
//! ```

mod cache;
mod carr_madan;
mod config;
mod error;
mod precompute;

pub use cache::{GridKey, StrikeGridCache};
pub use carr_madan::{build_strike_grid, StrikeGrid};
pub use config::{FftConfig, LadderStep, RETRY_LADDER};
pub use error::FftError;
pub use precompute::{simpson_weights, PrecomputeCache, Precomputation, ZERO_FREQUENCY};
