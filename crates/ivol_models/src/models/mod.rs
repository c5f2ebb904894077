//! Stochastic volatility models.
//!
//! - [`heston`]: Heston parameters and the little-trap characteristic function

pub mod heston;

pub use heston::{HestonError, HestonParams};
