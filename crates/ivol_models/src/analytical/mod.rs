//! Analytical pricing formulas for European calls.
//!
//! This module provides:
//! - Standard normal CDF/PDF (`distributions`)
//! - Black-Scholes call price with continuous dividend yield (`black_scholes`)
//! - Bisection implied-volatility solver (`implied_vol`)
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`** where the formula allows it
//! - **Numerical Stability**: erfc-based CDF, intrinsic value at vanishing
//!   total volatility, boundary values for overflowing `d₁`/`d₂`

pub mod black_scholes;
pub mod distributions;
pub mod error;
pub mod implied_vol;

pub use black_scholes::BlackScholes;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
pub use implied_vol::{ImpliedVolSolver, VOL_LOWER, VOL_UPPER};
