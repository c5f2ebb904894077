//! Numerical building blocks.
//!
//! - [`solvers`]: bracketing root finders
//! - [`fourier`]: fractional DFT used by transform pricers

pub mod fourier;
pub mod solvers;
