//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for pricing, solver and transform operations
//!
//! # Re-exports
//!
//! [`PricingError`], [`SolverError`] and [`TransformError`] are re-exported at
//! this module level.

pub mod error;

pub use error::{PricingError, SolverError, TransformError};
