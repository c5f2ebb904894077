//! # ivol_core: Numerical Foundation for Implied Volatility Engines
//!
//! ## Layer 1 (Foundation) Role
//!
//! ivol_core is the bottom layer of the workspace and provides:
//! - Error types: `PricingError`, `SolverError`, `TransformError` (`types::error`)
//! - Bracketing root finder with iteration and tolerance control (`math::solvers`)
//! - Fractional discrete Fourier transform on top of `rustfft` (`math::fourier`)
//!
//! ## Dependency Principle
//!
//! Layer 1 has no dependencies on other ivol_* crates:
//! - num-traits: Traits for generic numerical computation
//! - num-complex: Complex arithmetic shared with the transform layer
//! - rustfft: Radix-2 and mixed-radix FFT plans
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use ivol_core::math::solvers::{BisectionSolver, SolverConfig};
//!
//! let solver = BisectionSolver::new(SolverConfig::new(1e-12, 200));
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for configuration and error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
