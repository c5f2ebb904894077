//! # ivol_models (L2: Models)
//!
//! Implied volatility from European call prices under two models.
//!
//! This crate provides:
//! - Quote value types with no-arbitrage bounds (`quote`)
//! - Closed-form Black-Scholes pricing and a bisection implied-vol solver
//!   (`analytical`)
//! - Heston parameters and the little-trap characteristic function (`models`)
//! - Carr-Madan transform pricing over a log-strike grid with
//!   precomputation and strike-grid caches (`fourier`)
//! - Per-quote Heston calibration by bounded grid search with skew, term and
//!   blending post-processing (`calibration`)
//! - [`PricingEngine`], which owns the caches and exposes the four consumer
//!   operations
//!
//! ## Usage
//!
//! ```
//! use ivol_models::{CallQuote, PricingEngine};
//!
//! let engine = PricingEngine::with_defaults();
//! let quote = CallQuote::new(100.0, 100.0, 1.0, 0.05, 0.0).unwrap();
//!
//! let bs_vol = engine.bs_implied_vol(10.45, &quote).unwrap();
//! assert!((bs_vol - 0.2).abs() < 1e-3);
//! ```
//!
//! ## Design Principles
//!
//! - **Explicit state**: caches live in a [`PricingEngine`] value, never in
//!   process globals
//! - **Failure values, not faults**: every fallible transform step returns a
//!   `Result`, and the retry ladder is a loop over configurations

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod engine;
pub mod fourier;
pub mod models;
pub mod quote;

pub use engine::{
    bs_call, bs_implied_vol, heston_call, heston_implied_vol, with_thread_engine, EngineStats,
    PricingEngine,
};
pub use models::HestonParams;
pub use quote::{CallQuote, MarketState};
