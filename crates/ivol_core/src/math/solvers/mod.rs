//! Root-finding solvers for numerical computation.
//!
//! ## Available Solvers
//!
//! - [`BisectionSolver`]: Bracketing method relying only on continuity and
//!   a sign change; used for implied volatility where the pricing function is
//!   monotone in volatility
//!
//! ## Configuration
//!
//! Solvers use [`SolverConfig`] for configuring:
//! - `tolerance`: Convergence tolerance on `|f(x)|` (default: 1e-10)
//! - `max_iterations`: Maximum iteration count (default: 100)
//!
//! ## Examples
//!
//! ```
//! use ivol_core::math::solvers::{BisectionSolver, SolverConfig};
//!
//! let solver = BisectionSolver::new(SolverConfig::default());
//!
//! // Solve e^x - 2 = 0 (find ln 2)
//! let root = solver.find_root(|x: f64| x.exp() - 2.0, 0.0, 1.0).unwrap();
//! assert!((root - 2.0_f64.ln()).abs() < 1e-9);
//! ```

mod bisection;
mod config;

pub use bisection::BisectionSolver;
pub use config::SolverConfig;
