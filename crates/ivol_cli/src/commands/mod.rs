//! Command implementations

pub mod bs_iv;
pub mod heston_iv;
