//! Core types for steady-state wastewater treatment models
//!
//! - [`stream`]: streams, state variables, mass ratios and fractionation
//! - [`constants`]: kinetic constants, stoichiometry and molar masses
//! - [`balance`]: mass balance results and checking
//! - [`report`]: named process variables reported by unit processes
//! - [`solver`]: Newton–Raphson root finding
//! - [`validation`]: parameter range checks

pub mod balance;
pub mod constants;
pub mod errors;
pub mod report;
pub mod solver;
pub mod stream;
pub mod validation;

// Re-export derive macro for convenience
pub use report::ProcessVariables;
pub use wwtp_macros::ProcessVariables;
