//! Unit processes for steady-state wastewater treatment models
//!
//! This crate provides the unit processes of a municipal activated sludge plant and
//! a steady-state model of the river receiving its effluent.
//!
//! # Module Organisation
//!
//! Processes are organised by domain:
//! - `settling`: primary settler and secondary settler capacity
//! - `biological`: carbon removal, nitrification and denitrification
//! - `chemical`: metal salt dosing for phosphorus precipitation
//! - `plant`: configurable composition of the above, loadable from TOML
//! - `river`: river reaches and the network routing effluent through them
//!
//! # Parameters
//!
//! Each process has an associated parameters struct in the `parameters` module
//! with defaults matching the reference plant design.

pub mod biological;
pub mod chemical;
pub mod parameters;
pub mod plant;
pub mod river;
pub mod settling;
