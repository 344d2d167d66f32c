//! Receiving river
//!
//! A [`RiverNetwork`] of trapezoidal [`Reach`]es carrying headwater flows and
//! plant discharges downstream, degrading selected pollutants along each reach.

mod network;
mod reach;

pub use network::{NetworkOutput, ReachId, ReachOutput, RiverNetwork};
pub use reach::{Reach, ReachHydraulics};
