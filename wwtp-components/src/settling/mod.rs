//! Settling unit processes
//!
//! - [`PrimarySettler`]: gravity removal of particulate fractions ahead of the reactor
//! - [`CapacityEstimation`]: secondary settler limited plant capacity

mod capacity;
mod primary;

pub use capacity::{CapacityEstimate, CapacityEstimation};
pub use primary::{PrimarySettler, PrimarySettlerOutput, PrimarySettlerVariables};
