//! Unit process parameters
//!
//! Each unit process has a parameters struct with defaults matching the reference
//! plant design (25 ML/d municipal influent, 8473.3 m³ reactor, 15 d sludge age).
//! Every struct deserialises with missing keys falling back to its defaults and
//! exposes a `validate()` range check that processes run before computing.

mod capacity;
mod carbon_removal;
mod chemical_p_removal;
mod denitrification;
mod nitrification;
mod primary_settler;
mod river;

pub use capacity::CapacityParameters;
pub use carbon_removal::{CarbonRemovalParameters, WasteOrigin};
pub use chemical_p_removal::ChemicalPRemovalParameters;
pub use denitrification::DenitrificationParameters;
pub use nitrification::NitrificationParameters;
pub use primary_settler::PrimarySettlerParameters;
pub use river::{Degradation, ReachParameters};
