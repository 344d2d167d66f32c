//! Steady-state wastewater treatment plant and receiving river models
//!
//! `wwtp` bundles the core stream types ([`wwtp_core`]) with the unit processes
//! and plant orchestration built on them ([`wwtp_components`]).
//!
//! ```no_run
//! use wwtp::prelude::*;
//!
//! let plant = Plant::from_toml_str("[configuration]\ndenitrification = false\n")?;
//! let influent = Stream::new(
//!     25.0,
//!     Components {
//!         s_vfa: 50.0,
//!         s_fbso: 115.0,
//!         x_bpo: 440.0,
//!         x_upo: 100.0,
//!         s_uso: 45.0,
//!         x_iss: 60.0,
//!         s_nh4: 39.1,
//!         s_po4: 7.28,
//!         ..Default::default()
//!     },
//! )?;
//! let output = plant.run(&influent)?;
//! println!("{:?}", output.effluent().summary());
//! # Ok::<(), WwtpError>(())
//! ```

pub use wwtp_components;
pub use wwtp_core;

/// Types needed to describe, run and inspect a plant or river network
pub mod prelude {
    pub use wwtp_components::parameters::{Degradation, ReachParameters};
    pub use wwtp_components::plant::{Configuration, Plant, PlantOutput, PlantParameters};
    pub use wwtp_components::river::{Reach, RiverNetwork};
    pub use wwtp_core::balance::{BalanceKind, BalanceMode, MassBalance};
    pub use wwtp_core::constants::KineticConstants;
    pub use wwtp_core::errors::{Infeasibility, WwtpError, WwtpResult};
    pub use wwtp_core::report::{ProcessReport, ProcessVariables};
    pub use wwtp_core::stream::{Component, Components, Stream};
}
