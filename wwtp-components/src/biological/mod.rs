//! Biological treatment in the activated sludge reactor
//!
//! The three stages build on each other. [`CarbonRemoval`] sizes the sludge and
//! sets the effluent organics; [`Nitrification`] takes the carbon removal result
//! and oxidises ammonia; [`Denitrification`] takes the nitrification result and
//! reduces part of the nitrate in an anoxic zone. Each stage returns fresh
//! effluent and wastage streams and keeps the stage it was built on.

mod carbon_removal;
mod denitrification;
mod nitrification;

pub use carbon_removal::{CarbonRemoval, CarbonRemovalOutput, CarbonRemovalVariables};
pub use denitrification::{Denitrification, DenitrificationOutput, DenitrificationVariables};
pub use nitrification::{Nitrification, NitrificationOutput, NitrificationVariables};

use wwtp_core::balance::{BalanceKind, MassBalance};
use wwtp_core::stream::Stream;

/// COD, total nitrogen and phosphorus balances shared by every biological stage.
///
/// `oxygen_consumed` is the carbonaceous oxygen demand (kgO/d), `nitrogen_gas`
/// the nitrogen lost to the atmosphere (kgN/d) and `phosphate_precipitated` the
/// orthophosphate removed by dosing (kgP/d).
pub(crate) fn sludge_balances(
    stage: &str,
    influent: &Stream,
    effluent: &Stream,
    wastage: &Stream,
    oxygen_consumed: f64,
    nitrogen_gas: f64,
    phosphate_precipitated: f64,
) -> Vec<MassBalance> {
    let inf = influent.fluxes().totals;
    let eff = effluent.fluxes().totals;
    let was = wastage.fluxes().totals;
    vec![
        MassBalance::new(
            stage,
            BalanceKind::Cod,
            inf.cod.total,
            eff.cod.total + was.cod.total + oxygen_consumed,
        ),
        MassBalance::new(
            stage,
            BalanceKind::Nitrogen,
            inf.tn.total,
            eff.tn.total + was.tn.total + nitrogen_gas,
        ),
        MassBalance::new(
            stage,
            BalanceKind::Phosphorus,
            inf.tp.total,
            eff.tp.total + was.tp.total + phosphate_precipitated,
        ),
    ]
}
