//! Primary settler
//!
//! ```text
//! Qi -> [Primary Settler] -> Qe
//!              |
//!              v Qw
//! ```
//!
//! # What This Component Does
//!
//! Splits the influent into a primary effluent and a primary sludge. A fixed
//! fraction `fw` of the flow leaves as sludge, and a fixed percentage of each
//! particulate fraction settles into it:
//!
//! $$Q_w = f_w Q_i \qquad Q_e = Q_i - Q_w$$
//! $$X_w = \frac{Q_i X_i r}{Q_w} \qquad X_e = \frac{Q_i X_i (1 - r)}{Q_e}$$
//!
//! # Inputs
//!
//! - Influent stream (flow must be positive)
//!
//! # Outputs
//!
//! - Effluent and wastage streams
//! - Removed particulate loads (kg/d)
//!
//! # Differences from a full settler model
//!
//! - Removal percentages are inputs, not a function of surface overflow rate
//! - Influent biomass (OHO, PAO) settles at the UPO removal
//! - Soluble components leave at the influent concentration in both outlets

use crate::parameters::PrimarySettlerParameters;
use log::debug;
use wwtp_core::balance::{BalanceKind, MassBalance};
use wwtp_core::errors::WwtpResult;
use wwtp_core::stream::{Component, Components, Stream};
use wwtp_core::validation;
use wwtp_core::ProcessVariables;

const STAGE: &str = "primary settler";

/// Derived quantities of the primary settler
#[derive(Debug, Clone, Copy, PartialEq, ProcessVariables)]
pub struct PrimarySettlerVariables {
    #[variable(name = "Qi", unit = "ML/d", description = "Influent flowrate")]
    pub influent_flow: f64,

    #[variable(name = "Qe", unit = "ML/d", description = "Primary effluent flowrate")]
    pub effluent_flow: f64,

    #[variable(name = "Qw", unit = "ML/d", description = "Primary sludge flowrate")]
    pub wastage_flow: f64,

    #[variable(name = "BPO_removed", unit = "kgCOD/d", description = "Biodegradable particulate organics settled")]
    pub bpo_removed: f64,

    #[variable(name = "UPO_removed", unit = "kgCOD/d", description = "Unbiodegradable particulate organics settled")]
    pub upo_removed: f64,

    #[variable(name = "iSS_removed", unit = "kgiSS/d", description = "Inorganic suspended solids settled")]
    pub iss_removed: f64,
}

/// Primary settler result
#[derive(Debug, Clone)]
pub struct PrimarySettlerOutput {
    pub influent: Stream,
    pub effluent: Stream,
    pub wastage: Stream,
    pub variables: PrimarySettlerVariables,
}

impl PrimarySettlerOutput {
    /// COD, nitrogen and phosphorus balances over the settler
    pub fn balances(&self) -> Vec<MassBalance> {
        let inf = self.influent.fluxes().totals;
        let eff = self.effluent.fluxes().totals;
        let was = self.wastage.fluxes().totals;
        vec![
            MassBalance::new(STAGE, BalanceKind::Cod, inf.cod.total, eff.cod.total + was.cod.total),
            MassBalance::new(
                STAGE,
                BalanceKind::Nitrogen,
                inf.tn.total,
                eff.tn.total + was.tn.total,
            ),
            MassBalance::new(
                STAGE,
                BalanceKind::Phosphorus,
                inf.tp.total,
                eff.tp.total + was.tp.total,
            ),
        ]
    }
}

/// Primary settler with fixed removal percentages
#[derive(Debug, Clone, Default)]
pub struct PrimarySettler {
    parameters: PrimarySettlerParameters,
}

impl PrimarySettler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: PrimarySettlerParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &PrimarySettlerParameters {
        &self.parameters
    }

    pub fn settle(&self, influent: &Stream) -> WwtpResult<PrimarySettlerOutput> {
        let p = &self.parameters;
        p.validate()?;
        let qi = validation::positive("flow", influent.flow())?;
        let qw = p.fw * qi;
        let qe = qi - qw;

        let removal = |component: Component| -> f64 {
            match component {
                Component::Bpo => p.removal_bpo / 100.0,
                Component::Upo | Component::Oho | Component::Pao => p.removal_upo / 100.0,
                Component::Iss => p.removal_iss / 100.0,
                _ => 0.0,
            }
        };

        let mut effluent = Components::default();
        let mut wastage = Components::default();
        for component in Component::ALL {
            let concentration = influent.get(component);
            if is_particulate(component) {
                let load = qi * concentration;
                let r = removal(component);
                *wastage.get_mut(component) = load * r / qw;
                *effluent.get_mut(component) = load * (1.0 - r) / qe;
            } else {
                *effluent.get_mut(component) = concentration;
                *wastage.get_mut(component) = concentration;
            }
        }

        let variables = PrimarySettlerVariables {
            influent_flow: qi,
            effluent_flow: qe,
            wastage_flow: qw,
            bpo_removed: qi * influent.components().x_bpo * removal(Component::Bpo),
            upo_removed: qi * influent.components().x_upo * removal(Component::Upo),
            iss_removed: qi * influent.components().x_iss * removal(Component::Iss),
        };
        debug!(
            "primary settler: Qe {qe:.4} ML/d, Qw {qw:.4} ML/d, {:.2} kgCOD/d BPO settled",
            variables.bpo_removed
        );

        Ok(PrimarySettlerOutput {
            influent: *influent,
            effluent: influent.derive(qe, effluent)?,
            wastage: influent.derive(qw, wastage)?,
            variables,
        })
    }
}

fn is_particulate(component: Component) -> bool {
    matches!(
        component,
        Component::Bpo | Component::Upo | Component::Iss | Component::Oho | Component::Pao
    )
}
