//! Chemical Phosphorus Removal Parameters

use crate::chemical::{DoseResponse, PrecipitationModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wwtp_core::errors::WwtpResult;
use wwtp_core::validation;

/// Parameters for metal salt dosing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemicalPRemovalParameters {
    /// Metal chloride dosed (FeCl3 or AlCl3, depending on the model)
    /// unit: kg/d
    /// default: 3000.0
    #[serde(alias = "mass_FeCl3")]
    pub mass_dosed: f64,

    /// Precipitation model mapping the dose to residual orthophosphate
    /// default: dose-response table for FeCl3
    pub model: Arc<dyn PrecipitationModel>,
}

impl Default for ChemicalPRemovalParameters {
    fn default() -> Self {
        Self {
            mass_dosed: 3000.0,
            model: Arc::new(DoseResponse::default()),
        }
    }
}

impl ChemicalPRemovalParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::non_negative("mass_dosed", self.mass_dosed)?;
        self.model.validate()
    }

    /// Same model with nothing dosed.
    pub fn disabled(&self) -> Self {
        Self {
            mass_dosed: 0.0,
            model: Arc::clone(&self.model),
        }
    }
}
