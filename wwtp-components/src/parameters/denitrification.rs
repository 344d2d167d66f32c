//! Denitrification Parameters

use serde::{Deserialize, Serialize};
use wwtp_core::errors::WwtpResult;
use wwtp_core::validation;

/// Parameters for the anoxic zone of a Modified Ludzack-Ettinger (MLE) plant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DenitrificationParameters {
    /// Mixed liquor internal recirculation ratio (aerobic to anoxic)
    /// unit: dimensionless
    /// default: 5.4
    #[serde(alias = "IR")]
    pub internal_recirculation: f64,

    /// Dissolved oxygen carried with the settler underflow recycle
    /// unit: mgO/L
    /// default: 1.0
    #[serde(alias = "DO_RAS")]
    pub recycle_dissolved_oxygen: f64,

    /// Influent alkalinity
    /// unit: mgCaCO3/L
    /// default: 250.0
    pub influent_alkalinity: f64,
}

impl Default for DenitrificationParameters {
    fn default() -> Self {
        Self {
            internal_recirculation: 5.4,
            recycle_dissolved_oxygen: 1.0,
            influent_alkalinity: 250.0,
        }
    }
}

impl DenitrificationParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::non_negative("internal_recirculation", self.internal_recirculation)?;
        validation::non_negative("recycle_dissolved_oxygen", self.recycle_dissolved_oxygen)?;
        validation::non_negative("influent_alkalinity", self.influent_alkalinity)?;
        Ok(())
    }
}
