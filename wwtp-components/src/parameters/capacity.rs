//! Capacity Estimation Parameters
//!
//! Secondary settler characteristics used to estimate the average dry weather
//! flow a plant can treat before the settler is overloaded.

use serde::{Deserialize, Serialize};
use wwtp_core::errors::WwtpResult;
use wwtp_core::solver::NewtonRaphson;
use wwtp_core::validation;

/// Parameters for settler capacity estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityParameters {
    /// Diluted sludge volume index (settleability)
    /// unit: mL/gTSS
    /// default: 120.0
    #[serde(alias = "DSVI")]
    pub dsvi: f64,

    /// Secondary settler surface area
    /// unit: m²
    /// default: 1248.6
    #[serde(alias = "A_ST")]
    pub settler_area: f64,

    /// Peak wet weather flow factor (Qmax/Qavg)
    /// unit: dimensionless
    /// default: 2.4
    #[serde(alias = "fq")]
    pub peak_flow_factor: f64,

    /// Tolerated overload before the plant is considered infeasible
    /// unit: dimensionless
    /// default: 0.05
    pub overload_tolerance: f64,

    /// Root finder used for the average solids concentration
    pub solver: NewtonRaphson,
}

impl Default for CapacityParameters {
    fn default() -> Self {
        Self {
            dsvi: 120.0,
            settler_area: 1248.6,
            peak_flow_factor: 2.4,
            overload_tolerance: 0.05,
            solver: NewtonRaphson::default(),
        }
    }
}

impl CapacityParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::positive("dsvi", self.dsvi)?;
        validation::positive("settler_area", self.settler_area)?;
        validation::at_least("peak_flow_factor", self.peak_flow_factor, 1.0)?;
        validation::non_negative("overload_tolerance", self.overload_tolerance)?;
        validation::positive("solver.tolerance", self.solver.tolerance)?;
        Ok(())
    }
}
