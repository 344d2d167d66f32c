//! Primary Settler Parameters
//!
//! Removal efficiencies are given per particulate fraction. Influent biomass
//! (OHO and PAO) settles like unbiodegradable particulates and uses the UPO
//! removal.

use serde::{Deserialize, Serialize};
use wwtp_core::errors::WwtpResult;
use wwtp_core::validation;

/// Parameters for the primary settler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimarySettlerParameters {
    /// Fraction of the influent flow leaving with the primary sludge
    /// unit: dimensionless
    /// default: 0.005
    pub fw: f64,

    /// Removal of biodegradable particulate organics
    /// unit: %
    /// default: 42.3352
    pub removal_bpo: f64,

    /// Removal of unbiodegradable particulate organics (and influent biomass)
    /// unit: %
    /// default: 90.05
    pub removal_upo: f64,

    /// Removal of inorganic suspended solids
    /// unit: %
    /// default: 75.125
    pub removal_iss: f64,
}

impl Default for PrimarySettlerParameters {
    fn default() -> Self {
        Self {
            fw: 0.005,
            removal_bpo: 42.3352,
            removal_upo: 90.05,
            removal_iss: 75.125,
        }
    }
}

impl PrimarySettlerParameters {
    /// The wastage fraction must leave both outlets with flow; removals are percentages.
    pub fn validate(&self) -> WwtpResult<()> {
        validation::positive("fw", self.fw)?;
        validation::below("fw", self.fw, 1.0)?;
        validation::within("removal_bpo", self.removal_bpo, 0.0, 100.0)?;
        validation::within("removal_upo", self.removal_upo, 0.0, 100.0)?;
        validation::within("removal_iss", self.removal_iss, 0.0, 100.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(PrimarySettlerParameters::default().validate().is_ok());
    }

    #[test]
    fn test_negative_removal_rejected() {
        let params = PrimarySettlerParameters {
            removal_iss: -5.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_wastage_fraction_bounds() {
        for fw in [0.0, 1.0, -0.1] {
            let params = PrimarySettlerParameters {
                fw,
                ..Default::default()
            };
            assert!(params.validate().is_err(), "fw={fw} should be rejected");
        }
    }
}
