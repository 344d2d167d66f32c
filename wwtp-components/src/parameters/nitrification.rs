//! Nitrification Parameters

use serde::{Deserialize, Serialize};
use wwtp_core::errors::WwtpResult;
use wwtp_core::validation;

/// Parameters for nitrification in the activated sludge reactor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NitrificationParameters {
    /// Safety factor on the nitrifier growth rate
    /// Higher values raise the design sludge age and dampen effluent ammonia swings
    /// unit: dimensionless
    /// default: 1.25
    #[serde(alias = "SF")]
    pub safety_factor: f64,

    /// Unaerated sludge mass fraction
    /// unit: dimensionless
    /// default: 0.39
    #[serde(alias = "fxt")]
    pub unaerated_fraction: f64,

    /// Dissolved oxygen in the aerobic zone
    /// unit: mgO/L
    /// default: 2.0
    #[serde(alias = "DO")]
    pub dissolved_oxygen: f64,

    /// Reactor pH
    /// default: 7.2
    #[serde(alias = "pH")]
    pub ph: f64,
}

impl Default for NitrificationParameters {
    fn default() -> Self {
        Self {
            safety_factor: 1.25,
            unaerated_fraction: 0.39,
            dissolved_oxygen: 2.0,
            ph: 7.2,
        }
    }
}

impl NitrificationParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::non_negative("safety_factor", self.safety_factor)?;
        validation::non_negative("unaerated_fraction", self.unaerated_fraction)?;
        validation::below("unaerated_fraction", self.unaerated_fraction, 1.0)?;
        validation::non_negative("dissolved_oxygen", self.dissolved_oxygen)?;
        validation::within("ph", self.ph, 0.0, 14.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(NitrificationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_fully_unaerated_rejected() {
        let params = NitrificationParameters {
            unaerated_fraction: 1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_oxygen_rejected() {
        let params = NitrificationParameters {
            dissolved_oxygen: -0.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
