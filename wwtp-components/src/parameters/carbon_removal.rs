//! Carbon Removal Parameters
//!
//! Design parameters of the activated sludge reactor and its secondary settler.
//! The same reactor parameters are shared by the nitrification and
//! denitrification stages that build on the carbon removal result.

use serde::{Deserialize, Serialize};
use wwtp_core::errors::{WwtpError, WwtpResult};
use wwtp_core::validation;

/// Where the secondary sludge is wasted from
///
/// ```text
///  Reactor                  | SecondarySettler
///  Q -> [AS] -> [SST] -> Qe | Q -> [AS] -> [SST] -> Qe
///        |                  |               |
///        v Qw               |               v Qw
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WasteOrigin {
    /// Mixed liquor wasted directly from the reactor (hydraulic sludge age control)
    #[default]
    Reactor,
    /// Underflow wasted from the secondary settler, concentrated by `(1 + RAS) / RAS`
    #[serde(alias = "sst")]
    SecondarySettler,
}

/// Parameters for the activated sludge reactor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonRemovalParameters {
    /// Reactor temperature
    /// unit: °C
    /// default: 16.0
    #[serde(alias = "T")]
    pub temperature: f64,

    /// Reactor volume
    /// unit: m³
    /// default: 8473.3
    #[serde(alias = "Vp")]
    pub reactor_volume: f64,

    /// Solids retention time (sludge age)
    /// unit: d
    /// default: 15.0
    #[serde(alias = "Rs")]
    pub sludge_age: f64,

    /// Secondary settler underflow recycle ratio
    /// unit: dimensionless
    /// default: 1.0
    #[serde(alias = "RAS")]
    pub recycle_ratio: f64,

    /// Where secondary sludge is wasted from
    /// default: reactor
    pub waste_origin: WasteOrigin,
}

impl Default for CarbonRemovalParameters {
    fn default() -> Self {
        Self {
            temperature: 16.0,
            reactor_volume: 8473.3,
            sludge_age: 15.0,
            recycle_ratio: 1.0,
            waste_origin: WasteOrigin::Reactor,
        }
    }
}

impl CarbonRemovalParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::finite("temperature", self.temperature)?;
        validation::positive("reactor_volume", self.reactor_volume)?;
        validation::positive("sludge_age", self.sludge_age)?;
        validation::non_negative("recycle_ratio", self.recycle_ratio)?;
        if self.waste_origin == WasteOrigin::SecondarySettler && self.recycle_ratio == 0.0 {
            return Err(WwtpError::Validation {
                field: "recycle_ratio".to_string(),
                value: self.recycle_ratio,
                reason: "must be > 0 when wasting from the secondary settler".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(CarbonRemovalParameters::default().validate().is_ok());
    }

    #[test]
    fn test_negative_temperature_allowed() {
        let params = CarbonRemovalParameters {
            temperature: -2.0,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_sludge_age_rejected() {
        let params = CarbonRemovalParameters {
            sludge_age: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_recycle_only_with_reactor_wastage() {
        let reactor = CarbonRemovalParameters {
            recycle_ratio: 0.0,
            ..Default::default()
        };
        assert!(reactor.validate().is_ok());

        let settler = CarbonRemovalParameters {
            waste_origin: WasteOrigin::SecondarySettler,
            ..reactor
        };
        assert!(matches!(
            settler.validate(),
            Err(WwtpError::Validation { ref field, .. }) if field == "recycle_ratio"
        ));
    }

    #[test]
    fn test_waste_origin_names() {
        let origin: WasteOrigin = serde_json::from_str("\"secondarySettler\"").unwrap();
        assert_eq!(origin, WasteOrigin::SecondarySettler);
        let origin: WasteOrigin = serde_json::from_str("\"sst\"").unwrap();
        assert_eq!(origin, WasteOrigin::SecondarySettler);
        let origin: WasteOrigin = serde_json::from_str("\"reactor\"").unwrap();
        assert_eq!(origin, WasteOrigin::Reactor);
        assert!(serde_json::from_str::<WasteOrigin>("\"lagoon\"").is_err());
    }

    #[test]
    fn test_short_keys_accepted() {
        let params: CarbonRemovalParameters =
            toml::from_str("T = 20.0\nVp = 1000.0\nwaste_origin = \"secondarySettler\"\n").unwrap();
        assert_eq!(params.temperature, 20.0);
        assert_eq!(params.reactor_volume, 1000.0);
        assert_eq!(params.sludge_age, 15.0);
        assert_eq!(params.waste_origin, WasteOrigin::SecondarySettler);
    }
}
