//! Kinetic and stoichiometric constants
//!
//! [`KineticConstants`] holds the temperature-referenced (20 °C) kinetic constants
//! for heterotrophic growth, nitrification and denitrification. It is an immutable
//! value handed to every process call, so two plants with different calibrations
//! can run side by side.
//!
//! The stoichiometric factors and molar masses in this module are fixed chemistry
//! and are exposed as plain constants.

use crate::errors::WwtpResult;
use crate::validation;
use serde::{Deserialize, Serialize};

/// Oxygen equivalent of nitrate reduced to nitrogen gas (gO/gN), 40/14.
pub const NITRATE_OXYGEN_EQUIVALENT: f64 = 40.0 / 14.0;

/// COD of ammonia oxidised to nitrate (gO/gN), 64/14.
pub const NITRIFICATION_OXYGEN_DEMAND: f64 = 64.0 / 14.0;

/// Alkalinity consumed per unit of ammonia nitrified (gCaCO3/gN), 100/14.
pub const ALKALINITY_PER_NITRIFIED_N: f64 = 100.0 / 14.0;

/// Alkalinity produced per unit of nitrogen ammonified or denitrified (gCaCO3/gN), 50/14.
pub const ALKALINITY_PER_AMMONIFIED_N: f64 = 50.0 / 14.0;

/// Molar masses (g/mol)
pub mod molar_mass {
    pub const P: f64 = 30.974;
    pub const FE: f64 = 55.845;
    pub const AL: f64 = 26.982;
    pub const FECL3: f64 = 162.195;
    pub const ALCL3: f64 = 133.332;
    pub const FEOH3: f64 = 106.866;
    pub const ALOH3: f64 = 78.003;
    pub const FEPO4: f64 = 150.815;
    pub const ALPO4: f64 = 121.952;
    pub const FEH2PO4OH: f64 = 250.9646;
}

/// Apply an Arrhenius-style temperature correction to a rate referenced at 20 °C.
///
/// $$k_T = k_{20} \cdot \theta^{(T - 20)}$$
pub fn arrhenius(rate_20: f64, theta: f64, temperature: f64) -> f64 {
    rate_20 * theta.powf(temperature - 20.0)
}

/// Kinetic constants for the activated sludge, nitrification and denitrification
/// stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KineticConstants {
    // ===== Heterotrophic growth =====
    /// Heterotroph yield
    /// unit: gCOD/gCOD
    /// default: 0.666
    pub yh: f64,

    /// Heterotroph endogenous respiration rate at 20 °C
    /// unit: 1/d
    /// default: 0.24
    pub bh: f64,

    /// Temperature coefficient of `bh`
    /// default: 1.029
    pub theta_bh: f64,

    /// Hydrolysis rate of fermentable substrate at 20 °C
    /// unit: L/(mgVSS·d)
    /// default: 0.070
    pub k_v20: f64,

    /// Temperature coefficient of `k_v20`
    /// default: 1.035
    pub theta_k_v20: f64,

    /// Unbiodegradable fraction of dead heterotrophs
    /// default: 0.2
    pub fh: f64,

    /// Inorganic suspended solids fraction of heterotroph biomass
    /// unit: gISS/gVSS
    /// default: 0.15
    pub f_ioho: f64,

    // ===== Nitrification =====
    /// Maximum specific growth rate of nitrifiers at 20 °C
    /// unit: 1/d
    /// default: 0.45
    pub mu_am: f64,

    /// Temperature coefficient of `mu_am`
    /// default: 1.123
    pub theta_mu_am: f64,

    /// Oxygen half-saturation constant for nitrifiers
    /// unit: mgO/L
    /// default: 0.4
    pub k_o: f64,

    /// pH sensitivity coefficient
    /// default: 2.35
    pub theta_ph: f64,

    /// pH inhibition constant
    /// default: 1.13
    pub ki: f64,

    /// pH inhibition constant
    /// default: 0.3
    pub kii: f64,

    /// pH above which nitrification ceases
    /// default: 9.5
    pub kmax: f64,

    /// Nitrifier yield
    /// unit: gVSS/gN
    /// default: 0.1
    pub ya: f64,

    /// Ammonia half-saturation constant at 20 °C
    /// unit: mgN/L
    /// default: 1.0
    pub kn: f64,

    /// Temperature coefficient of `kn`
    /// default: 1.123
    pub theta_kn: f64,

    /// Nitrifier endogenous respiration rate at 20 °C
    /// unit: 1/d
    /// default: 0.04
    pub ba: f64,

    /// Temperature coefficient of `ba`
    /// default: 1.029
    pub theta_ba: f64,

    // ===== Denitrification =====
    /// Specific denitrification rate on readily biodegradable COD at 20 °C
    /// unit: gNO3-N/(gVSS·d)
    /// default: 0.72
    pub k1_20: f64,

    /// Specific denitrification rate on slowly biodegradable COD at 20 °C
    /// unit: gNO3-N/(gVSS·d)
    /// default: 0.101
    pub k2_20: f64,

    /// Temperature coefficient of `k1_20`
    /// default: 1.2
    pub theta_k1: f64,

    /// Temperature coefficient of `k2_20`
    /// default: 1.08
    pub theta_k2: f64,
}

impl Default for KineticConstants {
    fn default() -> Self {
        Self {
            yh: 0.666,
            bh: 0.24,
            theta_bh: 1.029,
            k_v20: 0.070,
            theta_k_v20: 1.035,
            fh: 0.2,
            f_ioho: 0.15,
            mu_am: 0.45,
            theta_mu_am: 1.123,
            k_o: 0.4,
            theta_ph: 2.35,
            ki: 1.13,
            kii: 0.3,
            kmax: 9.5,
            ya: 0.1,
            kn: 1.0,
            theta_kn: 1.123,
            ba: 0.04,
            theta_ba: 1.029,
            k1_20: 0.72,
            k2_20: 0.101,
            theta_k1: 1.2,
            theta_k2: 1.08,
        }
    }
}

impl KineticConstants {
    /// Parse constants from TOML, falling back to defaults for missing keys.
    pub fn from_toml_str(source: &str) -> WwtpResult<Self> {
        let constants: Self = toml::from_str(source)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Reject non-finite or negative constants.
    pub fn validate(&self) -> WwtpResult<()> {
        let named = [
            ("yh", self.yh),
            ("bh", self.bh),
            ("theta_bh", self.theta_bh),
            ("k_v20", self.k_v20),
            ("theta_k_v20", self.theta_k_v20),
            ("fh", self.fh),
            ("f_ioho", self.f_ioho),
            ("mu_am", self.mu_am),
            ("theta_mu_am", self.theta_mu_am),
            ("k_o", self.k_o),
            ("theta_ph", self.theta_ph),
            ("ki", self.ki),
            ("kii", self.kii),
            ("kmax", self.kmax),
            ("ya", self.ya),
            ("kn", self.kn),
            ("theta_kn", self.theta_kn),
            ("ba", self.ba),
            ("theta_ba", self.theta_ba),
            ("k1_20", self.k1_20),
            ("k2_20", self.k2_20),
            ("theta_k1", self.theta_k1),
            ("theta_k2", self.theta_k2),
        ];
        for (field, value) in named {
            validation::non_negative(field, value)?;
        }
        validation::within("yh", self.yh, 0.0, 1.0)?;
        validation::within("fh", self.fh, 0.0, 1.0)?;
        Ok(())
    }

    /// Heterotroph yield expressed as volatile solids, `YH / f_CV`.
    pub fn yh_vss(&self, f_cv_oho: f64) -> f64 {
        self.yh / f_cv_oho
    }
}
