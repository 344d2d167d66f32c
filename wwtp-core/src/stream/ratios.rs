use crate::errors::WwtpResult;
use crate::validation;
use serde::{Deserialize, Serialize};

/// Organic state-variable classes that carry stoichiometric ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganicClass {
    Vfa,
    Fbso,
    Bpo,
    Upo,
    Uso,
    Oho,
    Pao,
}

impl OrganicClass {
    pub const ALL: [OrganicClass; 7] = [
        OrganicClass::Vfa,
        OrganicClass::Fbso,
        OrganicClass::Bpo,
        OrganicClass::Upo,
        OrganicClass::Uso,
        OrganicClass::Oho,
        OrganicClass::Pao,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OrganicClass::Vfa => "VFA",
            OrganicClass::Fbso => "FBSO",
            OrganicClass::Bpo => "BPO",
            OrganicClass::Upo => "UPO",
            OrganicClass::Uso => "USO",
            OrganicClass::Oho => "OHO",
            OrganicClass::Pao => "PAO",
        }
    }
}

/// Mass ratios of one organic class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrganicRatios {
    /// COD per unit organic mass (gCOD/gVSS)
    pub f_cv: f64,
    /// Carbon per unit organic mass (gC/gVSS)
    pub f_c: f64,
    /// Nitrogen per unit organic mass (gN/gVSS)
    pub f_n: f64,
    /// Phosphorus per unit organic mass (gP/gVSS)
    pub f_p: f64,
}

impl OrganicRatios {
    pub const fn new(f_cv: f64, f_c: f64, f_n: f64, f_p: f64) -> Self {
        Self { f_cv, f_c, f_n, f_p }
    }

    /// Carbon per unit COD (gC/gCOD)
    pub fn carbon_per_cod(&self) -> f64 {
        self.f_c / self.f_cv
    }

    /// Nitrogen per unit COD (gN/gCOD)
    pub fn nitrogen_per_cod(&self) -> f64 {
        self.f_n / self.f_cv
    }

    /// Phosphorus per unit COD (gP/gCOD)
    pub fn phosphorus_per_cod(&self) -> f64 {
        self.f_p / self.f_cv
    }
}

/// Stoichiometric ratios for every organic class of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassRatios {
    pub vfa: OrganicRatios,
    pub fbso: OrganicRatios,
    pub bpo: OrganicRatios,
    pub upo: OrganicRatios,
    pub uso: OrganicRatios,
    pub oho: OrganicRatios,
    pub pao: OrganicRatios,
}

impl Default for MassRatios {
    fn default() -> Self {
        Self {
            vfa: OrganicRatios::new(1.0667, 0.400, 0.0, 0.0),
            fbso: OrganicRatios::new(1.4200, 0.471, 0.0464, 0.0118),
            bpo: OrganicRatios::new(1.5230, 0.498, 0.0323, 0.0072),
            upo: OrganicRatios::new(1.4810, 0.518, 0.1000, 0.0250),
            uso: OrganicRatios::new(1.4930, 0.498, 0.0366, 0.0),
            oho: OrganicRatios::new(1.4810, 0.518, 0.1000, 0.0250),
            pao: OrganicRatios::new(1.4810, 0.518, 0.1000, 0.0250),
        }
    }
}

impl MassRatios {
    pub fn get(&self, class: OrganicClass) -> &OrganicRatios {
        match class {
            OrganicClass::Vfa => &self.vfa,
            OrganicClass::Fbso => &self.fbso,
            OrganicClass::Bpo => &self.bpo,
            OrganicClass::Upo => &self.upo,
            OrganicClass::Uso => &self.uso,
            OrganicClass::Oho => &self.oho,
            OrganicClass::Pao => &self.pao,
        }
    }

    /// COD ratios must be positive; the elemental ratios non-negative.
    pub fn validate(&self) -> WwtpResult<()> {
        for class in OrganicClass::ALL {
            let ratios = self.get(class);
            let name = class.name();
            validation::positive(&format!("f_CV_{name}"), ratios.f_cv)?;
            validation::non_negative(&format!("f_C_{name}"), ratios.f_c)?;
            validation::non_negative(&format!("f_N_{name}"), ratios.f_n)?;
            validation::non_negative(&format!("f_P_{name}"), ratios.f_p)?;
        }
        Ok(())
    }
}
