//! Plant orchestration
//!
//! ```text
//!              configuration, parameters
//!                        |
//! influent -> [PST] -> [AS (+ N (+ DN))] -> effluent
//!               |             |
//!               v             v
//!        primary sludge   waste activated sludge
//! ```
//!
//! A [`Plant`] composes the unit processes according to its [`Configuration`],
//! runs them in order and checks every stage's mass balances with its
//! [`BalanceMode`]. The whole plant (flags, per-technology parameters, kinetic
//! constants and balance mode) can be loaded from TOML:
//!
//! ```toml
//! balance_mode = "strict"
//!
//! [configuration]
//! primary_settler = true
//! nitrification = true
//! denitrification = false
//!
//! [parameters.carbon_removal]
//! Rs = 12.0
//!
//! [constants]
//! mu_am = 0.5
//! ```

use crate::biological::{
    CarbonRemoval, CarbonRemovalOutput, Denitrification, DenitrificationOutput, Nitrification,
    NitrificationOutput,
};
use crate::parameters::{
    CapacityParameters, CarbonRemovalParameters, ChemicalPRemovalParameters,
    DenitrificationParameters, NitrificationParameters, PrimarySettlerParameters,
};
use crate::settling::{PrimarySettler, PrimarySettlerOutput};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use wwtp_core::balance::{self, BalanceMode, MassBalance};
use wwtp_core::constants::KineticConstants;
use wwtp_core::errors::{WwtpError, WwtpResult};
use wwtp_core::report::{ProcessReport, ProcessVariables};
use wwtp_core::stream::Stream;

/// Technologies enabled in a plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(alias = "pst")]
    pub primary_settler: bool,

    #[serde(alias = "nit")]
    pub nitrification: bool,

    /// Requires `nitrification`
    #[serde(alias = "dn")]
    pub denitrification: bool,

    #[serde(alias = "cpr")]
    pub chemical_p_removal: bool,

    #[serde(alias = "cap")]
    pub capacity_estimation: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            primary_settler: true,
            nitrification: true,
            denitrification: true,
            chemical_p_removal: true,
            capacity_estimation: false,
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> WwtpResult<()> {
        if self.denitrification && !self.nitrification {
            return Err(WwtpError::Config(
                "denitrification requires nitrification to be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of every technology, used or not by the configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParameters {
    pub primary_settler: PrimarySettlerParameters,
    pub carbon_removal: CarbonRemovalParameters,
    pub chemical_p_removal: ChemicalPRemovalParameters,
    pub capacity: CapacityParameters,
    pub nitrification: NitrificationParameters,
    pub denitrification: DenitrificationParameters,
}

impl PlantParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        self.primary_settler.validate()?;
        self.carbon_removal.validate()?;
        self.chemical_p_removal.validate()?;
        self.capacity.validate()?;
        self.nitrification.validate()?;
        self.denitrification.validate()
    }
}

/// Technology a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    PrimarySettler,
    CarbonRemoval,
    CapacityEstimation,
    ChemicalPRemoval,
    Nitrification,
    Denitrification,
}

impl Technology {
    /// Table holding the technology's parameters in a plant file
    pub fn section(&self) -> &'static str {
        match self {
            Technology::PrimarySettler => "primary_settler",
            Technology::CarbonRemoval => "carbon_removal",
            Technology::CapacityEstimation => "capacity",
            Technology::ChemicalPRemoval => "chemical_p_removal",
            Technology::Nitrification => "nitrification",
            Technology::Denitrification => "denitrification",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Technology::PrimarySettler => "Primary settler",
            Technology::CarbonRemoval => "Activated sludge",
            Technology::CapacityEstimation => "Capacity estimation",
            Technology::ChemicalPRemoval => "Chemical P removal",
            Technology::Nitrification => "Nitrification",
            Technology::Denitrification => "Denitrification",
        };
        f.write_str(name)
    }
}

/// Description of one plant parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterInfo {
    /// Key in the technology's table
    pub name: &'static str,
    /// Short alias accepted in plant files
    pub alias: Option<&'static str>,
    pub unit: &'static str,
    pub technology: Technology,
    pub description: &'static str,
}

const fn info(
    name: &'static str,
    alias: Option<&'static str>,
    unit: &'static str,
    technology: Technology,
    description: &'static str,
) -> ParameterInfo {
    ParameterInfo {
        name,
        alias,
        unit,
        technology,
        description,
    }
}

/// Every user-facing plant parameter
pub static PARAMETER_SCHEMA: &[ParameterInfo] = &[
    info("fw", None, "ø", Technology::PrimarySettler, "Fraction of the influent flow wasted as primary sludge"),
    info("removal_bpo", None, "%", Technology::PrimarySettler, "Removal of biodegradable particulate organics"),
    info("removal_upo", None, "%", Technology::PrimarySettler, "Removal of unbiodegradable particulate organics"),
    info("removal_iss", None, "%", Technology::PrimarySettler, "Removal of inorganic suspended solids"),
    info("temperature", Some("T"), "°C", Technology::CarbonRemoval, "Reactor temperature"),
    info("reactor_volume", Some("Vp"), "m3", Technology::CarbonRemoval, "Reactor volume"),
    info("sludge_age", Some("Rs"), "d", Technology::CarbonRemoval, "Solids retention time"),
    info("recycle_ratio", Some("RAS"), "ø", Technology::CarbonRemoval, "Secondary settler underflow recycle ratio"),
    info("waste_origin", None, "option", Technology::CarbonRemoval, "Where sludge is wasted from: reactor or secondarySettler"),
    info("dsvi", Some("DSVI"), "mL/gTSS", Technology::CapacityEstimation, "Sludge settleability"),
    info("settler_area", Some("A_ST"), "m2", Technology::CapacityEstimation, "Secondary settler surface area"),
    info("peak_flow_factor", Some("fq"), "ø", Technology::CapacityEstimation, "Peak flow factor (Qmax/Qavg)"),
    info("overload_tolerance", None, "ø", Technology::CapacityEstimation, "Tolerated overload of flow or solids"),
    info("mass_dosed", Some("mass_FeCl3"), "kg/d", Technology::ChemicalPRemoval, "Metal chloride dosed"),
    info("model", None, "option", Technology::ChemicalPRemoval, "Precipitation model: DoseResponse or Equilibrium"),
    info("safety_factor", Some("SF"), "ø", Technology::Nitrification, "Safety factor on the nitrifier growth rate"),
    info("unaerated_fraction", Some("fxt"), "ø", Technology::Nitrification, "Unaerated sludge mass fraction"),
    info("dissolved_oxygen", Some("DO"), "mgO/L", Technology::Nitrification, "Dissolved oxygen in the aerobic zone"),
    info("ph", Some("pH"), "ø", Technology::Nitrification, "Reactor pH"),
    info("internal_recirculation", Some("IR"), "ø", Technology::Denitrification, "Internal recirculation ratio"),
    info("recycle_dissolved_oxygen", Some("DO_RAS"), "mgO/L", Technology::Denitrification, "Dissolved oxygen in the underflow recycle"),
    info("influent_alkalinity", None, "mgCaCO3/L", Technology::Denitrification, "Influent alkalinity"),
];

/// Reactor result at the depth the configuration reached
#[derive(Debug, Clone)]
pub enum SecondaryOutput {
    CarbonRemoval(CarbonRemovalOutput),
    Nitrification(NitrificationOutput),
    Denitrification(DenitrificationOutput),
}

impl SecondaryOutput {
    pub fn carbon(&self) -> &CarbonRemovalOutput {
        match self {
            SecondaryOutput::CarbonRemoval(out) => out,
            SecondaryOutput::Nitrification(out) => &out.carbon,
            SecondaryOutput::Denitrification(out) => &out.nitrification.carbon,
        }
    }

    pub fn nitrification(&self) -> Option<&NitrificationOutput> {
        match self {
            SecondaryOutput::CarbonRemoval(_) => None,
            SecondaryOutput::Nitrification(out) => Some(out),
            SecondaryOutput::Denitrification(out) => Some(&out.nitrification),
        }
    }

    pub fn denitrification(&self) -> Option<&DenitrificationOutput> {
        match self {
            SecondaryOutput::Denitrification(out) => Some(out),
            _ => None,
        }
    }

    pub fn effluent(&self) -> &Stream {
        match self {
            SecondaryOutput::CarbonRemoval(out) => &out.effluent,
            SecondaryOutput::Nitrification(out) => &out.effluent,
            SecondaryOutput::Denitrification(out) => &out.effluent,
        }
    }

    pub fn wastage(&self) -> &Stream {
        match self {
            SecondaryOutput::CarbonRemoval(out) => &out.wastage,
            SecondaryOutput::Nitrification(out) => &out.wastage,
            SecondaryOutput::Denitrification(out) => &out.wastage,
        }
    }

    pub fn balances(&self) -> Vec<MassBalance> {
        match self {
            SecondaryOutput::CarbonRemoval(out) => out.balances(),
            SecondaryOutput::Nitrification(out) => out.balances(),
            SecondaryOutput::Denitrification(out) => out.balances(),
        }
    }

    /// Total oxygen demand of the deepest stage (kgO/d)
    pub fn oxygen_demand(&self) -> f64 {
        match self {
            SecondaryOutput::CarbonRemoval(out) => out.variables.fot,
            SecondaryOutput::Nitrification(out) => out.variables.fot,
            SecondaryOutput::Denitrification(out) => out.variables.fot,
        }
    }
}

/// Process variables of every stage that ran
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlantReport {
    pub primary_settler: Option<ProcessReport>,
    pub carbon_removal: ProcessReport,
    pub chemical_p_removal: Option<ProcessReport>,
    pub capacity: Option<ProcessReport>,
    pub nitrification: Option<ProcessReport>,
    pub denitrification: Option<ProcessReport>,
}

/// Streams, stage results and balance outcome of one plant run
#[derive(Debug, Clone)]
pub struct PlantOutput {
    pub influent: Stream,
    pub primary: Option<PrimarySettlerOutput>,
    pub secondary: SecondaryOutput,
    /// Balances outside the closure band (only in diagnostic mode)
    pub violations: Vec<MassBalance>,
}

impl PlantOutput {
    /// Final plant effluent
    pub fn effluent(&self) -> &Stream {
        self.secondary.effluent()
    }

    pub fn primary_wastage(&self) -> Option<&Stream> {
        self.primary.as_ref().map(|p| &p.wastage)
    }

    pub fn secondary_wastage(&self) -> &Stream {
        self.secondary.wastage()
    }

    /// Every stage's balances, primary settler first
    pub fn balances(&self) -> Vec<MassBalance> {
        let mut balances = self
            .primary
            .as_ref()
            .map(PrimarySettlerOutput::balances)
            .unwrap_or_default();
        balances.extend(self.secondary.balances());
        balances
    }

    pub fn report(&self) -> PlantReport {
        let carbon = self.secondary.carbon();
        PlantReport {
            primary_settler: self.primary.as_ref().map(|p| p.variables.to_report()),
            carbon_removal: carbon.variables.to_report(),
            chemical_p_removal: (carbon.chemical.mole_ratio > 0.0)
                .then(|| carbon.chemical.to_report()),
            capacity: carbon.capacity.as_ref().map(|c| c.to_report()),
            nitrification: self.secondary.nitrification().map(|n| n.variables.to_report()),
            denitrification: self
                .secondary
                .denitrification()
                .map(|d| d.variables.to_report()),
        }
    }
}

/// A configured wastewater treatment plant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plant {
    pub balance_mode: BalanceMode,
    pub configuration: Configuration,
    pub parameters: PlantParameters,
    pub constants: KineticConstants,
}

impl Plant {
    pub fn new(configuration: Configuration, parameters: PlantParameters) -> Self {
        Self {
            configuration,
            parameters,
            ..Default::default()
        }
    }

    pub fn with_constants(mut self, constants: KineticConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_balance_mode(mut self, mode: BalanceMode) -> Self {
        self.balance_mode = mode;
        self
    }

    /// Load and validate a plant description.
    pub fn from_toml_str(source: &str) -> WwtpResult<Self> {
        let plant: Self = toml::from_str(source)?;
        plant.validate()?;
        Ok(plant)
    }

    pub fn to_toml_string(&self) -> WwtpResult<String> {
        toml::to_string(self).map_err(|e| WwtpError::Config(e.to_string()))
    }

    pub fn validate(&self) -> WwtpResult<()> {
        self.configuration.validate()?;
        self.parameters.validate()?;
        self.constants.validate()
    }

    /// Run the influent through every configured stage.
    ///
    /// All or nothing: the first infeasible stage or, in strict mode, the first
    /// open balance aborts the run.
    pub fn run(&self, influent: &Stream) -> WwtpResult<PlantOutput> {
        self.validate()?;
        let conf = &self.configuration;
        let p = &self.parameters;
        info!(
            "running plant on {:.3} ML/d (settler: {}, nitrification: {}, denitrification: {}, \
             chemical P removal: {})",
            influent.flow(),
            conf.primary_settler,
            conf.nitrification,
            conf.denitrification,
            conf.chemical_p_removal
        );

        let primary = if conf.primary_settler {
            Some(PrimarySettler::from_parameters(p.primary_settler.clone()).settle(influent)?)
        } else {
            None
        };
        let reactor_influent = primary.as_ref().map_or(*influent, |pst| pst.effluent);

        let mut carbon_removal = CarbonRemoval::from_parameters(p.carbon_removal.clone());
        if conf.chemical_p_removal {
            carbon_removal = carbon_removal.with_chemical_p_removal(p.chemical_p_removal.clone());
        }
        if conf.capacity_estimation {
            carbon_removal = carbon_removal.with_capacity_estimation(p.capacity.clone());
        }
        let carbon = carbon_removal.run(&self.constants, &reactor_influent)?;

        let secondary = if conf.nitrification {
            let nitrification = Nitrification::from_parameters(p.nitrification.clone())
                .run(&self.constants, &carbon)?;
            if conf.denitrification {
                SecondaryOutput::Denitrification(
                    Denitrification::from_parameters(p.denitrification.clone())
                        .run(&self.constants, &nitrification)?,
                )
            } else {
                SecondaryOutput::Nitrification(nitrification)
            }
        } else {
            SecondaryOutput::CarbonRemoval(carbon)
        };

        let mut output = PlantOutput {
            influent: *influent,
            primary,
            secondary,
            violations: Vec::new(),
        };
        output.violations = balance::check(&output.balances(), self.balance_mode)?;

        let effluent = output.effluent().summary();
        info!(
            "plant effluent: COD {:.2}, TKN {:.2}, NOx {:.2}, TP {:.2} mg/L; oxygen demand {:.1} kgO/d",
            effluent.cod.concentration,
            effluent.tkn.concentration,
            effluent.nox.concentration,
            effluent.tp.concentration,
            output.secondary.oxygen_demand()
        );
        Ok(output)
    }
}
