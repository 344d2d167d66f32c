//! Carbon removal in the activated sludge reactor
//!
//! ```text
//! Qi -> [Activated Sludge + SST] -> Qe
//!                |
//!                v Qw
//! ```
//!
//! # What This Component Does
//!
//! Steady-state design of an aerobic activated sludge reactor with its secondary
//! settler. For a given sludge age the component computes the sludge mass and
//! composition, the biodegradable COD left unconsumed, the nutrients bound into
//! the sludge and the oxygen demand, then builds the effluent and wastage streams.
//!
//! Heterotroph kinetics, corrected from 20 °C with $k_T = k_{20} \theta^{T-20}$:
//!
//! $$f_{XBH} = \frac{Y_{Hv} R_s}{1 + b_{HT} R_s} \qquad S_b = \frac{1}{f_{XBH} k_{vT}}$$
//!
//! Sludge masses (kg):
//!
//! - live heterotrophs $MX_{BH} = (FS_{bi} - Q S_b) f_{XBH}$
//! - endogenous residue $MX_{EH} = f_H b_{HT} R_s MX_{BH}$
//! - influent unbiodegradable organics $MX_I = FX_{ti} R_s$
//! - inert solids $MX_{IO} = FiSS \cdot R_s + f_{iOHO} MX_{BH} + F_{prec} R_s$
//!
//! # Inputs
//!
//! - Influent stream (no active biomass)
//! - Kinetic constants
//!
//! # Outputs
//!
//! - Effluent: residual FBSO, unbiodegradable soluble COD, ammonia left after
//!   synthesis, orthophosphate after precipitation
//! - Wastage: the same solubles plus sludge (UPO, OHO, iSS), concentrated by
//!   `(1 + RAS) / RAS` when wasting from the settler
//! - Sludge, oxygen demand and settler variables; chemical dosing and
//!   optional capacity results
//!
//! # Differences from a dynamic model
//!
//! - Steady state only; the settler is ideal (no solids in the effluent)
//! - All influent VFA and BPO are consumed
//! - The ammonia in the effluent is the ammonia not needed for sludge; its
//!   oxidation is left to [`Nitrification`](super::Nitrification)

use super::sludge_balances;
use crate::chemical::{ChemicalPRemoval, ChemicalPRemovalOutput};
use crate::parameters::{
    CapacityParameters, CarbonRemovalParameters, ChemicalPRemovalParameters, WasteOrigin,
};
use crate::settling::{CapacityEstimate, CapacityEstimation};
use log::debug;
use wwtp_core::balance::MassBalance;
use wwtp_core::constants::{arrhenius, KineticConstants, NITRIFICATION_OXYGEN_DEMAND};
use wwtp_core::errors::{Infeasibility, WwtpError, WwtpResult};
use wwtp_core::report::ProcessReport;
use wwtp_core::stream::{Components, Stream};
use wwtp_core::validation;
use wwtp_core::ProcessVariables;

const STAGE: &str = "carbon removal";

/// Derived quantities of the carbon removal stage
#[derive(Debug, Clone, Copy, PartialEq, ProcessVariables)]
pub struct CarbonRemovalVariables {
    #[variable(name = "fSus", unit = "gUSO/gCOD", description = "USO/COD ratio (influent)")]
    pub fsus: f64,

    #[variable(name = "fSup", unit = "gUPO/gCOD", description = "UPO/COD ratio (influent)")]
    pub fsup: f64,

    #[variable(name = "Ns", unit = "mgN/L", description = "N required for sludge production")]
    pub ns: f64,

    #[variable(name = "Ps", unit = "mgP/L", description = "P required for sludge production")]
    pub ps: f64,

    #[variable(name = "Cs", unit = "mgC/L", description = "C required for sludge production")]
    pub cs: f64,

    #[variable(name = "Psa", unit = "mgP/L", description = "Orthophosphate available for chemical removal")]
    pub psa: f64,

    #[variable(name = "HRT", unit = "hour", description = "Nominal hydraulic retention time")]
    pub hrt: f64,

    #[variable(name = "bHT", unit = "1/d", description = "OHO endogenous respiration rate corrected by temperature")]
    pub bht: f64,

    #[variable(name = "k_vT", unit = "L/(mgVSS·d)", description = "FBSO utilisation rate corrected by temperature")]
    pub k_vt: f64,

    #[variable(name = "f_XBH", unit = "gVSS·d/gCOD", description = "OHO biomass production rate")]
    pub f_xbh: f64,

    #[variable(name = "S_b", unit = "mgCOD/L", description = "Biodegradable soluble COD not degraded")]
    pub s_b: f64,

    #[variable(name = "MX_BH", unit = "kgVSS", description = "OHO live biomass VSS")]
    pub mx_bh: f64,

    #[variable(name = "MX_EH", unit = "kgVSS", description = "OHO endogenous residue VSS")]
    pub mx_eh: f64,

    #[variable(name = "MX_I", unit = "kgVSS", description = "Unbiodegradable organics VSS")]
    pub mx_i: f64,

    #[variable(name = "MX_V", unit = "kgVSS", description = "Volatile suspended solids")]
    pub mx_v: f64,

    #[variable(name = "MX_IO", unit = "kgiSS", description = "Inert solids (influent, biomass and precipitate)")]
    pub mx_io: f64,

    #[variable(name = "MX_T", unit = "kgTSS", description = "Total suspended solids")]
    pub mx_t: f64,

    #[variable(name = "X_V", unit = "kgVSS/m3", description = "VSS concentration in the reactor")]
    pub x_v: f64,

    #[variable(name = "X_T", unit = "kgTSS/m3", description = "TSS concentration in the reactor")]
    pub x_t: f64,

    #[variable(name = "fi", unit = "gVSS/gTSS", description = "VSS/TSS ratio")]
    pub fi: f64,

    #[variable(name = "f_avOHO", unit = "gOHO/gVSS", description = "Active fraction of the sludge (VSS)")]
    pub f_avoho: f64,

    #[variable(name = "f_atOHO", unit = "gOHO/gTSS", description = "Active fraction of the sludge (TSS)")]
    pub f_atoho: f64,

    #[variable(name = "FOc", unit = "kgO/d", description = "Carbonaceous oxygen demand")]
    pub foc: f64,

    #[variable(name = "FOn", unit = "kgO/d", description = "Nitrogenous oxygen demand if all effluent ammonia were nitrified")]
    pub fon: f64,

    #[variable(name = "FOt", unit = "kgO/d", description = "Total oxygen demand")]
    pub fot: f64,

    #[variable(name = "OUR", unit = "mgO/(L·h)", description = "Oxygen uptake rate")]
    pub our: f64,

    #[variable(name = "Qr", unit = "ML/d", description = "SST recycle flowrate")]
    pub qr: f64,

    #[variable(name = "f_RAS", unit = "ø", description = "SST underflow concentrating factor")]
    pub f_ras: f64,

    #[variable(name = "X_RAS", unit = "kgTSS/m3", description = "SST underflow TSS concentration")]
    pub x_ras: f64,

    #[variable(name = "f", unit = "ø", description = "Wastage concentrating factor")]
    pub f: f64,

    #[variable(name = "Qe", unit = "ML/d", description = "Effluent flowrate")]
    pub qe: f64,

    #[variable(name = "Qw", unit = "ML/d", description = "Wastage flowrate")]
    pub qw: f64,
}

/// Carbon removal result
#[derive(Debug, Clone)]
pub struct CarbonRemovalOutput {
    pub parameters: CarbonRemovalParameters,
    pub influent: Stream,
    pub effluent: Stream,
    pub wastage: Stream,
    pub variables: CarbonRemovalVariables,
    pub chemical: ChemicalPRemovalOutput,
    pub capacity: Option<CapacityEstimate>,
}

impl CarbonRemovalOutput {
    /// COD, nitrogen and phosphorus balances over the reactor and settler
    pub fn balances(&self) -> Vec<MassBalance> {
        sludge_balances(
            STAGE,
            &self.influent,
            &self.effluent,
            &self.wastage,
            self.variables.foc,
            0.0,
            self.chemical.po4_removed,
        )
    }

    /// Stage, dosing and capacity variables in one report
    pub fn report(&self) -> ProcessReport {
        let mut report = self.variables.to_report();
        report.merge(&self.chemical.to_report());
        if let Some(capacity) = &self.capacity {
            report.merge(&capacity.to_report());
        }
        report
    }
}

/// Activated sludge reactor removing organic carbon
#[derive(Debug, Clone, Default)]
pub struct CarbonRemoval {
    parameters: CarbonRemovalParameters,
    chemical: Option<ChemicalPRemoval>,
    capacity: Option<CapacityEstimation>,
}

impl CarbonRemoval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: CarbonRemovalParameters) -> Self {
        Self {
            parameters,
            ..Default::default()
        }
    }

    /// Dose metal salt into the reactor
    pub fn with_chemical_p_removal(mut self, parameters: ChemicalPRemovalParameters) -> Self {
        self.chemical = Some(ChemicalPRemoval::from_parameters(parameters));
        self
    }

    /// Check the design against the secondary settler capacity
    pub fn with_capacity_estimation(mut self, parameters: CapacityParameters) -> Self {
        self.capacity = Some(CapacityEstimation::from_parameters(parameters));
        self
    }

    pub fn parameters(&self) -> &CarbonRemovalParameters {
        &self.parameters
    }

    pub fn run(&self, constants: &KineticConstants, influent: &Stream) -> WwtpResult<CarbonRemovalOutput> {
        constants.validate()?;
        let p = &self.parameters;
        p.validate()?;

        let q = validation::positive("flow", influent.flow())?;
        let c = influent.components();
        if c.x_oho > 0.0 || c.x_pao > 0.0 {
            return Err(WwtpError::Validation {
                field: if c.x_oho > 0.0 { "X_OHO" } else { "X_PAO" }.to_string(),
                value: c.x_oho.max(c.x_pao),
                reason: "influent to the reactor must carry no active biomass".to_string(),
            });
        }

        let r = influent.ratios();
        let totals = influent.totals();
        let fluxes = influent.fluxes().totals;
        let (t, vp, rs, ras) = (p.temperature, p.reactor_volume, p.sludge_age, p.recycle_ratio);

        let sti = validation::positive("COD", totals.cod.total)?;
        let suse = totals.cod.unbiodegradable_soluble;
        let fsus = suse / sti;
        let fsup = totals.cod.unbiodegradable_particulate / sti;

        let fsti = fluxes.cod.total;
        let fsbi = fluxes.cod.biodegradable;
        let fxti = fluxes.tss.unbiodegradable_volatile;
        let fiss = fluxes.tss.inorganic;

        // heterotroph kinetics
        let bht = arrhenius(constants.bh, constants.theta_bh, t);
        let yh_vss = constants.yh_vss(r.oho.f_cv);
        let f_xbh = yh_vss * rs / (1.0 + bht * rs);
        let k_vt = arrhenius(constants.k_v20, constants.theta_k_v20, t);
        let s_b = (1.0 / (f_xbh * k_vt)).clamp(0.0, c.s_fbso);
        let fdsbi = fsbi - q * s_b;

        // sludge masses
        let mx_bh = fdsbi * f_xbh;
        let mx_eh = constants.fh * bht * rs * mx_bh;
        let mx_i = fxti * rs;
        let mx_v = mx_bh + mx_eh + mx_i;
        let mx_oho = mx_bh + mx_eh;

        // nutrients bound into sludge
        let per_influent = rs * q;
        let ns = (r.oho.f_n * mx_oho + r.upo.f_n * mx_i) / per_influent;
        let ps = (r.oho.f_p * mx_oho + r.upo.f_p * mx_i) / per_influent;
        let cs = (r.oho.f_c * mx_oho + r.upo.f_c * mx_i) / per_influent;

        let nouse = totals.tkn.organic.unbiodegradable_soluble;
        let nobse = s_b * r.fbso.nitrogen_per_cod();
        let nae = totals.tkn.total - ns - nouse - nobse;
        if nae < 0.0 {
            return Err(Infeasibility::InsufficientNutrient {
                nutrient: "nitrogen".to_string(),
                available: nae,
            }
            .into());
        }

        let pouse = totals.tp.organic.unbiodegradable_soluble;
        let pobse = s_b * r.fbso.phosphorus_per_cod();
        let psa = totals.tp.total - ps - pouse - pobse;
        if psa < 0.0 {
            return Err(Infeasibility::InsufficientNutrient {
                nutrient: "phosphorus".to_string(),
                available: psa,
            }
            .into());
        }

        if cs > totals.toc.total {
            return Err(Infeasibility::InsufficientNutrient {
                nutrient: "carbon".to_string(),
                available: totals.toc.total - cs,
            }
            .into());
        }

        let chemical = match &self.chemical {
            Some(process) => process.precipitate(q, psa)?,
            None => ChemicalPRemoval::from_parameters(ChemicalPRemovalParameters::default().disabled())
                .precipitate(q, psa)?,
        };
        let pse = chemical.po4_effluent;

        let mx_io = fiss * rs + constants.f_ioho * mx_bh + chemical.extra_iss * rs;
        let mx_t = mx_v + mx_io;

        let x_bh = mx_bh / vp;
        let x_eh = mx_eh / vp;
        let x_i = mx_i / vp;
        let x_v = mx_v / vp;
        let x_io = mx_io / vp;
        let x_t = mx_t / vp;

        let hrt = vp / (q * 1000.0) * 24.0;

        // secondary settler
        // no underflow recycle: the underflow is infinitely thick
        let f_ras = if ras > 0.0 {
            (1.0 + ras) / ras
        } else {
            f64::INFINITY
        };
        let x_ras = f_ras * x_t;
        let qr = q * ras;
        let f = match p.waste_origin {
            WasteOrigin::Reactor => 1.0,
            WasteOrigin::SecondarySettler => f_ras,
        };
        let qw = vp / rs / f / 1000.0;
        let qe = q - qw;
        if qe <= 0.0 {
            return Err(WwtpError::Validation {
                field: "sludge_age".to_string(),
                value: rs,
                reason: format!("wastage flow {qw:.4} ML/d leaves no effluent from {q:.4} ML/d"),
            });
        }

        let fi = mx_v / mx_t;
        let f_avoho = mx_bh / mx_v;
        let f_atoho = fi * f_avoho;

        // oxygen demand
        let catabolism = 1.0 - constants.yh;
        let respiration = r.oho.f_cv * (1.0 - constants.fh) * bht * f_xbh;
        let foc = fdsbi * (catabolism + respiration);
        let fon = NITRIFICATION_OXYGEN_DEMAND * q * nae;
        let fot = foc + fon;
        let our = fot / (vp * 24.0) * 1000.0;

        let solubles = Components {
            s_fbso: s_b,
            s_uso: suse,
            s_nh4: nae,
            s_po4: pse,
            s_nox: c.s_nox,
            s_o2: c.s_o2,
            ..Default::default()
        };
        let effluent = influent.derive(qe, solubles)?;
        let wastage = influent.derive(
            qw,
            Components {
                x_upo: f * r.upo.f_cv * x_i * 1000.0,
                x_iss: f * x_io * 1000.0,
                x_oho: f * r.oho.f_cv * (x_bh + x_eh) * 1000.0,
                ..solubles
            },
        )?;

        let capacity = match &self.capacity {
            Some(estimation) => {
                let estimate = estimation.estimate(mx_t / fsti, sti, vp)?;
                estimation.check_load(&estimate, q, x_t)?;
                Some(estimate)
            }
            None => None,
        };

        debug!(
            "carbon removal: MX_T {mx_t:.2} kgTSS, S_b {s_b:.4} mgCOD/L, Nae {nae:.4} mgN/L, \
             FOc {foc:.2} kgO/d"
        );

        Ok(CarbonRemovalOutput {
            parameters: p.clone(),
            influent: *influent,
            effluent,
            wastage,
            variables: CarbonRemovalVariables {
                fsus,
                fsup,
                ns,
                ps,
                cs,
                psa,
                hrt,
                bht,
                k_vt,
                f_xbh,
                s_b,
                mx_bh,
                mx_eh,
                mx_i,
                mx_v,
                mx_io,
                mx_t,
                x_v,
                x_t,
                fi,
                f_avoho,
                f_atoho,
                foc,
                fon,
                fot,
                our,
                qr,
                f_ras,
                x_ras,
                f,
                qe,
                qw,
            },
            chemical,
            capacity,
        })
    }
}
