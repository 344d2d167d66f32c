//! Denitrification in the anoxic zone of an MLE plant
//!
//! ```text
//!          +------------- a -------------+
//!          v                             |
//! Qi -> [anoxic] -> [aerobic] -> [SST] -> Qe
//!          ^                      |
//!          +--------- s ----------+-> Qw
//! ```
//!
//! Builds on a [`NitrificationOutput`]. Part of the nitrate formed in the aerobic
//! zone is returned with the internal recirculation `a` and the settler recycle
//! `s` to the anoxic zone, where the influent biodegradable COD reduces it to
//! nitrogen gas. The denitrification potential of the anoxic zone is
//!
//! $$D_{p1} = \frac{S_{bsi}(1 - Y_H)}{2.86} + K_{2T} f_{xt} (S_{bi} - S_b) f_{XBH}$$
//!
//! The optimum recirculation `a_opt` is the positive root of
//! $A a^2 + B a - C = 0$ where the anoxic zone is exactly loaded. Below
//! `a_opt` the effluent nitrate is set by dilution, above it by the oxygen the
//! recycles carry into the anoxic zone.

use super::sludge_balances;
use super::NitrificationOutput;
use crate::parameters::DenitrificationParameters;
use log::{debug, warn};
use wwtp_core::balance::{BalanceKind, MassBalance};
use wwtp_core::constants::{
    arrhenius, KineticConstants, ALKALINITY_PER_AMMONIFIED_N, ALKALINITY_PER_NITRIFIED_N,
    NITRATE_OXYGEN_EQUIVALENT, NITRIFICATION_OXYGEN_DEMAND,
};
use wwtp_core::errors::{Infeasibility, WwtpResult};
use wwtp_core::report::ProcessReport;
use wwtp_core::stream::{Components, Stream};
use wwtp_core::ProcessVariables;

const STAGE: &str = "denitrification";

/// Effluent alkalinity below which pH control is needed (mgCaCO3/L)
pub const MINIMUM_ALKALINITY: f64 = 50.0;

/// Derived quantities of the denitrification stage
#[derive(Debug, Clone, Copy, PartialEq, ProcessVariables)]
pub struct DenitrificationVariables {
    #[variable(name = "K1T", unit = "gN/(gVSS·d)", description = "Denitrification rate on readily biodegradable COD")]
    pub k1t: f64,

    #[variable(name = "K2T", unit = "gN/(gVSS·d)", description = "Denitrification rate on slowly biodegradable COD")]
    pub k2t: f64,

    #[variable(name = "fSb_s", unit = "gBSO/gBO", description = "Readily biodegradable fraction of the biodegradable COD")]
    pub fsb_s: f64,

    #[variable(name = "Dp1", unit = "mgN/L", description = "Denitrification potential of the anoxic zone")]
    pub dp1: f64,

    #[variable(name = "a", unit = "ø", description = "Internal recirculation ratio")]
    pub a: f64,

    #[variable(name = "a_opt", unit = "ø", description = "Optimal internal recirculation ratio")]
    pub a_opt: f64,

    #[variable(name = "fx1min", unit = "ø", description = "Minimum anoxic sludge mass fraction to use all readily biodegradable COD")]
    pub fx1min: f64,

    #[variable(name = "Rs_bal", unit = "d", description = "Sludge age at which the anoxic zone exactly denitrifies the nitrate load")]
    pub rs_bal: f64,

    #[variable(name = "Nne", unit = "mgN/L", description = "Effluent nitrate")]
    pub nne: f64,

    #[variable(name = "Nne_opt", unit = "mgN/L", description = "Lowest effluent nitrate (at a_opt)")]
    pub nne_opt: f64,

    #[variable(name = "TNe", unit = "mgN/L", description = "Effluent total nitrogen (TKN + NOx)")]
    pub tne: f64,

    #[variable(name = "FOd", unit = "kgO/d", description = "Oxygen recovered by denitrification")]
    pub fod: f64,

    #[variable(name = "FOt", unit = "kgO/d", description = "Total oxygen demand (FOc + FOn - FOd)")]
    pub fot: f64,

    #[variable(name = "OUR", unit = "mgO/(L·h)", description = "Oxygen uptake rate in the aerobic zone")]
    pub our: f64,

    #[variable(name = "effluent_alk", unit = "mgCaCO3/L", description = "Effluent alkalinity")]
    pub effluent_alk: f64,

    #[variable(name = "FN2g", unit = "kgN/d", description = "Nitrogen gas produced")]
    pub fn2g: f64,
}

/// Denitrification result, keeping the nitrification stage it was built on
#[derive(Debug, Clone)]
pub struct DenitrificationOutput {
    pub nitrification: NitrificationOutput,
    pub parameters: DenitrificationParameters,
    pub effluent: Stream,
    pub wastage: Stream,
    pub variables: DenitrificationVariables,
}

impl DenitrificationOutput {
    pub fn influent(&self) -> &Stream {
        self.nitrification.influent()
    }

    /// COD, nitrogen (with N2 gas), phosphorus and total oxygen demand balances
    pub fn balances(&self) -> Vec<MassBalance> {
        let carbon = &self.nitrification.carbon;
        let mut balances = sludge_balances(
            STAGE,
            &carbon.influent,
            &self.effluent,
            &self.wastage,
            carbon.variables.foc,
            self.variables.fn2g,
            carbon.chemical.po4_removed,
        );
        let tod_out = total_oxygen_demand(&self.effluent)
            + total_oxygen_demand(&self.wastage)
            + self.variables.fot
            + self.variables.fod;
        balances.push(MassBalance::new(
            STAGE,
            BalanceKind::TotalOxygenDemand,
            total_oxygen_demand(&carbon.influent),
            tod_out,
        ));
        balances
    }

    pub fn report(&self) -> ProcessReport {
        let mut report = self.nitrification.report();
        report.merge(&self.variables.to_report());
        report
    }
}

/// Total oxygen demand flux of a stream, `Q (COD + 64/14 TKN)` (kgO/d)
fn total_oxygen_demand(stream: &Stream) -> f64 {
    let totals = stream.fluxes().totals;
    totals.cod.total + NITRIFICATION_OXYGEN_DEMAND * totals.tkn.total
}

/// Positive root of the recirculation quadratic `A a² + B a - C = 0`, floored at zero
fn optimal_recirculation(a: f64, b: f64, c: f64) -> WwtpResult<f64> {
    if a == 0.0 {
        if b == 0.0 {
            return Err(Infeasibility::NoRecirculationOptimum { discriminant: 0.0 }.into());
        }
        return Ok((c / b).max(0.0));
    }
    let discriminant = b * b + 4.0 * a * c;
    if discriminant < 0.0 {
        return Err(Infeasibility::NoRecirculationOptimum { discriminant }.into());
    }
    Ok(((-b + discriminant.sqrt()) / (2.0 * a)).max(0.0))
}

/// Anoxic nitrate reduction with internal recirculation
#[derive(Debug, Clone, Default)]
pub struct Denitrification {
    parameters: DenitrificationParameters,
}

impl Denitrification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: DenitrificationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &DenitrificationParameters {
        &self.parameters
    }

    pub fn run(
        &self,
        constants: &KineticConstants,
        nitrification: &NitrificationOutput,
    ) -> WwtpResult<DenitrificationOutput> {
        constants.validate()?;
        let p = &self.parameters;
        p.validate()?;

        let carbon = &nitrification.carbon;
        let cv = &carbon.variables;
        let nv = &nitrification.variables;
        let reactor = &carbon.parameters;
        let (t, vp, rs, s) = (
            reactor.temperature,
            reactor.reactor_volume,
            reactor.sludge_age,
            reactor.recycle_ratio,
        );
        let fxt = nitrification.parameters.unaerated_fraction;
        let dissolved_oxygen = nitrification.parameters.dissolved_oxygen;
        let sf = nitrification.parameters.safety_factor;
        let (a, recycle_oxygen) = (p.internal_recirculation, p.recycle_dissolved_oxygen);

        let influent = &carbon.influent;
        let q = influent.flow();
        let r = influent.ratios();
        let totals = influent.totals();
        let sbi = totals.cod.biodegradable;
        let sbsi = totals.cod.biodegradable_soluble;
        let sti = totals.cod.total;
        let nti = totals.tkn.total;
        let nni = influent.components().s_nox;
        let nc = nv.nc;
        let nte = nitrification.effluent.totals().tkn.total;
        let s_b = nitrification.effluent.components().s_fbso;

        let k1t = arrhenius(constants.k1_20, constants.theta_k1, t);
        let k2t = arrhenius(constants.k2_20, constants.theta_k2, t);
        let fsb_s = if sbi > 0.0 { sbsi / sbi } else { 0.0 };

        let yh = constants.yh;
        let yh_vss = constants.yh_vss(r.oho.f_cv);
        let dp1 = sbsi * (1.0 - yh) / NITRATE_OXYGEN_EQUIVALENT + k2t * fxt * (sbi - s_b) * cv.f_xbh;

        // recirculation
        let available = dp1 - nni;
        let qa = dissolved_oxygen / NITRATE_OXYGEN_EQUIVALENT;
        let qb = nc - available
            + ((1.0 + s) * dissolved_oxygen + s * recycle_oxygen) / NITRATE_OXYGEN_EQUIVALENT;
        let qc = (1.0 + s) * (available - s * recycle_oxygen / NITRATE_OXYGEN_EQUIVALENT) - s * nc;
        let a_opt = optimal_recirculation(qa, qb, qc)?;
        let nne_opt = nc / (a_opt + s + 1.0);

        let nne = if a < a_opt {
            nc / (a + s + 1.0)
        } else {
            nc - available + (a * dissolved_oxygen + s * recycle_oxygen) / NITRATE_OXYGEN_EQUIVALENT
        };
        let nne = nne.min(nitrification.effluent.components().s_nox).max(0.0);

        let fn2g = (q * (nni + nc - nne)).max(0.0);
        let tne = nte + nne;

        let fod = (NITRATE_OXYGEN_EQUIVALENT * q * (nc - nne)).max(0.0);
        let fot = cv.foc + nv.fon - fod;
        let our = fot * 1000.0 / (vp * (1.0 - fxt) * 24.0);

        let nobi = totals.tkn.organic.biodegradable;
        let noupi = totals.tkn.organic.unbiodegradable_particulate;
        let effluent_alk = p.influent_alkalinity + ALKALINITY_PER_AMMONIFIED_N * nobi
            - ALKALINITY_PER_AMMONIFIED_N * (cv.ns - noupi)
            - ALKALINITY_PER_NITRIFIED_N * nc
            + ALKALINITY_PER_AMMONIFIED_N * (nc - nne);
        if effluent_alk < MINIMUM_ALKALINITY {
            warn!(
                "denitrification: effluent alkalinity {effluent_alk:.2} mgCaCO3/L is below \
                 {MINIMUM_ALKALINITY} mgCaCO3/L"
            );
        }

        let bht = cv.bht;
        let fx1min = fsb_s * (1.0 - yh) * (1.0 + bht * rs)
            / (NITRATE_OXYGEN_EQUIVALENT * k1t * yh_vss * rs);
        if fxt < fx1min {
            return Err(Infeasibility::AnoxicFractionTooLow { fxt, fx1min }.into());
        }

        // balanced sludge age
        let mu = nv.mu_am_ph;
        let sludge_n = r.upo.f_n * sti * cv.fsup / r.upo.f_cv;
        let ra = sbi;
        let rb = fsb_s * (1.0 - yh) / NITRATE_OXYGEN_EQUIVALENT;
        let rc = nti - nte;
        let rd = (a * dissolved_oxygen + s * recycle_oxygen) / NITRATE_OXYGEN_EQUIVALENT;
        let re = (a + s) / (a + s + 1.0);
        let top = rc * re + rd - ra * rb + ra * sf * k2t * yh_vss / mu
            - re * (r.oho.f_n * ra * yh_vss + sludge_n);
        let bottom = ra * (rb * bht + k2t * yh_vss) - ra * sf * nv.bat * k2t * yh_vss / mu
            - bht * (rc * re + rd)
            + re * bht * (r.oho.f_n * ra * yh_vss * constants.fh + sludge_n);
        let rs_bal = (top / bottom).max(0.0);

        let denitrified = |stream: &Stream| -> WwtpResult<Stream> {
            stream.derive(
                stream.flow(),
                Components {
                    s_nox: nne,
                    ..*stream.components()
                },
            )
        };
        let effluent = denitrified(&nitrification.effluent)?;
        let wastage = denitrified(&nitrification.wastage)?;

        debug!(
            "denitrification: a {a:.3} (optimum {a_opt:.3}), Nne {nne:.4} mgN/L, \
             FN2g {fn2g:.2} kgN/d"
        );

        Ok(DenitrificationOutput {
            nitrification: nitrification.clone(),
            parameters: p.clone(),
            effluent,
            wastage,
            variables: DenitrificationVariables {
                k1t,
                k2t,
                fsb_s,
                dp1,
                a,
                a_opt,
                fx1min,
                rs_bal,
                nne,
                nne_opt,
                tne,
                fod,
                fot,
                our,
                effluent_alk,
                fn2g,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biological::{CarbonRemoval, Nitrification};
    use crate::parameters::{ChemicalPRemovalParameters, NitrificationParameters};
    use approx::assert_relative_eq;
    use wwtp_core::balance::{check, BalanceMode};
    use wwtp_core::errors::WwtpError;
    use wwtp_core::stream::Component;

    fn primary_effluent() -> Stream {
        Stream::new(
            24.875,
            Components {
                s_vfa: 50.0,
                s_fbso: 115.0,
                x_bpo: 255.0,
                x_upo: 10.0,
                s_uso: 45.0,
                x_iss: 15.0,
                s_nh4: 39.1,
                s_po4: 7.28,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn nitrified(influent: &Stream, parameters: NitrificationParameters) -> NitrificationOutput {
        let constants = KineticConstants::default();
        let carbon = CarbonRemoval::new()
            .with_chemical_p_removal(ChemicalPRemovalParameters::default())
            .run(&constants, influent)
            .unwrap();
        Nitrification::from_parameters(parameters)
            .run(&constants, &carbon)
            .unwrap()
    }

    fn denitrify(parameters: DenitrificationParameters) -> WwtpResult<DenitrificationOutput> {
        let nitrification = nitrified(&primary_effluent(), NitrificationParameters::default());
        Denitrification::from_parameters(parameters).run(&KineticConstants::default(), &nitrification)
    }

    // ===== Recirculation =====

    #[test]
    fn test_optimal_recirculation_root() {
        // 1·a² + 1·a - 6 = 0 -> a = 2
        assert_relative_eq!(optimal_recirculation(1.0, 1.0, 6.0).unwrap(), 2.0);
        // negative root floored at zero
        assert_eq!(optimal_recirculation(1.0, 5.0, -1.0).unwrap(), 0.0);
        assert_relative_eq!(optimal_recirculation(0.0, 2.0, 3.0).unwrap(), 1.5);
    }

    #[test]
    fn test_optimal_recirculation_without_solution() {
        let err = optimal_recirculation(1.0, 1.0, -1.0).unwrap_err();
        assert!(matches!(
            err,
            WwtpError::Infeasible(Infeasibility::NoRecirculationOptimum { discriminant }) if discriminant < 0.0
        ));
        assert!(optimal_recirculation(0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_design_point() {
        let v = denitrify(DenitrificationParameters::default()).unwrap().variables;
        assert!(v.a_opt > 5.4 && v.a_opt < 6.0, "a_opt {}", v.a_opt);
        assert!(v.nne > 5.0 && v.nne < 5.6, "Nne {}", v.nne);
        assert!(v.nne >= v.nne_opt);
        assert_relative_eq!(v.fsb_s, 165.0 / 420.0, max_relative = 1e-12);
        assert!(v.effluent_alk > MINIMUM_ALKALINITY);
        assert!(v.rs_bal > 0.0);
    }

    #[test]
    fn test_low_recirculation_dilutes_nitrate() {
        let out = denitrify(DenitrificationParameters {
            internal_recirculation: 0.5,
            ..Default::default()
        })
        .unwrap();
        let v = out.variables;
        let nc = out.nitrification.variables.nc;
        assert_relative_eq!(v.nne, nc / 2.5, max_relative = 1e-12);
    }

    #[test]
    fn test_nitrate_never_exceeds_nitrification() {
        for a in [0.0, 1.0, 5.4, 20.0, 100.0] {
            let out = denitrify(DenitrificationParameters {
                internal_recirculation: a,
                ..Default::default()
            })
            .unwrap();
            let limit = out.nitrification.effluent.components().s_nox;
            assert!(out.variables.nne <= limit, "a {a}");
            assert!(out.variables.nne >= 0.0);
            assert!(out.variables.fod >= 0.0);
        }
    }

    // ===== Oxygen and nitrogen =====

    #[test]
    fn test_oxygen_recovered() {
        let out = denitrify(DenitrificationParameters::default()).unwrap();
        let v = out.variables;
        let nv = out.nitrification.variables;
        assert_relative_eq!(v.fod, 40.0 / 14.0 * 24.875 * (nv.nc - v.nne), max_relative = 1e-12);
        assert_relative_eq!(
            v.fot,
            out.nitrification.carbon.variables.foc + nv.fon - v.fod,
            max_relative = 1e-12
        );
        assert!(v.fot < nv.fot);
    }

    #[test]
    fn test_total_nitrogen_in_effluent() {
        let out = denitrify(DenitrificationParameters::default()).unwrap();
        let tn = out.effluent.totals().tn.total;
        assert_relative_eq!(tn, out.variables.tne, max_relative = 1e-12);
    }

    // ===== Balances =====

    #[test]
    fn test_balances_close() {
        let out = denitrify(DenitrificationParameters::default()).unwrap();
        let balances = out.balances();
        assert_eq!(balances.len(), 4);
        assert!(check(&balances, BalanceMode::Strict).unwrap().is_empty());
    }

    #[test]
    fn test_balances_close_with_influent_nitrate() {
        let influent = primary_effluent().with_component(Component::Nox, 3.0).unwrap();
        let nitrification = nitrified(&influent, NitrificationParameters::default());
        let out = Denitrification::new()
            .run(&KineticConstants::default(), &nitrification)
            .unwrap();
        assert!(check(&out.balances(), BalanceMode::Strict).unwrap().is_empty());
        assert_relative_eq!(
            out.variables.fn2g,
            24.875 * (3.0 + out.nitrification.variables.nc - out.variables.nne),
            max_relative = 1e-12
        );
    }

    // ===== Infeasible designs =====

    #[test]
    fn test_anoxic_fraction_too_low() {
        let nitrification = nitrified(
            &primary_effluent(),
            NitrificationParameters {
                unaerated_fraction: 0.05,
                ..Default::default()
            },
        );
        let err = Denitrification::new()
            .run(&KineticConstants::default(), &nitrification)
            .unwrap_err();
        assert!(matches!(
            err,
            WwtpError::Infeasible(Infeasibility::AnoxicFractionTooLow { fxt, .. }) if fxt == 0.05
        ));
    }

    #[test]
    fn test_report_names() {
        let out = denitrify(DenitrificationParameters::default()).unwrap();
        let report = out.report();
        for name in ["K1T", "a_opt", "Rs_bal", "FN2g", "effluent_alk", "Nae", "MX_T"] {
            assert!(report.value(name).is_some(), "{name} missing");
        }
        assert_eq!(report.value("FOt"), Some(out.variables.fot));
    }
}
