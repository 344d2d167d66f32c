//! Nitrification in the activated sludge reactor
//!
//! ```text
//! Qi -> [Activated Sludge + Nitrification + SST] -> Qe
//!                      |
//!                      v Qw
//! ```
//!
//! Builds on a [`CarbonRemovalOutput`]: the sludge, solids and carbonaceous oxygen
//! demand are unchanged, ammonia not bound into sludge is oxidised to nitrate as
//! far as the nitrifier kinetics allow.
//!
//! Nitrifier growth is corrected for temperature, dissolved oxygen and pH:
//!
//! $$\mu_{Am,pH} = \mu_{AmT} \frac{DO}{DO + K_O} \theta_{pH}^{pH - 7.2} K_I \frac{K_{max} - pH}{K_{max} + K_{II} - pH}$$
//!
//! and the effluent ammonia follows from the aerated sludge fraction:
//!
//! $$N_{ae} = \frac{K_{nT}(b_{AT} + 1/R_s)}{\mu_{Am,pH}(1 - f_{xt}) - b_{AT} - 1/R_s}$$

use super::sludge_balances;
use super::CarbonRemovalOutput;
use crate::parameters::NitrificationParameters;
use log::{debug, warn};
use wwtp_core::balance::MassBalance;
use wwtp_core::constants::{arrhenius, KineticConstants, NITRIFICATION_OXYGEN_DEMAND};
use wwtp_core::errors::{Infeasibility, WwtpResult};
use wwtp_core::report::ProcessReport;
use wwtp_core::stream::{Components, Stream};
use wwtp_core::ProcessVariables;

const STAGE: &str = "nitrification";

/// Derived quantities of the nitrification stage
#[derive(Debug, Clone, Copy, PartialEq, ProcessVariables)]
pub struct NitrificationVariables {
    #[variable(name = "µAmT", unit = "1/d", description = "Nitrifier growth rate corrected by temperature")]
    pub mu_amt: f64,

    #[variable(name = "µAmO", unit = "1/d", description = "Nitrifier growth rate corrected by temperature and DO")]
    pub mu_amo: f64,

    #[variable(name = "µAm_pH", unit = "1/d", description = "Nitrifier growth rate corrected by temperature, DO and pH")]
    pub mu_am_ph: f64,

    #[variable(name = "KnT", unit = "mgN/L", description = "Ammonia half saturation constant corrected by temperature")]
    pub knt: f64,

    #[variable(name = "bAT", unit = "1/d", description = "Nitrifier endogenous respiration rate corrected by temperature")]
    pub bat: f64,

    #[variable(name = "f_XBA", unit = "gVSS·d/gN", description = "Nitrifier biomass production rate")]
    pub f_xba: f64,

    #[variable(name = "MX_BA", unit = "kgVSS", description = "Nitrifier biomass")]
    pub mx_ba: f64,

    #[variable(name = "X_BA", unit = "kgVSS/m3", description = "Nitrifier biomass concentration")]
    pub x_ba: f64,

    #[variable(name = "fxt", unit = "ø", description = "Unaerated sludge mass fraction")]
    pub fxt: f64,

    #[variable(name = "fxm", unit = "ø", description = "Maximum design unaerated sludge mass fraction")]
    pub fxm: f64,

    #[variable(name = "Rs", unit = "d", description = "Sludge age")]
    pub rs: f64,

    #[variable(name = "Rsm", unit = "d", description = "Minimum sludge age for nitrification")]
    pub rsm: f64,

    #[variable(name = "Nae", unit = "mgN/L", description = "Effluent ammonia concentration")]
    pub nae: f64,

    #[variable(name = "Nae_fxm", unit = "mgN/L", description = "Effluent ammonia at the maximum unaerated fraction")]
    pub nae_fxm: f64,

    #[variable(name = "Nae_max", unit = "mgN/L", description = "Ammonia available for nitrification")]
    pub nae_max: f64,

    #[variable(name = "Nte", unit = "mgN/L", description = "Effluent TKN concentration")]
    pub nte: f64,

    #[variable(name = "Nc", unit = "mgN/L", description = "Nitrification capacity")]
    pub nc: f64,

    #[variable(name = "FOn", unit = "kgO/d", description = "Nitrogenous oxygen demand")]
    pub fon: f64,

    #[variable(name = "FOt", unit = "kgO/d", description = "Total oxygen demand")]
    pub fot: f64,

    #[variable(name = "OUR", unit = "mgO/(L·h)", description = "Oxygen uptake rate in the aerobic zone")]
    pub our: f64,
}

/// Nitrification result, keeping the carbon removal stage it was built on
#[derive(Debug, Clone)]
pub struct NitrificationOutput {
    pub carbon: CarbonRemovalOutput,
    pub parameters: NitrificationParameters,
    pub effluent: Stream,
    pub wastage: Stream,
    pub variables: NitrificationVariables,
}

impl NitrificationOutput {
    pub fn influent(&self) -> &Stream {
        &self.carbon.influent
    }

    pub fn balances(&self) -> Vec<MassBalance> {
        sludge_balances(
            STAGE,
            &self.carbon.influent,
            &self.effluent,
            &self.wastage,
            self.carbon.variables.foc,
            0.0,
            self.carbon.chemical.po4_removed,
        )
    }

    /// Carbon removal report overlaid with the nitrification variables
    pub fn report(&self) -> ProcessReport {
        let mut report = self.carbon.report();
        report.merge(&self.variables.to_report());
        report
    }
}

/// Autotrophic ammonia oxidation
#[derive(Debug, Clone, Default)]
pub struct Nitrification {
    parameters: NitrificationParameters,
}

impl Nitrification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(parameters: NitrificationParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &NitrificationParameters {
        &self.parameters
    }

    pub fn run(
        &self,
        constants: &KineticConstants,
        carbon: &CarbonRemovalOutput,
    ) -> WwtpResult<NitrificationOutput> {
        constants.validate()?;
        let p = &self.parameters;
        p.validate()?;

        let reactor = &carbon.parameters;
        let (t, vp, rs) = (reactor.temperature, reactor.reactor_volume, reactor.sludge_age);
        let (sf, fxt, dissolved_oxygen, ph) =
            (p.safety_factor, p.unaerated_fraction, p.dissolved_oxygen, p.ph);

        let q = carbon.influent.flow();
        let nti = carbon.influent.totals().tkn.total;
        let ns = carbon.variables.ns;
        let carbon_effluent = carbon.effluent.totals();
        let carbon_nh4 = carbon.effluent.components().s_nh4;
        let organic_effluent_n = carbon_effluent.tkn.total - carbon_nh4;

        // growth rate corrections
        let mu_amt = arrhenius(constants.mu_am, constants.theta_mu_am, t);
        let mu_amo = mu_amt * dissolved_oxygen / (dissolved_oxygen + constants.k_o);
        let mu_am_ph = mu_amo
            * constants.theta_ph.powf(ph - 7.2)
            * constants.ki
            * (constants.kmax - ph)
            / (constants.kmax + constants.kii - ph);
        let knt = arrhenius(constants.kn, constants.theta_kn, t);
        let bat = arrhenius(constants.ba, constants.theta_ba, t);

        let washout = bat + 1.0 / rs;
        let fxm = 1.0 - sf * washout / mu_am_ph;
        let rsm_denominator = mu_am_ph * (1.0 - fxt) / sf - bat;
        let rsm = if rsm_denominator > 0.0 {
            1.0 / rsm_denominator
        } else {
            f64::INFINITY
        };

        // no aerated fraction could hold nitrifiers at this sludge age
        if fxm <= 0.0 {
            return Err(Infeasibility::SludgeAgeTooShort { rs, rsm }.into());
        }
        if fxt > fxm {
            return Err(Infeasibility::UnaeratedFractionTooHigh { fxt, fxm }.into());
        }

        let nae_max = carbon_nh4.max(0.0);
        let mut nae = knt * washout / (mu_am_ph * (1.0 - fxt) - washout);
        if !(0.0..=nae_max).contains(&nae) {
            warn!(
                "nitrification: effluent ammonia {nae:.4} mgN/L outside [0, {nae_max:.4}], \
                 no ammonia nitrified"
            );
            nae = nae_max;
        }
        let nae_fxm = if sf > 1.0 {
            knt / (sf - 1.0)
        } else {
            f64::INFINITY
        };

        let nte = nae + organic_effluent_n;
        let nc = nti - ns - nte;
        let nne = nc + carbon.effluent.components().s_nox;

        let fon = NITRIFICATION_OXYGEN_DEMAND * q * nc;
        let fot = carbon.variables.foc + fon;
        let our = fot * 1000.0 / (vp * (1.0 - fxt) * 24.0);

        let f_xba = constants.ya * rs / (1.0 + bat * rs);
        let mx_ba = q * nc * f_xba;
        let x_ba = mx_ba / vp;

        let nitrified = |stream: &Stream| -> WwtpResult<Stream> {
            stream.derive(
                stream.flow(),
                Components {
                    s_nh4: nae,
                    s_nox: nne,
                    ..*stream.components()
                },
            )
        };
        let effluent = nitrified(&carbon.effluent)?;
        let wastage = nitrified(&carbon.wastage)?;

        debug!("nitrification: Nae {nae:.4} mgN/L, Nc {nc:.4} mgN/L, FOt {fot:.2} kgO/d");

        Ok(NitrificationOutput {
            carbon: carbon.clone(),
            parameters: p.clone(),
            effluent,
            wastage,
            variables: NitrificationVariables {
                mu_amt,
                mu_amo,
                mu_am_ph,
                knt,
                bat,
                f_xba,
                mx_ba,
                x_ba,
                fxt,
                fxm,
                rs,
                rsm,
                nae,
                nae_fxm,
                nae_max,
                nte,
                nc,
                fon,
                fot,
                our,
            },
        })
    }
}
