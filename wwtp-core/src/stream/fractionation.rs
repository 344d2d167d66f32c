//! Fractionation of a stream into composite measures.
//!
//! Every composite tree is built bottom-up from the four organic leaves
//! (biodegradable soluble, unbiodegradable soluble, biodegradable particulate,
//! unbiodegradable particulate) plus active biomass, so each total equals the sum
//! of its parts by construction.

use super::ratios::{MassRatios, OrganicRatios};
use super::Components;
use serde::Serialize;

/// Organic fractions of one measure (COD, organic C, organic N or organic P).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OrganicFractions {
    pub total: f64,
    pub biodegradable: f64,
    pub unbiodegradable: f64,
    pub soluble: f64,
    pub particulate: f64,
    pub biodegradable_soluble: f64,
    pub unbiodegradable_soluble: f64,
    pub biodegradable_particulate: f64,
    pub unbiodegradable_particulate: f64,
    /// Active biomass (OHO + PAO)
    pub active: f64,
}

impl OrganicFractions {
    /// Convert each organic class from COD with `per_cod` and assemble the tree.
    fn build(c: &Components, r: &MassRatios, per_cod: impl Fn(&OrganicRatios) -> f64) -> Self {
        let bs = c.s_vfa * per_cod(&r.vfa) + c.s_fbso * per_cod(&r.fbso);
        let us = c.s_uso * per_cod(&r.uso);
        let bp = c.x_bpo * per_cod(&r.bpo);
        let up = c.x_upo * per_cod(&r.upo);
        let active = c.x_oho * per_cod(&r.oho) + c.x_pao * per_cod(&r.pao);
        Self {
            total: bs + us + bp + up + active,
            biodegradable: bs + bp,
            unbiodegradable: us + up,
            soluble: bs + us,
            particulate: bp + up,
            biodegradable_soluble: bs,
            unbiodegradable_soluble: us,
            biodegradable_particulate: bp,
            unbiodegradable_particulate: up,
            active,
        }
    }

    fn scaled(&self, k: f64) -> Self {
        Self {
            total: self.total * k,
            biodegradable: self.biodegradable * k,
            unbiodegradable: self.unbiodegradable * k,
            soluble: self.soluble * k,
            particulate: self.particulate * k,
            biodegradable_soluble: self.biodegradable_soluble * k,
            unbiodegradable_soluble: self.unbiodegradable_soluble * k,
            biodegradable_particulate: self.biodegradable_particulate * k,
            unbiodegradable_particulate: self.unbiodegradable_particulate * k,
            active: self.active * k,
        }
    }
}

/// Total Kjeldahl nitrogen: free and saline ammonia plus organic nitrogen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NitrogenFractions {
    pub total: f64,
    /// Free and saline ammonia
    pub fsa: f64,
    pub organic: OrganicFractions,
}

/// Total phosphorus: orthophosphate plus organic phosphorus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhosphorusFractions {
    pub total: f64,
    pub po4: f64,
    pub organic: OrganicFractions,
}

/// Total nitrogen: TKN plus oxidised nitrogen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TotalNitrogen {
    pub total: f64,
    pub tkn: f64,
    pub nox: f64,
}

/// Suspended solids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SolidsFractions {
    pub total: f64,
    pub inorganic: f64,
    pub volatile: f64,
    pub biodegradable_volatile: f64,
    pub unbiodegradable_volatile: f64,
    pub active_volatile: f64,
}

/// All composite measures of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub cod: OrganicFractions,
    pub toc: OrganicFractions,
    pub tkn: NitrogenFractions,
    pub tn: TotalNitrogen,
    pub tp: PhosphorusFractions,
    pub tss: SolidsFractions,
}

impl Totals {
    pub fn from_components(c: &Components, r: &MassRatios) -> Self {
        let cod = OrganicFractions::build(c, r, |_| 1.0);
        let toc = OrganicFractions::build(c, r, OrganicRatios::carbon_per_cod);

        let organic_n = OrganicFractions::build(c, r, OrganicRatios::nitrogen_per_cod);
        let tkn = NitrogenFractions {
            total: c.s_nh4 + organic_n.total,
            fsa: c.s_nh4,
            organic: organic_n,
        };

        let organic_p = OrganicFractions::build(c, r, OrganicRatios::phosphorus_per_cod);
        let tp = PhosphorusFractions {
            total: c.s_po4 + organic_p.total,
            po4: c.s_po4,
            organic: organic_p,
        };

        let tn = TotalNitrogen {
            total: tkn.total + c.s_nox,
            tkn: tkn.total,
            nox: c.s_nox,
        };

        let biodegradable_volatile = c.x_bpo / r.bpo.f_cv;
        let unbiodegradable_volatile = c.x_upo / r.upo.f_cv;
        let active_volatile = c.x_oho / r.oho.f_cv + c.x_pao / r.pao.f_cv;
        let volatile = biodegradable_volatile + unbiodegradable_volatile + active_volatile;
        let tss = SolidsFractions {
            total: volatile + c.x_iss,
            inorganic: c.x_iss,
            volatile,
            biodegradable_volatile,
            unbiodegradable_volatile,
            active_volatile,
        };

        Self {
            cod,
            toc,
            tkn,
            tn,
            tp,
            tss,
        }
    }

    /// Every measure multiplied by `k` (concentration × flow gives kg/d).
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            cod: self.cod.scaled(k),
            toc: self.toc.scaled(k),
            tkn: NitrogenFractions {
                total: self.tkn.total * k,
                fsa: self.tkn.fsa * k,
                organic: self.tkn.organic.scaled(k),
            },
            tn: TotalNitrogen {
                total: self.tn.total * k,
                tkn: self.tn.tkn * k,
                nox: self.tn.nox * k,
            },
            tp: PhosphorusFractions {
                total: self.tp.total * k,
                po4: self.tp.po4 * k,
                organic: self.tp.organic.scaled(k),
            },
            tss: SolidsFractions {
                total: self.tss.total * k,
                inorganic: self.tss.inorganic * k,
                volatile: self.tss.volatile * k,
                biodegradable_volatile: self.tss.biodegradable_volatile * k,
                unbiodegradable_volatile: self.tss.unbiodegradable_volatile * k,
                active_volatile: self.tss.active_volatile * k,
            },
        }
    }
}

/// Mass fluxes of a stream (kg/d).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fluxes {
    /// Flow rate the fluxes were computed with (ML/d)
    pub flow: f64,
    pub components: Components,
    pub totals: Totals,
}

/// A concentration (mg/L) and the matching mass flux (kg/d).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measure {
    pub concentration: f64,
    pub flux: f64,
}

/// Headline measures of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamSummary {
    pub flow: f64,
    pub cod: Measure,
    pub tkn: Measure,
    pub nh4: Measure,
    pub nox: Measure,
    pub tp: Measure,
    pub po4: Measure,
    pub vss: Measure,
    pub iss: Measure,
    pub tss: Measure,
    pub toc: Measure,
}

impl StreamSummary {
    pub(super) fn new(flow: f64, c: &Components, totals: &Totals) -> Self {
        let measure = |concentration: f64| Measure {
            concentration,
            flux: concentration * flow,
        };
        Self {
            flow,
            cod: measure(totals.cod.total),
            tkn: measure(totals.tkn.total),
            nh4: measure(c.s_nh4),
            nox: measure(c.s_nox),
            tp: measure(totals.tp.total),
            po4: measure(c.s_po4),
            vss: measure(totals.tss.volatile),
            iss: measure(totals.tss.inorganic),
            tss: measure(totals.tss.total),
            toc: measure(totals.toc.total),
        }
    }
}
