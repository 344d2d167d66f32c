//! A single river reach
//!
//! Trapezoidal channel hydraulics from the bank geometry and Manning's
//! equation, and the first-order surface removal of pollutants carried along
//! the reach.

use crate::parameters::{Degradation, ReachParameters};
use std::collections::HashMap;
use wwtp_core::constants::arrhenius;
use wwtp_core::errors::WwtpResult;
use wwtp_core::stream::{Component, Components, Stream};
use wwtp_core::ProcessVariables;

/// Gravitational acceleration (m/s²)
const GRAVITY: f64 = 9.81;

/// ML/d to m³/s
const ML_PER_DAY_TO_M3_PER_S: f64 = 1000.0 / 86400.0;

/// Hydraulics of a reach at its water depth
#[derive(Debug, Clone, Copy, PartialEq, ProcessVariables)]
pub struct ReachHydraulics {
    #[variable(name = "angle", unit = "rad", description = "Bank angle between the bed and bankfull")]
    pub angle: f64,

    #[variable(name = "Dt", unit = "m", description = "Bankfull depth")]
    pub bankfull_depth: f64,

    #[variable(name = "wi", unit = "m", description = "Wetted top width")]
    pub wetted_width: f64,

    #[variable(name = "Ai", unit = "m2", description = "Wetted cross-section area")]
    pub area: f64,

    #[variable(name = "wpi", unit = "m", description = "Wetted perimeter")]
    pub wetted_perimeter: f64,

    #[variable(name = "HRi", unit = "m", description = "Hydraulic radius")]
    pub hydraulic_radius: f64,

    #[variable(name = "Qi", unit = "m3/s", description = "Manning flow")]
    pub flow: f64,

    #[variable(name = "HRTi", unit = "min", description = "Mean residence time of the water")]
    pub residence_time: f64,

    #[variable(name = "Si", unit = "m2", description = "Wetted bed surface")]
    pub surface: f64,

    #[variable(name = "ky", unit = "m2/s", description = "Lateral dispersion coefficient")]
    pub lateral_dispersion: f64,

    #[variable(name = "Ll", unit = "m", description = "Lateral mixing length")]
    pub mixing_length: f64,
}

impl ReachHydraulics {
    pub fn from_parameters(p: &ReachParameters) -> WwtpResult<Self> {
        p.validate()?;
        let angle = ((p.top_width - p.bottom_width) / (2.0 * p.bank_length)).asin();
        let bankfull_depth = p.bank_length * angle.cos();
        let d = p.depth;
        let wetted_width = p.bottom_width + 2.0 * d * angle.tan();
        let area = d * (p.bottom_width + d * angle.tan());
        let wetted_perimeter = p.bottom_width + 2.0 * d / angle.cos();
        let hydraulic_radius = area / wetted_perimeter;
        let flow = hydraulic_radius.powf(2.0 / 3.0) * p.slope.sqrt() / p.manning_n;
        let residence_time = p.length * area / flow / 60.0;
        let surface = p.length * wetted_perimeter;
        let lateral_dispersion = 0.6 * d * (GRAVITY * p.slope * d).sqrt();
        let mixing_length = wetted_width.powi(2) * flow / area / (2.0 * lateral_dispersion);
        Ok(Self {
            angle,
            bankfull_depth,
            wetted_width,
            area,
            wetted_perimeter,
            hydraulic_radius,
            flow,
            residence_time,
            surface,
            lateral_dispersion,
            mixing_length,
        })
    }
}

/// A named river reach
#[derive(Debug, Clone, PartialEq)]
pub struct Reach {
    pub name: String,
    pub parameters: ReachParameters,
}

impl Reach {
    pub fn new(name: impl Into<String>, parameters: ReachParameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn hydraulics(&self) -> WwtpResult<ReachHydraulics> {
        ReachHydraulics::from_parameters(&self.parameters)
    }

    /// Mass flux (g/s) left at the end of the reach from an inflowing flux `mass`
    /// at concentration `concentration` (g/m³).
    pub fn decay(
        &self,
        hydraulics: &ReachHydraulics,
        degradation: &Degradation,
        mass: f64,
        concentration: f64,
    ) -> f64 {
        if mass == 0.0 {
            return 0.0;
        }
        let rate = arrhenius(degradation.r_20, degradation.theta, self.parameters.temperature);
        let removed = rate * hydraulics.residence_time * hydraulics.surface * concentration
            / (degradation.k + concentration);
        (mass - removed).max(0.0)
    }

    /// Stream leaving the reach. Components without a degradation entry pass
    /// through unchanged.
    pub fn degrade(
        &self,
        inflow: &Stream,
        degradation: &HashMap<Component, Degradation>,
    ) -> WwtpResult<Stream> {
        for kinetics in degradation.values() {
            kinetics.validate()?;
        }
        let hydraulics = self.hydraulics()?;
        let flow = inflow.flow() * ML_PER_DAY_TO_M3_PER_S;
        let mut components: Components = *inflow.components();
        if flow > 0.0 {
            for (component, kinetics) in degradation {
                let concentration = inflow.get(*component);
                let mass = self.decay(&hydraulics, kinetics, concentration * flow, concentration);
                *components.get_mut(*component) = mass / flow;
            }
        }
        inflow.derive(inflow.flow(), components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reach() -> Reach {
        Reach::new("upper", ReachParameters::default())
    }

    // ===== Hydraulics =====

    #[test]
    fn test_default_geometry() {
        let h = reach().hydraulics().unwrap();
        assert_relative_eq!(h.angle, 0.75_f64.asin(), max_relative = 1e-12);
        assert_relative_eq!(h.bankfull_depth, 1.3228756555322954, max_relative = 1e-10);
        assert_relative_eq!(h.wetted_width, 5.721344205666436, max_relative = 1e-10);
        assert_relative_eq!(h.area, 5.232806523399862, max_relative = 1e-10);
        assert_relative_eq!(h.wetted_perimeter, 6.6284589408885815, max_relative = 1e-10);
    }

    #[test]
    fn test_default_hydraulics() {
        let h = reach().hydraulics().unwrap();
        assert_relative_eq!(h.flow, 1.6871358230243272, max_relative = 1e-9);
        assert_relative_eq!(h.residence_time, 51.69319557232045, max_relative = 1e-9);
        assert_relative_eq!(h.surface, 6628.458940888581, max_relative = 1e-10);
        assert_relative_eq!(h.lateral_dispersion, 0.17467977558950548, max_relative = 1e-10);
        assert_relative_eq!(h.mixing_length, 30.20917752115205, max_relative = 1e-9);
    }

    #[test]
    fn test_rectangular_channel() {
        let params = ReachParameters {
            top_width: 3.0,
            ..Default::default()
        };
        let h = Reach::new("canal", params).hydraulics().unwrap();
        assert_eq!(h.angle, 0.0);
        assert_relative_eq!(h.area, 3.0 * 1.2);
        assert_relative_eq!(h.wetted_perimeter, 3.0 + 2.4);
    }

    // ===== Decay =====

    #[test]
    fn test_no_mass_stays_zero() {
        let r = reach();
        let h = r.hydraulics().unwrap();
        let kinetics = Degradation {
            r_20: 1.0,
            ..Default::default()
        };
        assert_eq!(r.decay(&h, &kinetics, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_decay_saturates_at_zero() {
        let r = reach();
        let h = r.hydraulics().unwrap();
        let kinetics = Degradation {
            r_20: 1e-4,
            ..Default::default()
        };
        assert_eq!(r.decay(&h, &kinetics, 2.9, 10.0), 0.0);
    }

    #[test]
    fn test_saturation_follows_inflow_concentration() {
        let r = reach();
        let h = r.hydraulics().unwrap();
        let kinetics = Degradation {
            r_20: 1e-6,
            ..Default::default()
        };
        let rate = 1e-6 * 1.041_f64.powf(-5.0) * h.residence_time * h.surface;
        // same mass flux carried by a dilute and a concentrated inflow
        let dilute = r.decay(&h, &kinetics, 3.0, 0.5);
        let concentrated = r.decay(&h, &kinetics, 3.0, 5.0);
        assert_relative_eq!(dilute, 3.0 - rate * 0.5 / 1.5, max_relative = 1e-12);
        assert_relative_eq!(concentrated, 3.0 - rate * 5.0 / 6.0, max_relative = 1e-12);
        assert!(concentrated < dilute);
    }

    #[test]
    fn test_degrade_selected_component() {
        let inflow = Stream::new(
            25.0,
            Components {
                s_nh4: 10.0,
                s_po4: 2.0,
                ..Default::default()
            },
        )
        .unwrap();
        let kinetics = Degradation {
            r_20: 1e-6,
            k: 1.0,
            theta: 1.041,
        };
        let degradation = HashMap::from([(Component::Nh4, kinetics)]);
        let out = reach().degrade(&inflow, &degradation).unwrap();

        let h = reach().hydraulics().unwrap();
        let flow = 25.0 * 1000.0 / 86400.0;
        let removed = 1e-6 * 1.041_f64.powf(-5.0) * h.residence_time * h.surface * 10.0 / 11.0;
        assert_relative_eq!(out.get(Component::Nh4), (10.0 * flow - removed) / flow, max_relative = 1e-10);
        assert!(out.get(Component::Nh4) < 10.0);
        assert_eq!(out.get(Component::Po4), 2.0);
        assert_eq!(out.flow(), 25.0);
    }

    #[test]
    fn test_no_kinetics_passes_through() {
        let inflow = Stream::new(
            5.0,
            Components {
                s_nh4: 3.0,
                ..Default::default()
            },
        )
        .unwrap();
        let out = reach().degrade(&inflow, &HashMap::new()).unwrap();
        assert_eq!(out, inflow);
    }
}
