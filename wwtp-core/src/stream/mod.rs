//! Wastewater streams
//!
//! A [`Stream`] is one pollutant-carrying flow: a flow rate (ML/d), twelve
//! state-variable concentrations (mg/L) and the stoichiometric mass ratios used
//! to convert the organic fractions between COD, carbon, nitrogen and phosphorus.
//!
//! Streams are values. Unit processes never modify a stream they were handed;
//! they build new ones with [`Stream::derive`], which carries the mass ratios over.
//!
//! Multiplying a concentration (mg/L = g/m³) by a flow (ML/d = 1000 m³/d) gives a
//! mass flux in kg/d, which is why [`Stream::fluxes`] is a plain product.

mod fractionation;
mod ratios;

pub use fractionation::{
    Fluxes, Measure, NitrogenFractions, OrganicFractions, PhosphorusFractions, SolidsFractions,
    StreamSummary, TotalNitrogen, Totals,
};
pub use ratios::{MassRatios, OrganicClass, OrganicRatios};

use crate::errors::{WwtpError, WwtpResult};
use crate::validation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The twelve state variables carried by a [`Stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    /// Volatile fatty acids (mgCOD/L)
    #[serde(rename = "S_VFA")]
    Vfa,
    /// Fermentable biodegradable soluble organics (mgCOD/L)
    #[serde(rename = "S_FBSO")]
    Fbso,
    /// Biodegradable particulate organics (mgCOD/L)
    #[serde(rename = "X_BPO")]
    Bpo,
    /// Unbiodegradable particulate organics (mgCOD/L)
    #[serde(rename = "X_UPO")]
    Upo,
    /// Unbiodegradable soluble organics (mgCOD/L)
    #[serde(rename = "S_USO")]
    Uso,
    /// Inorganic suspended solids (mgISS/L)
    #[serde(rename = "X_iSS")]
    Iss,
    /// Free and saline ammonia (mgN/L)
    #[serde(rename = "S_NH4")]
    Nh4,
    /// Orthophosphate (mgP/L)
    #[serde(rename = "S_PO4")]
    Po4,
    /// Nitrate and nitrite (mgN/L)
    #[serde(rename = "S_NOx")]
    Nox,
    /// Dissolved oxygen (mgO/L)
    #[serde(rename = "S_O2")]
    O2,
    /// Ordinary heterotrophic organisms (mgCOD/L)
    #[serde(rename = "X_OHO")]
    Oho,
    /// Phosphate accumulating organisms (mgCOD/L)
    #[serde(rename = "X_PAO")]
    Pao,
}

impl Component {
    /// All components in canonical order.
    pub const ALL: [Component; 12] = [
        Component::Vfa,
        Component::Fbso,
        Component::Bpo,
        Component::Upo,
        Component::Uso,
        Component::Iss,
        Component::Nh4,
        Component::Po4,
        Component::Nox,
        Component::O2,
        Component::Oho,
        Component::Pao,
    ];

    /// Canonical state-variable name, e.g. `S_VFA`.
    pub fn name(&self) -> &'static str {
        match self {
            Component::Vfa => "S_VFA",
            Component::Fbso => "S_FBSO",
            Component::Bpo => "X_BPO",
            Component::Upo => "X_UPO",
            Component::Uso => "S_USO",
            Component::Iss => "X_iSS",
            Component::Nh4 => "S_NH4",
            Component::Po4 => "S_PO4",
            Component::Nox => "S_NOx",
            Component::O2 => "S_O2",
            Component::Oho => "X_OHO",
            Component::Pao => "X_PAO",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = WwtpError;

    /// Accepts the canonical names plus the legacy aliases `S_FSA` and `S_OP`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S_FSA" => return Ok(Component::Nh4),
            "S_OP" => return Ok(Component::Po4),
            _ => {}
        }
        Component::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| WwtpError::UnknownComponent(s.to_string()))
    }
}

/// Concentrations of the twelve state variables (mg/L).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    #[serde(rename = "S_VFA")]
    pub s_vfa: f64,
    #[serde(rename = "S_FBSO")]
    pub s_fbso: f64,
    #[serde(rename = "X_BPO")]
    pub x_bpo: f64,
    #[serde(rename = "X_UPO")]
    pub x_upo: f64,
    #[serde(rename = "S_USO")]
    pub s_uso: f64,
    #[serde(rename = "X_iSS")]
    pub x_iss: f64,
    #[serde(rename = "S_NH4")]
    pub s_nh4: f64,
    #[serde(rename = "S_PO4")]
    pub s_po4: f64,
    #[serde(rename = "S_NOx")]
    pub s_nox: f64,
    #[serde(rename = "S_O2")]
    pub s_o2: f64,
    #[serde(rename = "X_OHO")]
    pub x_oho: f64,
    #[serde(rename = "X_PAO")]
    pub x_pao: f64,
}

impl Components {
    /// Build from values in canonical [`Component::ALL`] order.
    pub fn from_array(values: [f64; 12]) -> Self {
        let mut components = Self::default();
        for (component, value) in Component::ALL.iter().zip(values) {
            *components.get_mut(*component) = value;
        }
        components
    }

    /// Values in canonical [`Component::ALL`] order.
    pub fn to_array(&self) -> [f64; 12] {
        Component::ALL.map(|c| self.get(c))
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Vfa => self.s_vfa,
            Component::Fbso => self.s_fbso,
            Component::Bpo => self.x_bpo,
            Component::Upo => self.x_upo,
            Component::Uso => self.s_uso,
            Component::Iss => self.x_iss,
            Component::Nh4 => self.s_nh4,
            Component::Po4 => self.s_po4,
            Component::Nox => self.s_nox,
            Component::O2 => self.s_o2,
            Component::Oho => self.x_oho,
            Component::Pao => self.x_pao,
        }
    }

    pub fn get_mut(&mut self, component: Component) -> &mut f64 {
        match component {
            Component::Vfa => &mut self.s_vfa,
            Component::Fbso => &mut self.s_fbso,
            Component::Bpo => &mut self.x_bpo,
            Component::Upo => &mut self.x_upo,
            Component::Uso => &mut self.s_uso,
            Component::Iss => &mut self.x_iss,
            Component::Nh4 => &mut self.s_nh4,
            Component::Po4 => &mut self.s_po4,
            Component::Nox => &mut self.s_nox,
            Component::O2 => &mut self.s_o2,
            Component::Oho => &mut self.x_oho,
            Component::Pao => &mut self.x_pao,
        }
    }

    /// Every component multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_array(self.to_array().map(|v| v * factor))
    }
}

/// A flow of wastewater with its composition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stream {
    flow: f64,
    components: Components,
    ratios: MassRatios,
}

impl Stream {
    /// Create a stream with the default mass ratios.
    ///
    /// NaN values are read as zero. Negative or infinite values are rejected with
    /// a validation error naming the field.
    pub fn new(flow: f64, components: Components) -> WwtpResult<Self> {
        Self::with_ratios(flow, components, MassRatios::default())
    }

    /// Create a stream with explicit mass ratios.
    pub fn with_ratios(flow: f64, components: Components, ratios: MassRatios) -> WwtpResult<Self> {
        let flow = validation::non_negative("flow", nan_as_zero(flow))?;
        let mut checked = Components::default();
        for component in Component::ALL {
            let value = nan_as_zero(components.get(component));
            *checked.get_mut(component) = validation::non_negative(component.name(), value)?;
        }
        ratios.validate()?;
        Ok(Self {
            flow,
            components: checked,
            ratios,
        })
    }

    /// A new stream sharing this stream's mass ratios.
    pub fn derive(&self, flow: f64, components: Components) -> WwtpResult<Self> {
        Self::with_ratios(flow, components, self.ratios)
    }

    /// Flow rate (ML/d)
    pub fn flow(&self) -> f64 {
        self.flow
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn ratios(&self) -> &MassRatios {
        &self.ratios
    }

    /// Concentration of one component (mg/L)
    pub fn get(&self, component: Component) -> f64 {
        self.components.get(component)
    }

    /// Replace one component's concentration.
    pub fn set(&mut self, component: Component, value: f64) -> WwtpResult<()> {
        let value = validation::non_negative(component.name(), value)?;
        *self.components.get_mut(component) = value;
        Ok(())
    }

    /// Replace one component's concentration by state-variable name.
    pub fn set_by_name(&mut self, key: &str, value: f64) -> WwtpResult<()> {
        let component: Component = key.parse()?;
        self.set(component, value)
    }

    /// A copy of this stream with one component replaced.
    pub fn with_component(&self, component: Component, value: f64) -> WwtpResult<Self> {
        let mut stream = *self;
        stream.set(component, value)?;
        Ok(stream)
    }

    /// Composite measures (COD, TOC, TKN, TN, TP, TSS) in mg/L.
    pub fn totals(&self) -> Totals {
        Totals::from_components(&self.components, &self.ratios)
    }

    /// Components and composite measures as mass fluxes (kg/d).
    pub fn fluxes(&self) -> Fluxes {
        Fluxes {
            flow: self.flow,
            components: self.components.scaled(self.flow),
            totals: self.totals().scaled(self.flow),
        }
    }

    /// Concentration and flux of the headline measures.
    pub fn summary(&self) -> StreamSummary {
        StreamSummary::new(self.flow, &self.components, &self.totals())
    }

    /// Flow-weighted mix of two streams.
    ///
    /// The mixture keeps this stream's mass ratios. Mixing two empty flows yields
    /// an empty flow with zero concentrations.
    pub fn combine(&self, other: &Stream) -> WwtpResult<Self> {
        let flow = self.flow + other.flow;
        let mut components = Components::default();
        if flow > 0.0 {
            for component in Component::ALL {
                *components.get_mut(component) = (self.flow * self.get(component)
                    + other.flow * other.get(component))
                    / flow;
            }
        }
        self.derive(flow, components)
    }
}

fn nan_as_zero(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw_influent() -> Components {
        Components {
            s_vfa: 50.0,
            s_fbso: 115.0,
            x_bpo: 440.0,
            x_upo: 100.0,
            s_uso: 45.0,
            x_iss: 60.0,
            s_nh4: 39.1,
            s_po4: 7.28,
            ..Default::default()
        }
    }

    // ===== Construction =====

    #[test]
    fn test_nan_defaults_to_zero() {
        let components = Components {
            s_nox: f64::NAN,
            ..raw_influent()
        };
        let stream = Stream::new(f64::NAN, components).unwrap();
        assert_eq!(stream.flow(), 0.0);
        assert_eq!(stream.get(Component::Nox), 0.0);
    }

    #[test]
    fn test_negative_component_names_field() {
        let components = Components {
            x_bpo: -1.0,
            ..raw_influent()
        };
        match Stream::new(25.0, components).unwrap_err() {
            WwtpError::Validation { field, .. } => assert_eq!(field, "X_BPO"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_negative_flow_rejected() {
        assert!(Stream::new(-1.0, raw_influent()).is_err());
    }

    #[test]
    fn test_array_order_matches_component_order() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let components = Components::from_array(values);
        assert_eq!(components.x_iss, 6.0);
        assert_eq!(components.x_pao, 12.0);
        assert_eq!(components.to_array(), values);
    }

    // ===== Mutation =====

    #[test]
    fn test_set_by_name() {
        let mut stream = Stream::new(25.0, raw_influent()).unwrap();
        stream.set_by_name("S_NOx", 3.0).unwrap();
        assert_eq!(stream.components().s_nox, 3.0);
        stream.set_by_name("S_FSA", 20.0).unwrap();
        assert_eq!(stream.components().s_nh4, 20.0);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut stream = Stream::new(25.0, raw_influent()).unwrap();
        assert_eq!(
            stream.set_by_name("X_FOO", 1.0).unwrap_err(),
            WwtpError::UnknownComponent("X_FOO".to_string())
        );
    }

    #[test]
    fn test_set_rejects_negative_and_nan() {
        let mut stream = Stream::new(25.0, raw_influent()).unwrap();
        assert!(stream.set(Component::Vfa, -3.0).is_err());
        assert!(stream.set(Component::Vfa, f64::NAN).is_err());
        assert_eq!(stream.components().s_vfa, 50.0);
    }

    #[test]
    fn test_with_component_leaves_original_untouched() {
        let stream = Stream::new(25.0, raw_influent()).unwrap();
        let modified = stream.with_component(Component::Nh4, 1.0).unwrap();
        assert_eq!(stream.components().s_nh4, 39.1);
        assert_eq!(modified.components().s_nh4, 1.0);
    }

    // ===== Mixing =====

    #[test]
    fn test_combine_is_flow_weighted() {
        let a = Stream::new(10.0, raw_influent()).unwrap();
        let b = Stream::new(30.0, Components::default()).unwrap();
        let mixed = a.combine(&b).unwrap();
        assert_eq!(mixed.flow(), 40.0);
        assert_relative_eq!(mixed.components().s_vfa, 12.5, epsilon = 1e-12);
    }

    #[test]
    fn test_combine_conserves_every_component_mass() {
        let a = Stream::new(25.0, raw_influent()).unwrap();
        let mut other = raw_influent();
        other.s_nox = 12.0;
        other.x_oho = 30.0;
        other.s_o2 = 2.0;
        let b = Stream::new(7.5, other).unwrap();
        let mixed = a.combine(&b).unwrap();
        for component in Component::ALL {
            let before = a.flow() * a.get(component) + b.flow() * b.get(component);
            let after = mixed.flow() * mixed.get(component);
            assert_relative_eq!(before, after, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_combine_empty_flows() {
        let a = Stream::new(0.0, raw_influent()).unwrap();
        let b = Stream::new(0.0, raw_influent()).unwrap();
        let mixed = a.combine(&b).unwrap();
        assert_eq!(mixed.flow(), 0.0);
        assert_eq!(mixed.components().s_vfa, 0.0);
    }

    #[test]
    fn test_component_name_round_trip() {
        for component in Component::ALL {
            assert_eq!(component.name().parse::<Component>().unwrap(), component);
        }
    }

    #[test]
    fn test_components_serialise_with_state_variable_names() {
        let json = serde_json::to_value(raw_influent()).unwrap();
        assert_eq!(json["S_NH4"], 39.1);
        assert_eq!(json["X_iSS"], 60.0);
    }
}
