//! River Reach Parameters
//!
//! Trapezoidal channel geometry and roughness of one river reach, plus the
//! degradation kinetics applied to pollutants travelling along it.

use serde::{Deserialize, Serialize};
use wwtp_core::errors::WwtpResult;
use wwtp_core::validation;

/// Geometry and hydraulics of a trapezoidal river reach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachParameters {
    /// Bottom width
    /// unit: m
    /// default: 3.0
    pub bottom_width: f64,

    /// Top width at bankfull
    /// unit: m
    /// default: 6.0
    pub top_width: f64,

    /// Bank slope length from bed to bankfull
    /// unit: m
    /// default: 2.0
    pub bank_length: f64,

    /// Bed slope
    /// unit: m/m
    /// default: 0.005
    pub slope: f64,

    /// Manning roughness coefficient
    /// unit: s/m^(1/3)
    /// default: 0.0358
    pub manning_n: f64,

    /// Reach length
    /// unit: m
    /// default: 1000.0
    pub length: f64,

    /// Water depth
    /// unit: m
    /// default: 1.2
    pub depth: f64,

    /// Water temperature
    /// unit: °C
    /// default: 15.0
    pub temperature: f64,
}

impl Default for ReachParameters {
    fn default() -> Self {
        Self {
            bottom_width: 3.0,
            top_width: 6.0,
            bank_length: 2.0,
            slope: 0.005,
            manning_n: 0.0358,
            length: 1000.0,
            depth: 1.2,
            temperature: 15.0,
        }
    }
}

impl ReachParameters {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::positive("bottom_width", self.bottom_width)?;
        validation::at_least("top_width", self.top_width, self.bottom_width)?;
        validation::positive("bank_length", self.bank_length)?;
        // Banks cannot spread wider than their own length allows
        validation::within(
            "top_width",
            self.top_width,
            self.bottom_width,
            self.bottom_width + 2.0 * self.bank_length,
        )?;
        validation::positive("slope", self.slope)?;
        validation::positive("manning_n", self.manning_n)?;
        validation::positive("length", self.length)?;
        validation::positive("depth", self.depth)?;
        validation::finite("temperature", self.temperature)?;
        Ok(())
    }
}

/// Surface-area based removal of one pollutant along a reach
///
/// Removal follows saturation kinetics in the concentration `C = M/Q`:
/// $$M_f = \max(0, M_i - R_{20} \cdot HRT \cdot S \cdot \theta^{(T-20)} \cdot \frac{C}{k + C})$$
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Degradation {
    /// Areal removal rate at 20 °C
    /// unit: g/(m²·min)
    /// default: 0.0
    pub r_20: f64,

    /// Half-saturation concentration
    /// unit: g/m³
    /// default: 1.0
    pub k: f64,

    /// Temperature coefficient
    /// default: 1.041
    pub theta: f64,
}

impl Default for Degradation {
    fn default() -> Self {
        Self {
            r_20: 0.0,
            k: 1.0,
            theta: 1.041,
        }
    }
}

impl Degradation {
    pub fn validate(&self) -> WwtpResult<()> {
        validation::non_negative("r_20", self.r_20)?;
        validation::positive("k", self.k)?;
        validation::positive("theta", self.theta)?;
        Ok(())
    }
}
