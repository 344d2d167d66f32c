//! Mass balance checks
//!
//! Each unit process exposes the mass balances it is expected to close as a list
//! of [`MassBalance`] values. Checking them is a separate pass: [`BalanceMode::Strict`]
//! turns the first violation into an error, [`BalanceMode::Diagnostic`] logs every
//! violation and lets the caller inspect the results.

use crate::errors::{WwtpError, WwtpResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower edge of the accepted closure band (%)
pub const CLOSURE_LOWER: f64 = 99.9;
/// Upper edge of the accepted closure band (%)
pub const CLOSURE_UPPER: f64 = 100.1;

/// Conserved quantity a balance is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceKind {
    Cod,
    Nitrogen,
    Phosphorus,
    TotalOxygenDemand,
}

impl fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BalanceKind::Cod => "COD",
            BalanceKind::Nitrogen => "Nitrogen",
            BalanceKind::Phosphorus => "Phosphorus",
            BalanceKind::TotalOxygenDemand => "TOD",
        };
        f.write_str(name)
    }
}

/// How balance violations are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    /// A violation is an error
    #[default]
    Strict,
    /// Violations are logged and returned
    Diagnostic,
}

/// One closed (or not) mass balance of a unit process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassBalance {
    /// Unit process the balance belongs to
    pub stage: String,
    pub kind: BalanceKind,
    /// Mass entering (kg/d)
    pub input: f64,
    /// Mass leaving, including gaseous and oxidised losses (kg/d)
    pub output: f64,
    /// `100 · output / input`
    pub percentage: f64,
}

impl MassBalance {
    pub fn new(stage: &str, kind: BalanceKind, input: f64, output: f64) -> Self {
        let percentage = if input == 0.0 && output == 0.0 {
            100.0
        } else {
            100.0 * output / input
        };
        Self {
            stage: stage.to_string(),
            kind,
            input,
            output,
            percentage,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.percentage.is_finite()
            && (CLOSURE_LOWER..=CLOSURE_UPPER).contains(&self.percentage)
    }
}

/// Check every balance according to `mode`.
///
/// Returns the violated balances (always empty in strict mode, since the first
/// violation is returned as an error instead).
pub fn check(balances: &[MassBalance], mode: BalanceMode) -> WwtpResult<Vec<MassBalance>> {
    let mut violations = Vec::new();
    for balance in balances.iter().filter(|b| !b.is_closed()) {
        match mode {
            BalanceMode::Strict => {
                return Err(WwtpError::BalanceViolation {
                    kind: balance.kind,
                    percentage: balance.percentage,
                    lower: CLOSURE_LOWER,
                    upper: CLOSURE_UPPER,
                })
            }
            BalanceMode::Diagnostic => {
                warn!(
                    "{} {} balance does not close: {:.4}%",
                    balance.stage, balance.kind, balance.percentage
                );
                violations.push(balance.clone());
            }
        }
    }
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let balance = MassBalance::new("as", BalanceKind::Cod, 200.0, 199.9);
        assert!((balance.percentage - 99.95).abs() < 1e-9);
        assert!(balance.is_closed());
    }

    #[test]
    fn test_band_edges() {
        assert!(MassBalance::new("as", BalanceKind::Nitrogen, 1000.0, 999.0).is_closed());
        assert!(!MassBalance::new("as", BalanceKind::Nitrogen, 1000.0, 998.9).is_closed());
        assert!(!MassBalance::new("as", BalanceKind::Nitrogen, 1000.0, 1001.5).is_closed());
    }

    #[test]
    fn test_empty_balance_is_closed() {
        assert!(MassBalance::new("pst", BalanceKind::Phosphorus, 0.0, 0.0).is_closed());
        assert!(!MassBalance::new("pst", BalanceKind::Phosphorus, 0.0, 1.0).is_closed());
    }

    #[test]
    fn test_strict_mode_errors() {
        let balances = vec![
            MassBalance::new("as", BalanceKind::Cod, 100.0, 100.0),
            MassBalance::new("as", BalanceKind::Phosphorus, 100.0, 90.0),
        ];
        let err = check(&balances, BalanceMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            WwtpError::BalanceViolation {
                kind: BalanceKind::Phosphorus,
                ..
            }
        ));
    }

    #[test]
    fn test_diagnostic_mode_collects() {
        let balances = vec![
            MassBalance::new("as", BalanceKind::Cod, 100.0, 95.0),
            MassBalance::new("as", BalanceKind::Nitrogen, 100.0, 100.0),
            MassBalance::new("dn", BalanceKind::TotalOxygenDemand, 100.0, 105.0),
        ];
        let violations = check(&balances, BalanceMode::Diagnostic).unwrap();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].kind, BalanceKind::TotalOxygenDemand);
    }

    #[test]
    fn test_mode_deserialises_lowercase() {
        let mode: BalanceMode = serde_json::from_str("\"diagnostic\"").unwrap();
        assert_eq!(mode, BalanceMode::Diagnostic);
    }
}
