use crate::balance::BalanceKind;
use thiserror::Error;

/// Error type for invalid inputs and infeasible plant designs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WwtpError {
    #[error("Invalid value for '{field}': {value} ({reason})")]
    Validation {
        field: String,
        value: f64,
        reason: String,
    },
    #[error("Unknown stream component '{0}'")]
    UnknownComponent(String),
    #[error("Infeasible design: {0}")]
    Infeasible(#[from] Infeasibility),
    #[error("{kind} balance closes at {percentage:.4}%, outside the accepted [{lower}, {upper}]% band")]
    BalanceViolation {
        kind: BalanceKind,
        percentage: f64,
        lower: f64,
        upper: f64,
    },
    #[error("Solver failed: {0}")]
    Solver(#[from] SolverFailure),
    #[error("River network cannot be evaluated: {0}")]
    Network(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A design that violates a physical or kinetic limit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Infeasibility {
    #[error("insufficient {nutrient} for sludge production: {available:.4} mg/L available after synthesis")]
    InsufficientNutrient { nutrient: String, available: f64 },
    #[error("unaerated sludge fraction {fxt:.4} exceeds the maximum {fxm:.4} for nitrification")]
    UnaeratedFractionTooHigh { fxt: f64, fxm: f64 },
    #[error("sludge age {rs:.4} d is below the minimum {rsm:.4} d for nitrification")]
    SludgeAgeTooShort { rs: f64, rsm: f64 },
    #[error("unaerated sludge fraction {fxt:.4} is below the minimum {fx1min:.4} for the anoxic zone to consume its readily biodegradable COD")]
    AnoxicFractionTooLow { fxt: f64, fx1min: f64 },
    #[error("optimal internal recirculation has no real solution (discriminant {discriminant:.4e})")]
    NoRecirculationOptimum { discriminant: f64 },
    #[error("plant overloaded: {quantity} is {actual:.4} against a capacity of {capacity:.4}")]
    Overloaded {
        quantity: String,
        actual: f64,
        capacity: f64,
    },
}

/// Failure modes of the iterative root finder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverFailure {
    #[error("no convergence after {iterations} iterations (last estimate {last_estimate})")]
    MaxIterations { iterations: usize, last_estimate: f64 },
    #[error("derivative vanished at x={at}")]
    ZeroDerivative { at: f64 },
    #[error("iterate became non-finite at iteration {iteration}")]
    NonFinite { iteration: usize },
}

/// Convenience type for `Result<T, WwtpError>`.
pub type WwtpResult<T> = Result<T, WwtpError>;

impl From<toml::de::Error> for WwtpError {
    fn from(value: toml::de::Error) -> Self {
        WwtpError::Config(value.to_string())
    }
}
