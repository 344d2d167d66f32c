//! Newton–Raphson root finding
//!
//! Used wherever a design quantity is only defined implicitly, e.g. the average
//! reactor solids concentration in the settler capacity estimate. The solver
//! either converges or reports why it did not; the caller decides what a failure
//! means for its design.

use crate::errors::SolverFailure;
use log::debug;
use serde::{Deserialize, Serialize};

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub root: f64,
    pub iterations: usize,
}

/// Newton–Raphson iteration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonRaphson {
    /// Stop once successive iterates differ by less than this
    /// default: 1e-7
    pub tolerance: f64,

    /// Iteration cap
    /// default: 1000
    pub max_iterations: usize,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 1000,
        }
    }
}

impl NewtonRaphson {
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Find `x` with `f(x) = 0` starting from `x0`.
    ///
    /// `df` is the derivative of `f`.
    pub fn solve<F, D>(&self, f: F, df: D, x0: f64) -> Result<Convergence, SolverFailure>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let mut x = x0;
        for iteration in 1..=self.max_iterations {
            let slope = df(x);
            if slope == 0.0 {
                return Err(SolverFailure::ZeroDerivative { at: x });
            }
            let next = x - f(x) / slope;
            if !next.is_finite() {
                return Err(SolverFailure::NonFinite { iteration });
            }
            if (next - x).abs() < self.tolerance {
                debug!("Newton-Raphson converged to {next} after {iteration} iterations");
                return Ok(Convergence {
                    root: next,
                    iterations: iteration,
                });
            }
            x = next;
        }
        Err(SolverFailure::MaxIterations {
            iterations: self.max_iterations,
            last_estimate: x,
        })
    }
}
