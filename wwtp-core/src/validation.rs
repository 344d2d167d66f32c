//! Range checks applied to parameters at the boundary of every process call.
//!
//! Each helper names the offending field in the returned [`WwtpError::Validation`]
//! so that a rejected plant configuration points straight at the bad value.

use crate::errors::{WwtpError, WwtpResult};

fn invalid(field: &str, value: f64, reason: &str) -> WwtpError {
    WwtpError::Validation {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    }
}

/// Value must be a finite number.
pub fn finite(field: &str, value: f64) -> WwtpResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, value, "must be a finite number"))
    }
}

/// Value must be finite and `>= 0`.
pub fn non_negative(field: &str, value: f64) -> WwtpResult<f64> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, value, "must be >= 0"));
    }
    Ok(value)
}

/// Value must be finite and `> 0`.
pub fn positive(field: &str, value: f64) -> WwtpResult<f64> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, value, "must be > 0"));
    }
    Ok(value)
}

/// Value must lie in the closed interval `[lower, upper]`.
pub fn within(field: &str, value: f64, lower: f64, upper: f64) -> WwtpResult<f64> {
    finite(field, value)?;
    if value < lower || value > upper {
        return Err(invalid(
            field,
            value,
            &format!("must be within [{lower}, {upper}]"),
        ));
    }
    Ok(value)
}

/// Value must be finite and `>= lower`.
pub fn at_least(field: &str, value: f64, lower: f64) -> WwtpResult<f64> {
    finite(field, value)?;
    if value < lower {
        return Err(invalid(field, value, &format!("must be >= {lower}")));
    }
    Ok(value)
}

/// Value must be finite and `< upper`.
pub fn below(field: &str, value: f64, upper: f64) -> WwtpResult<f64> {
    finite(field, value)?;
    if value >= upper {
        return Err(invalid(field, value, &format!("must be < {upper}")));
    }
    Ok(value)
}
