//! Input Validation for Privacy Parameters
//!
//! Every parameter that influences the privacy guarantee is checked before it
//! reaches the mechanism or the ledger.
//!
//! # Parameter Constraints
//!
//! ## Epsilon (ε)
//! - Must be finite and positive (> 0)
//! - Smaller = more private, but more noise
//! - Values above [`MAX_RECOMMENDED_EPSILON`] are accepted but provide
//!   little protection
//!
//! ## Sensitivity (Δf)
//! - Must be finite and positive (> 0)
//! - Counting queries: Δf = [`COUNT_SENSITIVITY`]
//!
//! ## Budget total
//! - Must be finite and positive (> 0)
//! - There is no default: the analyst commits to a total explicitly

use thiserror::Error;

/// Error type for privacy parameter validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Epsilon is invalid
    #[error("invalid epsilon {value}: {reason}")]
    InvalidEpsilon { value: f64, reason: String },
    /// Sensitivity is invalid
    #[error("invalid sensitivity {value}: {reason}")]
    InvalidSensitivity { value: f64, reason: String },
    /// Declared budget total is invalid
    #[error("invalid privacy budget total {value}: {reason}")]
    InvalidBudget { value: f64, reason: String },
}

/// Sensitivity of a counting query: one record moves a count by at most 1
pub const COUNT_SENSITIVITY: f64 = 1.0;

/// Epsilon above which a query is accepted but logged as weakly private
pub const MAX_RECOMMENDED_EPSILON: f64 = 10.0;

/// Minimum allowed epsilon (smaller values would add unbounded noise)
pub const MIN_EPSILON: f64 = 1e-10;

/// Validate a per-query epsilon
///
/// # Constraints
/// - Must be finite
/// - Must be positive (> 0)
/// - Must be at least [`MIN_EPSILON`]
pub fn validate_epsilon(epsilon: f64) -> Result<(), ValidationError> {
    if !epsilon.is_finite() {
        return Err(ValidationError::InvalidEpsilon {
            value: epsilon,
            reason: "epsilon must be a finite number".to_string(),
        });
    }

    if epsilon <= 0.0 {
        return Err(ValidationError::InvalidEpsilon {
            value: epsilon,
            reason: "epsilon must be positive".to_string(),
        });
    }

    if epsilon < MIN_EPSILON {
        return Err(ValidationError::InvalidEpsilon {
            value: epsilon,
            reason: format!("epsilon too small (< {MIN_EPSILON}): noise scale is unbounded"),
        });
    }

    Ok(())
}

/// Validate a query sensitivity
pub fn validate_sensitivity(sensitivity: f64) -> Result<(), ValidationError> {
    if !sensitivity.is_finite() {
        return Err(ValidationError::InvalidSensitivity {
            value: sensitivity,
            reason: "sensitivity must be a finite number".to_string(),
        });
    }

    if sensitivity <= 0.0 {
        return Err(ValidationError::InvalidSensitivity {
            value: sensitivity,
            reason: "sensitivity must be positive".to_string(),
        });
    }

    Ok(())
}

/// Validate the total privacy budget declared for a session
pub fn validate_budget_total(total: f64) -> Result<(), ValidationError> {
    if !total.is_finite() {
        return Err(ValidationError::InvalidBudget {
            value: total,
            reason: "budget total must be a finite number".to_string(),
        });
    }

    if total <= 0.0 {
        return Err(ValidationError::InvalidBudget {
            value: total,
            reason: "budget total must be positive".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_epsilon_valid() {
        assert!(validate_epsilon(0.1).is_ok());
        assert!(validate_epsilon(1.0).is_ok());
        assert!(validate_epsilon(MAX_RECOMMENDED_EPSILON * 2.0).is_ok());
    }

    #[test]
    fn test_validate_epsilon_invalid() {
        assert!(validate_epsilon(0.0).is_err());
        assert!(validate_epsilon(-1.0).is_err());
        assert!(validate_epsilon(1e-12).is_err());
        assert!(validate_epsilon(f64::NAN).is_err());
        assert!(validate_epsilon(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_epsilon_reports_value() {
        let err = validate_epsilon(-1.0).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEpsilon { value, .. } if value == -1.0));
    }

    #[test]
    fn test_validate_sensitivity() {
        assert!(validate_sensitivity(COUNT_SENSITIVITY).is_ok());
        assert!(validate_sensitivity(0.0).is_err());
        assert!(validate_sensitivity(-1.0).is_err());
        assert!(validate_sensitivity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_budget_total() {
        assert!(validate_budget_total(1.0).is_ok());
        assert!(matches!(
            validate_budget_total(0.0),
            Err(ValidationError::InvalidBudget { .. })
        ));
        assert!(validate_budget_total(f64::INFINITY).is_err());
    }
}
