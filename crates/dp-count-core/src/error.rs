//! Errors surfaced by [`DpQuerier`](crate::querier::DpQuerier)
//!
//! Each failure is a distinct variant. None of them is ever replaced by a
//! default value, and none of them consumes budget.

use crate::budget::BudgetError;
use crate::dataset::DatasetError;
use crate::laplace::NoiseError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// A caller-supplied parameter violated a precondition
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ValidationError),

    /// The requested epsilon does not fit in the remaining budget
    #[error("privacy budget exceeded: requested ε={requested:.4}, remaining ε={remaining:.4}")]
    BudgetExceeded { requested: f64, remaining: f64 },

    /// The dataset collaborator failed
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// The noise source failed
    #[error("noise generation failed: {0}")]
    Noise(NoiseError),
}

/// Result type for querier operations
pub type Result<T> = std::result::Result<T, QueryError>;

impl From<BudgetError> for QueryError {
    fn from(e: BudgetError) -> Self {
        match e {
            BudgetError::Exceeded {
                requested,
                remaining,
            } => QueryError::BudgetExceeded {
                requested,
                remaining,
            },
            BudgetError::InvalidParameter(v) => QueryError::InvalidParameter(v),
        }
    }
}

impl From<NoiseError> for QueryError {
    fn from(e: NoiseError) -> Self {
        match e {
            NoiseError::InvalidParameter(v) => QueryError::InvalidParameter(v),
            other => QueryError::Noise(other),
        }
    }
}

impl QueryError {
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, QueryError::BudgetExceeded { .. })
    }
}
