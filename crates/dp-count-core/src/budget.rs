//! Privacy Budget Accounting
//!
//! Tracks the cumulative epsilon released for one dataset handle under
//! **sequential composition**: k queries with parameters ε₁…εₖ cost Σεᵢ, and
//! no query may push that sum past the declared total.
//!
//! # Budget Exhaustion
//!
//! When the budget is exhausted no more fresh answers can be released for the
//! lifetime of the ledger. There is no reset.
//!
//! # Floating Point Comparison
//!
//! `consumed + ε ≤ total` is evaluated with a tolerance of
//! [`TOLERANCE_ULPS`] machine epsilons relative to `total`, so a sequence that
//! spends exactly the total (0.7 + 0.2 + 0.1 against 1.0) is not rejected by
//! accumulated rounding.

use crate::validation::{validate_budget_total, validate_epsilon, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the boundary tolerance, in units of `f64::EPSILON * total`
pub const TOLERANCE_ULPS: f64 = 64.0;

/// Error type for budget operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BudgetError {
    /// Insufficient budget remaining
    #[error("privacy budget exceeded: requested ε={requested:.4}, remaining ε={remaining:.4}")]
    Exceeded { requested: f64, remaining: f64 },
    /// Invalid budget parameters
    #[error(transparent)]
    InvalidParameter(#[from] ValidationError),
}

/// Ledger of total and consumed epsilon for one dataset handle
#[derive(Debug, Clone)]
pub struct PrivacyBudget {
    total: f64,
    consumed: f64,
    /// Epsilon of every successful charge, in order
    history: Vec<f64>,
}

impl PrivacyBudget {
    /// Create a ledger with the declared total
    pub fn new(total: f64) -> Result<Self, BudgetError> {
        validate_budget_total(total)?;
        Ok(Self {
            total,
            consumed: 0.0,
            history: Vec::new(),
        })
    }

    /// Declared total epsilon
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Epsilon consumed so far
    pub fn consumed(&self) -> f64 {
        self.consumed
    }

    /// Remaining epsilon, never negative
    pub fn remaining(&self) -> f64 {
        (self.total - self.consumed).max(0.0)
    }

    /// Number of successful charges
    pub fn query_count(&self) -> usize {
        self.history.len()
    }

    /// Epsilon of every successful charge, in order
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Fraction of the total consumed
    pub fn utilization(&self) -> f64 {
        self.consumed / self.total
    }

    fn tolerance(&self) -> f64 {
        self.total * TOLERANCE_ULPS * f64::EPSILON
    }

    /// Whether a charge of `epsilon` would fit. Does not mutate the ledger.
    pub fn can_afford(&self, epsilon: f64) -> bool {
        self.consumed + epsilon <= self.total + self.tolerance()
    }

    /// Charge `epsilon` against the ledger
    ///
    /// The ledger is left untouched on failure.
    pub fn charge(&mut self, epsilon: f64) -> Result<(), BudgetError> {
        validate_epsilon(epsilon)?;

        if !self.can_afford(epsilon) {
            return Err(BudgetError::Exceeded {
                requested: epsilon,
                remaining: self.remaining(),
            });
        }

        // A charge inside the tolerance band lands exactly on the total.
        self.consumed = (self.consumed + epsilon).min(self.total);
        self.history.push(epsilon);
        Ok(())
    }

    /// Point-in-time view of the ledger
    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            total: self.total,
            consumed: self.consumed,
            remaining: self.remaining(),
            query_count: self.query_count(),
        }
    }
}

/// Serializable view of a [`PrivacyBudget`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub total: f64,
    pub consumed: f64,
    pub remaining: f64,
    pub query_count: usize,
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Remaining budget never increases after any charge
        #[test]
        fn budget_monotonicity(
            total in 1.0..100.0f64,
            charges in proptest::collection::vec(0.01..1.0f64, 1..50)
        ) {
            let mut budget = PrivacyBudget::new(total).unwrap();
            let mut prev_remaining = budget.remaining();

            for epsilon in charges {
                let _ = budget.charge(epsilon);
                let current = budget.remaining();
                prop_assert!(
                    current <= prev_remaining,
                    "Budget increased from {} to {} after charging {}",
                    prev_remaining, current, epsilon
                );
                prev_remaining = current;
            }
        }

        /// Consumed never exceeds total and remaining never goes negative
        #[test]
        fn budget_bounds_hold(
            total in 0.1..10.0f64,
            charges in proptest::collection::vec(0.01..2.0f64, 1..100)
        ) {
            let mut budget = PrivacyBudget::new(total).unwrap();

            for epsilon in charges {
                let _ = budget.charge(epsilon);
                prop_assert!(budget.remaining() >= 0.0);
                prop_assert!(budget.consumed() <= budget.total());
            }
        }

        /// Consumed equals the sum of successful charges
        #[test]
        fn consumed_is_sum_of_successful_charges(
            total in 1.0..10.0f64,
            charges in proptest::collection::vec(0.05..0.5f64, 1..40)
        ) {
            let mut budget = PrivacyBudget::new(total).unwrap();
            let mut accepted = Vec::new();

            for epsilon in charges {
                if budget.charge(epsilon).is_ok() {
                    accepted.push(epsilon);
                }
            }

            let sum: f64 = accepted.iter().sum();
            prop_assert!((budget.consumed() - sum).abs() < 1e-9);
            prop_assert_eq!(budget.query_count(), accepted.len());
            prop_assert_eq!(budget.history(), accepted.as_slice());
        }
    }
}
