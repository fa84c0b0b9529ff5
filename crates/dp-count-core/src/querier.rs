//! Differentially private counting sessions
//!
//! A [`DpQuerier`] binds one dataset to one privacy budget. Each query:
//!
//! 1. validates epsilon
//! 2. rejects if the budget cannot afford it, before touching the dataset
//! 3. counts matching rows (outside the session lock)
//! 4. draws Laplace noise with scale 1/ε and charges ε, atomically
//! 5. releases `count + noise`
//!
//! A dataset failure charges nothing. If the charge fails in step 4 the drawn
//! noise is dropped and never released or reused.

use crate::budget::{BudgetSnapshot, PrivacyBudget};
use crate::config::{QuerierConfig, ReleasePolicy};
use crate::dataset::Dataset;
use crate::error::{QueryError, Result};
use crate::laplace::{LaplaceMechanism, NoiseMechanism};
use crate::validation::{validate_epsilon, COUNT_SENSITIVITY, MAX_RECOMMENDED_EPSILON};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ledger, noise source and released answers; guarded together
struct Session<P, N> {
    budget: PrivacyBudget,
    noise: N,
    answers: Option<HashMap<P, f64>>,
}

impl<P: Eq + std::hash::Hash, N> Session<P, N> {
    fn released(&self, predicate: &P) -> Option<f64> {
        self.answers.as_ref()?.get(predicate).copied()
    }
}

/// Answers counting queries over a shared dataset under a fixed ε budget
pub struct DpQuerier<D: Dataset, N = LaplaceMechanism> {
    dataset: Arc<D>,
    release: ReleasePolicy,
    session: Mutex<Session<D::Predicate, N>>,
}

impl<D: Dataset> DpQuerier<D> {
    /// Open a session using the Laplace mechanism seeded from OS entropy
    pub fn new(dataset: Arc<D>, config: QuerierConfig) -> Result<Self> {
        let noise = LaplaceMechanism::from_entropy()?;
        Self::with_mechanism(dataset, config, noise)
    }
}

impl<D: Dataset, N: NoiseMechanism> DpQuerier<D, N> {
    /// Open a session with an explicit noise mechanism
    pub fn with_mechanism(dataset: Arc<D>, config: QuerierConfig, noise: N) -> Result<Self> {
        config.validate()?;
        let budget = PrivacyBudget::new(config.privacy_budget_total)?;

        info!(
            total = config.privacy_budget_total,
            release = ?config.release,
            reuse_answers = config.reuse_answers,
            "opened private counting session"
        );

        Ok(Self {
            dataset,
            release: config.release,
            session: Mutex::new(Session {
                budget,
                noise,
                answers: config.reuse_answers.then(HashMap::new),
            }),
        })
    }

    /// Noisy count of rows matching `predicate`, charged `epsilon`
    ///
    /// The result may be negative unless clamping was opted into; callers
    /// round it themselves if they need an integer.
    ///
    /// `epsilon` must be finite and at least
    /// [`MIN_EPSILON`](crate::validation::MIN_EPSILON) (1e-10); smaller
    /// positive values fail with [`QueryError::InvalidParameter`].
    pub fn get_count(&self, predicate: &D::Predicate, epsilon: f64) -> Result<f64> {
        validate_epsilon(epsilon)?;
        if epsilon > MAX_RECOMMENDED_EPSILON {
            warn!(epsilon, "epsilon above recommended maximum gives weak protection");
        }

        {
            let session = self.session.lock();
            if let Some(released) = session.released(predicate) {
                debug!(?predicate, "re-released stored answer");
                return Ok(released);
            }
            if !session.budget.can_afford(epsilon) {
                let remaining = session.budget.remaining();
                warn!(epsilon, remaining, "rejected query: privacy budget exceeded");
                return Err(QueryError::BudgetExceeded {
                    requested: epsilon,
                    remaining,
                });
            }
        }

        let true_count = self.dataset.count(predicate)?;

        let mut session = self.session.lock();
        // A concurrent identical query may have released first.
        if let Some(released) = session.released(predicate) {
            return Ok(released);
        }

        let noise = session.noise.sample(epsilon, COUNT_SENSITIVITY)?;
        if let Err(e) = session.budget.charge(epsilon) {
            warn!(epsilon, "rejected query: budget spent concurrently");
            return Err(e.into());
        }

        let released = self.release.apply(true_count as f64 + noise);
        if let Some(answers) = session.answers.as_mut() {
            answers.insert(predicate.clone(), released);
        }

        debug!(
            epsilon,
            remaining = session.budget.remaining(),
            queries = session.budget.query_count(),
            "released noisy count"
        );
        Ok(released)
    }

    /// Whether a query at `epsilon` would currently be accepted. Charges nothing.
    pub fn can_afford(&self, epsilon: f64) -> bool {
        validate_epsilon(epsilon).is_ok() && self.session.lock().budget.can_afford(epsilon)
    }

    /// Remaining epsilon. Charges nothing.
    pub fn remaining_budget(&self) -> f64 {
        self.session.lock().budget.remaining()
    }

    pub fn budget_snapshot(&self) -> BudgetSnapshot {
        self.session.lock().budget.snapshot()
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.release
    }

    pub fn dataset(&self) -> &Arc<D> {
        &self.dataset
    }
}
