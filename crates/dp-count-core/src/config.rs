//! Querier configuration
//!
//! A session is opened with an explicit privacy commitment. The budget total
//! has no default, neither in code nor in the JSON form:
//!
//! ```json
//! { "privacy_budget_total": 1.0, "release": "raw", "reuse_answers": false }
//! ```

use crate::validation::{validate_budget_total, ValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidParameter(#[from] ValidationError),
}

/// Post-processing applied to a noisy count before release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Release `true_count + noise` unchanged, possibly negative
    #[default]
    Raw,
    /// Replace negative releases with 0.
    ///
    /// Opt-in only: it biases small counts upward and reveals that the noisy
    /// value fell below zero. The query is charged exactly as under `Raw`.
    ClampNonNegative,
}

impl ReleasePolicy {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ReleasePolicy::Raw => value,
            ReleasePolicy::ClampNonNegative => value.max(0.0),
        }
    }
}

/// Construction-time settings for a [`DpQuerier`](crate::querier::DpQuerier)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuerierConfig {
    /// Total epsilon available to the session
    pub privacy_budget_total: f64,
    #[serde(default)]
    pub release: ReleasePolicy,
    /// Re-release the stored answer when a predicate is asked again
    #[serde(default)]
    pub reuse_answers: bool,
}

impl QuerierConfig {
    pub fn new(privacy_budget_total: f64) -> Self {
        Self {
            privacy_budget_total,
            release: ReleasePolicy::Raw,
            reuse_answers: false,
        }
    }

    pub fn with_release_policy(mut self, release: ReleasePolicy) -> Self {
        self.release = release;
        self
    }

    pub fn with_answer_reuse(mut self, reuse_answers: bool) -> Self {
        self.reuse_answers = reuse_answers;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_budget_total(self.privacy_budget_total)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
