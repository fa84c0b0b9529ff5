//! Differentially Private Counting
//!
//! Answers "how many records satisfy P?" over a tabular dataset with an
//! ε-differential privacy guarantee, and enforces a finite privacy budget
//! across all queries issued against one dataset handle.
//!
//! # Components
//!
//! - [`laplace`]: calibrated Laplace noise, scale Δf/ε
//! - [`budget`]: the ε ledger under sequential composition
//! - [`querier`]: validation, orchestration and error policy
//! - [`dataset`]: the contract a row store implements to be queried
//! - [`ratings`]: a CSV-backed movie ratings dataset
//!
//! # Example
//!
//! ```no_run
//! use dp_count_core::{DpQuerier, QuerierConfig, RatingPredicate, RatingsDataset};
//! use std::sync::Arc;
//!
//! let dataset = Arc::new(RatingsDataset::from_path("ratings.csv")?);
//! let querier = DpQuerier::new(dataset, QuerierConfig::new(1.0))?;
//!
//! let noisy = querier.get_count(&RatingPredicate::new("Seven Samurai", 3), 0.25)?;
//! println!("~{noisy:.1} ratings, ε remaining: {}", querier.remaining_budget());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod budget;
pub mod config;
pub mod dataset;
pub mod error;
pub mod laplace;
pub mod querier;
pub mod ratings;
pub mod rng;
pub mod validation;

// Re-export commonly used items
pub use budget::{BudgetError, BudgetSnapshot, PrivacyBudget};
pub use config::{ConfigError, QuerierConfig, ReleasePolicy};
pub use dataset::{Dataset, DatasetError};
pub use error::QueryError;
pub use laplace::{LaplaceMechanism, NoiseError, NoiseMechanism};
pub use querier::DpQuerier;
pub use ratings::{Rating, RatingPredicate, RatingsDataset};
pub use validation::{ValidationError, COUNT_SENSITIVITY};
