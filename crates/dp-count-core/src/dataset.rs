//! Dataset collaborator contract
//!
//! The privacy engine never sees rows. It asks a [`Dataset`] for the number of
//! records matching an opaque predicate and adds noise to that number.

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

/// Errors raised by a dataset while loading or counting
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The predicate cannot be evaluated against this dataset
    #[error("malformed predicate: {0}")]
    MalformedPredicate(String),
    /// A source record could not be parsed
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    /// The source could not be read
    #[error("dataset unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// A tabular dataset that can count rows matching a predicate.
///
/// Zero matches is a normal result, never an error.
pub trait Dataset: Send + Sync {
    /// Conjunction of field conditions understood by this dataset
    type Predicate: Clone + Eq + Hash + fmt::Debug + Send + Sync;

    /// Count rows matching `predicate`
    fn count(&self, predicate: &Self::Predicate) -> Result<u64, DatasetError>;
}
