//! Laplace Mechanism for Differential Privacy
//!
//! Implements the Laplace mechanism for (ε, 0)-differential privacy.
//!
//! # Mathematical Foundation
//!
//! For a numeric query f with sensitivity Δf, the mechanism releases
//!
//! ```text
//! M(D) = f(D) + Lap(0, Δf/ε)
//! ```
//!
//! The Laplace distribution with scale b = Δf/ε has PDF
//! `p(x) = (1/2b) * e^(-|x|/b)`, mean 0 and variance 2b². For any two
//! neighboring datasets the output densities differ by at most `e^ε`.
//!
//! # Inverse CDF Sampling
//!
//! ```text
//! F^(-1)(u) = -b * sign(u) * ln(1 - 2|u|),   u ~ Uniform(-0.5, 0.5)
//! ```

use crate::rng::{centered_uniform, entropy_seeded, RngError};
use crate::validation::{validate_epsilon, validate_sensitivity, ValidationError};
use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Error type for noise generation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoiseError {
    /// Epsilon or sensitivity violated a precondition
    #[error(transparent)]
    InvalidParameter(#[from] ValidationError),
    /// The random source could not be initialized
    #[error(transparent)]
    Rng(#[from] RngError),
    /// Δf/ε overflowed
    #[error("noise scale is not finite for sensitivity {sensitivity} and epsilon {epsilon}")]
    NonFiniteScale { sensitivity: f64, epsilon: f64 },
}

/// A source of calibrated noise for a query with bounded sensitivity.
///
/// Implementations must draw independently on every call.
pub trait NoiseMechanism: Send {
    /// Draw one noise sample calibrated to `epsilon` and `sensitivity`
    fn sample(&mut self, epsilon: f64, sensitivity: f64) -> Result<f64, NoiseError>;
}

/// Laplace mechanism for (ε, 0)-differential privacy
///
/// The random source is injected; [`LaplaceMechanism::from_entropy`] is the
/// production constructor and seeded generators are used in tests.
#[derive(Debug, Clone)]
pub struct LaplaceMechanism<R = ChaCha20Rng> {
    rng: R,
}

impl LaplaceMechanism<ChaCha20Rng> {
    /// Create a mechanism backed by a ChaCha20 stream seeded from OS entropy
    pub fn from_entropy() -> Result<Self, NoiseError> {
        Ok(Self::with_rng(entropy_seeded()?))
    }
}

impl<R: RngCore> LaplaceMechanism<R> {
    /// Create a mechanism over the given random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Sample from Laplace(0, scale)
    fn draw(&mut self, scale: f64) -> f64 {
        let u = centered_uniform(&mut self.rng);
        -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
    }
}

impl<R: RngCore + Send> NoiseMechanism for LaplaceMechanism<R> {
    fn sample(&mut self, epsilon: f64, sensitivity: f64) -> Result<f64, NoiseError> {
        let b = scale(sensitivity, epsilon)?;
        Ok(self.draw(b))
    }
}

/// Compute the scale parameter b = Δf / ε
pub fn scale(sensitivity: f64, epsilon: f64) -> Result<f64, NoiseError> {
    validate_sensitivity(sensitivity)?;
    validate_epsilon(epsilon)?;

    let b = sensitivity / epsilon;
    if !b.is_finite() {
        return Err(NoiseError::NonFiniteScale {
            sensitivity,
            epsilon,
        });
    }
    Ok(b)
}

/// Variance of the noise: Var(Lap(0, b)) = 2b²
pub fn variance(sensitivity: f64, epsilon: f64) -> Result<f64, NoiseError> {
    let b = scale(sensitivity, epsilon)?;
    Ok(2.0 * b * b)
}

/// Half-width of the interval holding 95% of the noise mass
///
/// P(|X| < x) = 1 - e^(-x/b), so x = b * ln(20) ≈ 3b.
pub fn confidence_interval_95(sensitivity: f64, epsilon: f64) -> Result<f64, NoiseError> {
    let b = scale(sensitivity, epsilon)?;
    Ok(-b * 0.05_f64.ln())
}
