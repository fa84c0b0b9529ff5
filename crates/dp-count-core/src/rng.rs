//! Randomness for the Noise Mechanism
//!
//! Production samplers are ChaCha20 streams seeded with 32 bytes from the
//! operating system entropy source (`getrandom`). Each mechanism instance owns
//! its own stream, so no seed state is shared between sessions.
//!
//! Time-derived or hash-derived seeds are predictable and must never feed
//! the mechanism: an attacker who reconstructs the stream can subtract the
//! noise from every released count.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Error type for RNG operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RngError {
    /// The OS entropy source failed
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

/// Create a ChaCha20 generator seeded from OS entropy
pub fn entropy_seeded() -> Result<ChaCha20Rng, RngError> {
    let mut seed = [0u8; 32];
    getrandom::fill(&mut seed).map_err(|e| RngError::Entropy(e.to_string()))?;
    Ok(ChaCha20Rng::from_seed(seed))
}

/// Uniform f64 in [0, 1)
///
/// Uses 53 random bits (the f64 mantissa precision) divided by 2^53.
pub fn uniform_f64<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Uniform f64 in the open interval (-0.5, 0.5), excluding 0
///
/// The Laplace inverse CDF takes `ln(1 - 2|u|)`, so -0.5 would yield an
/// infinite sample and 0 carries no sign.
pub fn centered_uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let centered = uniform_f64(rng) - 0.5;
        if centered > -0.5 && centered != 0.0 {
            return centered;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_seeded_streams_differ() {
        let mut a = entropy_seeded().unwrap();
        let mut b = entropy_seeded().unwrap();
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..10_000 {
            let value = uniform_f64(&mut rng);
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_centered_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..10_000 {
            let value = centered_uniform(&mut rng);
            assert!(value > -0.5);
            assert!(value < 0.5);
            assert!(value != 0.0);
        }
    }

    #[test]
    fn test_seeded_streams_reproducible() {
        let mut a = ChaCha20Rng::seed_from_u64(42);
        let mut b = ChaCha20Rng::seed_from_u64(42);
        assert_eq!(uniform_f64(&mut a), uniform_f64(&mut b));
    }
}
