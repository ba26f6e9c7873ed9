//! Secret Number Source
//!
//! The session never calls a random number generator directly. It draws
//! secrets through [`SecretSource`], so tests can script the sequence.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::{SECRET_MAX, SECRET_MIN};

/// A uniform source of secret numbers in `[SECRET_MIN, SECRET_MAX]`.
pub trait SecretSource: Send {
    /// Draw the next secret.
    fn draw_secret(&mut self) -> u32;
}

/// Secret source backed by any `rand` generator.
///
/// # Example
///
/// ```
/// use number_guess::game::secret::{RandomSecrets, SecretSource};
///
/// let mut source = RandomSecrets::seeded(7);
/// let secret = source.draw_secret();
/// assert!((1..=100).contains(&secret));
/// ```
#[derive(Debug, Clone)]
pub struct RandomSecrets<R> {
    rng: R,
}

impl<R: RngCore + Send> RandomSecrets<R> {
    /// Wrap an existing generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSecrets<StdRng> {
    /// Generator seeded from OS entropy. Used by the server.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible generator for tests and demos.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> SecretSource for RandomSecrets<R> {
    #[inline]
    fn draw_secret(&mut self) -> u32 {
        // gen_range uses rejection sampling, so no modulo bias
        self.rng.gen_range(SECRET_MIN..=SECRET_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_in_range() {
        let mut source = RandomSecrets::seeded(1234);
        for _ in 0..10_000 {
            let secret = source.draw_secret();
            assert!((SECRET_MIN..=SECRET_MAX).contains(&secret));
        }
    }

    #[test]
    fn test_both_endpoints_reachable() {
        let mut source = RandomSecrets::seeded(99);
        let draws: Vec<u32> = (0..20_000).map(|_| source.draw_secret()).collect();
        assert!(draws.contains(&SECRET_MIN));
        assert!(draws.contains(&SECRET_MAX));
    }

    #[test]
    fn test_approximately_uniform() {
        // 100 buckets, 100k draws: expected 1000 per bucket.
        // Chi-squared with 99 dof; 99.9th percentile is ~148.
        let mut source = RandomSecrets::seeded(2024);
        let draws = 100_000u32;
        let mut counts = [0u32; 100];
        for _ in 0..draws {
            counts[(source.draw_secret() - SECRET_MIN) as usize] += 1;
        }

        let expected = draws as f64 / 100.0;
        let chi_sq: f64 = counts
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();

        assert!(chi_sq < 148.0, "chi-squared too large: {chi_sq}");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomSecrets::seeded(5);
        let mut b = RandomSecrets::seeded(5);
        for _ in 0..100 {
            assert_eq!(a.draw_secret(), b.draw_secret());
        }
    }
}
