// Copyright (c) 2024 Mike Tsao

//! Provides the random-number generator behind chance rolls and randomized
//! spring targets.

use crate::types::{Normal, Vector};
use byteorder::{BigEndian, ByteOrder};
use delegate::delegate;

/// A pseudorandom number generator (PRNG) for gameplay decisions that don't
/// need cryptographically secure random numbers.
#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        // A failing OS entropy source is rare enough that a fixed seed is an
        // acceptable fallback.
        Self::new_with_seed(Self::generate_seed().unwrap_or(0x5eed))
    }
}
#[allow(missing_docs)]
impl Rng {
    /// Pass the same number to [Rng::new_with_seed()] to get the same stream
    /// back again. Good for reproducing test failures.
    pub fn new_with_seed(seed: u128) -> Self {
        Self(oorandom::Rand64::new(seed))
    }

    /// Creates a seed from the operating system's entropy source.
    pub fn generate_seed() -> anyhow::Result<u128> {
        let mut bytes = [0u8; 16];

        getrandom::getrandom(&mut bytes)?;
        Ok(BigEndian::read_u128(&bytes))
    }

    delegate! {
        to self.0 {
            pub fn rand_u64(&mut self) -> u64;
            pub fn rand_float(&mut self) -> f64;
        }
    }

    /// Returns true with probability `chance`. Certain chances don't consume
    /// a roll.
    pub fn roll(&mut self, chance: Normal) -> bool {
        if chance.is_certain() {
            true
        } else {
            self.rand_float() < chance.get()
        }
    }

    /// A uniformly distributed value in [min, max).
    pub fn rand_between(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.rand_float()
    }

    /// A vector whose components are each drawn from the matching
    /// components of `min` and `max`.
    pub fn rand_vector(&mut self, min: Vector, max: Vector) -> Vector {
        Vector::new(
            self.rand_between(min.x, max.x),
            self.rand_between(min.y, max.y),
            self.rand_between(min.z, max.z),
        )
    }
}
