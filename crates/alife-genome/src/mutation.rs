//! Mutation operator for genome byte code.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Uniform per-byte point mutation
#[derive(Debug, Clone, Copy)]
pub struct Mutator {
    /// Probability of redrawing each byte, in percent
    rate: u8,
}

impl Mutator {
    /// Create a mutator; rates above 100 are treated as 100
    pub fn new(rate: u8) -> Self {
        Self { rate: rate.min(100) }
    }

    pub fn rate(&self) -> u8 {
        self.rate
    }

    /// Return a copy of `code` where every byte was independently replaced by
    /// a uniformly random byte with probability `rate / 100`
    pub fn mutate(&self, code: &[u8], rng: &mut ChaCha8Rng) -> Vec<u8> {
        let mut redrawn = 0usize;
        let mutated = code
            .iter()
            .map(|&byte| {
                if rng.gen_range(0..100u8) < self.rate {
                    redrawn += 1;
                    rng.gen::<u8>()
                } else {
                    byte
                }
            })
            .collect();

        trace!(len = code.len(), redrawn, rate = self.rate, "Mutated genome");
        mutated
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new(10)
    }
}
