//! Genome structure: the byte code a life and all its cells are grown from.

use crate::mutation::Mutator;
use crate::validation::validate_code;
use alife_core::{GenomeConfig, Result};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A life's genome together with its aging counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    code: Vec<u8>,
    prime_gene_length: usize,
    lifespan: u64,
    dormancy_ticks: u64,
    ticket: u64,
}

impl Genome {
    pub fn new(code: Vec<u8>, config: &GenomeConfig) -> Result<Self> {
        validate_code(&code, config.prime_gene_length)?;
        Ok(Self {
            code,
            prime_gene_length: config.prime_gene_length,
            lifespan: config.lifespan,
            dormancy_ticks: config.dormancy_ticks,
            ticket: 0,
        })
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn prime_gene_length(&self) -> usize {
        self.prime_gene_length
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn lifespan(&self) -> u64 {
        self.lifespan
    }

    /// Age the genome by one update
    pub fn advance(&mut self) {
        self.ticket += 1;
    }

    pub fn is_alive(&self) -> bool {
        self.ticket < self.lifespan
    }

    /// False during the dormancy period right after spawn
    pub fn can_grow(&self) -> bool {
        self.ticket > self.dormancy_ticks
    }

    /// Raw read at the cursor for a cell's next growth.
    ///
    /// The offset is `((gene_position + growth_count) * width) % (len + 1)`
    /// and the read runs to the end of the code without wrapping, so the
    /// result may be shorter than one instruction or empty.
    pub fn next_instruction(&self, gene_position: usize, growth_count: usize) -> &[u8] {
        let offset =
            ((gene_position + growth_count) * self.prime_gene_length) % (self.code.len() + 1);
        &self.code[offset..]
    }

    /// Exactly one instruction at the cursor, or `None` when the read runs short
    pub fn instruction(&self, gene_position: usize, growth_count: usize) -> Option<&[u8]> {
        let slice = self.next_instruction(gene_position, growth_count);
        slice.get(..self.prime_gene_length)
    }

    /// Instruction the root cell is built from
    pub fn root_instruction(&self) -> Option<&[u8]> {
        self.code.get(..self.prime_gene_length)
    }

    /// A fresh copy for offspring: mutated code, ticket reset
    pub fn mutated(&self, mutator: &Mutator, rng: &mut ChaCha8Rng) -> Genome {
        Genome {
            code: mutator.mutate(&self.code, rng),
            prime_gene_length: self.prime_gene_length,
            lifespan: self.lifespan,
            dormancy_ticks: self.dormancy_ticks,
            ticket: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alife_core::DEFAULT_SEED_GENOME;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn seed_genome() -> Genome {
        Genome::new(DEFAULT_SEED_GENOME.to_vec(), &GenomeConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_empty_code() {
        assert!(Genome::new(Vec::new(), &GenomeConfig::default()).is_err());
    }

    #[test]
    fn test_next_instruction_offsets() {
        let genome = seed_genome();

        let slice = genome.next_instruction(1, 0);
        assert_eq!(&slice[..10], &[4, 7, 1, 3, 10, 0, 12, 100, 0, 0]);
        assert_eq!(slice.len(), 80);

        // (1 + 1) * 10 = 20
        assert_eq!(genome.next_instruction(1, 1)[0], 1);
        assert_eq!(genome.next_instruction(1, 1).len(), 70);
    }

    #[test]
    fn test_read_past_end_is_short() {
        let genome = seed_genome();

        // 9 * 10 = 90 = len: empty read
        assert!(genome.next_instruction(9, 0).is_empty());
        assert!(genome.instruction(9, 0).is_none());

        // 13 * 10 = 130 % 91 = 39: misaligned, but a full width remains
        let slice = genome.next_instruction(13, 0);
        assert_eq!(slice.len(), 51);
        assert!(genome.instruction(13, 0).is_some());

        // 17 * 10 = 170 % 91 = 79: 11 bytes left
        assert_eq!(genome.next_instruction(17, 0).len(), 11);
        // 89 * 10 = 890 % 91 = 71: 19 bytes left
        assert_eq!(genome.next_instruction(89, 0).len(), 19);
        // 18 * 10 = 180 % 91 = 89: 1 byte left
        assert_eq!(genome.next_instruction(18, 0).len(), 1);
        assert!(genome.instruction(18, 0).is_none());
    }

    #[test]
    fn test_aging() {
        let config = GenomeConfig {
            lifespan: 12,
            dormancy_ticks: 10,
            ..Default::default()
        };
        let mut genome = Genome::new(vec![0; 10], &config).unwrap();

        for _ in 0..10 {
            genome.advance();
            assert!(!genome.can_grow());
            assert!(genome.is_alive());
        }

        genome.advance();
        assert_eq!(genome.ticket(), 11);
        assert!(genome.can_grow());
        assert!(genome.is_alive());

        genome.advance();
        assert!(!genome.is_alive());
    }

    #[test]
    fn test_root_instruction() {
        let genome = seed_genome();
        assert_eq!(genome.root_instruction().unwrap(), &DEFAULT_SEED_GENOME[..10]);
    }

    #[test]
    fn test_mutated_resets_ticket_and_keeps_length() {
        let mut genome = seed_genome();
        genome.advance();
        genome.advance();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let child = genome.mutated(&Mutator::new(50), &mut rng);

        assert_eq!(child.ticket(), 0);
        assert_eq!(child.len(), genome.len());
        assert_eq!(child.prime_gene_length(), genome.prime_gene_length());
        assert_eq!(child.lifespan(), genome.lifespan());
    }

    #[test]
    fn test_genome_serialization() {
        let genome = seed_genome();
        let json = serde_json::to_string(&genome).unwrap();
        let deserialized: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(genome, deserialized);
    }

    proptest! {
        #[test]
        fn next_instruction_is_pure(
            code in proptest::collection::vec(any::<u8>(), 10..200),
            gene_position in 0usize..256,
            growth_count in 0usize..256,
        ) {
            let genome = Genome::new(code, &GenomeConfig::default()).unwrap();
            let first = genome.next_instruction(gene_position, growth_count).to_vec();
            let second = genome.next_instruction(gene_position, growth_count).to_vec();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() <= genome.len());
        }

        #[test]
        fn instruction_is_full_width_or_none(
            code in proptest::collection::vec(any::<u8>(), 10..200),
            gene_position in 0usize..256,
            growth_count in 0usize..256,
        ) {
            let genome = Genome::new(code, &GenomeConfig::default()).unwrap();
            let raw = genome.next_instruction(gene_position, growth_count);
            match genome.instruction(gene_position, growth_count) {
                Some(inst) => {
                    prop_assert_eq!(inst.len(), 10);
                    prop_assert_eq!(inst, &raw[..10]);
                }
                None => prop_assert!(raw.len() < 10),
            }
        }
    }
}
