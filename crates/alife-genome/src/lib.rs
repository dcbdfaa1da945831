//! Byte-code genomes and their decoding into per-cell growth parameters.
//!
//! A genome is a flat byte string read in fixed-width instructions:
//! - Deterministic: the same genome always decodes the same body plan
//! - Total: any byte string of sufficient length is a valid genome
//! - Length-preserving: mutation only ever redraws bytes

pub mod genome;
pub mod context;
pub mod mutation;
pub mod validation;

pub use genome::Genome;
pub use context::GrowthContext;
pub use mutation::Mutator;
pub use validation::validate_code;
