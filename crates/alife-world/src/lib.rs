//! World simulation engine.
//!
//! This module implements the tick-driven world where lives grow cell trees
//! from their genomes, trade energy along parent/child joints, reproduce, and die.

pub mod cell;
pub mod clock;
pub mod environment;
pub mod geometry;
pub mod organism;
pub mod world;

pub use cell::{energy_transfer, Cell, GenomeFlags};
pub use clock::TickClock;
pub use environment::Sun;
pub use geometry::{Geometry, HeadlessGeometry};
pub use organism::{Ancestry, Life, LifeData};
pub use world::World;
