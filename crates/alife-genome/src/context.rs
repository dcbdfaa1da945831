//! Per-cell growth parameters decoded from one genome instruction.

use alife_core::{heading_to_radians, rotation_to_radians, MIN_INSTRUCTION_LEN};
use serde::{Deserialize, Serialize};

/// Byte offsets of the fields inside an instruction, after the kind selector
mod offset {
    pub const GENE_POSITION: usize = 1;
    pub const GROWTH_LIMIT: usize = 2;
    pub const ROTATION: usize = 3;
    pub const CHILD_ENERGY: usize = 4;
    pub const IMPULSE: usize = 5;
    pub const HEADING: usize = 6;
    pub const ACTIVATION: usize = 7;
}

/// Number of distinct growth directions, spaced π/3 apart
pub const ROTATION_STEPS: u8 = 6;

/// Growth parameters a cell carries for its whole life
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthContext {
    /// The instruction this context was decoded from
    pub raw_instruction: Vec<u8>,
    /// Read cursor for this cell's own growth instructions
    pub gene_position: usize,
    /// Children this cell may ever grow
    pub growth_limit: usize,
    /// Children grown so far
    pub growth_count: usize,
    /// Growth direction step, `0..ROTATION_STEPS`
    pub rotation: u8,
    /// Energy granted to each child (or offspring root) this cell creates
    pub child_energy: u8,
    /// Locomotion / launch strength
    pub impulse: u8,
    /// Locomotion / launch direction over a full turn
    pub heading: u8,
    /// Energy a foot cell keeps in reserve before kicking
    pub activation: u8,
}

impl GrowthContext {
    /// Decode a context from an instruction. Returns `None` if the slice is
    /// too short to hold every field.
    pub fn decode(instruction: &[u8], max_growth_limit: u8) -> Option<Self> {
        if instruction.len() < MIN_INSTRUCTION_LEN {
            return None;
        }

        Some(Self {
            raw_instruction: instruction.to_vec(),
            gene_position: instruction[offset::GENE_POSITION] as usize,
            growth_limit: instruction[offset::GROWTH_LIMIT] as usize
                % (max_growth_limit as usize + 1),
            growth_count: 0,
            rotation: instruction[offset::ROTATION] % ROTATION_STEPS,
            child_energy: instruction[offset::CHILD_ENERGY],
            impulse: instruction[offset::IMPULSE],
            heading: instruction[offset::HEADING],
            activation: instruction[offset::ACTIVATION],
        })
    }

    pub fn can_grow_more(&self) -> bool {
        self.growth_count < self.growth_limit
    }

    pub fn record_growth(&mut self) {
        debug_assert!(self.can_grow_more());
        self.growth_count += 1;
    }

    pub fn child_energy(&self) -> f32 {
        self.child_energy as f32
    }

    pub fn rotation_radians(&self) -> f32 {
        rotation_to_radians(self.rotation)
    }

    pub fn heading_radians(&self) -> f32 {
        heading_to_radians(self.heading)
    }
}
