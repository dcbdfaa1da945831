//! Life (organism) state and management.

use alife_core::{CellId, LifeId, LifeMetrics, LineageId};
use alife_genome::Genome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An organism: one genome and the tree of cells grown from it
#[derive(Debug, Clone)]
pub struct Life {
    pub id: LifeId,
    pub lineage_id: LineageId,
    /// 0 for the seed life, parent's generation + 1 for offspring
    pub generation: u32,
    pub parent: Option<LifeId>,
    pub genome: Genome,
    pub root: CellId,
    /// Flat membership index, consistent with the tree under `root`
    pub cells: BTreeSet<CellId>,
    pub metrics: LifeMetrics,
}

impl Life {
    pub fn new(
        id: LifeId,
        lineage_id: LineageId,
        generation: u32,
        parent: Option<LifeId>,
        genome: Genome,
        root: CellId,
        birth_tick: u64,
    ) -> Self {
        let mut cells = BTreeSet::new();
        cells.insert(root);

        let mut metrics = LifeMetrics::new(birth_tick);
        metrics.observe_cell_count(1);

        Self {
            id,
            lineage_id,
            generation,
            parent,
            genome,
            root,
            cells,
            metrics,
        }
    }

    /// Age the life by one update
    pub fn tick(&mut self) {
        self.genome.advance();
        self.metrics.lifetime += 1;
    }

    pub fn is_alive(&self) -> bool {
        self.genome.is_alive()
    }

    pub fn can_grow(&self) -> bool {
        self.genome.can_grow()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn add_cell(&mut self, cell: CellId) {
        self.cells.insert(cell);
        self.metrics.observe_cell_count(self.cells.len());
    }

    pub fn remove_cell(&mut self, cell: CellId) -> bool {
        self.cells.remove(&cell)
    }

    pub fn record_growth(&mut self) {
        self.metrics.cells_grown += 1;
    }

    pub fn record_offspring(&mut self) {
        self.metrics.offspring_count += 1;
    }

    pub fn record_meal(&mut self) {
        self.metrics.times_eaten += 1;
    }
}

/// Where a new life comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestry {
    pub lineage_id: LineageId,
    pub generation: u32,
    pub parent: Option<LifeId>,
}

impl Ancestry {
    /// Founder of a fresh lineage
    pub fn founder(lineage_id: LineageId) -> Self {
        Self {
            lineage_id,
            generation: 0,
            parent: None,
        }
    }

    pub fn offspring_of(parent: &Life) -> Self {
        Self {
            lineage_id: parent.lineage_id,
            generation: parent.generation + 1,
            parent: Some(parent.id),
        }
    }
}

/// Serializable life summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeData {
    pub id: LifeId,
    pub lineage_id: LineageId,
    pub generation: u32,
    pub parent: Option<LifeId>,
    pub genome: Vec<u8>,
    pub ticket: u64,
    pub cell_count: usize,
    pub metrics: LifeMetrics,
}

impl From<&Life> for LifeData {
    fn from(life: &Life) -> Self {
        Self {
            id: life.id,
            lineage_id: life.lineage_id,
            generation: life.generation,
            parent: life.parent,
            genome: life.genome.code().to_vec(),
            ticket: life.genome.ticket(),
            cell_count: life.cells.len(),
            metrics: life.metrics.clone(),
        }
    }
}
