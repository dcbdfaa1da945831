//! Per-life metrics and population statistics.

use crate::types::{CellKind, LineageId};
use serde::{Deserialize, Serialize};

/// Metrics collected over one life's existence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifeMetrics {
    /// World tick at which the life was appended
    pub birth_tick: u64,
    /// Number of updates the life went through
    pub lifetime: u64,
    /// Lives spawned by this life's breed cells
    pub offspring_count: u32,
    /// Successful growth events across all cells
    pub cells_grown: u32,
    /// Largest number of cells alive at once
    pub peak_cells: u32,
    /// Resource contacts relayed to this life's cells
    pub times_eaten: u32,
}

impl LifeMetrics {
    pub fn new(birth_tick: u64) -> Self {
        Self {
            birth_tick,
            ..Default::default()
        }
    }

    pub fn observe_cell_count(&mut self, cells: usize) {
        self.peak_cells = self.peak_cells.max(cells as u32);
    }
}

/// Statistics aggregated over every life of a lineage that has died
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageStats {
    pub lineage_id: LineageId,
    pub total_lives: u32,
    pub avg_lifetime: f64,
    pub max_generation: u32,
    pub best: LifeMetrics,
}

impl LineageStats {
    pub fn new(lineage_id: LineageId) -> Self {
        Self {
            lineage_id,
            total_lives: 0,
            avg_lifetime: 0.0,
            max_generation: 0,
            best: LifeMetrics::default(),
        }
    }

    /// Fold a finished life into the lineage
    pub fn update(&mut self, metrics: &LifeMetrics, generation: u32) {
        let n = self.total_lives as f64;
        self.avg_lifetime = (self.avg_lifetime * n + metrics.lifetime as f64) / (n + 1.0);
        self.max_generation = self.max_generation.max(generation);

        // Offspring first, size breaks ties
        let key = |m: &LifeMetrics| (m.offspring_count, m.peak_cells);
        if self.total_lives == 0 || key(metrics) > key(&self.best) {
            self.best = metrics.clone();
        }

        self.total_lives += 1;
    }
}

/// Snapshot of the whole population at one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub tick: u64,
    pub lives: usize,
    pub cells: usize,
    /// Cell counts indexed by [`CellKind::index`]
    pub cells_by_kind: [usize; 5],
    pub total_energy: f64,
    /// Lives appended since the world started, the seed included
    pub births: u64,
    pub life_deaths: u64,
    pub cell_deaths: u64,
}

impl PopulationStats {
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells_by_kind[kind.index()]
    }

    pub fn avg_cells_per_life(&self) -> f64 {
        if self.lives == 0 {
            0.0
        } else {
            self.cells as f64 / self.lives as f64
        }
    }

    pub fn is_extinct(&self) -> bool {
        self.lives == 0
    }
}
