//! The world: every life, every cell, and the tick that drives them.

use crate::cell::{Cell, GenomeFlags};
use crate::clock::TickClock;
use crate::environment::Sun;
use crate::geometry::{Geometry, HeadlessGeometry};
use crate::organism::{Ancestry, Life};
use alife_core::{
    CellId, CellKind, Error, LifeId, LineageId, LineageStats, PopulationStats, Position, Result,
    SimulationConfig,
};
use alife_genome::{Genome, GrowthContext, Mutator};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, event, info, instrument, Level};

/// Owns all lives and the cell arena, and advances them tick by tick.
///
/// Lives are updated in ascending id order and cells in pre-order of their
/// tree, so a run is fully determined by the config and its seed.
pub struct World<G: Geometry = HeadlessGeometry> {
    pub(crate) config: SimulationConfig,
    pub(crate) geometry: G,
    pub(crate) lives: BTreeMap<LifeId, Life>,
    pub(crate) cells: BTreeMap<CellId, Cell>,
    pub(crate) sun: Sun,
    clock: TickClock,
    pub(crate) mutator: Mutator,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) tick: u64,
    next_life: u64,
    next_cell: u64,
    births: u64,
    life_deaths: u64,
    pub(crate) cell_deaths: u64,
    lineages: HashMap<LineageId, LineageStats>,
}

impl<G: Geometry> World<G> {
    /// Create a world holding the seed life from `config`
    pub fn new(config: SimulationConfig, geometry: G) -> Result<Self> {
        let mut world = Self::empty(config, geometry)?;

        let genome = Genome::new(world.config.seed_genome.clone(), &world.config.genome)?;
        let position = world.config.world.seed_position;
        let energy = world.config.energy.seed_energy;
        let lineage_id = world.new_lineage_id();
        world.append_life(genome, position, energy, Ancestry::founder(lineage_id))?;

        Ok(world)
    }

    /// Create a world with no lives in it
    pub fn empty(config: SimulationConfig, geometry: G) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            sun: Sun::new(&config.world.sun),
            clock: TickClock::new(config.clock.interval_secs),
            mutator: Mutator::new(config.genome.mutation_rate),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            geometry,
            lives: BTreeMap::new(),
            cells: BTreeMap::new(),
            tick: 0,
            next_life: 1,
            next_cell: 1,
            births: 0,
            life_deaths: 0,
            cell_deaths: 0,
            lineages: HashMap::new(),
        })
    }

    /// Register a new life with a Green root at `position`.
    ///
    /// The life is first updated on the tick after the one it was added in.
    pub fn append_life(
        &mut self,
        genome: Genome,
        position: Position,
        energy: f32,
        ancestry: Ancestry,
    ) -> Result<LifeId> {
        let growth = genome
            .root_instruction()
            .and_then(|instruction| {
                GrowthContext::decode(instruction, self.config.genome.max_growth_limit)
            })
            .ok_or_else(|| {
                Error::Validation(format!(
                    "genome of {} bytes has no root instruction",
                    genome.len()
                ))
            })?;

        let life_id = LifeId(self.next_life);
        self.next_life += 1;
        let root_id = self.allocate_cell_id();

        self.geometry.place_node(root_id, position)?;
        self.cells.insert(
            root_id,
            Cell::new(root_id, life_id, CellKind::Green, energy, position, None, growth),
        );

        let life = Life::new(
            life_id,
            ancestry.lineage_id,
            ancestry.generation,
            ancestry.parent,
            genome,
            root_id,
            self.tick,
        );
        self.lives.insert(life_id, life);
        self.births += 1;

        debug!(
            event = "life_birth",
            life_id = %life_id,
            lineage_id = %ancestry.lineage_id,
            generation = ancestry.generation,
            tick = self.tick,
            x = position.x,
            y = position.y,
            "Life appended"
        );

        Ok(life_id)
    }

    /// Advance if the tick clock says a tick is due at host time `now`.
    /// Returns whether a tick ran.
    pub fn advance(&mut self, now: f64) -> Result<bool> {
        if !self.clock.ready(now) {
            return Ok(false);
        }
        self.tick()?;
        Ok(true)
    }

    /// Run one tick over the lives present at its start
    pub fn tick(&mut self) -> Result<()> {
        self.tick += 1;

        let life_ids: Vec<LifeId> = self.lives.keys().copied().collect();
        for id in life_ids {
            self.update_life(id)?;
        }

        self.sun.update();

        if self.config.stats_interval > 0 && self.tick % self.config.stats_interval == 0 {
            self.emit_population_metrics();
        }

        Ok(())
    }

    /// Tick until `ticks` have run or the population dies out
    #[instrument(skip(self))]
    pub fn run(&mut self, ticks: u64) -> Result<PopulationStats> {
        info!("Starting world run for {} ticks", ticks);

        for _ in 0..ticks {
            self.tick()?;
            if self.lives.is_empty() {
                info!(event = "extinction", tick = self.tick, "☠️ Population went extinct");
                break;
            }
        }

        self.emit_run_summary();
        Ok(self.stats())
    }

    fn update_life(&mut self, id: LifeId) -> Result<()> {
        let Some(life) = self.lives.get_mut(&id) else {
            return Ok(());
        };

        life.tick();
        if !life.is_alive() {
            return self.teardown_life(id, "lifespan");
        }

        let flags = GenomeFlags {
            alive: true,
            can_grow: life.can_grow(),
        };
        let root = life.root;

        for cell_id in self.subtree(root) {
            // Skip cells killed earlier in this pass
            if self.cells.contains_key(&cell_id) {
                self.update_cell(cell_id, flags)?;
            }
        }

        let starved = self.lives.get(&id).map_or(false, Life::is_empty);
        if starved {
            self.unregister_life(id, "starved");
        }
        Ok(())
    }

    /// Kill every cell of a life, then drop the life
    fn teardown_life(&mut self, id: LifeId, cause: &'static str) -> Result<()> {
        let root = self.lives.get(&id).map(|life| life.root);
        if let Some(root) = root.filter(|root| self.cells.contains_key(root)) {
            self.kill_cell(root)?;
        }

        if let Some(life) = self.lives.get(&id) {
            if let Some(orphan) = life.cells.iter().next() {
                return Err(Error::InvalidState(format!(
                    "{} still indexed by {} after teardown",
                    orphan, id
                )));
            }
        }

        self.unregister_life(id, cause);
        Ok(())
    }

    fn unregister_life(&mut self, id: LifeId, cause: &'static str) {
        let Some(life) = self.lives.remove(&id) else {
            return;
        };
        self.life_deaths += 1;

        self.lineages
            .entry(life.lineage_id)
            .or_insert_with(|| LineageStats::new(life.lineage_id))
            .update(&life.metrics, life.generation);

        if life.metrics.offspring_count > 0 {
            info!(
                event = "life_death",
                life_id = %id,
                lineage_id = %life.lineage_id,
                cause,
                tick = self.tick,
                generation = life.generation,
                lifetime = life.metrics.lifetime,
                offspring_count = life.metrics.offspring_count,
                peak_cells = life.metrics.peak_cells,
                times_eaten = life.metrics.times_eaten,
                "💀 Parent life died"
            );
        } else {
            debug!(
                event = "life_death",
                life_id = %id,
                cause,
                tick = self.tick,
                lifetime = life.metrics.lifetime,
                peak_cells = life.metrics.peak_cells,
                "Life died"
            );
        }

        event!(
            Level::INFO,
            counter_name = "life_deaths",
            counter_value = 1,
            cause,
            had_offspring = life.metrics.offspring_count > 0,
            "Life death metric"
        );
    }

    /// Host callback for a cell touching a resource node (soil).
    /// Returns whether the cell was alive to eat.
    pub fn on_resource_contact(&mut self, cell_id: CellId) -> bool {
        let Some(cell) = self.cells.get_mut(&cell_id) else {
            return false;
        };
        cell.eat(self.config.energy.eat_energy);
        if let Some(life) = self.lives.get_mut(&cell.life) {
            life.record_meal();
        }
        true
    }

    /// Ids of the subtree rooted at `root`, in pre-order
    pub fn subtree(&self, root: CellId) -> Vec<CellId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(cell) = self.cells.get(&id) {
                order.push(id);
                stack.extend(cell.children.keys().rev().copied());
            }
        }
        order
    }

    /// Lineage id drawn from the world's seeded generator
    pub fn new_lineage_id(&mut self) -> LineageId {
        LineageId::from_random_bytes(self.rng.gen())
    }

    pub(crate) fn allocate_cell_id(&mut self) -> CellId {
        let id = CellId(self.next_cell);
        self.next_cell += 1;
        id
    }

    /// Distance between a parent and a new child, or a breed cell and its offspring
    pub(crate) fn spawn_distance(&self) -> f32 {
        3.0 * self.config.world.cell_radius
    }

    pub fn stats(&self) -> PopulationStats {
        let mut stats = PopulationStats {
            tick: self.tick,
            lives: self.lives.len(),
            cells: self.cells.len(),
            births: self.births,
            life_deaths: self.life_deaths,
            cell_deaths: self.cell_deaths,
            ..Default::default()
        };
        for cell in self.cells.values() {
            stats.cells_by_kind[cell.kind.index()] += 1;
            stats.total_energy += cell.energy as f64;
        }
        stats
    }

    fn emit_population_metrics(&self) {
        let stats = self.stats();
        let max_generation = self.lives.values().map(|l| l.generation).max().unwrap_or(0);

        info!(
            event = "population_metrics",
            tick = stats.tick,
            lives = stats.lives,
            cells = stats.cells,
            wall = stats.count(CellKind::Wall),
            green = stats.count(CellKind::Green),
            foot = stats.count(CellKind::Foot),
            tank = stats.count(CellKind::Tank),
            breed = stats.count(CellKind::Breed),
            avg_cells_per_life = format!("{:.2}", stats.avg_cells_per_life()),
            total_energy = format!("{:.1}", stats.total_energy),
            max_generation,
            births = stats.births,
            life_deaths = stats.life_deaths,
            cell_deaths = stats.cell_deaths,
            sun_power = self.sun.power,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = stats.lives,
            tick = stats.tick,
            "Population gauge"
        );

        event!(
            Level::INFO,
            gauge_name = "cells_total",
            gauge_value = stats.cells,
            tick = stats.tick,
            "Cell gauge"
        );
    }

    pub fn emit_run_summary(&self) {
        let stats = self.stats();
        let best = self
            .lineages
            .values()
            .max_by_key(|lineage| (lineage.best.offspring_count, lineage.max_generation));

        info!(
            event = "run_summary",
            final_tick = stats.tick,
            lives = stats.lives,
            cells = stats.cells,
            births = stats.births,
            life_deaths = stats.life_deaths,
            lineages = self.lineages.len(),
            best_lineage_generation = best.map(|l| l.max_generation).unwrap_or(0),
            best_lineage_avg_lifetime = best.map(|l| l.avg_lifetime).unwrap_or(0.0),
            "🏁 Run complete"
        );
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Host access to the scene, e.g. to step a physics engine
    pub fn geometry_mut(&mut self) -> &mut G {
        &mut self.geometry
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    pub fn lives(&self) -> impl Iterator<Item = &Life> {
        self.lives.values()
    }

    pub fn life(&self, id: LifeId) -> Option<&Life> {
        self.lives.get(&id)
    }

    pub fn life_count(&self) -> usize {
        self.lives.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_extinct(&self) -> bool {
        self.lives.is_empty()
    }

    /// Stats of lineages with at least one finished life
    pub fn lineage_stats(&self) -> &HashMap<LineageId, LineageStats> {
        &self.lineages
    }
}
