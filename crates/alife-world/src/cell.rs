//! Cells and the per-tick cell state machine.
//!
//! Each update runs, in order: work, upkeep, growth, diffusion to children,
//! death check. Cells live in the world's arena and refer to each other by id.

use crate::geometry::Geometry;
use crate::organism::Ancestry;
use crate::world::World;
use alife_core::{CellId, CellKind, Error, Impulse, JointHandle, LifeId, Position, Result};
use alife_genome::GrowthContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use tracing::{debug, trace};

/// A node in a life's cell tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub life: LifeId,
    pub kind: CellKind,
    /// May dip below zero until the death check runs
    pub energy: f32,
    pub position: Position,
    pub parent: Option<CellId>,
    /// Children and the joint binding each one to this cell
    pub children: BTreeMap<CellId, JointHandle>,
    pub growth: GrowthContext,
    pub age: u64,
}

impl Cell {
    pub fn new(
        id: CellId,
        life: LifeId,
        kind: CellKind,
        energy: f32,
        position: Position,
        parent: Option<CellId>,
        growth: GrowthContext,
    ) -> Self {
        Self {
            id,
            life,
            kind,
            energy,
            position,
            parent,
            children: BTreeMap::new(),
            growth,
            age: 0,
        }
    }

    pub fn cost(&self) -> f32 {
        self.kind.cost()
    }

    pub fn move_capacity(&self) -> f32 {
        self.kind.move_capacity()
    }

    /// Energy a growth event consumes: this kind's growth energy plus the
    /// child's starting grant
    pub fn growth_threshold(&self) -> f32 {
        self.kind.growth_energy() + self.growth.child_energy()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_starved(&self) -> bool {
        self.energy <= 0.0
    }

    pub fn eat(&mut self, amount: f32) {
        self.energy += amount;
    }
}

/// Genome state a cell update depends on, copied out before the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeFlags {
    pub alive: bool,
    pub can_grow: bool,
}

/// One pairwise diffusion step between a parent (`a`) and a child (`b`).
///
/// Returns the new `(a, b)` energies, or `None` when the gap is within
/// `1 + move_cost`. The sender is charged `move_cost` on top of the amount,
/// which is capped by the sender's capacity.
pub fn energy_transfer(
    a: f32,
    b: f32,
    capacity_a: f32,
    capacity_b: f32,
    move_cost: f32,
) -> Option<(f32, f32)> {
    let delta = a - b;
    if delta.abs() <= 1.0 + move_cost {
        return None;
    }

    if delta > 0.0 {
        let amount = (delta / 2.0).min(capacity_a);
        Some((a - amount - move_cost, b + amount))
    } else {
        let amount = (-delta / 2.0).min(capacity_b);
        Some((a + amount, b - amount - move_cost))
    }
}

impl<G: Geometry> World<G> {
    /// Run one cell through its tick
    pub(crate) fn update_cell(&mut self, id: CellId, flags: GenomeFlags) -> Result<()> {
        let kind = match self.cells.get_mut(&id) {
            Some(cell) => {
                cell.age += 1;
                cell.kind
            }
            None => return Ok(()),
        };

        match kind {
            CellKind::Green => self.photosynthesize(id),
            CellKind::Foot => self.kick(id)?,
            CellKind::Breed => self.breed(id)?,
            CellKind::Wall | CellKind::Tank => {}
        }

        if let Some(cell) = self.cells.get_mut(&id) {
            cell.energy -= cell.cost();
        }

        if flags.can_grow && flags.alive {
            self.grow(id)?;
        }

        self.diffuse(id);

        let starved = self.cells.get(&id).map_or(false, Cell::is_starved);
        if starved || !flags.alive {
            trace!(cell = %id, starved, "Cell died");
            self.kill_cell(id)?;
        }

        Ok(())
    }

    fn photosynthesize(&mut self, id: CellId) {
        if let Some(cell) = self.cells.get_mut(&id) {
            let light = self.sun.illumination(&cell.position);
            cell.energy += light * self.config.energy.photosynthesis_gain;
        }
    }

    /// Foot cells push themselves once they hold enough energy
    fn kick(&mut self, id: CellId) -> Result<()> {
        let Some(cell) = self.cells.get_mut(&id) else {
            return Ok(());
        };

        let strength = cell.growth.impulse as f32;
        if strength == 0.0 || cell.energy < cell.growth.activation as f32 + cell.cost() {
            return Ok(());
        }

        let impulse = Impulse::along(
            cell.growth.heading_radians(),
            strength * self.config.energy.foot_impulse_scale,
        );
        cell.energy -= strength * self.config.energy.foot_energy_per_impulse;

        self.geometry.apply_impulse(id, impulse)?;
        trace!(cell = %id, dx = impulse.dx, dy = impulse.dy, "Foot kicked");
        Ok(())
    }

    /// Breed cells spawn a new life once they can pay for its root
    fn breed(&mut self, id: CellId) -> Result<()> {
        let Some(cell) = self.cells.get(&id) else {
            return Ok(());
        };

        let green_growth = CellKind::Green.growth_energy();
        let grant = cell.growth.child_energy();
        if cell.energy <= grant + green_growth + cell.cost() {
            return Ok(());
        }

        if self.lives.len() >= self.config.world.max_population {
            trace!(
                cell = %id,
                population = self.lives.len(),
                max_population = self.config.world.max_population,
                "Reproduction refused: max population reached"
            );
            return Ok(());
        }

        let life_id = cell.life;
        let heading = cell.growth.heading_radians();
        let launch = cell.growth.impulse as f32 * self.config.energy.breed_impulse_scale;
        let spawn_at = cell.position.offset(heading, self.spawn_distance());

        let Some(parent) = self.lives.get(&life_id) else {
            return Ok(());
        };
        let genome = parent.genome.mutated(&self.mutator, &mut self.rng);
        let ancestry = Ancestry::offspring_of(parent);

        let offspring = self.append_life(genome, spawn_at, grant, ancestry)?;

        if let Some(cell) = self.cells.get_mut(&id) {
            cell.energy -= grant + green_growth;
        }
        if let Some(parent) = self.lives.get_mut(&life_id) {
            parent.record_offspring();
        }

        if launch > 0.0 {
            if let Some(root) = self.lives.get(&offspring).map(|life| life.root) {
                self.geometry.apply_impulse(root, Impulse::along(heading, launch))?;
            }
        }

        debug!(
            event = "reproduction",
            parent_life = %life_id,
            offspring_life = %offspring,
            breed_cell = %id,
            tick = self.tick,
            "Life reproduced"
        );
        Ok(())
    }

    /// Grow one child if the cell is eligible and its next instruction decodes
    fn grow(&mut self, id: CellId) -> Result<Option<CellId>> {
        let Some(cell) = self.cells.get(&id) else {
            return Ok(None);
        };

        if !cell.growth.can_grow_more() || cell.energy < cell.growth_threshold() {
            return Ok(None);
        }

        let life_id = cell.life;
        let threshold = cell.growth_threshold();
        let grant = cell.growth.child_energy();
        let (gene_position, growth_count) = (cell.growth.gene_position, cell.growth.growth_count);
        let max_growth_limit = self.config.genome.max_growth_limit;

        let decoded = self
            .lives
            .get(&life_id)
            .and_then(|life| life.genome.instruction(gene_position, growth_count))
            .and_then(|instruction| {
                let kind = CellKind::from_selector(*instruction.first()?)?;
                let context = GrowthContext::decode(instruction, max_growth_limit)?;
                Some((kind, context))
            });

        let Some((kind, context)) = decoded else {
            trace!(cell = %id, gene_position, growth_count, "No growth instruction");
            return Ok(None);
        };

        let child = self.attach_child(id, kind, context, grant)?;

        if let Some(cell) = self.cells.get_mut(&id) {
            cell.growth.record_growth();
            cell.energy -= threshold;
        }
        if let Some(life) = self.lives.get_mut(&life_id) {
            life.record_growth();
        }

        trace!(parent = %id, child = %child, kind = %kind, "Cell grew");
        Ok(Some(child))
    }

    /// Place a new child next to `parent_id`, join the two, and index it
    pub(crate) fn attach_child(
        &mut self,
        parent_id: CellId,
        kind: CellKind,
        growth: GrowthContext,
        energy: f32,
    ) -> Result<CellId> {
        let (life_id, parent_position) = self
            .cells
            .get(&parent_id)
            .map(|cell| (cell.life, cell.position))
            .ok_or_else(|| Error::NotFound(format!("parent {}", parent_id)))?;

        let mut angle = growth.rotation_radians();
        if self.config.world.phototropism {
            if let Some(bearing) = self.sun.bearing_from(&parent_position) {
                // Rotation 0 points straight at the light
                angle += bearing - FRAC_PI_2;
            }
        }
        let position = parent_position.offset(angle, self.spawn_distance());

        let child_id = self.allocate_cell_id();
        self.geometry.place_node(child_id, position)?;
        let joint = self
            .geometry
            .create_joint(parent_id, child_id, parent_position, position)?;

        let child = Cell::new(child_id, life_id, kind, energy, position, Some(parent_id), growth);
        self.cells.insert(child_id, child);
        if let Some(parent) = self.cells.get_mut(&parent_id) {
            parent.children.insert(child_id, joint);
        }
        if let Some(life) = self.lives.get_mut(&life_id) {
            life.add_cell(child_id);
        }

        Ok(child_id)
    }

    /// Equalize energy with each child, one pair at a time
    fn diffuse(&mut self, id: CellId) {
        let children: Vec<CellId> = match self.cells.get(&id) {
            Some(cell) => cell.children.keys().copied().collect(),
            None => return,
        };
        let move_cost = self.config.energy.move_cost;

        for child_id in children {
            let Some((child_energy, child_capacity)) = self
                .cells
                .get(&child_id)
                .map(|child| (child.energy, child.move_capacity()))
            else {
                continue;
            };
            let Some(cell) = self.cells.get(&id) else {
                return;
            };

            let Some((own, theirs)) = energy_transfer(
                cell.energy,
                child_energy,
                cell.move_capacity(),
                child_capacity,
                move_cost,
            ) else {
                continue;
            };

            if let Some(cell) = self.cells.get_mut(&id) {
                cell.energy = own;
            }
            if let Some(child) = self.cells.get_mut(&child_id) {
                child.energy = theirs;
            }
        }
    }

    /// Kill a cell together with its whole subtree, descendants first
    pub(crate) fn kill_cell(&mut self, id: CellId) -> Result<()> {
        let doomed = self.subtree(id);
        for cell_id in doomed.into_iter().rev() {
            self.release_cell(cell_id)?;
        }
        Ok(())
    }

    /// Detach a childless cell from its parent, the scene, and every index
    pub(crate) fn release_cell(&mut self, id: CellId) -> Result<()> {
        let attached = self
            .cells
            .get(&id)
            .map(|cell| cell.children.len())
            .ok_or_else(|| Error::InvalidState(format!("{} released twice", id)))?;

        // Refuse before touching any index so the tree stays intact
        if attached > 0 {
            return Err(Error::InvalidState(format!(
                "{} released with {} children attached",
                id, attached
            )));
        }

        let Some(cell) = self.cells.remove(&id) else {
            return Err(Error::InvalidState(format!("{} released twice", id)));
        };

        if let Some(parent_id) = cell.parent {
            let joint = self
                .cells
                .get_mut(&parent_id)
                .and_then(|parent| parent.children.remove(&id));
            if let Some(joint) = joint {
                self.geometry.remove_joint(joint)?;
            }
        }

        self.geometry.remove_node(id)?;

        if let Some(life) = self.lives.get_mut(&cell.life) {
            life.remove_cell(id);
        }
        self.cell_deaths += 1;
        Ok(())
    }
}
