//! Boundary to the geometry/physics collaborator.

use alife_core::{CellId, Error, Impulse, JointHandle, Position, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything the core asks of the scene/physics layer.
///
/// Nodes are identified by the [`CellId`] of the cell they represent. Removing
/// a node or joint that is not present is an error: the core never removes
/// anything twice.
pub trait Geometry {
    /// Put a new body for `node` into the scene at `position`
    fn place_node(&mut self, node: CellId, position: Position) -> Result<()>;

    /// Join two placed bodies, anchored at the given points
    fn create_joint(
        &mut self,
        body_a: CellId,
        body_b: CellId,
        anchor_a: Position,
        anchor_b: Position,
    ) -> Result<JointHandle>;

    fn remove_joint(&mut self, joint: JointHandle) -> Result<()>;

    /// Take `node` out of the scene. All its joints must already be removed.
    fn remove_node(&mut self, node: CellId) -> Result<()>;

    /// Push `node` (locomotion, offspring launch)
    fn apply_impulse(&mut self, node: CellId, impulse: Impulse) -> Result<()>;
}

/// Body state tracked by [`HeadlessGeometry`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub position: Position,
    pub velocity: Impulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointState {
    pub body_a: CellId,
    pub body_b: CellId,
    pub anchor_a: Position,
    pub anchor_b: Position,
}

/// Bookkeeping-only scene used when no physics engine is attached.
///
/// It enforces the node/joint lifecycle strictly so tests catch any double
/// removal or dangling joint.
#[derive(Debug, Default, Clone)]
pub struct HeadlessGeometry {
    nodes: HashMap<CellId, NodeState>,
    joints: HashMap<JointHandle, JointState>,
    next_joint: u64,
}

impl HeadlessGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node: CellId) -> Option<&NodeState> {
        self.nodes.get(&node)
    }

    pub fn joint(&self, joint: JointHandle) -> Option<&JointState> {
        self.joints.get(&joint)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.joints.is_empty()
    }

    /// Joints with `node` at either end
    pub fn joints_of(&self, node: CellId) -> impl Iterator<Item = (&JointHandle, &JointState)> {
        self.joints
            .iter()
            .filter(move |(_, j)| j.body_a == node || j.body_b == node)
    }
}

impl Geometry for HeadlessGeometry {
    fn place_node(&mut self, node: CellId, position: Position) -> Result<()> {
        if self.nodes.contains_key(&node) {
            return Err(Error::Geometry(format!("{} is already placed", node)));
        }
        self.nodes.insert(
            node,
            NodeState {
                position,
                velocity: Impulse::default(),
            },
        );
        Ok(())
    }

    fn create_joint(
        &mut self,
        body_a: CellId,
        body_b: CellId,
        anchor_a: Position,
        anchor_b: Position,
    ) -> Result<JointHandle> {
        for body in [body_a, body_b] {
            if !self.nodes.contains_key(&body) {
                return Err(Error::Geometry(format!("cannot join unplaced {}", body)));
            }
        }

        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(
            handle,
            JointState {
                body_a,
                body_b,
                anchor_a,
                anchor_b,
            },
        );
        Ok(handle)
    }

    fn remove_joint(&mut self, joint: JointHandle) -> Result<()> {
        self.joints
            .remove(&joint)
            .map(|_| ())
            .ok_or_else(|| Error::Geometry(format!("joint {} removed twice", joint.0)))
    }

    fn remove_node(&mut self, node: CellId) -> Result<()> {
        if let Some((handle, _)) = self.joints_of(node).next() {
            return Err(Error::Geometry(format!(
                "{} removed while joint {} still attached",
                node, handle.0
            )));
        }
        self.nodes
            .remove(&node)
            .map(|_| ())
            .ok_or_else(|| Error::Geometry(format!("{} removed twice", node)))
    }

    fn apply_impulse(&mut self, node: CellId, impulse: Impulse) -> Result<()> {
        let state = self
            .nodes
            .get_mut(&node)
            .ok_or_else(|| Error::Geometry(format!("impulse on unplaced {}", node)))?;
        state.velocity.dx += impulse.dx;
        state.velocity.dy += impulse.dy;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_and_joint_lifecycle() {
        let mut geo = HeadlessGeometry::new();
        let (a, b) = (CellId(1), CellId(2));

        geo.place_node(a, Position::ORIGIN).unwrap();
        geo.place_node(b, Position::new(0.0, 30.0)).unwrap();
        let joint = geo
            .create_joint(a, b, Position::ORIGIN, Position::new(0.0, 30.0))
            .unwrap();
        assert_eq!(geo.joint_count(), 1);
        assert_eq!(geo.joints_of(b).count(), 1);

        geo.remove_joint(joint).unwrap();
        geo.remove_node(b).unwrap();
        geo.remove_node(a).unwrap();
        assert!(geo.is_empty());
    }

    #[test]
    fn test_double_removal_is_an_error() {
        let mut geo = HeadlessGeometry::new();
        let (a, b) = (CellId(1), CellId(2));
        geo.place_node(a, Position::ORIGIN).unwrap();
        geo.place_node(b, Position::ORIGIN).unwrap();
        let joint = geo.create_joint(a, b, Position::ORIGIN, Position::ORIGIN).unwrap();

        geo.remove_joint(joint).unwrap();
        assert!(geo.remove_joint(joint).is_err());

        geo.remove_node(a).unwrap();
        assert!(geo.remove_node(a).is_err());
    }

    #[test]
    fn test_node_with_joint_cannot_be_removed() {
        let mut geo = HeadlessGeometry::new();
        let (a, b) = (CellId(1), CellId(2));
        geo.place_node(a, Position::ORIGIN).unwrap();
        geo.place_node(b, Position::ORIGIN).unwrap();
        geo.create_joint(a, b, Position::ORIGIN, Position::ORIGIN).unwrap();

        assert!(geo.remove_node(a).is_err());
        assert!(geo.remove_node(b).is_err());
    }

    #[test]
    fn test_placement_rules() {
        let mut geo = HeadlessGeometry::new();
        geo.place_node(CellId(1), Position::ORIGIN).unwrap();
        assert!(geo.place_node(CellId(1), Position::ORIGIN).is_err());
        assert!(geo
            .create_joint(CellId(1), CellId(9), Position::ORIGIN, Position::ORIGIN)
            .is_err());
    }

    #[test]
    fn test_impulse_accumulates() {
        let mut geo = HeadlessGeometry::new();
        geo.place_node(CellId(1), Position::ORIGIN).unwrap();
        geo.apply_impulse(CellId(1), Impulse::new(1.0, 2.0)).unwrap();
        geo.apply_impulse(CellId(1), Impulse::new(0.5, -1.0)).unwrap();

        let node = geo.node(CellId(1)).unwrap();
        assert_eq!(node.velocity, Impulse::new(1.5, 1.0));
        assert!(geo.apply_impulse(CellId(2), Impulse::default()).is_err());
    }
}
