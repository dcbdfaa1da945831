//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_3, TAU};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a line of descent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageId(pub Uuid);

impl LineageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Version 4 id from caller-drawn bytes, for seeded runs
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

impl Default for LineageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a life (organism). Issued by the world in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LifeId(pub u64);

impl fmt::Display for LifeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "life-{}", self.0)
    }
}

/// Unique identifier for a cell. Doubles as the geometry node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell-{}", self.0)
    }
}

/// Handle for a parent/child joint issued by the geometry collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointHandle(pub u64);

/// 2D position in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Bearing from `self` to `other` in radians, measured from the +x axis
    pub fn radian_to(&self, other: &Position) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Point `length` away along `angle`, where angle 0 points up (+y) and
    /// positive angles turn counter-clockwise.
    pub fn offset(&self, angle: f32, length: f32) -> Self {
        Self {
            x: self.x - length * angle.sin(),
            y: self.y + length * angle.cos(),
        }
    }
}

/// Velocity change requested from the physics collaborator
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Impulse {
    pub dx: f32,
    pub dy: f32,
}

impl Impulse {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Impulse of `magnitude` along `angle` (same convention as [`Position::offset`])
    pub fn along(angle: f32, magnitude: f32) -> Self {
        Self {
            dx: -magnitude * angle.sin(),
            dy: magnitude * angle.cos(),
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

/// Convert a genome rotation step (0..6) into radians
pub fn rotation_to_radians(rotation: u8) -> f32 {
    FRAC_PI_3 * rotation as f32
}

/// Convert a genome heading byte into radians over a full turn
pub fn heading_to_radians(heading: u8) -> f32 {
    heading as f32 / 256.0 * TAU
}

/// RGB color used by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The closed set of cell behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Green,
    Foot,
    Tank,
    Breed,
}

impl CellKind {
    /// Kinds a cell can grow, in genome selector order
    pub const GROWABLE: [CellKind; 5] = [
        CellKind::Wall,
        CellKind::Green,
        CellKind::Breed,
        CellKind::Tank,
        CellKind::Foot,
    ];

    /// Select a child kind from the first byte of a growth instruction.
    /// Returns `None` for a remainder with no mapped kind.
    pub fn from_selector(selector: u8) -> Option<CellKind> {
        match selector as usize % Self::GROWABLE.len() {
            0 => Some(CellKind::Wall),
            1 => Some(CellKind::Green),
            2 => Some(CellKind::Breed),
            3 => Some(CellKind::Tank),
            4 => Some(CellKind::Foot),
            _ => None,
        }
    }

    pub fn all() -> [CellKind; 5] {
        [
            CellKind::Wall,
            CellKind::Green,
            CellKind::Foot,
            CellKind::Tank,
            CellKind::Breed,
        ]
    }

    /// Upkeep subtracted every tick
    pub fn cost(&self) -> f32 {
        match self {
            CellKind::Wall => 0.5,
            CellKind::Green => 1.0,
            CellKind::Foot => 2.0,
            CellKind::Tank => 1.0,
            CellKind::Breed => 2.0,
        }
    }

    /// Energy consumed by a growth event, on top of the child's starting energy
    pub fn growth_energy(&self) -> f32 {
        match self {
            CellKind::Wall => 10.0,
            CellKind::Green => 10.0,
            CellKind::Foot => 15.0,
            CellKind::Tank => 20.0,
            CellKind::Breed => 20.0,
        }
    }

    /// Upper bound on energy pushed to or pulled from a neighbour per diffusion step
    pub fn move_capacity(&self) -> f32 {
        match self {
            CellKind::Wall => 2.0,
            CellKind::Green => 5.0,
            CellKind::Foot => 5.0,
            CellKind::Tank => 20.0,
            CellKind::Breed => 10.0,
        }
    }

    pub fn base_color(&self) -> Color {
        match self {
            CellKind::Wall => Color::rgb(128, 128, 128),
            CellKind::Green => Color::rgb(60, 180, 75),
            CellKind::Foot => Color::rgb(0, 130, 200),
            CellKind::Tank => Color::rgb(255, 225, 25),
            CellKind::Breed => Color::rgb(240, 50, 230),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            CellKind::Wall => 0,
            CellKind::Green => 1,
            CellKind::Foot => 2,
            CellKind::Tank => 3,
            CellKind::Breed => 4,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellKind::Wall => "wall",
            CellKind::Green => "green",
            CellKind::Foot => "foot",
            CellKind::Tank => "tank",
            CellKind::Breed => "breed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_order() {
        assert_eq!(CellKind::from_selector(0), Some(CellKind::Wall));
        assert_eq!(CellKind::from_selector(1), Some(CellKind::Green));
        assert_eq!(CellKind::from_selector(2), Some(CellKind::Breed));
        assert_eq!(CellKind::from_selector(3), Some(CellKind::Tank));
        assert_eq!(CellKind::from_selector(4), Some(CellKind::Foot));
        assert_eq!(CellKind::from_selector(9), Some(CellKind::Foot));
        assert_eq!(CellKind::from_selector(255), Some(CellKind::Wall));
    }

    #[test]
    fn test_kind_indices_are_unique() {
        let mut seen = [false; 5];
        for kind in CellKind::all() {
            assert!(!seen[kind.index()]);
            seen[kind.index()] = true;
        }
    }

    #[test]
    fn test_offset_points_up_at_zero() {
        let pos = Position::new(1.0, 1.0).offset(0.0, 30.0);
        assert!((pos.x - 1.0).abs() < 1e-4);
        assert!((pos.y - 31.0).abs() < 1e-4);

        // A quarter turn counter-clockwise points along -x
        let pos = Position::ORIGIN.offset(std::f32::consts::FRAC_PI_2, 10.0);
        assert!((pos.x + 10.0).abs() < 1e-4);
        assert!(pos.y.abs() < 1e-4);
    }

    #[test]
    fn test_distance_and_bearing() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
        assert!((a.radian_to(&Position::new(0.0, 2.0)) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_impulse_along_matches_offset() {
        let angle = 1.2;
        let impulse = Impulse::along(angle, 4.0);
        let pos = Position::ORIGIN.offset(angle, 4.0);
        assert!((impulse.dx - pos.x).abs() < 1e-5);
        assert!((impulse.dy - pos.y).abs() < 1e-5);
        assert!((impulse.magnitude() - 4.0).abs() < 1e-5);
    }
}
