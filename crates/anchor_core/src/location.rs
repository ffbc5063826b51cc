//! Block addresses.
//!
//! A [`Location`] names one block in one world. Equality and hashing are
//! by value, so two locations built independently for the same block are the
//! same registry key.

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub Uuid);

impl WorldId {
    /// Allocate a fresh random world identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A block position inside a specific world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The world the block belongs to.
    pub world: WorldId,
    /// Integer block coordinates.
    pub block: IVec3,
}

impl Location {
    /// Create a location from integer block coordinates.
    #[must_use]
    pub const fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self {
            world,
            block: IVec3::new(x, y, z),
        }
    }

    /// The block containing a fractional world position.
    #[must_use]
    pub fn containing(world: WorldId, position: DVec3) -> Self {
        Self {
            world,
            block: position.floor().as_ivec3(),
        }
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.block.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.block.y
    }

    #[must_use]
    pub const fn z(&self) -> i32 {
        self.block.z
    }

    /// The minimum corner of the block in world space.
    ///
    /// Proximity queries are centred here, matching how hosts report a
    /// block's own location.
    #[must_use]
    pub fn corner(&self) -> DVec3 {
        self.block.as_dvec3()
    }

    /// The point half a block in on x/z and one block above the corner.
    #[must_use]
    pub fn particle_origin(&self) -> DVec3 {
        self.corner() + DVec3::new(0.5, 1.0, 0.5)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{},{},{}",
            self.world, self.block.x, self.block.y, self.block.z
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_same_block_compares_equal() {
        let world = WorldId::new_random();
        let a = Location::new(world, 10, 64, -3);
        let b = Location::containing(world, DVec3::new(10.2, 64.9, -2.5));
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b), "hashing must be by value");
    }

    #[test]
    fn test_different_worlds_differ() {
        let a = Location::new(WorldId::new_random(), 0, 0, 0);
        let b = Location::new(WorldId::new_random(), 0, 0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_containing_floors_negative_coordinates() {
        let world = WorldId::new_random();
        let loc = Location::containing(world, DVec3::new(-0.5, 0.0, -1.01));
        assert_eq!(loc.block, IVec3::new(-1, 0, -2));
    }

    #[test]
    fn test_particle_origin_offset() {
        let loc = Location::new(WorldId::new_random(), 3, 70, -8);
        assert_eq!(loc.particle_origin(), DVec3::new(3.5, 71.0, -7.5));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let loc = Location::new(WorldId::new_random(), 1, 2, 3);
        let json = serde_json::to_string(&loc).unwrap();
        let restored: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(loc, restored);
    }
}
