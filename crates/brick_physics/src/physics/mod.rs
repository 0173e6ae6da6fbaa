//! Physics module for collision detection and response
//!
//! Fixed-orientation rigid bodies (sphere, upright cylinder, upright
//! capsule, axis-aligned cuboid) integrated with a two-slot state per tick,
//! with one Check/Bounce/Separate strategy per pair of shapes and a
//! neighbour-aware adapter for the static brick world.

pub mod body;
pub mod brick;
pub mod collision;
pub mod collision_system;
pub mod constants;
pub mod error;
pub mod hit;
pub mod response;
pub mod shape;

pub use body::{BodyParams, RigidBody};
pub use brick::{
    Brick, BrickAdapter, BrickGeometry, BrickHit, BrickMaterial, BrickWorld, CellCoord, GridWorld,
};
pub use collision::{
    bounce_pair, check_pair, resolve_pair, separate_pair, strategy_for, CollisionStrategy,
};
pub use collision_system::{BodyKey, CollisionPair, PhysicsWorld, StepStats};
pub use error::BodyError;
pub use hit::{HitArea, HitResult};
pub use shape::{BodyShape, FixedCapsule, FixedCuboid, FixedCylinder, FixedSphere, ShapeKind};
