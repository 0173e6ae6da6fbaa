//! # Brick Physics
//!
//! Collision detection and response for fixed-orientation rigid bodies in a
//! world built from unit bricks.
//!
//! ## Features
//!
//! - **Two-slot tick protocol**: forces integrate into a proposed state that
//!   collision strategies refine before it is committed
//! - **Pairwise strategies**: Check / Bounce / Separate for every pair of
//!   sphere, upright cylinder and upright capsule, plus each of them against
//!   a brick's cuboid
//! - **Seam-aware bricks**: faces that open onto empty cells yield to firm
//!   contacts, so bodies slide along walls and floors made of many cells
//! - **Reference driver**: [`physics::PhysicsWorld`] runs whole ticks
//!
//! ## Quick Start
//!
//! ```rust
//! use brick_physics::prelude::*;
//!
//! fn main() -> Result<(), BodyError> {
//!     let mut bricks = GridWorld::new();
//!     bricks.fill_box(CellCoord::new(-4, -4, 0), CellCoord::new(3, 3, 0), Brick::full(BrickMaterial::default()));
//!
//!     let config = SimulationConfig::default();
//!     config.init_logging();
//!
//!     let mut world = PhysicsWorld::new(config).with_bricks(bricks);
//!     let ball = world.add_body(RigidBody::sphere("ball", 0.25, BodyParams::new(1.0, 0.5, 0.5), Vec3::new(0.0, 0.0, 3.0))?);
//!
//!     for _ in 0..240 {
//!         world.step();
//!     }
//!     assert!(world.body(ball).is_some_and(|b| b.pos().z > 1.2));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SimulationConfig},
        foundation::math::{Real, Vec3},
        physics::{
            BodyError, BodyParams, BodyShape, Brick, BrickAdapter, BrickMaterial, BrickWorld,
            CellCoord, CollisionStrategy, GridWorld, HitArea, HitResult, PhysicsWorld, RigidBody,
            ShapeKind,
        },
    };
}
