//! Reference tick driver
//!
//! Runs the per-tick protocol over a set of bodies and a brick world:
//!
//! 1. `apply_forces` on every body
//! 2. up to `resolution_passes` passes of Check → Bounce → Separate over
//!    every body pair and every body's brick contacts, stopping early once
//!    a pass finds nothing
//! 3. `move_body` on every body
//!
//! Pair pruning is a plain bounding-radius test over all pairs; spatial
//! partitioning is left to callers with large worlds.

use std::collections::HashSet;

use slotmap::{new_key_type, SlotMap};

use crate::config::SimulationConfig;
use crate::foundation::math::Vec3;
use super::body::RigidBody;
use super::brick::{BrickAdapter, GridWorld};
use super::collision::resolve_pair;

new_key_type! {
    /// Handle of a body owned by a [`PhysicsWorld`]
    pub struct BodyKey;
}

/// Two bodies in contact during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Body with the smaller key
    pub body_a: BodyKey,
    /// Body with the larger key
    pub body_b: BodyKey,
}

impl CollisionPair {
    /// Create a new collision pair (always stores the smaller key first for consistency)
    pub fn new(body_a: BodyKey, body_b: BodyKey) -> Self {
        if body_a < body_b {
            Self { body_a, body_b }
        } else {
            Self { body_a: body_b, body_b: body_a }
        }
    }
}

/// Counters for one [`PhysicsWorld::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Resolution passes actually run
    pub passes: u32,
    /// Body pairs that survived the bounding-radius prune
    pub pair_checks: usize,
    /// Body-vs-body hits resolved, summed over passes
    pub body_hits: usize,
    /// Body-vs-brick hits resolved, summed over passes
    pub brick_hits: usize,
}

/// Owns bodies and bricks and advances them one tick at a time
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    bricks: GridWorld,
    config: SimulationConfig,

    /// Pairs in contact during the latest step
    current_pairs: HashSet<CollisionPair>,
    /// Pairs in contact during the step before
    previous_pairs: HashSet<CollisionPair>,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: SimulationConfig) -> Self {
        if let Err(err) = config.validate() {
            log::warn!("{err}; clamping resolution passes");
        }
        let config = SimulationConfig {
            resolution_passes: config.resolution_passes.clamp(1, 32),
            ..config
        };
        Self {
            bodies: SlotMap::with_key(),
            bricks: GridWorld::new(),
            config,
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
        }
    }

    /// Replace the brick world
    pub fn with_bricks(mut self, bricks: GridWorld) -> Self {
        self.bricks = bricks;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The brick world
    pub fn bricks(&self) -> &GridWorld {
        &self.bricks
    }

    /// Mutable access to the brick world, e.g. to dig or build between ticks
    pub fn bricks_mut(&mut self) -> &mut GridWorld {
        &mut self.bricks
    }

    /// Take ownership of a body
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        log::debug!("adding body {}", body.name());
        self.bodies.insert(body)
    }

    /// Remove a body, forgetting its contacts
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.current_pairs.retain(|p| p.body_a != key && p.body_b != key);
        self.previous_pairs.retain(|p| p.body_a != key && p.body_b != key);
        self.bodies.remove(key)
    }

    /// Borrow a body
    pub fn body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Borrow a body mutably, e.g. to add forces or teleport it
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Accumulate a force on a body for the next step; false for a stale key
    pub fn add_force(&mut self, key: BodyKey, force: Vec3) -> bool {
        match self.bodies.get_mut(key) {
            Some(body) => {
                body.add_force(force.x, force.y, force.z);
                true
            }
            None => false,
        }
    }

    /// Get the number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all bodies
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &RigidBody)> {
        self.bodies.iter()
    }

    /// Cheap bounding-sphere test on the proposed positions
    fn may_touch(a: &RigidBody, b: &RigidBody) -> bool {
        if a.is_immovable() && b.is_immovable() {
            return false;
        }
        (b.next_pos - a.next_pos).norm() < a.collision_radius() + b.collision_radius()
    }

    /// Advance every body by one tick
    pub fn step(&mut self) -> StepStats {
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let mut stats = StepStats::default();

        for body in self.bodies.values_mut() {
            body.apply_forces();
        }

        let keys: Vec<BodyKey> = self.bodies.keys().collect();
        for pass in 0..self.config.resolution_passes {
            stats.passes = pass + 1;
            let mut hits = 0;

            for (i, &a) in keys.iter().enumerate() {
                for &b in &keys[i + 1..] {
                    let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([a, b]) else {
                        continue;
                    };
                    if !Self::may_touch(body_a, body_b) {
                        continue;
                    }
                    stats.pair_checks += 1;
                    if resolve_pair(body_a, body_b).is_some() {
                        hits += 1;
                        stats.body_hits += 1;
                        self.current_pairs.insert(CollisionPair::new(a, b));
                    }
                }
            }

            if self.config.resolve_bricks && !self.bricks.is_empty() {
                for body in self.bodies.values_mut() {
                    let brick_hits = BrickAdapter::resolve(body, &self.bricks).len();
                    hits += brick_hits;
                    stats.brick_hits += brick_hits;
                }
            }

            if hits == 0 {
                break;
            }
        }

        for body in self.bodies.values_mut() {
            body.move_body();
        }

        log::trace!("step: {:?}", stats);
        stats
    }

    /// Get pairs that came into contact in the latest step
    pub fn get_collision_entered(&self) -> Vec<CollisionPair> {
        self.current_pairs
            .difference(&self.previous_pairs)
            .copied()
            .collect()
    }

    /// Get pairs that stopped touching in the latest step
    pub fn get_collision_exited(&self) -> Vec<CollisionPair> {
        self.previous_pairs
            .difference(&self.current_pairs)
            .copied()
            .collect()
    }

    /// Get all pairs in contact during the latest step
    pub fn get_current_collisions(&self) -> &HashSet<CollisionPair> {
        &self.current_pairs
    }

    /// Remove every body and forget all contacts; bricks stay
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.current_pairs.clear();
        self.previous_pairs.clear();
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyParams;
    use crate::physics::brick::{Brick, BrickMaterial, CellCoord};
    use approx::assert_relative_eq;

    fn ball(name: &'static str, pos: Vec3, speed: Vec3) -> RigidBody {
        RigidBody::sphere(name, 0.5, BodyParams::new(1.0, 1.0, 0.0).with_gravity(false), pos)
            .unwrap()
            .with_speed(speed)
    }

    #[test]
    fn test_head_on_collision_enters_then_exits() {
        let mut world = PhysicsWorld::default();
        let a = world.add_body(ball("a", Vec3::new(-0.52, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)));
        let b = world.add_body(ball("b", Vec3::new(0.52, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)));

        let stats = world.step();
        assert_eq!(stats.body_hits, 1);
        assert_eq!(world.get_collision_entered(), vec![CollisionPair::new(a, b)]);
        assert_relative_eq!(world.body(a).unwrap().speed(), Vec3::new(-3.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(world.body(b).unwrap().speed(), Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-9);

        let stats = world.step();
        assert_eq!(stats.body_hits, 0);
        assert_eq!(world.get_collision_exited(), vec![CollisionPair::new(b, a)]);
        assert!(world.get_current_collisions().is_empty());
    }

    #[test]
    fn test_distant_bodies_are_pruned() {
        let mut world = PhysicsWorld::default();
        world.add_body(ball("a", Vec3::zeros(), Vec3::zeros()));
        world.add_body(ball("b", Vec3::new(5.0, 0.0, 0.0), Vec3::zeros()));

        let stats = world.step();
        assert_eq!(stats.pair_checks, 0);
        assert_eq!(stats.passes, 1);
    }

    #[test]
    fn test_body_comes_to_rest_on_bricks() {
        let mut bricks = GridWorld::new();
        bricks.fill_box(CellCoord::new(-2, -2, 0), CellCoord::new(1, 1, 0), Brick::full(BrickMaterial::new(0.3, 0.8)));
        let mut world = PhysicsWorld::default().with_bricks(bricks);
        let key = world.add_body(
            RigidBody::cylinder("crate", 0.4, 0.6, BodyParams::new(2.0, 0.3, 0.8), Vec3::new(0.0, 0.0, 1.5))
                .unwrap(),
        );

        for _ in 0..180 {
            world.step();
        }

        let body = world.body(key).unwrap();
        assert!(body.pos().z >= 1.3);
        assert!(body.pos().z < 1.31);
        assert!(body.speed().z.abs() < 1e-9);
    }

    #[test]
    fn test_bricks_can_be_disabled() {
        let mut bricks = GridWorld::new();
        bricks.set_brick(CellCoord::new(0, 0, 0), Brick::full(BrickMaterial::default()));
        let config = SimulationConfig::new().with_bricks(false);
        let mut world = PhysicsWorld::new(config).with_bricks(bricks);
        let falling = RigidBody::sphere("a", 0.5, BodyParams::default(), Vec3::new(0.5, 0.5, 1.4)).unwrap();
        let key = world.add_body(falling);

        let stats = world.step();
        assert_eq!(stats.brick_hits, 0);
        assert!(world.body(key).unwrap().pos().z < 1.4);
    }

    #[test]
    fn test_remove_body_forgets_contacts() {
        let mut world = PhysicsWorld::default();
        let a = world.add_body(ball("a", Vec3::zeros(), Vec3::zeros()));
        let b = world.add_body(ball("b", Vec3::new(0.9, 0.0, 0.0), Vec3::zeros()));
        world.step();
        assert_eq!(world.get_current_collisions().len(), 1);

        assert!(world.remove_body(b).is_some());
        assert!(world.get_current_collisions().is_empty());
        assert!(world.add_force(a, Vec3::x()));
        assert!(!world.add_force(b, Vec3::x()));
    }
}
