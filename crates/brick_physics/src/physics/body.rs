//! Rigid body model
//!
//! Every body carries two kinematic slots:
//! - `pos` / `speed`: the state at the start of the tick. Only
//!   [`RigidBody::move_body`] and the explicit overrides change them.
//! - `next_pos` / `next_speed`: the proposal for the end of the tick,
//!   written by [`RigidBody::apply_forces`] and then refined by the
//!   collision strategies.
//!
//! A tick therefore reads: `add_force`* → `apply_forces` → strategies →
//! `move_body`.

use std::borrow::Cow;

use crate::foundation::math::{Real, Vec3};
use super::constants::{
    G, LARGE_MASS, MAX_SPEED, MIN_MASS, SIGNIFICANT_DIRECTION, TICK_DURATION,
};
use super::error::BodyError;
use super::shape::{
    BodyShape, FixedCapsule, FixedCuboid, FixedCylinder, FixedSphere, ShapeKind,
};

/// Shape-invariant physical constants of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyParams {
    /// Mass; at or above [`LARGE_MASS`] the body is immovable
    pub mass: Real,
    /// Restitution coefficient in [0, 1]
    pub elasticity: Real,
    /// Tangential damping coefficient in [0, 1]
    pub friction: Real,
    /// Whether gravity acts on the body
    pub gravity: bool,
}

impl BodyParams {
    /// Create body parameters with gravity enabled
    pub fn new(mass: Real, elasticity: Real, friction: Real) -> Self {
        Self { mass, elasticity, friction, gravity: true }
    }

    /// Parameters of an immovable body
    pub fn immovable(elasticity: Real, friction: Real) -> Self {
        Self { mass: LARGE_MASS, elasticity, friction, gravity: false }
    }

    /// Enable or disable gravity
    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    fn validate(&self, name: &str) -> Result<(), BodyError> {
        if !(self.mass > MIN_MASS) {
            return Err(BodyError::InvalidMass {
                name: name.to_string(),
                mass: self.mass,
                min: MIN_MASS,
            });
        }
        for (field, value) in [("elasticity", self.elasticity), ("friction", self.friction)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BodyError::CoefficientOutOfRange {
                    name: name.to_string(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Default for BodyParams {
    fn default() -> Self {
        Self::new(1.0, 0.5, 0.5)
    }
}

/// A fixed-orientation rigid body: translates, never rotates
#[derive(Debug, Clone)]
pub struct RigidBody {
    name: Cow<'static, str>,
    shape: BodyShape,
    params: BodyParams,
    collision_radius: Real,

    pub(crate) pos: Vec3,
    pub(crate) speed: Vec3,
    pub(crate) next_pos: Vec3,
    pub(crate) next_speed: Vec3,
    resulting_force: Vec3,
    speed_before_collisions: Vec3,
    norm_dir_of_speed_before_collisions: Option<Vec3>,
}

impl RigidBody {
    /// Create a body at rest at `pos`
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        shape: BodyShape,
        params: BodyParams,
        pos: Vec3,
    ) -> Result<Self, BodyError> {
        let name = name.into();
        params.validate(&name)?;
        Ok(Self {
            collision_radius: shape.bounding_radius(),
            name,
            shape,
            params,
            pos,
            speed: Vec3::zeros(),
            next_pos: pos,
            next_speed: Vec3::zeros(),
            resulting_force: Vec3::zeros(),
            speed_before_collisions: Vec3::zeros(),
            norm_dir_of_speed_before_collisions: None,
        })
    }

    /// Create a sphere body
    pub fn sphere(
        name: impl Into<Cow<'static, str>>,
        radius: Real,
        params: BodyParams,
        pos: Vec3,
    ) -> Result<Self, BodyError> {
        Self::new(name, BodyShape::Sphere(FixedSphere::new(radius)?), params, pos)
    }

    /// Create an upright cylinder body
    pub fn cylinder(
        name: impl Into<Cow<'static, str>>,
        radius: Real,
        height: Real,
        params: BodyParams,
        pos: Vec3,
    ) -> Result<Self, BodyError> {
        Self::new(name, BodyShape::Cylinder(FixedCylinder::new(radius, height)?), params, pos)
    }

    /// Create an upright capsule body; fails unless `height > 2 * radius`
    pub fn capsule(
        name: impl Into<Cow<'static, str>>,
        radius: Real,
        height: Real,
        params: BodyParams,
        pos: Vec3,
    ) -> Result<Self, BodyError> {
        Self::new(name, BodyShape::Capsule(FixedCapsule::new(radius, height)?), params, pos)
    }

    /// Create an axis-aligned cuboid body
    pub fn cuboid(
        name: impl Into<Cow<'static, str>>,
        size: Vec3,
        params: BodyParams,
        pos: Vec3,
    ) -> Result<Self, BodyError> {
        Self::new(name, BodyShape::Cuboid(FixedCuboid::new(size)?), params, pos)
    }

    /// Set the initial velocity (builder form of [`Self::set_speed`])
    pub fn with_speed(mut self, speed: Vec3) -> Self {
        self.set_speed(speed);
        self
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape of the body
    pub fn shape(&self) -> &BodyShape {
        &self.shape
    }

    /// Dispatch key of the body's shape
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Mass
    pub fn mass(&self) -> Real {
        self.params.mass
    }

    /// Restitution coefficient
    pub fn elasticity(&self) -> Real {
        self.params.elasticity
    }

    /// Friction coefficient
    pub fn friction(&self) -> Real {
        self.params.friction
    }

    /// Whether gravity acts on this body
    pub fn has_gravity(&self) -> bool {
        self.params.gravity
    }

    /// Conservative bounding radius for broad-phase pruning
    pub fn collision_radius(&self) -> Real {
        self.collision_radius
    }

    /// True for bodies at or above [`LARGE_MASS`]
    pub fn is_immovable(&self) -> bool {
        self.params.mass >= LARGE_MASS
    }

    /// `1 / mass`, or zero for immovable bodies
    pub fn inverse_mass(&self) -> Real {
        if self.is_immovable() {
            0.0
        } else {
            1.0 / self.params.mass
        }
    }

    /// Position at the start of the tick
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    /// Velocity at the start of the tick
    pub fn speed(&self) -> Vec3 {
        self.speed
    }

    /// Proposed position for the end of the tick
    pub fn next_pos(&self) -> Vec3 {
        self.next_pos
    }

    /// Proposed velocity for the end of the tick
    pub fn next_speed(&self) -> Vec3 {
        self.next_speed
    }

    /// Force accumulated since the last integration
    pub fn resulting_force(&self) -> Vec3 {
        self.resulting_force
    }

    /// `next_speed` as it was right after integration, before any collision response
    pub fn speed_before_collisions(&self) -> Vec3 {
        self.speed_before_collisions
    }

    /// Unit direction of [`Self::speed_before_collisions`], `None` when the
    /// speed is too small for the direction to mean anything
    pub fn norm_dir_of_speed_before_collisions(&self) -> Option<Vec3> {
        self.norm_dir_of_speed_before_collisions
    }

    // ---------------------------------------------------------------------
    // Tick protocol
    // ---------------------------------------------------------------------

    /// Accumulate a force for the current tick
    pub fn add_force(&mut self, fx: Real, fy: Real, fz: Real) {
        self.resulting_force += Vec3::new(fx, fy, fz);
    }

    /// Integrate accumulated forces into `next_speed` and `next_pos`.
    ///
    /// Call exactly once per tick, after all forces have been added and
    /// before any collision check.
    pub fn apply_forces(&mut self) {
        if self.params.gravity {
            self.resulting_force.z -= G * self.params.mass;
        }

        // Immovable bodies keep whatever next_speed they already carry
        if !self.is_immovable() {
            let acceleration = self.resulting_force / self.params.mass;
            let speed = self.speed + acceleration * TICK_DURATION;
            self.next_speed = speed.map(|c| c.clamp(-MAX_SPEED, MAX_SPEED));
        }

        self.next_pos = self.pos + self.next_speed * TICK_DURATION;

        self.speed_before_collisions = self.next_speed;
        let magnitude = self.next_speed.norm();
        self.norm_dir_of_speed_before_collisions = if magnitude < SIGNIFICANT_DIRECTION {
            None
        } else {
            Some(self.next_speed / magnitude)
        };

        self.resulting_force = Vec3::zeros();

        log::trace!(
            "{}: integrated to next_pos {:?}, next_speed {:?}",
            self.name,
            self.next_pos,
            self.next_speed
        );
    }

    /// Commit the proposal: `pos ← next_pos`, `speed ← next_speed`.
    ///
    /// Call once per tick after every collision strategy has finished.
    pub fn move_body(&mut self) {
        self.pos = self.next_pos;
        self.speed = self.next_speed;
    }

    /// Zero all velocity and force state, keeping the position
    pub fn stop_all_motion(&mut self) {
        self.speed = Vec3::zeros();
        self.next_speed = Vec3::zeros();
        self.next_pos = self.pos;
        self.resulting_force = Vec3::zeros();
        self.speed_before_collisions = Vec3::zeros();
        self.norm_dir_of_speed_before_collisions = None;
    }

    /// Relocate the body, overriding both position slots
    pub fn teleport(&mut self, pos: Vec3) {
        self.pos = pos;
        self.next_pos = pos;
    }

    /// Override the velocity in both slots
    pub fn set_speed(&mut self, speed: Vec3) {
        self.speed = speed;
        self.next_speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scenario_sphere() -> RigidBody {
        RigidBody::sphere(
            "A",
            1.0,
            BodyParams::new(7.0, 0.5, 0.2).with_gravity(false),
            Vec3::new(4.0, 5.0, 6.0),
        )
        .unwrap()
        .with_speed(Vec3::new(1.5, 0.0, 0.0))
    }

    #[test]
    fn test_apply_forces_scenario() {
        let mut body = scenario_sphere();
        body.add_force(0.0, 330.0, -0.2);
        body.add_force(0.0, 3.0, 4.2);
        body.apply_forces();

        assert_relative_eq!(body.next_speed(), Vec3::new(1.5, 0.792_86, 0.009_52), epsilon = 1e-5);
        assert_relative_eq!(body.next_pos(), Vec3::new(4.025, 5.013_21, 6.000_16), epsilon = 1e-5);
        assert_eq!(body.resulting_force(), Vec3::zeros());
        // Start-of-tick state untouched until move_body
        assert_eq!(body.pos(), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(body.speed(), Vec3::new(1.5, 0.0, 0.0));

        body.move_body();
        assert_eq!(body.pos(), body.next_pos());
        assert_eq!(body.speed(), body.next_speed());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut body = RigidBody::sphere("g", 0.5, BodyParams::new(2.0, 0.5, 0.5), Vec3::zeros())
            .unwrap();
        body.apply_forces();

        assert_relative_eq!(body.next_speed().z, -G * TICK_DURATION, epsilon = 1e-12);
        assert_relative_eq!(body.next_pos().z, -G * TICK_DURATION * TICK_DURATION, epsilon = 1e-12);
    }

    #[test]
    fn test_speed_is_clamped_per_component() {
        let mut body = RigidBody::sphere(
            "fast",
            0.5,
            BodyParams::new(1.0, 0.5, 0.5).with_gravity(false),
            Vec3::zeros(),
        )
        .unwrap();
        body.add_force(1.0e6, -1.0e6, 10.0);
        body.apply_forces();

        assert_eq!(body.next_speed().x, MAX_SPEED);
        assert_eq!(body.next_speed().y, -MAX_SPEED);
        assert_relative_eq!(body.next_speed().z, 10.0 * TICK_DURATION, epsilon = 1e-12);
    }

    #[test]
    fn test_large_mass_ignores_forces() {
        let mut body = RigidBody::cylinder(
            "platform",
            1.0,
            0.5,
            BodyParams::immovable(0.5, 0.5).with_gravity(true),
            Vec3::zeros(),
        )
        .unwrap()
        .with_speed(Vec3::new(0.6, 0.0, 0.0));
        body.add_force(0.0, 500.0, 0.0);
        body.apply_forces();

        assert_eq!(body.next_speed(), Vec3::new(0.6, 0.0, 0.0));
        assert_relative_eq!(body.next_pos().x, 0.6 * TICK_DURATION, epsilon = 1e-12);
    }

    #[test]
    fn test_direction_significance_threshold() {
        let params = BodyParams::new(1.0, 0.5, 0.5).with_gravity(false);

        let mut slow = RigidBody::sphere("slow", 0.5, params, Vec3::zeros())
            .unwrap()
            .with_speed(Vec3::new(5e-5, 0.0, 0.0));
        slow.apply_forces();
        assert!(slow.norm_dir_of_speed_before_collisions().is_none());

        let mut fast = RigidBody::sphere("fast", 0.5, params, Vec3::zeros())
            .unwrap()
            .with_speed(Vec3::new(0.3, -0.4, 2.0));
        fast.apply_forces();
        let dir = fast.norm_dir_of_speed_before_collisions().unwrap();
        assert_relative_eq!(dir.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_stop_all_motion_keeps_position() {
        let mut body = scenario_sphere();
        body.add_force(3.0, 0.0, 0.0);
        body.apply_forces();
        body.move_body();
        let committed = body.pos();
        body.add_force(1.0, 1.0, 1.0);
        body.stop_all_motion();

        assert_eq!(body.pos(), committed);
        assert_eq!(body.next_pos(), committed);
        assert_eq!(body.speed(), Vec3::zeros());
        assert_eq!(body.next_speed(), Vec3::zeros());
        assert_eq!(body.resulting_force(), Vec3::zeros());
        assert!(body.norm_dir_of_speed_before_collisions().is_none());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let pos = Vec3::zeros();
        assert!(matches!(
            RigidBody::sphere("m", 1.0, BodyParams::new(0.0, 0.5, 0.5), pos),
            Err(BodyError::InvalidMass { .. })
        ));
        assert!(matches!(
            RigidBody::sphere("e", 1.0, BodyParams::new(1.0, 1.5, 0.5), pos),
            Err(BodyError::CoefficientOutOfRange { field: "elasticity", .. })
        ));
        assert!(matches!(
            RigidBody::capsule("c", 1.0, 2.0, BodyParams::default(), pos),
            Err(BodyError::CapsuleTooShort { .. })
        ));
    }
}
