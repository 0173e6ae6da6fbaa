//! Narrow-phase collision strategies
//!
//! One [`CollisionStrategy`] per unordered pair of shape kinds. A strategy
//! groups the three steps that must agree with each other:
//!
//! - `check`: does the pair overlap at the given candidate centres, and
//!   if so where, along which normal, and on which [`HitArea`]s
//! - `bounce`: velocity response written to `next_speed`
//! - `separate`: positional correction written to `next_pos`
//!
//! Strategies are stateless unit structs; all scratch values live on the
//! stack of each call.
//!
//! # Module Organization
//!
//! - [`sphere_sphere`], [`sphere_cylinder`], [`sphere_capsule`]
//! - [`cylinder_cylinder`], [`cylinder_capsule`], [`capsule_capsule`]
//! - [`cuboid`] - round bodies against a brick's derived cuboid

pub mod capsule_capsule;
pub mod cuboid;
pub mod cylinder_capsule;
pub mod cylinder_cylinder;
pub mod sphere_capsule;
pub mod sphere_cylinder;
pub mod sphere_sphere;

use rand::Rng;

use crate::foundation::math::{constants::TAU, utils::horizontal_unit, Real, Vec3};
use super::body::RigidBody;
use super::constants::EPSILON;
use super::hit::HitResult;
use super::shape::{BodyShape, FixedCapsule, FixedCuboid, FixedCylinder, FixedSphere, ShapeKind};

pub use capsule_capsule::CapsuleCapsule;
pub use cuboid::{CapsuleCuboid, CylinderCuboid, SphereCuboid};
pub use cylinder_capsule::CylinderCapsule;
pub use cylinder_cylinder::CylinderCylinder;
pub use sphere_capsule::SphereCapsule;
pub use sphere_cylinder::SphereCylinder;
pub use sphere_sphere::SphereSphere;

/// Check / Bounce / Separate for one pair of shape kinds.
///
/// Body 1 always has the kind that sorts first in [`ShapeKind`] order;
/// [`strategy_for`] reports when the caller must swap its arguments.
pub trait CollisionStrategy: Sync {
    /// Human-readable pair name for diagnostics
    fn name(&self) -> &'static str;

    /// Test the bodies for overlap with their centres placed at `centre1`
    /// and `centre2`. When they overlap and `hit` is given, it receives the
    /// contact point, the unit normal from body 1 to body 2 and both areas.
    fn check(
        &self,
        body1: &RigidBody,
        centre1: &Vec3,
        body2: &RigidBody,
        centre2: &Vec3,
        hit: Option<&mut HitResult>,
    ) -> bool;

    /// Velocity response for a hit found by [`Self::check`]
    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult);

    /// Positional correction for a hit found by [`Self::check`]
    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult);
}

/// Strategy for a pair of kinds, plus whether the bodies must be swapped
/// so that the first argument matches the strategy's body 1.
///
/// Cuboid-vs-cuboid has no strategy: cuboids only collide as bricks.
pub fn strategy_for(
    kind1: ShapeKind,
    kind2: ShapeKind,
) -> Option<(&'static dyn CollisionStrategy, bool)> {
    let swapped = kind1 > kind2;
    let (first, second) = if swapped { (kind2, kind1) } else { (kind1, kind2) };

    let strategy: &'static dyn CollisionStrategy = match (first, second) {
        (ShapeKind::Sphere, ShapeKind::Sphere) => &SphereSphere,
        (ShapeKind::Sphere, ShapeKind::Cylinder) => &SphereCylinder,
        (ShapeKind::Sphere, ShapeKind::Capsule) => &SphereCapsule,
        (ShapeKind::Sphere, ShapeKind::Cuboid) => &SphereCuboid,
        (ShapeKind::Cylinder, ShapeKind::Cylinder) => &CylinderCylinder,
        (ShapeKind::Cylinder, ShapeKind::Capsule) => &CylinderCapsule,
        (ShapeKind::Cylinder, ShapeKind::Cuboid) => &CylinderCuboid,
        (ShapeKind::Capsule, ShapeKind::Capsule) => &CapsuleCapsule,
        (ShapeKind::Capsule, ShapeKind::Cuboid) => &CapsuleCuboid,
        _ => return None,
    };
    Some((strategy, swapped))
}

/// Check two bodies at their proposed positions, in either argument order.
///
/// The returned hit is expressed for `(body1, body2)` as passed in.
pub fn check_pair(body1: &RigidBody, body2: &RigidBody) -> Option<HitResult> {
    let (strategy, swapped) = strategy_for(body1.kind(), body2.kind())?;
    let mut hit = HitResult::default();
    let found = if swapped {
        strategy.check(body2, &body2.next_pos, body1, &body1.next_pos, Some(&mut hit))
    } else {
        strategy.check(body1, &body1.next_pos, body2, &body2.next_pos, Some(&mut hit))
    };
    if !found {
        return None;
    }
    Some(if swapped { hit.flipped() } else { hit })
}

/// Bounce a hit returned by [`check_pair`] for the same argument order
pub fn bounce_pair(body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
    match strategy_for(body1.kind(), body2.kind()) {
        Some((strategy, false)) => strategy.bounce(body1, body2, hit),
        Some((strategy, true)) => strategy.bounce(body2, body1, &hit.flipped()),
        None => log::debug!("no strategy for {} / {}", body1.name(), body2.name()),
    }
}

/// Separate a hit returned by [`check_pair`] for the same argument order
pub fn separate_pair(body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
    match strategy_for(body1.kind(), body2.kind()) {
        Some((strategy, false)) => strategy.separate(body1, body2, hit),
        Some((strategy, true)) => strategy.separate(body2, body1, &hit.flipped()),
        None => log::debug!("no strategy for {} / {}", body1.name(), body2.name()),
    }
}

/// Check, then bounce and separate on a hit. Returns the hit, if any.
pub fn resolve_pair(body1: &mut RigidBody, body2: &mut RigidBody) -> Option<HitResult> {
    let hit = check_pair(body1, body2)?;
    bounce_pair(body1, body2, &hit);
    separate_pair(body1, body2, &hit);
    Some(hit)
}

// ---------------------------------------------------------------------------
// Helpers shared by the strategy triples
// ---------------------------------------------------------------------------

/// How an ambiguous contact between two upright shapes is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Lateral contact, horizontal normal
    Side,
    /// One body on top of the other, vertical normal
    Cap,
}

/// Decide between a side and a top/bottom contact when the proposed
/// positions overlap on both axes.
///
/// Looks at the start-of-tick positions first: if only the vertical extents
/// overlapped the bodies were side by side, if only the horizontal extents
/// overlapped one was above the other. Otherwise the relative velocity
/// before collisions decides, with horizontal winning ties.
pub fn classify_ambiguous(body1: &RigidBody, body2: &RigidBody) -> ContactKind {
    let ext1 = body1.shape().half_extents();
    let ext2 = body2.shape().half_extents();
    let d = body2.pos - body1.pos;

    let vertical = d.z.abs() < ext1.z + ext2.z;
    let horizontal = d.x.hypot(d.y) < horizontal_reach(body1) + horizontal_reach(body2);

    let kind = match (vertical, horizontal) {
        (true, false) => ContactKind::Side,
        (false, true) => ContactKind::Cap,
        _ => kind_from_relative_speed(body1, body2),
    };
    log::debug!(
        "ambiguous contact {} / {} (was vertical {}, horizontal {}) -> {:?}",
        body1.name(),
        body2.name(),
        vertical,
        horizontal,
        kind
    );
    kind
}

/// Side when the relative velocity before collisions is at least as
/// horizontal as it is vertical, cap otherwise
pub fn kind_from_relative_speed(body1: &RigidBody, body2: &RigidBody) -> ContactKind {
    let relative = body2.speed_before_collisions() - body1.speed_before_collisions();
    if relative.x.hypot(relative.y) >= relative.z.abs() {
        ContactKind::Side
    } else {
        ContactKind::Cap
    }
}

/// Horizontal radius of a round shape, half-diagonal of a cuboid footprint
fn horizontal_reach(body: &RigidBody) -> Real {
    let ext = body.shape().half_extents();
    match body.shape() {
        BodyShape::Cuboid(_) => ext.x.hypot(ext.y),
        _ => ext.x,
    }
}

/// `+1` when body 2 is above body 1, `-1` when below.
///
/// `dz` is the centre offset from 1 to 2; when it is essentially zero the
/// relative vertical velocity says which one came from above.
pub fn vertical_sign(dz: Real, body1: &RigidBody, body2: &RigidBody) -> Real {
    if dz > EPSILON {
        1.0
    } else if dz < -EPSILON {
        -1.0
    } else {
        let relative = body2.speed_before_collisions().z - body1.speed_before_collisions().z;
        if relative <= 0.0 { 1.0 } else { -1.0 }
    }
}

/// Unit horizontal normal from `from` to `to`, or a random one (with a
/// warning) when the two are horizontally coincident.
pub fn horizontal_normal(from: &Vec3, to: &Vec3, body1: &RigidBody, body2: &RigidBody) -> Vec3 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dxy = dx.hypot(dy);
    if dxy > EPSILON {
        Vec3::new(dx / dxy, dy / dxy, 0.0)
    } else {
        random_horizontal_normal(body1, body2)
    }
}

/// Horizontal unit normal at a uniformly random angle
pub fn random_horizontal_normal(body1: &RigidBody, body2: &RigidBody) -> Vec3 {
    let angle = rand::thread_rng().gen_range(0.0..TAU);
    log::warn!(
        "{} and {} are horizontally coincident; using random normal angle {:.4}",
        body1.name(),
        body2.name(),
        angle
    );
    horizontal_unit(angle)
}

/// Normal from `from` to `to`, or `fallback` when the points coincide
pub fn normal_or(from: &Vec3, to: &Vec3, fallback: &Vec3) -> Vec3 {
    let d = to - from;
    let len = d.norm();
    if len > EPSILON { d / len } else { *fallback }
}

/// Horizontal normal between two reference points, or the horizontal part
/// of `fallback` when they are coincident in xy
pub fn horizontal_normal_or(from: &Vec3, to: &Vec3, fallback: &Vec3) -> Vec3 {
    let flat = Vec3::new(to.x - from.x, to.y - from.y, 0.0);
    let len = flat.norm();
    if len > EPSILON {
        return flat / len;
    }
    let flat_fallback = Vec3::new(fallback.x, fallback.y, 0.0);
    let len = flat_fallback.norm();
    if len > EPSILON { flat_fallback / len } else { *fallback }
}

/// Point between two round reference points, split by their radii
pub fn weighted_point(p1: &Vec3, r1: Real, p2: &Vec3, r2: Real) -> Vec3 {
    p1 + (p2 - p1) * (r1 / (r1 + r2))
}

/// Abort on a hit area the strategy cannot have produced
#[track_caller]
pub fn unexpected_area(strategy: &str, hit: &HitResult) -> ! {
    panic!(
        "{strategy}: unexpected hit areas {:?} / {:?}; check and response are out of sync",
        hit.area1, hit.area2
    )
}

#[track_caller]
fn wrong_shape(expected: &str, body: &RigidBody) -> ! {
    panic!("expected a {expected} body, '{}' is a {:?}", body.name(), body.kind())
}

/// Sphere extents of `body`; panics on another shape
#[track_caller]
pub fn sphere_of(body: &RigidBody) -> FixedSphere {
    match body.shape() {
        BodyShape::Sphere(s) => *s,
        _ => wrong_shape("sphere", body),
    }
}

/// Cylinder extents of `body`; panics on another shape
#[track_caller]
pub fn cylinder_of(body: &RigidBody) -> FixedCylinder {
    match body.shape() {
        BodyShape::Cylinder(c) => *c,
        _ => wrong_shape("cylinder", body),
    }
}

/// Capsule extents of `body`; panics on another shape
#[track_caller]
pub fn capsule_of(body: &RigidBody) -> FixedCapsule {
    match body.shape() {
        BodyShape::Capsule(c) => *c,
        _ => wrong_shape("capsule", body),
    }
}

/// Cuboid extents of `body`; panics on another shape
#[track_caller]
pub fn cuboid_of(body: &RigidBody) -> FixedCuboid {
    match body.shape() {
        BodyShape::Cuboid(c) => *c,
        _ => wrong_shape("cuboid", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyParams;

    fn cylinder(name: &'static str, pos: Vec3, speed: Vec3) -> RigidBody {
        RigidBody::cylinder(name, 0.5, 1.0, BodyParams::new(1.0, 0.5, 0.5).with_gravity(false), pos)
            .unwrap()
            .with_speed(speed)
    }

    #[test]
    fn test_dispatch_covers_every_supported_pair() {
        use ShapeKind::*;
        let kinds = [Sphere, Cylinder, Capsule, Cuboid];
        for &a in &kinds {
            for &b in &kinds {
                let found = strategy_for(a, b);
                if a == Cuboid && b == Cuboid {
                    assert!(found.is_none());
                } else {
                    let (_, swapped) = found.unwrap();
                    assert_eq!(swapped, a > b);
                }
            }
        }
        assert_eq!(strategy_for(Capsule, Sphere).unwrap().0.name(), "sphere-capsule");
    }

    #[test]
    fn test_classify_side_by_side_start() {
        let mut a = cylinder("a", Vec3::zeros(), Vec3::new(1.0, 0.0, -3.0));
        let mut b = cylinder("b", Vec3::new(1.2, 0.0, 0.5), Vec3::zeros());
        a.apply_forces();
        b.apply_forces();
        // vertical extents overlapped at the start, horizontal did not
        assert_eq!(classify_ambiguous(&a, &b), ContactKind::Side);
    }

    #[test]
    fn test_classify_stacked_start() {
        let mut a = cylinder("a", Vec3::zeros(), Vec3::zeros());
        let mut b = cylinder("b", Vec3::new(0.3, 0.0, 1.2), Vec3::new(5.0, 0.0, -1.0));
        a.apply_forces();
        b.apply_forces();
        assert_eq!(classify_ambiguous(&a, &b), ContactKind::Cap);
    }

    #[test]
    fn test_classify_falls_back_to_relative_speed() {
        // Neither extent overlapped at the start: diagonal approach
        let mut a = cylinder("a", Vec3::zeros(), Vec3::zeros());
        let mut b = cylinder("b", Vec3::new(1.1, 0.0, 1.1), Vec3::new(-1.0, 0.0, -3.0));
        a.apply_forces();
        b.apply_forces();
        assert_eq!(classify_ambiguous(&a, &b), ContactKind::Cap);

        let mut c = cylinder("c", Vec3::new(1.1, 0.0, 1.1), Vec3::new(-2.0, 0.0, -2.0));
        c.apply_forces();
        // Equal components: side wins the tie
        assert_eq!(classify_ambiguous(&a, &c), ContactKind::Side);
    }

    #[test]
    fn test_horizontal_normal_degenerate_is_random_unit() {
        let a = cylinder("a", Vec3::zeros(), Vec3::zeros());
        let b = cylinder("b", Vec3::zeros(), Vec3::zeros());
        let n = horizontal_normal(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 0.3), &a, &b);

        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert_eq!(n.z, 0.0);
    }
}
