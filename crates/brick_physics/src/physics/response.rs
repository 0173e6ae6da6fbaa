//! Shared collision response helpers
//!
//! Every strategy's `bounce` ends in [`bounce_along`] and every `separate`
//! ends in [`separate_along`]; the strategies only decide *which* normal
//! and which reference points apply to their pair.

use crate::foundation::math::{utils::decompose, Real, Vec3};
use super::body::RigidBody;
use super::constants::{EPSILON, HOPPING_PREVENTION_MAX_SPEED, TINY_GAP};

/// Minimum |n.z| for a contact normal to count as "one body resting on the other"
const SUPPORT_NORMAL_MIN_Z: Real = 0.7;

/// Friction of a contact: the mean of both coefficients
pub fn blended_friction(body1: &RigidBody, body2: &RigidBody) -> Real {
    (body1.friction() + body2.friction()) * 0.5
}

/// Restitution of a contact: the product of both elasticities
///
/// A brick's cuboid carries its material's elasticity, so this is also
/// `elasticity × material.elasticity` for body-vs-brick contacts.
pub fn combined_elasticity(body1: &RigidBody, body2: &RigidBody) -> Real {
    body1.elasticity() * body2.elasticity()
}

/// Damp the velocity components tangential to `n` for both bodies.
///
/// Each movable body's tangential velocity is pulled towards a common
/// tangential velocity by the blended friction factor. The common velocity
/// is the mass-weighted mean for two movable bodies, or the immovable
/// body's own tangential velocity, which is never altered.
pub fn apply_friction(body1: &mut RigidBody, body2: &mut RigidBody, n: &Vec3) {
    let friction = blended_friction(body1, body2);
    if friction <= 0.0 {
        return;
    }

    let (normal1, tangent1) = decompose(&body1.next_speed, n);
    let (normal2, tangent2) = decompose(&body2.next_speed, n);

    let common = match (body1.is_immovable(), body2.is_immovable()) {
        (true, true) => return,
        (true, false) => tangent1,
        (false, true) => tangent2,
        (false, false) => {
            let (m1, m2) = (body1.mass(), body2.mass());
            (tangent1 * m1 + tangent2 * m2) / (m1 + m2)
        }
    };

    let keep = 1.0 - friction;
    if !body1.is_immovable() {
        body1.next_speed = normal1 + common + (tangent1 - common) * keep;
    }
    if !body2.is_immovable() {
        body2.next_speed = normal2 + common + (tangent2 - common) * keep;
    }
}

/// Reflect the approaching normal component of the relative velocity.
///
/// The impulse is shared by inverse mass, so an immovable body takes none
/// of it. Returns `false` when the bodies are already separating along `n`.
pub fn apply_restitution(body1: &mut RigidBody, body2: &mut RigidBody, n: &Vec3) -> bool {
    let w1 = body1.inverse_mass();
    let w2 = body2.inverse_mass();
    if w1 + w2 <= 0.0 {
        return false;
    }

    let approach = (body2.next_speed - body1.next_speed).dot(n);
    if approach >= 0.0 {
        return false;
    }

    let e = combined_elasticity(body1, body2);
    let impulse = -(1.0 + e) * approach / (w1 + w2);
    body1.next_speed -= n * (impulse * w1);
    body2.next_speed += n * (impulse * w2);
    true
}

/// Pin a light body resting on a heavier one to its support's vertical speed.
///
/// Applies only to near-vertical normals, to an upper body under gravity
/// that is no heavier than the lower one, and only while the upper body's
/// downward speed relative to its support lies in
/// `(0, HOPPING_PREVENTION_MAX_SPEED)`. Returns whether the body was pinned.
pub fn prevent_hopping(body1: &mut RigidBody, body2: &mut RigidBody, n: &Vec3) -> bool {
    if n.z.abs() < SUPPORT_NORMAL_MIN_Z {
        return false;
    }
    let (upper, lower) = if n.z > 0.0 { (body2, body1) } else { (body1, body2) };

    if !upper.has_gravity() || upper.is_immovable() || upper.mass() > lower.mass() {
        return false;
    }

    let downward = lower.next_speed.z - upper.next_speed.z;
    if downward > 0.0 && downward < HOPPING_PREVENTION_MAX_SPEED {
        log::trace!(
            "{} resting on {}: pinning vertical speed (relative {:.5})",
            upper.name(),
            lower.name(),
            downward
        );
        upper.next_speed.z = lower.next_speed.z;
        return true;
    }
    false
}

/// Full velocity response along the unit normal `n` (body 1 → body 2):
/// friction, then either anti-hopping or restitution.
pub fn bounce_along(body1: &mut RigidBody, body2: &mut RigidBody, n: &Vec3) {
    if body1.is_immovable() && body2.is_immovable() {
        log::debug!("{} and {} are both immovable; no bounce", body1.name(), body2.name());
        return;
    }

    apply_friction(body1, body2, n);
    if !prevent_hopping(body1, body2, n) {
        apply_restitution(body1, body2, n);
    }
}

/// Movement along `n` needed to leave [`TINY_GAP`] between the two shapes
/// at their proposed positions. Non-positive when they are already apart.
pub fn required_separation(body1: &RigidBody, body2: &RigidBody, n: &Vec3) -> Real {
    let reach = body1.shape().support(n) + body2.shape().support(n);
    reach + TINY_GAP - (body2.next_pos - body1.next_pos).dot(n)
}

/// Push the proposed positions apart along `n` so the shapes end up
/// [`TINY_GAP`] apart.
///
/// Two movable bodies share the correction evenly regardless of mass. A
/// single movable body takes all of it. Two immovable bodies are left alone.
pub fn separate_along(body1: &mut RigidBody, body2: &mut RigidBody, n: &Vec3) {
    let required = required_separation(body1, body2, n);
    if required <= EPSILON {
        log::warn!(
            "separate called on {} and {} which are already apart (required {:.3e})",
            body1.name(),
            body2.name(),
            required
        );
        return;
    }

    match (body1.is_immovable(), body2.is_immovable()) {
        (false, false) => {
            let half = n * (required * 0.5);
            body1.next_pos -= half;
            body2.next_pos += half;
        }
        (false, true) => body1.next_pos -= n * required,
        (true, false) => body2.next_pos += n * required,
        (true, true) => {
            log::warn!(
                "cannot separate {} and {}: both are immovable",
                body1.name(),
                body2.name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyParams;
    use approx::assert_relative_eq;

    fn ball(name: &'static str, mass: f64, elasticity: f64, friction: f64, x: f64) -> RigidBody {
        RigidBody::sphere(
            name,
            0.5,
            BodyParams::new(mass, elasticity, friction).with_gravity(false),
            Vec3::new(x, 0.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_restitution_swaps_equal_masses() {
        let mut a = ball("a", 2.0, 1.0, 0.0, 0.0).with_speed(Vec3::new(1.0, 0.0, 0.0));
        let mut b = ball("b", 2.0, 1.0, 0.0, 0.9).with_speed(Vec3::new(-3.0, 0.0, 0.0));

        assert!(apply_restitution(&mut a, &mut b, &Vec3::x()));
        assert_relative_eq!(a.next_speed(), Vec3::new(-3.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(b.next_speed(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_restitution_ignores_separating_bodies() {
        let mut a = ball("a", 1.0, 1.0, 0.0, 0.0).with_speed(Vec3::new(-1.0, 0.0, 0.0));
        let mut b = ball("b", 1.0, 1.0, 0.0, 0.9).with_speed(Vec3::new(1.0, 0.0, 0.0));

        assert!(!apply_restitution(&mut a, &mut b, &Vec3::x()));
        assert_eq!(a.next_speed(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_friction_leaves_immovable_body_alone() {
        let mut wall = RigidBody::sphere(
            "wall",
            1.0,
            BodyParams::immovable(1.0, 1.0),
            Vec3::zeros(),
        )
        .unwrap()
        .with_speed(Vec3::new(0.0, 0.5, 0.0));
        let mut slider = ball("slider", 1.0, 1.0, 0.6, 1.4).with_speed(Vec3::new(-1.0, 2.0, 0.0));

        apply_friction(&mut wall, &mut slider, &Vec3::x());

        assert_eq!(wall.next_speed(), Vec3::new(0.0, 0.5, 0.0));
        // blended friction 0.8: tangential 2.0 pulled towards 0.5
        assert_relative_eq!(slider.next_speed(), Vec3::new(-1.0, 0.5 + 1.5 * 0.2, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_friction_conserves_tangential_momentum() {
        let mut a = ball("a", 1.0, 1.0, 0.5, 0.0).with_speed(Vec3::new(0.0, 3.0, 0.0));
        let mut b = ball("b", 3.0, 1.0, 0.5, 0.9).with_speed(Vec3::new(0.0, -1.0, 0.0));

        apply_friction(&mut a, &mut b, &Vec3::x());

        let momentum = a.next_speed() * a.mass() + b.next_speed() * b.mass();
        assert_relative_eq!(momentum, Vec3::zeros(), epsilon = 1e-12);
        assert!(a.next_speed().y < 3.0);
    }

    #[test]
    fn test_separate_splits_evenly_regardless_of_mass() {
        let mut light = ball("light", 1.0, 1.0, 0.0, 0.0);
        let mut heavy = ball("heavy", 100.0, 1.0, 0.0, 0.8);

        separate_along(&mut light, &mut heavy, &Vec3::x());

        let moved_light = -light.next_pos().x;
        let moved_heavy = heavy.next_pos().x - 0.8;
        assert_relative_eq!(moved_light, moved_heavy, epsilon = 1e-12);
        assert_relative_eq!(heavy.next_pos().x - light.next_pos().x, 1.0 + TINY_GAP, epsilon = 1e-12);
    }

    #[test]
    fn test_separate_is_noop_when_apart() {
        let mut a = ball("a", 1.0, 1.0, 0.0, 0.0);
        let mut b = ball("b", 1.0, 1.0, 0.0, 2.0);

        separate_along(&mut a, &mut b, &Vec3::x());

        assert_eq!(a.next_pos(), Vec3::zeros());
        assert_eq!(b.next_pos(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_separate_two_immovables_does_nothing() {
        let params = BodyParams::immovable(0.5, 0.5);
        let mut a = RigidBody::sphere("a", 0.5, params, Vec3::zeros()).unwrap();
        let mut b = RigidBody::sphere("b", 0.5, params, Vec3::new(0.5, 0.0, 0.0)).unwrap();

        separate_along(&mut a, &mut b, &Vec3::x());

        assert_eq!(a.next_pos(), Vec3::zeros());
        assert_eq!(b.next_pos(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_prevent_hopping_pins_slow_resting_body() {
        let mut floor = RigidBody::sphere("floor", 0.5, BodyParams::immovable(1.0, 0.5), Vec3::zeros())
            .unwrap();
        let mut ball = RigidBody::sphere("ball", 0.5, BodyParams::new(1.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 0.99))
            .unwrap()
            .with_speed(Vec3::new(0.0, 0.0, -0.2));

        assert!(prevent_hopping(&mut floor, &mut ball, &Vec3::z()));
        assert_eq!(ball.next_speed().z, 0.0);

        ball.set_speed(Vec3::new(0.0, 0.0, -5.0));
        assert!(!prevent_hopping(&mut floor, &mut ball, &Vec3::z()));
    }
}
