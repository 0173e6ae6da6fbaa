//! Upright cylinder vs upright cylinder
//!
//! Two upright cylinders overlap exactly when their slabs overlap and their
//! discs overlap, so every hit is ambiguous between a side and a cap
//! contact and goes through the tie-break.

use super::{
    classify_ambiguous, cylinder_of, horizontal_normal, horizontal_normal_or, unexpected_area,
    vertical_sign, CollisionStrategy, ContactKind,
};
use crate::foundation::math::Vec3;
use crate::physics::body::RigidBody;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};

/// Strategy for two cylinders
#[derive(Debug, Clone, Copy, Default)]
pub struct CylinderCylinder;

impl CylinderCylinder {
    const NAME: &'static str = "cylinder-cylinder";
}

impl CollisionStrategy for CylinderCylinder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(
        &self,
        body1: &RigidBody,
        centre1: &Vec3,
        body2: &RigidBody,
        centre2: &Vec3,
        hit: Option<&mut HitResult>,
    ) -> bool {
        let c1 = cylinder_of(body1);
        let c2 = cylinder_of(body2);
        let (h1, h2) = (c1.half_height(), c2.half_height());
        let d = centre2 - centre1;

        if d.z.abs() >= h1 + h2 {
            return false;
        }
        let dxy = d.x.hypot(d.y);
        if dxy >= c1.radius + c2.radius {
            return false;
        }

        let Some(hit) = hit else {
            return true;
        };

        match classify_ambiguous(body1, body2) {
            ContactKind::Side => {
                let n = horizontal_normal(centre1, centre2, body1, body2);
                let share = dxy * c1.radius / (c1.radius + c2.radius);
                let low = (centre1.z - h1).max(centre2.z - h2);
                let high = (centre1.z + h1).min(centre2.z + h2);
                let mut pt = centre1 + n * share;
                pt.z = (low + high) * 0.5;
                hit.set(pt, n, HitArea::Side, HitArea::Side);
            }
            ContactKind::Cap => {
                let sign = vertical_sign(d.z, body1, body2);
                let share = c1.radius / (c1.radius + c2.radius);
                let mut pt = centre1 + d * share;
                pt.z = centre1.z + sign * h1;
                let (area1, area2) = if sign > 0.0 {
                    (HitArea::TopFace, HitArea::BottomFace)
                } else {
                    (HitArea::BottomFace, HitArea::TopFace)
                };
                hit.set(pt, Vec3::z() * sign, area1, area2);
            }
        }
        true
    }

    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        let n = match (hit.area1, hit.area2) {
            (HitArea::Side, HitArea::Side) => {
                horizontal_normal_or(&body1.next_pos, &body2.next_pos, &hit.hit_normal12)
            }
            (HitArea::TopFace, HitArea::BottomFace) | (HitArea::BottomFace, HitArea::TopFace) => {
                hit.hit_normal12
            }
            _ => unexpected_area(Self::NAME, hit),
        };
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        match (hit.area1, hit.area2) {
            (HitArea::Side, HitArea::Side)
            | (HitArea::TopFace, HitArea::BottomFace)
            | (HitArea::BottomFace, HitArea::TopFace) => {
                separate_along(body1, body2, &hit.hit_normal12);
            }
            _ => unexpected_area(Self::NAME, hit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyParams;
    use approx::assert_relative_eq;

    fn drum(name: &'static str, pos: Vec3, speed: Vec3) -> RigidBody {
        RigidBody::cylinder(name, 0.5, 1.0, BodyParams::new(1.0, 0.5, 0.0).with_gravity(false), pos)
            .unwrap()
            .with_speed(speed)
    }

    fn check(a: &RigidBody, b: &RigidBody) -> Option<HitResult> {
        let mut hit = HitResult::default();
        CylinderCylinder
            .check(a, &a.next_pos, b, &b.next_pos, Some(&mut hit))
            .then_some(hit)
    }

    #[test]
    fn test_side_by_side_collision() {
        let mut a = drum("a", Vec3::zeros(), Vec3::new(12.0, 0.0, 0.0));
        let mut b = drum("b", Vec3::new(1.1, 0.0, 0.2), Vec3::zeros());
        a.apply_forces();
        b.apply_forces();

        let hit = check(&a, &b).unwrap();
        assert_eq!((hit.area1, hit.area2), (HitArea::Side, HitArea::Side));
        assert_relative_eq!(hit.hit_normal12, Vec3::x(), epsilon = 1e-12);
        // Middle of the shared height band [-0.3, 0.5]
        assert_relative_eq!(hit.hit_pt.z, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_stacked_collision_from_below() {
        let mut a = drum("a", Vec3::zeros(), Vec3::new(0.0, 0.0, 12.0));
        let mut b = drum("b", Vec3::new(0.2, 0.0, 1.1), Vec3::zeros());
        a.apply_forces();
        b.apply_forces();

        let hit = check(&a, &b).unwrap();
        assert_eq!((hit.area1, hit.area2), (HitArea::TopFace, HitArea::BottomFace));
        assert_relative_eq!(hit.hit_normal12, Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(hit.hit_pt.z, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_cap_contact_seen_from_upper_body() {
        let mut a = drum("a", Vec3::new(0.0, 0.0, 1.1), Vec3::new(0.0, 0.0, -12.0));
        let mut b = drum("b", Vec3::zeros(), Vec3::zeros());
        a.apply_forces();
        b.apply_forces();

        let hit = check(&a, &b).unwrap();
        assert_eq!((hit.area1, hit.area2), (HitArea::BottomFace, HitArea::TopFace));
        assert_relative_eq!(hit.hit_normal12, -Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_separated_discs_miss() {
        let a = drum("a", Vec3::zeros(), Vec3::zeros());
        let b = drum("b", Vec3::new(0.8, 0.8, 0.0), Vec3::zeros());
        assert!(check(&a, &b).is_none());
    }

    #[test]
    fn test_side_bounce_swaps_speeds_when_elastic() {
        let params = BodyParams::new(1.0, 1.0, 0.0).with_gravity(false);
        let mut a = RigidBody::cylinder("a", 0.5, 1.0, params, Vec3::zeros())
            .unwrap()
            .with_speed(Vec3::new(6.0, 0.0, 0.0));
        let mut b = RigidBody::cylinder("b", 0.5, 1.0, params, Vec3::new(1.05, 0.0, 0.0))
            .unwrap()
            .with_speed(Vec3::new(-6.0, 0.0, 0.0));
        a.apply_forces();
        b.apply_forces();
        let hit = check(&a, &b).unwrap();

        CylinderCylinder.bounce(&mut a, &mut b, &hit);

        assert_relative_eq!(a.next_speed, Vec3::new(-6.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(b.next_speed, Vec3::new(6.0, 0.0, 0.0), epsilon = 1e-12);
    }
}
