//! Sphere vs upright cylinder
//!
//! The geometry lives in [`round_vs_cylinder`] so the cylinder–capsule
//! strategy can reuse it for a capsule's end spheres.

use super::{
    classify_ambiguous, cylinder_of, horizontal_normal, horizontal_normal_or, sphere_of,
    unexpected_area, vertical_sign, CollisionStrategy, ContactKind,
};
use crate::foundation::math::{Real, Vec3};
use crate::physics::body::RigidBody;
use crate::physics::constants::EPSILON;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};
use crate::physics::shape::FixedCylinder;

/// Contact between a round end (sphere or capsule cap) and a cylinder
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoundCylinderContact {
    /// Contact point
    pub hit_pt: Vec3,
    /// Unit normal from the round shape towards the cylinder
    pub normal: Vec3,
    /// Region of the cylinder that was struck
    pub area: HitArea,
}

/// Sphere of radius `radius` centred at `centre` against the cylinder
/// `cyl` centred at `cyl_centre`.
///
/// `round` and `cyl_body` are the owning bodies; they feed the ambiguous
/// contact tie-break and the diagnostics.
pub(crate) fn round_vs_cylinder(
    round: &RigidBody,
    centre: &Vec3,
    radius: Real,
    cyl_body: &RigidBody,
    cyl_centre: &Vec3,
    cyl: &FixedCylinder,
) -> Option<RoundCylinderContact> {
    let half = cyl.half_height();
    let d = cyl_centre - centre;
    if d.z.abs() >= half + radius {
        return None;
    }
    let dxy = d.x.hypot(d.y);
    if dxy >= cyl.radius + radius {
        return None;
    }

    let in_side = d.z.abs() < half;
    let in_cap = dxy <= cyl.radius;

    let side = |n: Vec3| RoundCylinderContact {
        hit_pt: Vec3::new(cyl_centre.x, cyl_centre.y, centre.z) - n * cyl.radius,
        normal: n,
        area: HitArea::Side,
    };
    let cap = |sign: Real| RoundCylinderContact {
        hit_pt: Vec3::new(centre.x, centre.y, cyl_centre.z - sign * half),
        normal: Vec3::z() * sign,
        area: if sign > 0.0 { HitArea::BottomFace } else { HitArea::TopFace },
    };

    let contact = match (in_side, in_cap) {
        (true, false) => side(Vec3::new(d.x / dxy, d.y / dxy, 0.0)),
        (false, true) => cap(d.z.signum()),
        (false, false) => {
            // Beyond both the side and the caps: the rim is closest
            let outward = Vec3::new(-d.x / dxy, -d.y / dxy, 0.0);
            let rim = Vec3::new(
                cyl_centre.x + outward.x * cyl.radius,
                cyl_centre.y + outward.y * cyl.radius,
                cyl_centre.z + (centre.z - cyl_centre.z).clamp(-half, half),
            );
            let to_rim = rim - centre;
            let dist = to_rim.norm();
            if dist >= radius {
                return None;
            }
            let normal = if dist > EPSILON { to_rim / dist } else { d.normalize() };
            let area = if normal.z.abs() >= normal.x.hypot(normal.y) {
                if centre.z > cyl_centre.z { HitArea::TopFace } else { HitArea::BottomFace }
            } else {
                HitArea::Side
            };
            RoundCylinderContact { hit_pt: rim, normal, area }
        }
        (true, true) => match classify_ambiguous(round, cyl_body) {
            ContactKind::Side => side(horizontal_normal(centre, cyl_centre, round, cyl_body)),
            ContactKind::Cap => cap(vertical_sign(d.z, round, cyl_body)),
        },
    };
    Some(contact)
}

/// Strategy for a sphere (body 1) and a cylinder (body 2)
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereCylinder;

impl SphereCylinder {
    const NAME: &'static str = "sphere-cylinder";

    fn validate(hit: &HitResult) {
        let known = matches!(
            hit.area2,
            HitArea::Side | HitArea::TopFace | HitArea::BottomFace
        );
        if hit.area1 != HitArea::Unspecified || !known {
            unexpected_area(Self::NAME, hit);
        }
    }
}

impl CollisionStrategy for SphereCylinder {
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
        let sphere = sphere_of(body1);
        let cyl = cylinder_of(body2);
        let Some(contact) = round_vs_cylinder(body1, centre1, sphere.radius, body2, centre2, &cyl)
        else {
            return false;
        };
        if let Some(hit) = hit {
            hit.set(contact.hit_pt, contact.normal, HitArea::Unspecified, contact.area);
        }
        true
    }

    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        Self::validate(hit);
        let n = match hit.area2 {
            HitArea::Side if hit.hit_normal12.z.abs() <= EPSILON => {
                horizontal_normal_or(&body1.next_pos, &body2.next_pos, &hit.hit_normal12)
            }
            _ => hit.hit_normal12,
        };
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        Self::validate(hit);
        separate_along(body1, body2, &hit.hit_normal12);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyParams;
    use crate::physics::response::required_separation;
    use approx::assert_relative_eq;

    fn ball(pos: Vec3, speed: Vec3) -> RigidBody {
        RigidBody::sphere("ball", 0.3, BodyParams::new(1.0, 0.5, 0.0).with_gravity(false), pos)
            .unwrap()
            .with_speed(speed)
    }

    fn post() -> RigidBody {
        RigidBody::cylinder("post", 0.5, 1.0, BodyParams::immovable(0.5, 0.0), Vec3::zeros())
            .unwrap()
    }

    fn check(a: &RigidBody, b: &RigidBody) -> Option<HitResult> {
        let mut hit = HitResult::default();
        SphereCylinder
            .check(a, &a.next_pos, b, &b.next_pos, Some(&mut hit))
            .then_some(hit)
    }

    #[test]
    fn test_side_contact() {
        let a = ball(Vec3::new(-0.7, 0.0, 0.2), Vec3::zeros());
        let hit = check(&a, &post()).unwrap();

        assert_eq!(hit.area2, HitArea::Side);
        assert_relative_eq!(hit.hit_normal12, Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(hit.hit_pt, Vec3::new(-0.5, 0.0, 0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_cap_contact_from_above() {
        let a = ball(Vec3::new(0.2, 0.1, 0.7), Vec3::zeros());
        let hit = check(&a, &post()).unwrap();

        assert_eq!(hit.area2, HitArea::TopFace);
        assert_relative_eq!(hit.hit_normal12, -Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(hit.hit_pt.z, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rim_contact_and_corner_miss() {
        let near = ball(Vec3::new(0.7, 0.0, 0.7), Vec3::zeros());
        let hit = check(&near, &post()).unwrap();
        assert_eq!(hit.area2, HitArea::TopFace);
        assert_relative_eq!(hit.hit_pt, Vec3::new(0.5, 0.0, 0.5), epsilon = 1e-12);

        // Bounding boxes overlap but the sphere clears the rim
        let far = ball(Vec3::new(0.75, 0.0, 0.75), Vec3::zeros());
        assert!(check(&far, &post()).is_none());
    }

    #[test]
    fn test_centre_inside_uses_tie_break() {
        // Started beside the post, moving sideways into it
        let mut a = ball(Vec3::new(-0.9, 0.0, 0.0), Vec3::new(48.0, 0.0, 0.0));
        a.apply_forces();
        let hit = check(&a, &post()).unwrap();

        assert_eq!(hit.area2, HitArea::Side);
        assert_relative_eq!(hit.hit_normal12, Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_bounce_then_separate_on_side() {
        let mut a = ball(Vec3::new(-0.7, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let mut b = post();
        a.apply_forces();
        b.apply_forces();
        let hit = check(&a, &b).unwrap();

        SphereCylinder.bounce(&mut a, &mut b, &hit);
        SphereCylinder.separate(&mut a, &mut b, &hit);

        assert_relative_eq!(a.next_speed, Vec3::new(-0.5, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(b.next_pos, Vec3::zeros());
        assert!(required_separation(&a, &b, &hit.hit_normal12) < 1e-12);
    }
}
