//! Upright cylinder vs upright capsule
//!
//! While the capsule's core segment shares a height band with the cylinder
//! the pair behaves like two cylinders; otherwise only the nearer end
//! sphere can touch and the sphere–cylinder geometry applies.

use super::sphere_cylinder::round_vs_cylinder;
use super::{
    capsule_of, classify_ambiguous, cylinder_of, horizontal_normal, horizontal_normal_or,
    unexpected_area, vertical_sign, CollisionStrategy, ContactKind,
};
use crate::foundation::math::{utils::intervals_overlap, Vec3};
use crate::physics::body::RigidBody;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};

/// Strategy for a cylinder (body 1) and a capsule (body 2)
#[derive(Debug, Clone, Copy, Default)]
pub struct CylinderCapsule;

impl CylinderCapsule {
    const NAME: &'static str = "cylinder-capsule";
}

impl CollisionStrategy for CylinderCapsule {
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
        let cyl = cylinder_of(body1);
        let capsule = capsule_of(body2);
        let half = cyl.half_height();
        let core = capsule.core_half_length();
        let d = centre2 - centre1;

        if d.z.abs() >= half + capsule.half_height() {
            return false;
        }
        let dxy = d.x.hypot(d.y);
        if dxy >= cyl.radius + capsule.radius {
            return false;
        }

        let slab = (centre1.z - half, centre1.z + half);
        let shaft = (centre2.z - core, centre2.z + core);

        if !intervals_overlap(slab.0, slab.1, shaft.0, shaft.1) {
            let (sphere_centre, area2) = if d.z > 0.0 {
                (capsule.bottom_sphere_centre(centre2), HitArea::BottomSphere)
            } else {
                (capsule.top_sphere_centre(centre2), HitArea::TopSphere)
            };
            let Some(contact) =
                round_vs_cylinder(body2, &sphere_centre, capsule.radius, body1, centre1, &cyl)
            else {
                return false;
            };
            if let Some(hit) = hit {
                hit.set(contact.hit_pt, -contact.normal, contact.area, area2);
            }
            return true;
        }

        let Some(hit) = hit else {
            return true;
        };

        let kind = if dxy > cyl.radius {
            ContactKind::Side
        } else {
            classify_ambiguous(body1, body2)
        };
        match kind {
            ContactKind::Side => {
                let n = horizontal_normal(centre1, centre2, body1, body2);
                let mut pt = centre1 + n * cyl.radius;
                pt.z = (slab.0.max(shaft.0) + slab.1.min(shaft.1)) * 0.5;
                hit.set(pt, n, HitArea::Side, HitArea::Side);
            }
            ContactKind::Cap => {
                let sign = vertical_sign(d.z, body1, body2);
                let pt = Vec3::new(centre2.x, centre2.y, centre1.z + sign * half);
                let (area1, area2) = if sign > 0.0 {
                    (HitArea::TopFace, HitArea::BottomSphere)
                } else {
                    (HitArea::BottomFace, HitArea::TopSphere)
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
            (
                HitArea::TopFace | HitArea::BottomFace | HitArea::Side,
                HitArea::TopSphere | HitArea::BottomSphere,
            ) => hit.hit_normal12,
            _ => unexpected_area(Self::NAME, hit),
        };
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        match (hit.area1, hit.area2) {
            (HitArea::Side, HitArea::Side)
            | (
                HitArea::TopFace | HitArea::BottomFace | HitArea::Side,
                HitArea::TopSphere | HitArea::BottomSphere,
            ) => separate_along(body1, body2, &hit.hit_normal12),
            _ => unexpected_area(Self::NAME, hit),
        }
    }
}
