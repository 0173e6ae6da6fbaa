//! Sphere vs upright capsule

use super::{
    capsule_of, classify_ambiguous, horizontal_normal, horizontal_normal_or, normal_or, sphere_of,
    unexpected_area, vertical_sign, weighted_point, CollisionStrategy, ContactKind,
};
use crate::foundation::math::Vec3;
use crate::physics::body::RigidBody;
use crate::physics::constants::EPSILON;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};

/// Strategy for a sphere (body 1) and a capsule (body 2)
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereCapsule;

impl SphereCapsule {
    const NAME: &'static str = "sphere-capsule";
}

impl CollisionStrategy for SphereCapsule {
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
        let rs = sphere_of(body1).radius;
        let capsule = capsule_of(body2);
        let reach = rs + capsule.radius;
        let d = centre2 - centre1;

        if d.z.abs() >= rs + capsule.half_height() || d.x.hypot(d.y) >= reach {
            return false;
        }

        // Closest point of the capsule's core segment to the sphere centre
        let core = capsule.core_half_length();
        let along = centre1.z - centre2.z;
        let closest = Vec3::new(centre2.x, centre2.y, centre2.z + along.clamp(-core, core));
        let to_core = closest - centre1;
        let dist = to_core.norm();
        if dist >= reach {
            return false;
        }

        let Some(hit) = hit else {
            return true;
        };

        if dist > EPSILON {
            let area = if along > core {
                HitArea::TopSphere
            } else if along < -core {
                HitArea::BottomSphere
            } else {
                HitArea::Side
            };
            let n = to_core / dist;
            hit.set(
                weighted_point(centre1, rs, &closest, capsule.radius),
                n,
                HitArea::Unspecified,
                area,
            );
            return true;
        }

        // The sphere centre sits on the core
        let (n, area) = match classify_ambiguous(body1, body2) {
            ContactKind::Side => (horizontal_normal(centre1, centre2, body1, body2), HitArea::Side),
            ContactKind::Cap => {
                let sign = vertical_sign(d.z, body1, body2);
                let area = if sign > 0.0 { HitArea::BottomSphere } else { HitArea::TopSphere };
                (Vec3::z() * sign, area)
            }
        };
        hit.set(centre1 + n * rs, n, HitArea::Unspecified, area);
        true
    }

    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        let capsule = capsule_of(body2);
        let n = match (hit.area1, hit.area2) {
            (HitArea::Unspecified, HitArea::Side) => {
                horizontal_normal_or(&body1.next_pos, &body2.next_pos, &hit.hit_normal12)
            }
            (HitArea::Unspecified, HitArea::TopSphere) => normal_or(
                &body1.next_pos,
                &capsule.top_sphere_centre(&body2.next_pos),
                &hit.hit_normal12,
            ),
            (HitArea::Unspecified, HitArea::BottomSphere) => normal_or(
                &body1.next_pos,
                &capsule.bottom_sphere_centre(&body2.next_pos),
                &hit.hit_normal12,
            ),
            _ => unexpected_area(Self::NAME, hit),
        };
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        match (hit.area1, hit.area2) {
            (HitArea::Unspecified, HitArea::Side | HitArea::TopSphere | HitArea::BottomSphere) => {
                separate_along(body1, body2, &hit.hit_normal12);
            }
            _ => unexpected_area(Self::NAME, hit),
        }
    }
}
