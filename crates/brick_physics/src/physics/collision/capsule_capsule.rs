//! Upright capsule vs upright capsule

use super::{
    capsule_of, classify_ambiguous, horizontal_normal, horizontal_normal_or, normal_or,
    unexpected_area, vertical_sign, weighted_point, CollisionStrategy, ContactKind,
};
use crate::foundation::math::{utils::intervals_overlap, Vec3};
use crate::physics::body::RigidBody;
use crate::physics::constants::EPSILON;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};
use crate::physics::shape::FixedCapsule;

/// Strategy for two capsules
#[derive(Debug, Clone, Copy, Default)]
pub struct CapsuleCapsule;

impl CapsuleCapsule {
    const NAME: &'static str = "capsule-capsule";
}

fn end_sphere(capsule: &FixedCapsule, centre: &Vec3, area: HitArea) -> Option<Vec3> {
    match area {
        HitArea::TopSphere => Some(capsule.top_sphere_centre(centre)),
        HitArea::BottomSphere => Some(capsule.bottom_sphere_centre(centre)),
        _ => None,
    }
}

impl CollisionStrategy for CapsuleCapsule {
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
        let k1 = capsule_of(body1);
        let k2 = capsule_of(body2);
        let reach = k1.radius + k2.radius;
        let d = centre2 - centre1;

        if d.z.abs() >= k1.half_height() + k2.half_height() {
            return false;
        }
        let dxy = d.x.hypot(d.y);
        if dxy >= reach {
            return false;
        }

        let (core1, core2) = (k1.core_half_length(), k2.core_half_length());
        let shaft1 = (centre1.z - core1, centre1.z + core1);
        let shaft2 = (centre2.z - core2, centre2.z + core2);

        if intervals_overlap(shaft1.0, shaft1.1, shaft2.0, shaft2.1) {
            let Some(hit) = hit else {
                return true;
            };
            let kind = if dxy > EPSILON { ContactKind::Side } else { classify_ambiguous(body1, body2) };
            match kind {
                ContactKind::Side => {
                    let n = horizontal_normal(centre1, centre2, body1, body2);
                    let mut pt = centre1 + n * (dxy * k1.radius / reach);
                    pt.z = (shaft1.0.max(shaft2.0) + shaft1.1.min(shaft2.1)) * 0.5;
                    hit.set(pt, n, HitArea::Side, HitArea::Side);
                }
                ContactKind::Cap => {
                    let sign = vertical_sign(d.z, body1, body2);
                    let (area1, area2) = if sign > 0.0 {
                        (HitArea::TopSphere, HitArea::BottomSphere)
                    } else {
                        (HitArea::BottomSphere, HitArea::TopSphere)
                    };
                    let n = Vec3::z() * sign;
                    hit.set(centre1 + n * k1.half_height(), n, area1, area2);
                }
            }
            return true;
        }

        // Shafts apart vertically: only the facing end spheres can touch
        let (area1, area2) = if d.z > 0.0 {
            (HitArea::TopSphere, HitArea::BottomSphere)
        } else {
            (HitArea::BottomSphere, HitArea::TopSphere)
        };
        let (Some(p1), Some(p2)) = (end_sphere(&k1, centre1, area1), end_sphere(&k2, centre2, area2))
        else {
            return false;
        };
        let dist = (p2 - p1).norm();
        if dist >= reach {
            return false;
        }
        if let Some(hit) = hit {
            let n = normal_or(&p1, &p2, &(Vec3::z() * d.z.signum()));
            hit.set(weighted_point(&p1, k1.radius, &p2, k2.radius), n, area1, area2);
        }
        true
    }

    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        let n = match (hit.area1, hit.area2) {
            (HitArea::Side, HitArea::Side) => {
                horizontal_normal_or(&body1.next_pos, &body2.next_pos, &hit.hit_normal12)
            }
            (HitArea::TopSphere, HitArea::BottomSphere) | (HitArea::BottomSphere, HitArea::TopSphere) => {
                let k1 = capsule_of(body1);
                let k2 = capsule_of(body2);
                match (
                    end_sphere(&k1, &body1.next_pos, hit.area1),
                    end_sphere(&k2, &body2.next_pos, hit.area2),
                ) {
                    (Some(p1), Some(p2)) => normal_or(&p1, &p2, &hit.hit_normal12),
                    _ => unexpected_area(Self::NAME, hit),
                }
            }
            _ => unexpected_area(Self::NAME, hit),
        };
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        match (hit.area1, hit.area2) {
            (HitArea::Side, HitArea::Side)
            | (HitArea::TopSphere, HitArea::BottomSphere)
            | (HitArea::BottomSphere, HitArea::TopSphere) => {
                separate_along(body1, body2, &hit.hit_normal12);
            }
            _ => unexpected_area(Self::NAME, hit),
        }
    }
}
