//! Sphere vs sphere

use super::{normal_or, random_horizontal_normal, sphere_of, unexpected_area, CollisionStrategy};
use crate::foundation::math::Vec3;
use crate::physics::body::RigidBody;
use crate::physics::constants::EPSILON;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};

/// Strategy for two spheres
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereSphere;

impl SphereSphere {
    const NAME: &'static str = "sphere-sphere";

    fn validate(hit: &HitResult) {
        if hit.area1 != HitArea::Unspecified || hit.area2 != HitArea::Unspecified {
            unexpected_area(Self::NAME, hit);
        }
    }
}

impl CollisionStrategy for SphereSphere {
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
        let r1 = sphere_of(body1).radius;
        let r2 = sphere_of(body2).radius;
        let reach = r1 + r2;
        let d = centre2 - centre1;

        if d.z.abs() >= reach || d.x.hypot(d.y) >= reach {
            return false;
        }
        let dist = d.norm();
        if dist >= reach {
            return false;
        }

        if let Some(hit) = hit {
            let n = if dist > EPSILON { d / dist } else { random_horizontal_normal(body1, body2) };
            hit.set(
                centre1 + n * (dist * r1 / reach),
                n,
                HitArea::Unspecified,
                HitArea::Unspecified,
            );
        }
        true
    }

    fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        Self::validate(hit);
        let n = normal_or(&body1.next_pos, &body2.next_pos, &hit.hit_normal12);
        bounce_along(body1, body2, &n);
    }

    fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
        Self::validate(hit);
        separate_along(body1, body2, &hit.hit_normal12);
    }
}
