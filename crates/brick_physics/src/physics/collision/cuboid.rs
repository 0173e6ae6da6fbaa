//! Round bodies vs an axis-aligned cuboid
//!
//! Cuboids never move on their own: they stand for the derived geometry of
//! a brick. The contact is classified against one of the cuboid's six
//! faces, from where the body stood at the start of the tick: beside the
//! cuboid (sharing its height band, clear of its footprint) means a lateral
//! face, above or below it means the top or bottom face. When both or
//! neither held, the relative velocity decides as for the other upright
//! pairs. A lateral face is chosen among those the body's centre is, or
//! started, beyond, so a fast body whose proposed centre ends up inside
//! the footprint is still pushed back out the side it came from.
//!
//! [`round_vs_cuboid`] takes a predicate deciding whether a face normal
//! leads into open space. The plain strategies never call a face tentative;
//! the brick adapter answers it from the world's occupancy.

use std::cmp::Ordering;

use super::{
    cuboid_of, kind_from_relative_speed, unexpected_area, vertical_sign, CollisionStrategy,
    ContactKind,
};
use crate::foundation::math::{Real, Vec3};
use crate::physics::body::RigidBody;
use crate::physics::constants::EPSILON;
use crate::physics::hit::{HitArea, HitResult};
use crate::physics::response::{bounce_along, separate_along};
use crate::physics::shape::BodyShape;

/// Extents of the round body that matter against a box
#[derive(Debug, Clone, Copy)]
struct RoundExtents {
    radius: Real,
    half_height: Real,
    /// Half length of the vertical core segment; zero for spheres
    core: Real,
    top: HitArea,
    bottom: HitArea,
    side: HitArea,
}

impl RoundExtents {
    fn of(body: &RigidBody) -> Self {
        match body.shape() {
            BodyShape::Sphere(s) => Self {
                radius: s.radius,
                half_height: s.radius,
                core: 0.0,
                top: HitArea::Unspecified,
                bottom: HitArea::Unspecified,
                side: HitArea::Unspecified,
            },
            BodyShape::Cylinder(c) => Self {
                radius: c.radius,
                half_height: c.half_height(),
                core: c.half_height(),
                top: HitArea::TopFace,
                bottom: HitArea::BottomFace,
                side: HitArea::Side,
            },
            BodyShape::Capsule(c) => Self {
                radius: c.radius,
                half_height: c.half_height(),
                core: c.core_half_length(),
                top: HitArea::TopSphere,
                bottom: HitArea::BottomSphere,
                side: HitArea::Side,
            },
            BodyShape::Cuboid(_) => panic!(
                "cuboid '{}' cannot be the moving side of a cuboid contact",
                body.name()
            ),
        }
    }

    fn accepts(&self, area: HitArea) -> bool {
        area == self.top || area == self.bottom || area == self.side
    }
}

/// A classified contact against one cuboid face
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CuboidContact {
    /// Contact with the round body as body 1 and the cuboid as body 2
    pub hit: HitResult,
    /// Depth of the overlap along the face normal
    pub penetration: Real,
    /// The face borders open space and may be overridden
    pub tentative: bool,
}

struct Candidate {
    contact: CuboidContact,
    alignment: Real,
}

fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    a.contact
        .tentative
        .cmp(&b.contact.tentative)
        .then_with(|| {
            let (pa, pb) = (a.contact.penetration, b.contact.penetration);
            if (pa - pb).abs() <= EPSILON { Ordering::Equal } else { pa.total_cmp(&pb) }
        })
        .then_with(|| b.alignment.total_cmp(&a.alignment))
}

/// Round body centred at `centre` against the cuboid body centred at
/// `box_centre`. `is_tentative` receives the candidate's normal (round body
/// towards cuboid) and reports whether that face leads into open space.
pub(crate) fn round_vs_cuboid(
    body: &RigidBody,
    centre: &Vec3,
    cuboid: &RigidBody,
    box_centre: &Vec3,
    is_tentative: &dyn Fn(&Vec3) -> bool,
) -> Option<CuboidContact> {
    let round = RoundExtents::of(body);
    let h = cuboid_of(cuboid).half_extents();
    let min = box_centre - h;
    let max = box_centre + h;

    if (centre.z - box_centre.z).abs() >= round.half_height + h.z {
        return None;
    }
    let closest = Vec3::new(
        centre.x.clamp(min.x, max.x),
        centre.y.clamp(min.y, max.y),
        centre.z.clamp(min.z, max.z),
    );
    let dxy = (centre.x - closest.x).hypot(centre.y - closest.y);
    if dxy >= round.radius {
        return None;
    }
    if round.core < round.half_height {
        // Rounded ends: measure from the core segment, not the bounding box
        let gap_z = (min.z - (centre.z + round.core)).max((centre.z - round.core) - max.z).max(0.0);
        if dxy.hypot(gap_z) >= round.radius {
            return None;
        }
    }

    let alignment_of = |n: &Vec3| body.norm_dir_of_speed_before_collisions().map_or(0.0, |d| d.dot(n));

    // Where the body stood at the start of the tick decides between the
    // lateral faces and the top/bottom ones
    let start = body.pos();
    let start_min = cuboid.pos() - h;
    let start_max = cuboid.pos() + h;
    let was_level = (start.z - cuboid.pos().z).abs() < round.half_height + h.z;
    let start_xy = (start.x - start.x.clamp(start_min.x, start_max.x))
        .hypot(start.y - start.y.clamp(start_min.y, start_max.y));
    let was_over = start_xy < round.radius;

    let kind = match (was_level, was_over) {
        (true, false) => ContactKind::Side,
        (false, true) => ContactKind::Cap,
        _ => kind_from_relative_speed(body, cuboid),
    };

    if kind == ContactKind::Side {
        // (face, normal from the body towards the cuboid, distance of the
        // centre beyond the face plane, started beyond the plane)
        let faces = HitArea::LATERAL_FACES.map(|face| match face {
            HitArea::NorthFace => (face, -Vec3::y(), centre.y - max.y, start.y > start_max.y),
            HitArea::EastFace => (face, -Vec3::x(), centre.x - max.x, start.x > start_max.x),
            HitArea::SouthFace => (face, Vec3::y(), min.y - centre.y, start.y < start_min.y),
            _ => (face, Vec3::x(), min.x - centre.x, start.x < start_min.x),
        });
        // A centre that never left the footprint may exit through any face
        let any_beyond = faces.iter().any(|&(_, _, gap, started)| gap > 0.0 || started);

        let best = faces
            .iter()
            .filter(|&&(_, _, gap, started)| !any_beyond || gap > 0.0 || started)
            .map(|&(face, n, gap, _)| {
                let mut pt = closest;
                match face {
                    HitArea::NorthFace => pt.y = max.y,
                    HitArea::EastFace => pt.x = max.x,
                    HitArea::SouthFace => pt.y = min.y,
                    _ => pt.x = min.x,
                }
                Candidate {
                    contact: CuboidContact {
                        hit: HitResult::new(pt, n, round.side, face),
                        penetration: round.radius - gap,
                        tentative: is_tentative(&n),
                    },
                    alignment: alignment_of(&n),
                }
            })
            .min_by(rank);

        if let Some(best) = best {
            log::trace!(
                "{} vs {}: {:?} (penetration {:.5}, tentative {})",
                body.name(),
                cuboid.name(),
                best.contact.hit.area2,
                best.contact.penetration,
                best.contact.tentative
            );
            return Some(best.contact);
        }
    }

    let contact = if vertical_sign(box_centre.z - centre.z, body, cuboid) > 0.0 {
        let n = Vec3::z();
        CuboidContact {
            hit: HitResult::new(Vec3::new(closest.x, closest.y, min.z), n, round.top, HitArea::BottomFace),
            penetration: (centre.z + round.half_height) - min.z,
            tentative: is_tentative(&n),
        }
    } else {
        let n = -Vec3::z();
        CuboidContact {
            hit: HitResult::new(Vec3::new(closest.x, closest.y, max.z), n, round.bottom, HitArea::TopFace),
            penetration: max.z - (centre.z - round.half_height),
            tentative: is_tentative(&n),
        }
    };
    Some(contact)
}

/// Velocity response against a cuboid face
pub(crate) fn bounce_on_cuboid(
    name: &str,
    body: &mut RigidBody,
    cuboid: &mut RigidBody,
    hit: &HitResult,
) {
    validate(name, body, hit);
    bounce_along(body, cuboid, &hit.hit_normal12);
}

/// Positional correction against a cuboid face
pub(crate) fn separate_from_cuboid(
    name: &str,
    body: &mut RigidBody,
    cuboid: &mut RigidBody,
    hit: &HitResult,
) {
    validate(name, body, hit);
    separate_along(body, cuboid, &hit.hit_normal12);
}

fn validate(name: &str, body: &RigidBody, hit: &HitResult) {
    if hit.area2.face_normal().is_none() || !RoundExtents::of(body).accepts(hit.area1) {
        unexpected_area(name, hit);
    }
}

macro_rules! cuboid_strategy {
    ($(#[$doc:meta])* $ty:ident, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl CollisionStrategy for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn check(
                &self,
                body1: &RigidBody,
                centre1: &Vec3,
                body2: &RigidBody,
                centre2: &Vec3,
                hit: Option<&mut HitResult>,
            ) -> bool {
                let Some(contact) = round_vs_cuboid(body1, centre1, body2, centre2, &|_: &Vec3| false) else {
                    return false;
                };
                if let Some(hit) = hit {
                    *hit = contact.hit;
                }
                true
            }

            fn bounce(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
                bounce_on_cuboid($name, body1, body2, hit);
            }

            fn separate(&self, body1: &mut RigidBody, body2: &mut RigidBody, hit: &HitResult) {
                separate_from_cuboid($name, body1, body2, hit);
            }
        }
    };
}

cuboid_strategy!(
    /// Strategy for a sphere (body 1) and a cuboid (body 2)
    SphereCuboid,
    "sphere-cuboid"
);
cuboid_strategy!(
    /// Strategy for a cylinder (body 1) and a cuboid (body 2)
    CylinderCuboid,
    "cylinder-cuboid"
);
cuboid_strategy!(
    /// Strategy for a capsule (body 1) and a cuboid (body 2)
    CapsuleCuboid,
    "capsule-cuboid"
);
