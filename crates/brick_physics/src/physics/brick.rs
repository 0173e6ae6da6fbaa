//! Brick world adapter
//!
//! The static world is a grid of unit cells; a solid cell holds a [`Brick`]
//! whose derived geometry is an axis-aligned cuboid. Moving bodies collide
//! with that cuboid through the same geometry as the cuboid strategies,
//! plus one piece of neighbour awareness: a face is *tentative* when the
//! cell next to the body, in the direction of the face, is open. The body's
//! cell is the one holding its proposed centre, or its start-of-tick cell
//! when the proposed centre is buried in a solid cell. A flat
//! wall or floor is made of many cells, and without this a body sliding
//! along it would catch on the seams between them.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Real, Vec3, Vector3};
use super::body::{BodyParams, RigidBody};
use super::collision::cuboid::{bounce_on_cuboid, round_vs_cuboid, separate_from_cuboid};
use super::constants::EPSILON;
use super::hit::HitResult;
use super::shape::ShapeKind;

/// Integer coordinate of a unit world cell
pub type CellCoord = Vector3<i32>;

const BRICK_CONTACT: &str = "body-brick";

/// Cell containing `point`; cell `c` spans `[c, c + 1)` on every axis
pub fn cell_of(point: &Vec3) -> CellCoord {
    point.map(|c| c.floor() as i32)
}

/// Centre of a cell
pub fn cell_centre(cell: &CellCoord) -> Vec3 {
    cell.map(|c| Real::from(c) + 0.5)
}

/// Surface response of a brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickMaterial {
    /// Restitution coefficient in [0, 1]
    pub elasticity: Real,
    /// Friction coefficient in [0, 1]
    pub friction: Real,
}

impl BrickMaterial {
    /// Create a material
    pub fn new(elasticity: Real, friction: Real) -> Self {
        Self { elasticity, friction }
    }
}

impl Default for BrickMaterial {
    fn default() -> Self {
        Self::new(0.2, 0.6)
    }
}

/// Content of a solid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Size of the brick's cuboid, at most one cell per axis
    pub size: Vec3,
    /// Offset of the cuboid's centre from the cell centre
    pub offset: Vec3,
    /// Surface material
    pub material: BrickMaterial,
}

impl Brick {
    /// A brick filling its whole cell
    pub fn full(material: BrickMaterial) -> Self {
        Self { size: Vec3::repeat(1.0), offset: Vec3::zeros(), material }
    }

    /// A full-footprint brick of the given height resting on the cell floor
    pub fn slab(height: Real, material: BrickMaterial) -> Self {
        Self {
            size: Vec3::new(1.0, 1.0, height),
            offset: Vec3::new(0.0, 0.0, (height - 1.0) * 0.5),
            material,
        }
    }

    /// Does the cuboid cover the whole cell
    pub fn is_full(&self) -> bool {
        (self.size - Vec3::repeat(1.0)).amax() <= EPSILON && self.offset.amax() <= EPSILON
    }

    /// Cuboid of this brick when placed in `cell`
    pub fn geometry(&self, cell: &CellCoord) -> BrickGeometry {
        BrickGeometry { centre: cell_centre(cell) + self.offset, size: self.size }
    }
}

/// Derived cuboid geometry of a placed brick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickGeometry {
    /// World position of the cuboid's centre
    pub centre: Vec3,
    /// Full size of the cuboid
    pub size: Vec3,
}

/// Read access to the static brick grid
pub trait BrickWorld {
    /// Brick occupying `cell`, if any
    fn brick(&self, cell: &CellCoord) -> Option<Brick>;

    /// Whether `cell` closes off its faces completely. Partial bricks leave
    /// their neighbours' faces exposed.
    fn is_solid(&self, cell: &CellCoord) -> bool {
        self.brick(cell).is_some_and(|b| b.is_full())
    }

    /// Cell containing a world point
    fn cell_of(&self, point: &Vec3) -> CellCoord {
        cell_of(point)
    }
}

/// In-memory brick grid
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    bricks: HashMap<CellCoord, Brick>,
}

impl GridWorld {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a brick, returning the one it replaced
    pub fn set_brick(&mut self, cell: CellCoord, brick: Brick) -> Option<Brick> {
        self.bricks.insert(cell, brick)
    }

    /// Clear a cell, returning its brick
    pub fn remove(&mut self, cell: &CellCoord) -> Option<Brick> {
        self.bricks.remove(cell)
    }

    /// Fill every cell of the inclusive box `min..=max`
    pub fn fill_box(&mut self, min: CellCoord, max: CellCoord, brick: Brick) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.bricks.insert(CellCoord::new(x, y, z), brick);
                }
            }
        }
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    /// True when no cell is occupied
    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }
}

impl BrickWorld for GridWorld {
    fn brick(&self, cell: &CellCoord) -> Option<Brick> {
        self.bricks.get(cell).copied()
    }
}

/// A contact between a body and one brick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickHit {
    /// Cell of the brick
    pub cell: CellCoord,
    /// Contact with the body as body 1 and the brick as body 2
    pub hit: HitResult,
    /// The face leads into open space and yields to any firm contact
    pub tentative: bool,
    /// Overlap depth along the normal
    pub penetration: Real,
}

/// Check / Bounce / Separate of moving bodies against bricks
#[derive(Debug, Clone, Copy, Default)]
pub struct BrickAdapter;

impl BrickAdapter {
    /// Cells overlapped by the body's bounding box at its proposed position
    pub fn candidate_cells(body: &RigidBody) -> impl Iterator<Item = CellCoord> {
        let extents = body.shape().half_extents();
        let min = cell_of(&(body.next_pos - extents));
        let max = cell_of(&(body.next_pos + extents));
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y)
                .flat_map(move |y| (min.z..=max.z).map(move |z| CellCoord::new(x, y, z)))
        })
    }

    /// Immovable cuboid body standing in for the brick in `cell`
    pub fn brick_body(cell: &CellCoord, brick: &Brick) -> Option<RigidBody> {
        let geometry = brick.geometry(cell);
        let params = BodyParams::immovable(brick.material.elasticity, brick.material.friction);
        match RigidBody::cuboid(Cow::Borrowed("brick"), geometry.size, params, geometry.centre) {
            Ok(body) => Some(body),
            Err(err) => {
                log::warn!("skipping invalid brick at {:?}: {}", cell, err);
                None
            }
        }
    }

    /// Check `body`, centred at `centre`, against the brick in `cell`
    pub fn check<W: BrickWorld + ?Sized>(
        body: &RigidBody,
        centre: &Vec3,
        cell: &CellCoord,
        world: &W,
    ) -> Option<BrickHit> {
        if body.kind() == ShapeKind::Cuboid {
            return None;
        }
        let brick = world.brick(cell)?;
        let brick_body = Self::brick_body(cell, &brick)?;

        // A centre buried in a solid cell says nothing about the faces the
        // body is hitting; judge them from where it started the tick
        let body_cell = match world.cell_of(centre) {
            cell if world.is_solid(&cell) => world.cell_of(&body.pos()),
            cell => cell,
        };
        let is_tentative = |n: &Vec3| {
            let step = n.map(|c| c.round() as i32);
            !world.is_solid(&(body_cell + step))
        };

        let contact =
            round_vs_cuboid(body, centre, &brick_body, &brick_body.next_pos, &is_tentative)?;
        Some(BrickHit {
            cell: *cell,
            hit: contact.hit,
            tentative: contact.tentative,
            penetration: contact.penetration,
        })
    }

    /// Velocity response of `body` against a brick hit
    pub fn bounce<W: BrickWorld + ?Sized>(body: &mut RigidBody, hit: &BrickHit, world: &W) {
        if let Some(mut brick_body) = Self::body_for(hit, world) {
            bounce_on_cuboid(BRICK_CONTACT, body, &mut brick_body, &hit.hit);
        }
    }

    /// Positional correction of `body` against a brick hit
    pub fn separate<W: BrickWorld + ?Sized>(body: &mut RigidBody, hit: &BrickHit, world: &W) {
        if let Some(mut brick_body) = Self::body_for(hit, world) {
            separate_from_cuboid(BRICK_CONTACT, body, &mut brick_body, &hit.hit);
        }
    }

    fn body_for<W: BrickWorld + ?Sized>(hit: &BrickHit, world: &W) -> Option<RigidBody> {
        let Some(brick) = world.brick(&hit.cell) else {
            log::warn!("brick at {:?} vanished between check and response", hit.cell);
            return None;
        };
        Self::brick_body(&hit.cell, &brick)
    }

    /// Check every candidate cell, then bounce and separate the surviving
    /// hits. Tentative hits survive only when no firm hit exists. Returns
    /// the hits that were acted on.
    pub fn resolve<W: BrickWorld + ?Sized>(body: &mut RigidBody, world: &W) -> Vec<BrickHit> {
        if body.kind() == ShapeKind::Cuboid {
            log::debug!("{} is a cuboid; cuboids do not collide with bricks", body.name());
            return Vec::new();
        }

        let centre = body.next_pos;
        let mut hits: Vec<BrickHit> = Self::candidate_cells(body)
            .filter_map(|cell| Self::check(body, &centre, &cell, world))
            .collect();
        if hits.iter().any(|h| !h.tentative) {
            hits.retain(|h| !h.tentative);
        }
        hits.sort_by(|a, b| b.penetration.total_cmp(&a.penetration));

        // A floor made of several bricks produces one hit per brick; damp
        // and reflect only once per normal.
        let mut bounced: Vec<Vec3> = Vec::with_capacity(hits.len());
        for hit in &hits {
            let n = hit.hit.hit_normal12;
            if !bounced.iter().any(|b| (b - n).amax() <= EPSILON) {
                Self::bounce(body, hit, world);
                bounced.push(n);
            }

            // Earlier separations may already have cleared this brick
            let centre = body.next_pos;
            if let Some(fresh) = Self::check(body, &centre, &hit.cell, world) {
                Self::separate(body, &fresh, world);
            }
        }

        if !hits.is_empty() {
            log::trace!("{}: {} brick contact(s)", body.name(), hits.len());
        }
        hits
    }
}
