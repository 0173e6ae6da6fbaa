//! Shape variants of fixed (non-rotating) bodies
//!
//! The set is closed: a body is a sphere, an upright cylinder, an upright
//! capsule or an axis-aligned cuboid. Cuboids only take part in collisions
//! as the derived geometry of a brick.

use crate::foundation::math::{Real, Vec3};
use super::error::BodyError;

/// Sphere extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedSphere {
    /// Sphere radius
    pub radius: Real,
}

/// Upright cylinder extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCylinder {
    /// Radius of the flat caps
    pub radius: Real,
    /// Total height along z
    pub height: Real,
}

/// Upright capsule extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCapsule {
    /// Radius of the end spheres and the shaft
    pub radius: Real,
    /// Total height along z, end spheres included
    pub height: Real,
}

/// Axis-aligned cuboid extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCuboid {
    /// Full size along x, y and z
    pub size: Vec3,
}

fn positive(field: &'static str, value: Real) -> Result<Real, BodyError> {
    // `!(x > 0)` so NaN is rejected as well
    if !(value > 0.0) {
        return Err(BodyError::NonPositiveExtent { field, value });
    }
    Ok(value)
}

impl FixedSphere {
    /// Create a sphere
    pub fn new(radius: Real) -> Result<Self, BodyError> {
        Ok(Self { radius: positive("radius", radius)? })
    }
}

impl FixedCylinder {
    /// Create an upright cylinder
    pub fn new(radius: Real, height: Real) -> Result<Self, BodyError> {
        Ok(Self {
            radius: positive("radius", radius)?,
            height: positive("height", height)?,
        })
    }

    /// Half of the height
    pub fn half_height(&self) -> Real {
        self.height * 0.5
    }
}

impl FixedCapsule {
    /// Create an upright capsule; `height` must exceed `2 * radius`
    pub fn new(radius: Real, height: Real) -> Result<Self, BodyError> {
        let radius = positive("radius", radius)?;
        let height = positive("height", height)?;
        if height <= 2.0 * radius {
            return Err(BodyError::CapsuleTooShort { height, radius });
        }
        Ok(Self { radius, height })
    }

    /// Half of the height
    pub fn half_height(&self) -> Real {
        self.height * 0.5
    }

    /// Distance from the capsule centre to either end-sphere centre
    pub fn core_half_length(&self) -> Real {
        self.half_height() - self.radius
    }

    /// Centre of the upper end sphere for a capsule centred at `centre`
    pub fn top_sphere_centre(&self, centre: &Vec3) -> Vec3 {
        Vec3::new(centre.x, centre.y, centre.z + self.core_half_length())
    }

    /// Centre of the lower end sphere for a capsule centred at `centre`
    pub fn bottom_sphere_centre(&self, centre: &Vec3) -> Vec3 {
        Vec3::new(centre.x, centre.y, centre.z - self.core_half_length())
    }
}

impl FixedCuboid {
    /// Create a cuboid from its full size
    pub fn new(size: Vec3) -> Result<Self, BodyError> {
        positive("size.x", size.x)?;
        positive("size.y", size.y)?;
        positive("size.z", size.z)?;
        Ok(Self { size })
    }

    /// Half extents along each axis
    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }
}

/// Discriminant of [`BodyShape`], used as the pair-dispatch key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// [`FixedSphere`]
    Sphere,
    /// [`FixedCylinder`]
    Cylinder,
    /// [`FixedCapsule`]
    Capsule,
    /// [`FixedCuboid`]
    Cuboid,
}

/// The shape of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    /// Sphere
    Sphere(FixedSphere),
    /// Upright cylinder
    Cylinder(FixedCylinder),
    /// Upright capsule
    Capsule(FixedCapsule),
    /// Axis-aligned cuboid
    Cuboid(FixedCuboid),
}

impl BodyShape {
    /// Dispatch key of this shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Cylinder(_) => ShapeKind::Cylinder,
            Self::Capsule(_) => ShapeKind::Capsule,
            Self::Cuboid(_) => ShapeKind::Cuboid,
        }
    }

    /// Conservative bounding radius around the centre, for broad-phase pruning
    pub fn bounding_radius(&self) -> Real {
        match self {
            Self::Sphere(s) => s.radius,
            Self::Cylinder(c) => c.radius.hypot(c.half_height()),
            // The tips of the end spheres are the farthest points
            Self::Capsule(c) => c.half_height(),
            Self::Cuboid(c) => c.half_extents().norm(),
        }
    }

    /// Half extents of the axis-aligned bounding box
    pub fn half_extents(&self) -> Vec3 {
        match self {
            Self::Sphere(s) => Vec3::repeat(s.radius),
            Self::Cylinder(c) => Vec3::new(c.radius, c.radius, c.half_height()),
            Self::Capsule(c) => Vec3::new(c.radius, c.radius, c.half_height()),
            Self::Cuboid(c) => c.half_extents(),
        }
    }

    /// Vertical distance from the centre to the top (and bottom)
    pub fn half_height(&self) -> Real {
        self.half_extents().z
    }

    /// Extent of the shape from its centre along the unit direction `n`
    ///
    /// This is the support distance: projecting the shape onto `n` gives the
    /// interval `[c·n - support(-n), c·n + support(n)]`, and every shape here
    /// is symmetric so `support(-n) == support(n)`.
    pub fn support(&self, n: &Vec3) -> Real {
        let horizontal = n.x.hypot(n.y);
        match self {
            Self::Sphere(s) => s.radius,
            Self::Cylinder(c) => c.radius * horizontal + c.half_height() * n.z.abs(),
            Self::Capsule(c) => c.radius + c.core_half_length() * n.z.abs(),
            Self::Cuboid(c) => {
                let h = c.half_extents();
                h.x * n.x.abs() + h.y * n.y.abs() + h.z * n.z.abs()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_capsule_rejects_short_height() {
        assert_eq!(
            FixedCapsule::new(0.5, 1.0),
            Err(BodyError::CapsuleTooShort { height: 1.0, radius: 0.5 })
        );
        assert!(FixedCapsule::new(0.5, 1.01).is_ok());
    }

    #[test]
    fn test_extents_must_be_positive() {
        assert!(FixedSphere::new(0.0).is_err());
        assert!(FixedSphere::new(f64::NAN).is_err());
        assert!(FixedCylinder::new(1.0, -2.0).is_err());
        assert!(FixedCuboid::new(Vec3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_capsule_sphere_centres() {
        let capsule = FixedCapsule::new(0.5, 3.0).unwrap();
        let centre = Vec3::new(1.0, 2.0, 3.0);

        assert_relative_eq!(capsule.core_half_length(), 1.0);
        assert_relative_eq!(capsule.top_sphere_centre(&centre), Vec3::new(1.0, 2.0, 4.0));
        assert_relative_eq!(capsule.bottom_sphere_centre(&centre), Vec3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn test_support_along_axes() {
        let cylinder = BodyShape::Cylinder(FixedCylinder::new(0.5, 2.0).unwrap());
        assert_relative_eq!(cylinder.support(&Vec3::z()), 1.0);
        assert_relative_eq!(cylinder.support(&Vec3::x()), 0.5);

        let capsule = BodyShape::Capsule(FixedCapsule::new(0.5, 2.0).unwrap());
        assert_relative_eq!(capsule.support(&-Vec3::z()), 1.0);
        assert_relative_eq!(capsule.support(&Vec3::y()), 0.5);

        let cuboid = BodyShape::Cuboid(FixedCuboid::new(Vec3::new(1.0, 2.0, 4.0)).unwrap());
        let diagonal = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(cuboid.support(&diagonal), 1.5 * diagonal.x, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_radius_covers_aabb_corners_of_round_shapes() {
        let cylinder = BodyShape::Cylinder(FixedCylinder::new(1.0, 2.0).unwrap());
        assert_relative_eq!(cylinder.bounding_radius(), 2.0_f64.sqrt());

        let capsule = BodyShape::Capsule(FixedCapsule::new(1.0, 6.0).unwrap());
        assert_relative_eq!(capsule.bounding_radius(), 3.0);
    }
}
