//! Hit classification data model
//!
//! A [`HitResult`] is written by a strategy's `check` and read back by the
//! same strategy's `bounce` and `separate`. Strategies own the mutable
//! form (`&mut HitResult`) only while detecting; the response steps get a
//! shared reference.

use crate::foundation::math::Vec3;

/// Which sub-region of a shape was struck.
///
/// The meaning is pair-specific: `TopFace` is a cylinder's flat cap or a
/// brick's upper face, `TopSphere` is a capsule's rounded upper end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitArea {
    /// Upper flat face (cylinder cap, brick top)
    TopFace,
    /// Lower flat face (cylinder cap, brick bottom)
    BottomFace,
    /// Lateral surface of a cylinder or capsule
    Side,
    /// Upper end sphere of a capsule
    TopSphere,
    /// Lower end sphere of a capsule
    BottomSphere,
    /// Brick face whose outward normal is +y
    NorthFace,
    /// Brick face whose outward normal is +x
    EastFace,
    /// Brick face whose outward normal is -y
    SouthFace,
    /// Brick face whose outward normal is -x
    WestFace,
    /// Shape without distinguishable regions (spheres)
    Unspecified,
}

impl HitArea {
    /// Outward unit normal of a brick/cuboid face, `None` for non-face areas
    pub fn face_normal(self) -> Option<Vec3> {
        match self {
            Self::TopFace => Some(Vec3::z()),
            Self::BottomFace => Some(-Vec3::z()),
            Self::NorthFace => Some(Vec3::y()),
            Self::EastFace => Some(Vec3::x()),
            Self::SouthFace => Some(-Vec3::y()),
            Self::WestFace => Some(-Vec3::x()),
            _ => None,
        }
    }

    /// The four lateral brick faces in north, east, south, west order
    pub const LATERAL_FACES: [HitArea; 4] =
        [Self::NorthFace, Self::EastFace, Self::SouthFace, Self::WestFace];

    /// Is this one of the four lateral brick faces
    pub fn is_lateral_face(self) -> bool {
        Self::LATERAL_FACES.contains(&self)
    }
}

/// Contact description produced by a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Contact point in world space
    pub hit_pt: Vec3,
    /// Unit normal pointing from body 1 towards body 2
    pub hit_normal12: Vec3,
    /// Region of body 1 that was struck
    pub area1: HitArea,
    /// Region of body 2 that was struck
    pub area2: HitArea,
}

impl Default for HitResult {
    fn default() -> Self {
        Self {
            hit_pt: Vec3::zeros(),
            hit_normal12: Vec3::z(),
            area1: HitArea::Unspecified,
            area2: HitArea::Unspecified,
        }
    }
}

impl HitResult {
    /// Create a hit result
    pub fn new(hit_pt: Vec3, hit_normal12: Vec3, area1: HitArea, area2: HitArea) -> Self {
        Self { hit_pt, hit_normal12, area1, area2 }
    }

    /// Overwrite every field, used by checks writing into a caller's buffer
    pub fn set(&mut self, hit_pt: Vec3, hit_normal12: Vec3, area1: HitArea, area2: HitArea) {
        *self = Self::new(hit_pt, hit_normal12, area1, area2);
    }

    /// The same contact seen with the two bodies swapped
    pub fn flipped(&self) -> Self {
        Self {
            hit_pt: self.hit_pt,
            hit_normal12: -self.hit_normal12,
            area1: self.area2,
            area2: self.area1,
        }
    }
}
