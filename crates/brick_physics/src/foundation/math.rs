//! Math utilities and types
//!
//! Provides the vector types used by the collision kernel. Everything is
//! `f64`: the positional correction gap is a few hundred thousandths of a
//! unit and must survive rounding at world coordinates in the hundreds.

pub use nalgebra::Vector3;

/// Scalar type used throughout the crate
pub type Real = f64;

/// 3D vector type (z is up, +y is north, +x is east)
pub type Vec3 = Vector3<Real>;

/// Math constants
pub mod constants {
    /// 2 * Pi
    pub const TAU: f64 = std::f64::consts::TAU;
}

/// Math utility functions
pub mod utils {
    use super::{Real, Vec3};

    /// Unit vector in the horizontal plane at `angle` radians from +x
    pub fn horizontal_unit(angle: Real) -> Vec3 {
        Vec3::new(angle.cos(), angle.sin(), 0.0)
    }

    /// Do the open intervals `(a_min, a_max)` and `(b_min, b_max)` overlap
    pub fn intervals_overlap(a_min: Real, a_max: Real, b_min: Real, b_max: Real) -> bool {
        a_max > b_min && b_max > a_min
    }

    /// Split `v` into its components parallel and perpendicular to the unit vector `n`
    pub fn decompose(v: &Vec3, n: &Vec3) -> (Vec3, Vec3) {
        let parallel = n * v.dot(n);
        (parallel, v - parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::Vec3;
    use approx::assert_relative_eq;

    #[test]
    fn test_decompose_reassembles() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        let n = Vec3::new(0.0, 0.6, 0.8);
        let (parallel, tangent) = decompose(&v, &n);

        assert_relative_eq!(parallel + tangent, v, epsilon = 1e-12);
        assert_relative_eq!(tangent.dot(&n), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_intervals_touching_do_not_overlap() {
        assert!(!intervals_overlap(0.0, 1.0, 1.0, 2.0));
        assert!(intervals_overlap(0.0, 1.0, 0.999, 2.0));
    }

    #[test]
    fn test_horizontal_unit_is_unit_length() {
        for i in 0..8 {
            let v = horizontal_unit(f64::from(i) * 0.7);
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
            assert_eq!(v.z, 0.0);
        }
    }
}
