//! Body construction errors

use thiserror::Error;

/// Errors raised when a body or shape is built with invalid constants.
///
/// These indicate a caller or configuration bug; the expected handling is
/// to fail at the construction site.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    /// Mass not above the minimum
    #[error("Body '{name}': mass {mass} must be greater than {min}")]
    InvalidMass {
        /// Body name
        name: String,
        /// Offending mass
        mass: f64,
        /// Minimum accepted mass
        min: f64,
    },

    /// Elasticity or friction outside [0, 1]
    #[error("Body '{name}': {field} {value} must be within [0, 1]")]
    CoefficientOutOfRange {
        /// Body name
        name: String,
        /// Which coefficient
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// A shape extent that must be strictly positive is not
    #[error("Shape extent '{field}' must be positive, got {value}")]
    NonPositiveExtent {
        /// Which extent
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// Capsule too short to hold its two end spheres
    #[error("Capsule height {height} must be greater than twice its radius {radius}")]
    CapsuleTooShort {
        /// Capsule height
        height: f64,
        /// Capsule radius
        radius: f64,
    },
}
