//! Shared physical and numerical constants
//!
//! Nothing in the crate reads these from configuration.

use crate::foundation::math::Real;

/// Distances and magnitudes at or below this are treated as zero
pub const EPSILON: Real = 1e-9;

/// Gap left between two shapes after positional correction
pub const TINY_GAP: Real = 0.000_05;

/// Bodies at or above this mass are immovable for collision response
pub const LARGE_MASS: Real = 1.0e6;

/// Per-component velocity clamp applied during integration
pub const MAX_SPEED: Real = 100.0;

/// Gravitational acceleration (world units / s²), pointing towards -z
pub const G: Real = 9.81;

/// Fixed simulation tick
pub const TICK_DURATION: Real = 1.0 / 60.0;

/// Below this speed the direction of motion is considered undefined
pub const SIGNIFICANT_DIRECTION: Real = 1e-4;

/// Downward relative speed under which a body resting on another is pinned
/// to its support instead of bouncing
pub const HOPPING_PREVENTION_MAX_SPEED: Real = 1.0;

/// Smallest mass a body may be created with
pub const MIN_MASS: Real = 1e-6;
