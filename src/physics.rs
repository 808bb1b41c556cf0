//! Collision resolution against ship voxel fields, and interception of the
//! host engine's entity-movement step.

use crate::math::FreeCoordinate;

mod collision;
pub use collision::*;
mod intercept;
pub use intercept::*;

#[cfg(test)]
mod tests;

/// Close-but-not-intersecting objects are set to this separation.
pub(crate) const POSITION_EPSILON: FreeCoordinate = 1e-6 * 1e-6;

/// Displacements longer than this are clamped.
///
/// This provides an upper limit on the collision detection computation,
/// per body per tick.
pub(crate) const DISPLACEMENT_MAGNITUDE_LIMIT: FreeCoordinate = 1e5_f64;
pub(crate) const DISPLACEMENT_MAGNITUDE_LIMIT_SQUARED: FreeCoordinate =
    DISPLACEMENT_MAGNITUDE_LIMIT * DISPLACEMENT_MAGNITUDE_LIMIT;
