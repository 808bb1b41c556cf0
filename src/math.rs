//! Mathematical utilities: coordinates, boxes, cubes, and rigid ship
//! transforms.
//!
//! Continuous coordinates are [`FreeCoordinate`] (`f64`); grid coordinates
//! are [`GridCoordinate`] (`i32`). The voxel grid is made of unit [`Cube`]s,
//! addressed by their most negative corner.

mod aab;
pub use aab::*;
mod axis;
pub use axis::*;
mod coord;
pub use coord::*;
mod cube;
pub use cube::Cube;
mod face;
pub use face::*;
mod grid_aab;
pub use grid_aab::*;
mod tick;
pub use tick::Tick;
mod transform;
pub use transform::*;
