//! Coordinate and collision core for rigid voxel “ships”: independently
//! posed block structures embedded in an otherwise fixed block-grid world.
//!
//! This crate owns three things and deliberately nothing else:
//!
//! * **Transforms.** Each ship has a rigid pose ([`math::ShipTransform`])
//!   buffered across two simulation ticks ([`ship::TransformBuffer`]) so that
//!   renderers can sample a smoothly interpolated pose at any tick fraction
//!   while physics always reads the authoritative tick-boundary pose.
//! * **Subspaces.** Entities standing on a ship are attached to its local
//!   reference frame ([`ship::Subspace`]); their recorded local pose and
//!   velocity stay consistent across frame hand-offs, and collaborators can
//!   temporarily *force* an attachment with a scoped, unwind-safe pin.
//! * **Collision interception.** The host engine's entity-movement step is
//!   redirected ([`physics::intercept_move`]) whenever an entity's position
//!   is owned by a ship: the proposed motion is transformed into ship-local
//!   space, resolved against the ship's voxel field, and projected back.
//!
//! Voxel storage, rendering, networking, and ship assembly are external
//! collaborators. They reach this crate only through the narrow seams of
//! [`physics::VoxelField`], [`physics::MovementHost`], and the
//! [`ship::ShipRegistry`] lifecycle hooks.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridship::math::{Cube, FreePoint, GridAab, ShipTransform};
//! use gridship::physics::{VoxelCollision, VoxelField};
//! use gridship::ship::ShipRegistry;
//!
//! /// A 2×2×2 hull of solid blocks.
//! struct Hull;
//! impl VoxelField for Hull {
//!     fn bounds(&self) -> GridAab {
//!         GridAab::from_lower_upper([-1, -1, -1], [1, 1, 1])
//!     }
//!     fn collision(&self, cube: Cube) -> VoxelCollision {
//!         if self.bounds().contains_cube(cube) {
//!             VoxelCollision::Hard
//!         } else {
//!             VoxelCollision::None
//!         }
//!     }
//! }
//!
//! let mut registry = ShipRegistry::new();
//! let ship = registry.register_ship(Arc::new(Hull), ShipTransform::identity());
//!
//! assert_eq!(registry.ship_owning(FreePoint::new(0.5, 0.5, 0.5)), Some(ship));
//! assert_eq!(registry.ship_owning(FreePoint::new(40.0, 0.5, 0.5)), None);
//! ```

pub mod math;
pub mod physics;
pub mod ship;
