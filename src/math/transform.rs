use core::fmt;

use euclid::Rotation3D;

use crate::math::{Cube, FreeCoordinate, FreePoint, FreeVector};

/// Unit quaternion rotating free coordinates; the orientation component of a
/// [`ShipTransform`].
pub type Rotation = Rotation3D<FreeCoordinate, Cube, Cube>;

/// A rigid transformation describing the pose of one ship: where its local
/// voxel grid sits in the world and how it is turned.
///
/// All world↔local conversions rotate about the ship's center of mass, not
/// the local origin. A [`ShipTransform`] is immutable once constructed; a
/// ship's pose changes by replacing the transform wholesale (see
/// [`TransformBuffer`](crate::ship::TransformBuffer)).
///
/// [Rigid transformation]: https://en.wikipedia.org/wiki/Rigid_transformation
#[derive(Clone, Copy, PartialEq)]
pub struct ShipTransform {
    /// World position of the ship's center of mass.
    position: FreePoint,
    /// Orientation of the local grid relative to the world axes.
    /// Invariant: always normalized.
    orientation: Rotation,
    /// Center of mass in ship-local coordinates; the fixed point of pure
    /// rotation.
    center_of_mass: FreePoint,
}

impl ShipTransform {
    /// Constructs a transform from its three components.
    ///
    /// A non-normalized `orientation` is an invariant violation: it fails a
    /// debug assertion, and is silently renormalized in release builds so a
    /// live simulation is never crashed by accumulated rounding.
    #[inline]
    pub fn new(position: FreePoint, orientation: Rotation, center_of_mass: FreePoint) -> Self {
        debug_assert!(
            (square_norm(&orientation) - 1.0).abs() < 1e-6,
            "ShipTransform orientation must be normalized: {orientation:?}"
        );
        Self {
            position,
            orientation: orientation.normalize(),
            center_of_mass,
        }
    }

    /// The transform which maps local coordinates to identical world
    /// coordinates.
    #[inline]
    pub fn identity() -> Self {
        Self {
            position: FreePoint::origin(),
            orientation: Rotation::identity(),
            center_of_mass: FreePoint::origin(),
        }
    }

    /// World position of the ship's center of mass.
    #[inline]
    pub fn position(&self) -> FreePoint {
        self.position
    }

    /// Orientation of the local grid relative to the world axes.
    #[inline]
    pub fn orientation(&self) -> Rotation {
        self.orientation
    }

    /// Center of mass in ship-local coordinates.
    #[inline]
    pub fn center_of_mass(&self) -> FreePoint {
        self.center_of_mass
    }

    /// Maps a point in ship-local coordinates to world coordinates.
    #[inline]
    pub fn local_to_world(&self, point: FreePoint) -> FreePoint {
        self.position
            + self
                .orientation
                .transform_vector3d(point - self.center_of_mass)
    }

    /// Maps a point in world coordinates to ship-local coordinates.
    ///
    /// This is the exact inverse of [`ShipTransform::local_to_world`] up to
    /// floating-point rounding.
    #[inline]
    pub fn world_to_local(&self, point: FreePoint) -> FreePoint {
        self.center_of_mass
            + self
                .orientation
                .inverse()
                .transform_vector3d(point - self.position)
    }

    /// Maps a direction (or velocity) in ship-local coordinates to world
    /// coordinates; rotation only, no translation.
    #[inline]
    pub fn local_direction_to_world(&self, direction: FreeVector) -> FreeVector {
        self.orientation.transform_vector3d(direction)
    }

    /// Maps a direction (or velocity) in world coordinates to ship-local
    /// coordinates; rotation only, no translation.
    #[inline]
    pub fn world_direction_to_local(&self, direction: FreeVector) -> FreeVector {
        self.orientation.inverse().transform_vector3d(direction)
    }

    /// Computes the pose `fraction` of the way from `previous` to `current`:
    /// linear interpolation of position and center of mass, spherical linear
    /// interpolation of orientation along the shorter arc.
    ///
    /// `fraction` is clamped to `[0, 1]`, and the boundary values return the
    /// respective input exactly, so samplers see no interpolation artifacts
    /// at tick edges.
    pub fn interpolate(previous: &Self, current: &Self, fraction: FreeCoordinate) -> Self {
        if !(fraction > 0.0) {
            return *previous;
        }
        if fraction >= 1.0 {
            return *current;
        }

        let from = previous.orientation;
        let mut to = current.orientation;
        // Take the shorter arc: q and -q are the same rotation, so flip the
        // sign when the quaternions point into opposite half-spaces.
        if dot(&from, &to) < 0.0 {
            to = Rotation::quaternion(-to.i, -to.j, -to.k, -to.r);
        }

        Self {
            position: previous.position.lerp(current.position, fraction),
            orientation: from.slerp(&to, fraction).normalize(),
            center_of_mass: previous.center_of_mass.lerp(current.center_of_mass, fraction),
        }
    }

    /// The rotation angle, in radians, between the orientations of `self`
    /// and `other`. Always in `[0, π]`.
    pub fn angle_to(&self, other: &Self) -> FreeCoordinate {
        let alignment = dot(&self.orientation, &other.orientation).abs().min(1.0);
        2.0 * alignment.acos()
    }
}

#[inline]
fn dot(a: &Rotation, b: &Rotation) -> FreeCoordinate {
    a.i * b.i + a.j * b.j + a.k * b.k + a.r * b.r
}

#[inline]
fn square_norm(q: &Rotation) -> FreeCoordinate {
    dot(q, q)
}

impl fmt::Debug for ShipTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            position,
            orientation,
            center_of_mass,
        } = self;
        f.debug_struct("ShipTransform")
            .field("position", position)
            .field("orientation", orientation)
            .field("center_of_mass", center_of_mass)
            .finish()
    }
}
