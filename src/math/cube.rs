use core::fmt;

use crate::math::{Aab, FreeCoordinate, FreePoint, GridAab, GridCoordinate, GridPoint};

/// “A cube”, in this documentation, is a unit cube whose corners' coordinates
/// are integers. This type identifies such a cube by the coordinates of its
/// most negative corner.
///
/// Considered in continuous space, the ranges of coordinates a cube contains
/// are half-open intervals: lower inclusive and upper exclusive.
///
/// This struct also serves as the `euclid` *unit* of all grid-interacting
/// coordinates in this crate, so that `Point3D<f64, Cube>` reads as “a point
/// measured in cubes”.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[allow(missing_docs, clippy::exhaustive_structs)]
pub struct Cube {
    pub x: GridCoordinate,
    pub y: GridCoordinate,
    pub z: GridCoordinate,
}

impl Cube {
    /// Equal to `Cube::new(0, 0, 0)`.
    ///
    /// Note that this is not a box _centered_ on the coordinate origin.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Construct `Cube { x, y, z }` from the given coordinates.
    #[inline]
    pub const fn new(x: GridCoordinate, y: GridCoordinate, z: GridCoordinate) -> Self {
        Self { x, y, z }
    }

    /// Convert a point in space to the unit cube that encloses it.
    ///
    /// Such cubes are defined to be half-open intervals on each axis; that
    /// is, an integer coordinate is counted as part of the cube extending
    /// positively from that coordinate.
    ///
    /// If the point coordinates are outside of the numeric range of
    /// [`GridCoordinate`], returns [`None`].
    #[inline]
    pub fn containing(point: FreePoint) -> Option<Self> {
        const MIN_INCLUSIVE: FreeCoordinate = GridCoordinate::MIN as FreeCoordinate;
        const MAX_EXCLUSIVE: FreeCoordinate = GridCoordinate::MAX as FreeCoordinate + 1.0;

        let FreePoint { x, y, z, .. } = point;

        if (MIN_INCLUSIVE <= x)
            & (MIN_INCLUSIVE <= y)
            & (MIN_INCLUSIVE <= z)
            & (x < MAX_EXCLUSIVE)
            & (y < MAX_EXCLUSIVE)
            & (z < MAX_EXCLUSIVE)
        {
            Some(Self {
                x: x.floor() as GridCoordinate,
                y: y.floor() as GridCoordinate,
                z: z.floor() as GridCoordinate,
            })
        } else {
            None
        }
    }

    /// Returns the corner of this cube with the most negative coordinates.
    #[inline]
    pub fn lower_bounds(self) -> GridPoint {
        GridPoint::new(self.x, self.y, self.z)
    }

    /// Returns the corner of this cube with the most positive coordinates.
    ///
    /// Panics if `self` has any coordinates equal to [`GridCoordinate::MAX`].
    #[inline]
    #[track_caller]
    pub fn upper_bounds(self) -> GridPoint {
        self.lower_bounds() + crate::math::GridVector::new(1, 1, 1)
    }

    /// Returns the center point of this cube.
    #[inline]
    pub fn midpoint(self) -> FreePoint {
        self.lower_bounds().map(FreeCoordinate::from) + crate::math::FreeVector::splat(0.5)
    }

    /// Constructs the [`Aab`] describing this cube exactly.
    #[inline]
    pub fn aab(self) -> Aab {
        Aab::from_lower_upper(
            self.lower_bounds().map(FreeCoordinate::from),
            self.upper_bounds().map(FreeCoordinate::from),
        )
    }

    /// Constructs the [`GridAab`] containing this cube only.
    #[inline]
    pub fn grid_aab(self) -> GridAab {
        GridAab::single_cube(self)
    }
}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { x, y, z } = self;
        write!(f, "({x:+.3?}, {y:+.3?}, {z:+.3?})")
    }
}

impl From<GridPoint> for Cube {
    #[inline]
    fn from(point: GridPoint) -> Self {
        Self::new(point.x, point.y, point.z)
    }
}

impl From<Cube> for GridPoint {
    #[inline]
    fn from(cube: Cube) -> Self {
        cube.lower_bounds()
    }
}
