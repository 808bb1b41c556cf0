use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;

use crate::math::{Aab, Axis, Cube, FreeCoordinate, GridCoordinate, GridPoint, GridVector};

/// An axis-aligned box of integer coordinates, representing a set of whole
/// [`Cube`]s; the discrete analogue of [`Aab`].
///
/// The box may have a zero size along any axis, in which case it contains no
/// cubes.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct GridAab {
    // Invariant: lower_bounds ≤ upper_bounds on every axis.
    lower_bounds: GridPoint,
    upper_bounds: GridPoint,
}

impl GridAab {
    /// Constructs a [`GridAab`] from inclusive lower bounds and exclusive
    /// upper bounds.
    ///
    /// Misordered bounds are clamped to an empty box at the lower bounds.
    #[inline]
    pub fn from_lower_upper(
        lower_bounds: impl Into<GridPoint>,
        upper_bounds: impl Into<GridPoint>,
    ) -> GridAab {
        let lower_bounds = lower_bounds.into();
        let upper_bounds = upper_bounds.into().max(lower_bounds);
        GridAab {
            lower_bounds,
            upper_bounds,
        }
    }

    /// Constructs a [`GridAab`] containing the single given cube.
    #[inline]
    pub fn single_cube(cube: Cube) -> GridAab {
        GridAab {
            lower_bounds: cube.lower_bounds(),
            upper_bounds: cube.upper_bounds(),
        }
    }

    /// Returns whether the box contains no cubes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        Axis::ALL
            .into_iter()
            .any(|axis| self.lower_bounds[axis] == self.upper_bounds[axis])
    }

    /// Inclusive upper bounds on cube coordinates, or the most negative
    /// corner of the box.
    #[inline]
    pub fn lower_bounds(&self) -> GridPoint {
        self.lower_bounds
    }

    /// Exclusive upper bounds on cube coordinates, or the most positive
    /// corner of the box.
    #[inline]
    pub fn upper_bounds(&self) -> GridPoint {
        self.upper_bounds
    }

    /// The range of coordinates along the given axis.
    #[inline]
    pub fn axis_range(&self, axis: Axis) -> Range<GridCoordinate> {
        self.lower_bounds[axis]..self.upper_bounds[axis]
    }

    /// Returns whether the box includes the given cube.
    #[inline]
    pub fn contains_cube(&self, cube: Cube) -> bool {
        let position = cube.lower_bounds();
        Axis::ALL.into_iter().all(|axis| {
            self.axis_range(axis).contains(&position[axis])
        })
    }

    /// Returns the intersection of two boxes, or [`None`] if they share no
    /// cubes.
    #[inline]
    pub fn intersection_cubes(self, other: GridAab) -> Option<GridAab> {
        let lower = self.lower_bounds.max(other.lower_bounds);
        let upper = self.upper_bounds.min(other.upper_bounds);
        for axis in Axis::ALL {
            if upper[axis] <= lower[axis] {
                return None;
            }
        }
        Some(GridAab {
            lower_bounds: lower,
            upper_bounds: upper,
        })
    }

    /// Translates the box by the given offset.
    ///
    /// Coordinates saturate at the numeric range of [`GridCoordinate`].
    #[inline]
    #[must_use]
    pub fn translate(&self, offset: impl Into<GridVector>) -> Self {
        let offset = offset.into();
        let translate_point = |point: GridPoint| {
            GridPoint::new(
                point.x.saturating_add(offset.x),
                point.y.saturating_add(offset.y),
                point.z.saturating_add(offset.z),
            )
        };
        GridAab {
            lower_bounds: translate_point(self.lower_bounds),
            upper_bounds: translate_point(self.upper_bounds),
        }
    }

    /// Converts this box to the equivalent [`Aab`] with continuous
    /// coordinates.
    #[inline]
    pub fn to_free(self) -> Aab {
        Aab::from_lower_upper(
            self.lower_bounds.map(FreeCoordinate::from),
            self.upper_bounds.map(FreeCoordinate::from),
        )
    }

    /// Iterates over all cubes in the box.
    #[inline]
    pub fn interior_iter(self) -> GridIter {
        GridIter::new(self)
    }
}

impl fmt::Debug for GridAab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let GridAab {
            lower_bounds: l,
            upper_bounds: u,
        } = *self;
        f.debug_tuple("GridAab")
            .field(&(l.x..u.x))
            .field(&(l.y..u.y))
            .field(&(l.z..u.z))
            .finish()
    }
}

/// Iterator over the cubes in a [`GridAab`], produced by
/// [`GridAab::interior_iter()`].
///
/// Cubes are visited in the order (x, y, z) with z varying fastest.
#[derive(Clone, Debug)]
pub struct GridIter {
    bounds: GridAab,
    cursor: Option<GridPoint>,
}

impl GridIter {
    fn new(bounds: GridAab) -> Self {
        GridIter {
            bounds,
            cursor: if bounds.is_empty() {
                None
            } else {
                Some(bounds.lower_bounds())
            },
        }
    }
}

impl Iterator for GridIter {
    type Item = Cube;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.cursor?;
        let lower = self.bounds.lower_bounds();
        let upper = self.bounds.upper_bounds();

        let mut next = position;
        next.z += 1;
        if next.z >= upper.z {
            next.z = lower.z;
            next.y += 1;
            if next.y >= upper.y {
                next.y = lower.y;
                next.x += 1;
            }
        }
        self.cursor = if next.x >= upper.x { None } else { Some(next) };

        Some(Cube::from(position))
    }
}

impl FusedIterator for GridIter {}
