use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use euclid::Point3D;

use crate::math::{Axis, FreeCoordinate, FreePoint, FreeVector, GridAab, GridCoordinate};

/// Axis-Aligned Box data type with continuous coordinates.
///
/// A discrete analogue exists as [`GridAab`].
#[derive(Copy, Clone, PartialEq)]
pub struct Aab {
    // Invariant: lower_bounds ≤ upper_bounds on every axis, and no NaN.
    lower_bounds: FreePoint,
    upper_bounds: FreePoint,
}

impl Aab {
    /// The [`Aab`] of zero size at the origin.
    pub const ZERO: Aab = Aab {
        lower_bounds: Point3D::new(0., 0., 0.),
        upper_bounds: Point3D::new(0., 0., 0.),
    };

    /// Constructs an [`Aab`] from individual coordinates, low and high per
    /// axis.
    #[inline]
    #[track_caller]
    pub fn new(
        lx: FreeCoordinate,
        hx: FreeCoordinate,
        ly: FreeCoordinate,
        hy: FreeCoordinate,
        lz: FreeCoordinate,
        hz: FreeCoordinate,
    ) -> Self {
        Self::from_lower_upper(Point3D::new(lx, ly, lz), Point3D::new(hx, hy, hz))
    }

    /// Constructs an [`Aab`] from most-negative and most-positive corner
    /// points.
    ///
    /// Panics if the points are not in the proper order or if they are NaN.
    #[inline]
    #[track_caller]
    pub fn from_lower_upper(
        lower_bounds: impl Into<FreePoint>,
        upper_bounds: impl Into<FreePoint>,
    ) -> Self {
        let lower_bounds = lower_bounds.into();
        let upper_bounds = upper_bounds.into();
        match Self::checked_from_lower_upper(lower_bounds, upper_bounds) {
            Some(aab) => aab,
            None => panic!(
                "invalid AAB points that are misordered or NaN: \
                lower {lower_bounds:?} upper {upper_bounds:?}"
            ),
        }
    }

    /// Constructs an [`Aab`] from most-negative and most-positive corner
    /// points, returning [`None`] if they are misordered or NaN.
    #[inline]
    pub fn checked_from_lower_upper(
        lower_bounds: FreePoint,
        upper_bounds: FreePoint,
    ) -> Option<Self> {
        if lower_bounds.x <= upper_bounds.x
            && lower_bounds.y <= upper_bounds.y
            && lower_bounds.z <= upper_bounds.z
        {
            Some(Self {
                lower_bounds,
                upper_bounds,
            })
        } else {
            None
        }
    }

    /// Constructs the smallest [`Aab`] enclosing all the given points.
    ///
    /// Returns [`None`] if the iterator is empty or any coordinate is NaN.
    pub fn from_points(points: impl IntoIterator<Item = FreePoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut lower = first;
        let mut upper = first;
        for point in points {
            for axis in Axis::ALL {
                lower[axis] = lower[axis].min(point[axis]);
                upper[axis] = upper[axis].max(point[axis]);
            }
        }
        Self::checked_from_lower_upper(lower, upper)
    }

    /// The most negative corner of the box.
    #[inline]
    pub const fn lower_bounds_p(&self) -> FreePoint {
        self.lower_bounds
    }

    /// The most positive corner of the box.
    #[inline]
    pub const fn upper_bounds_p(&self) -> FreePoint {
        self.upper_bounds
    }

    /// The center of the enclosed volume.
    #[inline]
    pub fn center(&self) -> FreePoint {
        (self.lower_bounds + self.upper_bounds.to_vector()) * 0.5
    }

    /// Iterates over the eight corner points of the box.
    /// The ordering is deterministic but not currently declared stable.
    #[inline]
    pub fn corner_points(
        self,
    ) -> impl DoubleEndedIterator<Item = FreePoint> + ExactSizeIterator + FusedIterator {
        let l = self.lower_bounds;
        let u = self.upper_bounds;
        (0..8).map(move |i| {
            Point3D::new(
                if i & 1 == 0 { l.x } else { u.x },
                if i & 2 == 0 { l.y } else { u.y },
                if i & 4 == 0 { l.z } else { u.z },
            )
        })
    }

    /// Returns whether this AAB, including the boundary, contains the point.
    #[inline]
    pub fn contains(&self, point: FreePoint) -> bool {
        for axis in Axis::ALL {
            if !(self.lower_bounds[axis] <= point[axis] && point[axis] <= self.upper_bounds[axis]) {
                return false;
            }
        }
        true
    }

    /// Returns whether this AAB, including the boundary, intersects the other
    /// AAB.
    #[inline]
    pub fn intersects(&self, other: Aab) -> bool {
        for axis in Axis::ALL {
            let intersection_min = self.lower_bounds[axis].max(other.lower_bounds[axis]);
            let intersection_max = self.upper_bounds[axis].min(other.upper_bounds[axis]);
            match intersection_min.partial_cmp(&intersection_max) {
                Some(Ordering::Less | Ordering::Equal) => {}
                _ => return false,
            }
        }
        true
    }

    /// Translate this box by the specified offset.
    ///
    /// Note that due to rounding error, the result may not have the same
    /// size.
    #[inline]
    #[must_use]
    #[track_caller] // in case of NaN
    pub fn translate(self, offset: FreeVector) -> Self {
        Self::from_lower_upper(self.lower_bounds + offset, self.upper_bounds + offset)
    }

    /// Returns the smallest [`Aab`] which contains both `self` and `other`.
    #[inline]
    #[must_use]
    pub fn union(self, other: Aab) -> Self {
        Self {
            lower_bounds: self.lower_bounds.min(other.lower_bounds),
            upper_bounds: self.upper_bounds.max(other.upper_bounds),
        }
    }

    /// Construct the [`GridAab`] containing all cubes this [`Aab`]
    /// intersects.
    ///
    /// Grid cubes are considered to be half-open ranges, so an [`Aab`] with
    /// exact integer bounds on some axis will convert without rounding
    /// outward on that axis.
    ///
    /// If the floating-point coordinates are out of [`GridCoordinate`]'s
    /// numeric range, then they will be clamped.
    #[inline]
    pub fn round_up_to_grid(self) -> GridAab {
        GridAab::from_lower_upper(
            self.lower_bounds.map(|c| c.floor() as GridCoordinate),
            self.upper_bounds.map(|c| c.ceil() as GridCoordinate),
        )
    }
}

impl fmt::Debug for Aab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Aab {
            lower_bounds: l,
            upper_bounds: u,
        } = *self;
        f.debug_tuple("Aab")
            .field(&(l.x..=u.x))
            .field(&(l.y..=u.y))
            .field(&(l.z..=u.z))
            .finish()
    }
}

/// [`Aab`] rejects NaN values, so it can implement [`Eq`] even though it
/// contains floats.
impl Eq for Aab {}
