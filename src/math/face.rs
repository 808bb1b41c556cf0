use core::fmt;

use crate::math::{Axis, Cube, FreeVector};

/// Identifies a face of a cube, or equivalently, one of the six axis-aligned
/// unit direction vectors.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
#[repr(u8)]
pub enum Face6 {
    /// Negative X; the face whose normal vector is `(-1, 0, 0)`.
    NX,
    /// Negative Y; the face whose normal vector is `(0, -1, 0)`; downward.
    NY,
    /// Negative Z; the face whose normal vector is `(0, 0, -1)`.
    NZ,
    /// Positive X; the face whose normal vector is `(1, 0, 0)`.
    PX,
    /// Positive Y; the face whose normal vector is `(0, 1, 0)`; upward.
    PY,
    /// Positive Z; the face whose normal vector is `(0, 0, 1)`.
    PZ,
}

impl Face6 {
    /// All the values of [`Face6`].
    pub const ALL: [Face6; 6] = [
        Face6::NX,
        Face6::NY,
        Face6::NZ,
        Face6::PX,
        Face6::PY,
        Face6::PZ,
    ];

    /// Which axis is this face perpendicular to?
    #[inline]
    pub const fn axis(self) -> Axis {
        match self {
            Face6::NX | Face6::PX => Axis::X,
            Face6::NY | Face6::PY => Axis::Y,
            Face6::NZ | Face6::PZ => Axis::Z,
        }
    }

    /// Returns whether this face is on the positive side of its axis.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Face6::PX | Face6::PY | Face6::PZ)
    }

    /// Returns the opposite face (maps [`PX`](Self::PX) to
    /// [`NX`](Self::NX) and so on).
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Face6 {
        match self {
            Face6::NX => Face6::PX,
            Face6::NY => Face6::PY,
            Face6::NZ => Face6::PZ,
            Face6::PX => Face6::NX,
            Face6::PY => Face6::NY,
            Face6::PZ => Face6::NZ,
        }
    }

    /// Returns the unit vector normal to this face, pointing away from the
    /// cube it belongs to.
    #[inline]
    pub fn normal_vector(self) -> FreeVector {
        match self {
            Face6::NX => FreeVector::new(-1.0, 0.0, 0.0),
            Face6::NY => FreeVector::new(0.0, -1.0, 0.0),
            Face6::NZ => FreeVector::new(0.0, 0.0, -1.0),
            Face6::PX => FreeVector::new(1.0, 0.0, 0.0),
            Face6::PY => FreeVector::new(0.0, 1.0, 0.0),
            Face6::PZ => FreeVector::new(0.0, 0.0, 1.0),
        }
    }
}

/// A cube together with one of its faces; used to report which surface a
/// collision landed on.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct CubeFace {
    /// The cube.
    pub cube: Cube,
    /// The face of that cube.
    pub face: Face6,
}

impl CubeFace {
    /// Construct a [`CubeFace`] from a cube (or anything convertible to one)
    /// and a face.
    #[inline]
    pub fn new(cube: impl Into<Cube>, face: Face6) -> Self {
        Self {
            cube: cube.into(),
            face,
        }
    }
}

impl fmt::Debug for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { cube, face } = self;
        write!(f, "CubeFace({cube:?}, {face:?})")
    }
}
