use core::fmt;

use crate::math::Face6;

/// Enumeration of the axes of three-dimensional space.
///
/// Can be used to infallibly index 3-component arrays and vectors.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in the standard order, [X, Y, Z].
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Convert the axis to a number for indexing 3-element arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the [`Face6`] value which corresponds to the positive
    /// direction on this axis.
    #[inline]
    pub fn positive_face(self) -> Face6 {
        match self {
            Axis::X => Face6::PX,
            Axis::Y => Face6::PY,
            Axis::Z => Face6::PZ,
        }
    }

    /// Returns the [`Face6`] value which corresponds to the negative
    /// direction on this axis.
    #[inline]
    pub fn negative_face(self) -> Face6 {
        match self {
            Axis::X => Face6::NX,
            Axis::Y => Face6::NY,
            Axis::Z => Face6::NZ,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl From<Axis> for usize {
    #[inline]
    fn from(value: Axis) -> Self {
        value as usize
    }
}

mod impl_index_axis {
    use super::Axis;
    use core::ops;

    impl<T> ops::Index<Axis> for [T; 3] {
        type Output = T;

        #[inline]
        fn index(&self, index: Axis) -> &Self::Output {
            &self[index as usize]
        }
    }
    impl<T> ops::IndexMut<Axis> for [T; 3] {
        #[inline]
        fn index_mut(&mut self, index: Axis) -> &mut Self::Output {
            &mut self[index as usize]
        }
    }

    macro_rules! impl_xyz {
        ($($type:tt)*) => {
            impl<T, U> ops::Index<Axis> for $($type)*<T, U> {
                type Output = T;

                #[inline]
                fn index(&self, index: Axis) -> &Self::Output {
                    match index {
                        Axis::X => &self.x,
                        Axis::Y => &self.y,
                        Axis::Z => &self.z,
                    }
                }
            }
            impl<T, U> ops::IndexMut<Axis> for $($type)*<T, U> {
                #[inline]
                fn index_mut(&mut self, index: Axis) -> &mut Self::Output {
                    match index {
                        Axis::X => &mut self.x,
                        Axis::Y => &mut self.y,
                        Axis::Z => &mut self.z,
                    }
                }
            }
        };
    }
    impl_xyz!(euclid::Vector3D);
    impl_xyz!(euclid::Point3D);
}
