//! Algorithms for collision detection between moving boxes and a ship's
//! voxel field.

use hashbrown::HashSet;

use super::{DISPLACEMENT_MAGNITUDE_LIMIT, DISPLACEMENT_MAGNITUDE_LIMIT_SQUARED, POSITION_EPSILON};
use crate::math::{Aab, Axis, Cube, CubeFace, FreeCoordinate, FreeVector, GridAab};

/// An individual collision contact.
pub type Contact = CubeFace;

/// How a voxel of a [`VoxelField`] behaves when a moving body intersects it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum VoxelCollision {
    /// The voxel has no collision shape; bodies pass through freely.
    #[default]
    None,
    /// The voxel is a solid obstacle filling its unit cube.
    Hard,
}

/// Abstraction over the per-ship voxel grids that collision detection can
/// query.
///
/// Implemented by the surrounding voxel-storage system; this crate only ever
/// reads it.
pub trait VoxelField {
    /// Bounds outside which every cube must be empty.
    fn bounds(&self) -> GridAab;

    /// Retrieve the collision behavior of the given cube.
    /// Must return [`VoxelCollision::None`] for out-of-bounds cubes.
    fn collision(&self, cube: Cube) -> VoxelCollision;
}

impl core::fmt::Debug for dyn VoxelField + Send + Sync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "VoxelField({:?})", self.bounds())
    }
}

/// Result of [`resolve_displacement`]: the displacement that was actually
/// possible, in the same (ship-local) coordinates as the request.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct ResolvedMotion {
    /// The clamped displacement.
    pub displacement: FreeVector,
    /// Whether downward motion was obstructed; the body is standing on
    /// something.
    pub on_ground: bool,
    /// Whether any axis of the displacement was obstructed.
    pub colliding: bool,
}

/// Returns an iterator over all cubes in `field` which are solid and
/// intersect `aab`.
pub fn find_colliding_cubes<'a>(
    field: &'a (dyn VoxelField + 'a),
    aab: Aab,
) -> impl Iterator<Item = Cube> + 'a {
    aab.round_up_to_grid()
        .interior_iter()
        .filter(move |&cube| field.collision(cube) == VoxelCollision::Hard)
}

/// Moves `collision_box` by `displacement` through `field`, clamping each
/// axis of the motion at the first solid cube it would enter. Axes are
/// resolved in the order Y, X, Z, so a falling body lands before it slides.
///
/// Cubes the box intersects *before* moving are ignored: a body that finds
/// itself embedded is allowed to stay or leave under its own motion, but is
/// never pushed out or ejected, and resolution never fails — the worst case
/// is zero displacement on an obstructed axis.
///
/// `collision_callback` is called once for each cube the motion is clamped
/// against — any one of them would have been sufficient to stop that axis,
/// but all are reported.
pub fn resolve_displacement<CC>(
    field: &dyn VoxelField,
    collision_box: Aab,
    displacement: FreeVector,
    mut collision_callback: CC,
) -> ResolvedMotion
where
    CC: FnMut(Contact),
{
    // An unboundedly long displacement would make the swept volume
    // unboundedly expensive to scan.
    let displacement = if displacement.square_length() > DISPLACEMENT_MAGNITUDE_LIMIT_SQUARED {
        displacement.normalize() * DISPLACEMENT_MAGNITUDE_LIMIT
    } else {
        displacement
    };

    let mut moved_box = collision_box;
    let mut resolved = FreeVector::zero();
    let mut on_ground = false;
    let mut colliding = false;

    for axis in [Axis::Y, Axis::X, Axis::Z] {
        let requested = displacement[axis];
        let allowed = sweep_axis(field, moved_box, axis, requested, &mut collision_callback);
        if allowed != requested {
            colliding = true;
            if axis == Axis::Y && requested < 0.0 {
                on_ground = true;
            }
        }
        resolved[axis] = allowed;
        let mut step = FreeVector::zero();
        step[axis] = allowed;
        moved_box = moved_box.translate(step);
    }

    ResolvedMotion {
        displacement: resolved,
        on_ground,
        colliding,
    }
}

/// Clamps motion of `aab` along one axis against the solid cubes the swept
/// box would enter, and reports the contacts that did the clamping.
fn sweep_axis(
    field: &dyn VoxelField,
    aab: Aab,
    axis: Axis,
    requested: FreeCoordinate,
    collision_callback: &mut dyn FnMut(Contact),
) -> FreeCoordinate {
    if requested == 0.0 {
        return 0.0;
    }

    // Cubes the box overlaps before this axis moves. The box is allowed to
    // leave them; pretend they don't exist.
    let already_colliding: HashSet<Cube> = find_colliding_cubes(field, aab).collect();

    let positive = requested > 0.0;
    let mut step = FreeVector::zero();
    step[axis] = requested;
    let swept = aab.union(aab.translate(step));

    // Which face of an obstacle cube the motion runs into.
    let contact_face = if positive {
        axis.negative_face()
    } else {
        axis.positive_face()
    };
    let leading = if positive {
        aab.upper_bounds_p()[axis]
    } else {
        aab.lower_bounds_p()[axis]
    };

    let mut allowed = requested;
    let mut obstacles: Vec<(FreeCoordinate, Cube)> = Vec::new();

    for cube in swept.round_up_to_grid().interior_iter() {
        if field.collision(cube) != VoxelCollision::Hard {
            continue;
        }
        if already_colliding.contains(&cube) {
            continue;
        }
        // Distance from the leading face to the obstructing plane of this
        // cube, minus a small separation; clamped so the box never moves
        // backward (no ejection of embedded bodies).
        let allowed_here = if positive {
            let plane = FreeCoordinate::from(cube.lower_bounds()[axis]);
            (plane - leading - POSITION_EPSILON).max(0.0)
        } else {
            let plane = FreeCoordinate::from(cube.upper_bounds()[axis]);
            (plane - leading + POSITION_EPSILON).min(0.0)
        };
        if allowed_here.abs() < requested.abs() {
            obstacles.push((allowed_here, cube));
            if allowed_here.abs() < allowed.abs() {
                allowed = allowed_here;
            }
        }
    }

    if allowed != requested {
        // Report every cube that independently clamps to the final distance.
        for &(allowed_here, cube) in &obstacles {
            if (allowed_here - allowed).abs() <= POSITION_EPSILON {
                collision_callback(Contact::new(cube, contact_face));
            }
        }
    }

    allowed
}
