//! Interception of the host engine's entity-movement step.
//!
//! The host calls [`intercept_move`] instead of its own movement primitive.
//! When the moving entity is not on any ship, the call is delegated straight
//! back through [`MovementHost::try_move`] — the overwhelmingly common case.
//! When a ship owns the entity's position, the proposed motion is resolved
//! against that ship's voxel field in ship-local space, and the result is
//! applied through [`MovementHost::apply_resolved`], with the entity's
//! subspace record updated afterwards.

use crate::math::{Aab, FreePoint, FreeVector};
use crate::physics::{Contact, resolve_displacement};
use crate::ship::{EntityId, ShipId, ShipRegistry};

/// Movement primitive supplied by the host engine.
///
/// Both methods move the entity by a world-space displacement and report
/// what happened; they differ in whether the host runs its own collision
/// checking.
pub trait MovementHost {
    /// The host's default, unmodified movement behavior, collision checking
    /// included. Called when no ship is involved.
    fn try_move(&mut self, entity: EntityId, delta: FreeVector) -> MovementOutcome;

    /// Applies a displacement that has already been collision-resolved;
    /// the host must not re-check collision for this call.
    fn apply_resolved(&mut self, entity: EntityId, delta: FreeVector) -> MovementOutcome;
}

/// What a movement primitive call did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementOutcome {
    /// World-space displacement actually applied.
    pub displacement: FreeVector,
    /// Whether the entity ended the move standing on a surface.
    pub on_ground: bool,
    /// Whether any axis of the motion was obstructed.
    pub colliding: bool,
    /// The ship whose frame handled the motion, if any.
    pub ship: Option<ShipId>,
}

impl MovementOutcome {
    /// Convenience constructor for an unobstructed move of exactly `delta`.
    #[inline]
    pub fn unobstructed(delta: FreeVector) -> Self {
        Self {
            displacement: delta,
            on_ground: false,
            colliding: false,
            ship: None,
        }
    }
}

/// The moving entity's current state and proposed motion, read from the
/// host's entity storage by the caller. This crate never owns entity
/// lifecycle.
#[derive(Clone, Copy, Debug)]
pub struct EntityMotion {
    /// Current world position (feet position; ship ownership is resolved
    /// against this point).
    pub position: FreePoint,
    /// Current world look direction.
    pub look: FreeVector,
    /// Current world velocity.
    pub velocity: FreeVector,
    /// Collision box, relative to `position`.
    pub collision_box: Aab,
    /// Proposed world-space displacement for this movement step.
    pub delta: FreeVector,
}

/// Runs one entity movement step, redirecting collision resolution through
/// a ship's local voxel space when a ship owns the entity's position.
///
/// Equivalent to [`intercept_move_with`] with contacts discarded.
pub fn intercept_move<H: MovementHost + ?Sized>(
    registry: &mut ShipRegistry,
    host: &mut H,
    entity: EntityId,
    motion: EntityMotion,
) -> MovementOutcome {
    intercept_move_with(registry, host, entity, motion, |_, _| {})
}

/// [`intercept_move`], additionally reporting each ship-local collision
/// contact through `contact_callback` so collaborators can trigger surface
/// effects.
pub fn intercept_move_with<H, CC>(
    registry: &mut ShipRegistry,
    host: &mut H,
    entity: EntityId,
    motion: EntityMotion,
    mut contact_callback: CC,
) -> MovementOutcome
where
    H: MovementHost + ?Sized,
    CC: FnMut(ShipId, Contact),
{
    // LOOKUP. A forced attachment pins the frame regardless of momentary
    // position; otherwise, ownership follows the feet position.
    let ship_id = registry
        .forced_ship_of(entity)
        .or_else(|| registry.ship_owning(motion.position));
    let Some(ship_id) = ship_id else {
        return host.try_move(entity, motion.delta);
    };
    let Some(state) = registry.ship(ship_id) else {
        // A forced attachment may only name a registered ship, but don't
        // let a broken caller turn that into a stuck entity.
        return host.try_move(entity, motion.delta);
    };

    // Collision always uses the authoritative tick-boundary pose, never the
    // interpolated one.
    let transform = state.transforms().current();

    // TRANSFORM_IN: the entity's world-axis-aligned box becomes a rotated
    // box in ship space; resolve against its enclosing axis-aligned box.
    let world_box = motion.collision_box.translate(motion.position.to_vector());
    let corners = world_box
        .corner_points()
        .map(|corner| transform.world_to_local(corner));
    let Some(local_box) = Aab::from_points(corners) else {
        return host.try_move(entity, motion.delta);
    };
    let local_delta = transform.world_direction_to_local(motion.delta);

    // RESOLVE.
    let resolved = resolve_displacement(state.field(), local_box, local_delta, |contact| {
        contact_callback(ship_id, contact)
    });

    // TRANSFORM_OUT.
    let world_delta = transform.local_direction_to_world(resolved.displacement);
    log::trace!(
        "entity {entity:?} motion intercepted by ship {ship_id:?}: {:?} -> {world_delta:?}",
        motion.delta,
    );

    // COMMIT: collision is already resolved, so the host applies the
    // displacement without re-checking.
    let applied = host.apply_resolved(entity, world_delta);

    let new_position = motion.position + applied.displacement;
    registry.record_attachment(
        ship_id,
        entity,
        transform.world_to_local(new_position),
        transform.world_direction_to_local(motion.look),
        transform.world_direction_to_local(motion.velocity),
    );

    MovementOutcome {
        displacement: applied.displacement,
        on_ground: resolved.on_ground,
        colliding: resolved.colliding,
        ship: Some(ship_id),
    }
}
