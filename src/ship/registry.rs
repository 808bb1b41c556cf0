use std::sync::Arc;

use hashbrown::HashMap;

use crate::math::{
    Aab, Cube, FreeCoordinate, FreePoint, FreeVector, GridAab, GridCoordinate, ShipTransform, Tick,
};
use crate::physics::VoxelField;
use crate::ship::{EntityId, Subspace, SubspaceRecord, TransformBuffer, TransformSampler};

/// Identifies a registered ship.
///
/// Ids are assigned from a monotonically increasing counter, so ordering by
/// id is ordering by creation time; that ordering is used as the
/// deterministic tie-break when a point lies inside two ships at once.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShipId(u64);

/// Ways that forcing an attachment can fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AttachmentError {
    /// The entity's frame is already pinned to a different ship; the
    /// existing attachment remains in effect.
    #[error("entity {entity:?} is already force-attached to ship {ship:?}")]
    AlreadyForced {
        /// The entity whose frame was to be pinned.
        entity: EntityId,
        /// The ship it is already pinned to.
        ship: ShipId,
    },
    /// The named ship is not registered.
    #[error("{0:?} is not a registered ship")]
    UnknownShip(ShipId),
}

/// Edge length, in world units, of one cell of the spatial index mapping
/// world positions to candidate ships.
const INDEX_CELL_SIZE: FreeCoordinate = 16.0;

/// Everything this crate knows about one live ship: its double-buffered
/// pose, its attached entities, and a read-only handle to its voxel field.
///
/// Created by [`ShipRegistry::register_ship`] and destroyed by
/// [`ShipRegistry::unregister_ship`].
#[derive(Debug)]
pub struct ShipPhysicsState {
    id: ShipId,
    transforms: TransformBuffer,
    subspace: Subspace,
    field: Arc<dyn VoxelField + Send + Sync>,
    /// Transform queued to become current on the next
    /// [`ShipRegistry::advance_all_transforms`]. Last write per tick wins.
    pending_transform: Option<ShipTransform>,
    /// The index cells this ship currently occupies.
    indexed_cells: GridAab,
}

impl ShipPhysicsState {
    /// This ship's id.
    #[inline]
    pub fn id(&self) -> ShipId {
        self.id
    }

    /// This ship's double-buffered pose.
    #[inline]
    pub fn transforms(&self) -> &TransformBuffer {
        &self.transforms
    }

    /// Creates a render-thread handle for sampling this ship's interpolated
    /// pose.
    #[inline]
    pub fn sampler(&self) -> TransformSampler {
        self.transforms.sampler()
    }

    /// The entities attached to this ship's reference frame.
    #[inline]
    pub fn subspace(&self) -> &Subspace {
        &self.subspace
    }

    /// This ship's voxel field.
    #[inline]
    pub fn field(&self) -> &dyn VoxelField {
        &*self.field
    }

    /// Queues the pose this ship should have after the next tick
    /// advancement. Called by the surrounding ship-dynamics system.
    pub fn push_transform(&mut self, new_transform: ShipTransform) {
        self.pending_transform = Some(new_transform);
    }

    /// The world-space axis-aligned box enclosing this ship's voxel bounds
    /// under the given pose.
    fn world_bounds(&self, transform: &ShipTransform) -> Aab {
        let local = self.field.bounds().to_free();
        Aab::from_points(local.corner_points().map(|p| transform.local_to_world(p)))
            .unwrap_or(Aab::ZERO)
    }

    /// Whether the given world point lies within this ship's voxel bounds
    /// under its current pose.
    pub fn contains_world_point(&self, point: FreePoint) -> bool {
        let local = self.transforms.current().world_to_local(point);
        self.field.bounds().to_free().contains(local)
    }
}

/// The single source of truth for which ships exist and which ship owns any
/// given world position.
///
/// This is an explicit context object: collaborators receive a reference to
/// it at construction time, and its lifetime is tied to the world/session.
/// All mutation happens on the simulation thread.
#[derive(Debug, Default)]
pub struct ShipRegistry {
    ships: HashMap<ShipId, ShipPhysicsState>,
    /// Coarse spatial index: cell → ids of ships whose world bounds touch
    /// that cell, kept sorted ascending. Rebuilt incrementally as ships
    /// move.
    index: HashMap<Cube, Vec<ShipId>>,
    /// Process-wide forced attachments: at most one per entity.
    forced: HashMap<EntityId, ShipId>,
    next_id: u64,
}

impl ShipRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings a ship into existence with the given voxel field and initial
    /// pose, and returns its id.
    pub fn register_ship(
        &mut self,
        field: Arc<dyn VoxelField + Send + Sync>,
        initial_transform: ShipTransform,
    ) -> ShipId {
        let id = ShipId(self.next_id);
        self.next_id += 1;

        let state = ShipPhysicsState {
            id,
            transforms: TransformBuffer::new(initial_transform),
            subspace: Subspace::new(),
            field,
            pending_transform: None,
            indexed_cells: GridAab::from_lower_upper([0, 0, 0], [0, 0, 0]),
        };
        let cells = index_cells(state.world_bounds(&initial_transform));
        self.ships.insert(id, state);
        self.set_indexed_cells(id, cells);

        log::debug!("registered ship {id:?}");
        id
    }

    /// Destroys a ship. All of its subspace records' forced flags are
    /// cleared first, so no forced attachment ever dangles; then the voxel
    /// field handle is released.
    ///
    /// Returns `false` if no such ship was registered.
    pub fn unregister_ship(&mut self, id: ShipId) -> bool {
        let Some(state) = self.ships.remove(&id) else {
            return false;
        };
        // Forced attachments must never dangle; the subspace records
        // themselves die with the state.
        self.forced.retain(|_, &mut forced_ship| forced_ship != id);
        for cell in state.indexed_cells.interior_iter() {
            remove_from_cell(&mut self.index, cell, id);
        }
        log::debug!("unregistered ship {id:?}");
        true
    }

    /// The state of the given ship, if it is registered.
    #[inline]
    pub fn ship(&self, id: ShipId) -> Option<&ShipPhysicsState> {
        self.ships.get(&id)
    }

    /// Mutable state of the given ship, if it is registered.
    #[inline]
    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut ShipPhysicsState> {
        self.ships.get_mut(&id)
    }

    /// Iterates over all live ships in unspecified order.
    pub fn ships(&self) -> impl Iterator<Item = &ShipPhysicsState> {
        self.ships.values()
    }

    /// Which ship owns the given world position, if any.
    ///
    /// When the point lies inside two ships' bounds at once (adjacent
    /// ships), the lowest id — the earliest-created ship — wins, for
    /// determinism.
    pub fn ship_owning(&self, position: FreePoint) -> Option<ShipId> {
        let candidates = self.index.get(&cell_containing(position))?;
        // Candidates are sorted ascending, so the first hit is the winner.
        candidates
            .iter()
            .copied()
            .find(|&id| self.ships[&id].contains_world_point(position))
    }

    /// The ship the entity's frame is currently force-attached to, if any.
    #[inline]
    pub fn forced_ship_of(&self, entity: EntityId) -> Option<ShipId> {
        self.forced.get(&entity).copied()
    }

    /// Pins the entity's reference frame to the given ship until
    /// [`ShipRegistry::release_forced`] (or ship destruction).
    ///
    /// Fails with [`AttachmentError::AlreadyForced`] if the entity is
    /// already pinned to a different ship — the existing pin stays in
    /// effect. Re-forcing the same ship is a no-op.
    pub fn force_attachment(
        &mut self,
        entity: EntityId,
        ship: ShipId,
    ) -> Result<(), AttachmentError> {
        if !self.ships.contains_key(&ship) {
            return Err(AttachmentError::UnknownShip(ship));
        }
        match self.forced.get(&entity) {
            Some(&existing) if existing != ship => Err(AttachmentError::AlreadyForced {
                entity,
                ship: existing,
            }),
            Some(_) => Ok(()),
            None => {
                self.forced.insert(entity, ship);
                if let Some(state) = self.ships.get_mut(&ship) {
                    state.subspace.set_forced(entity, true);
                }
                Ok(())
            }
        }
    }

    /// Releases the entity's forced attachment, if it has one. Returns
    /// whether anything was released.
    pub fn release_forced(&mut self, entity: EntityId) -> bool {
        let Some(ship) = self.forced.remove(&entity) else {
            return false;
        };
        if let Some(state) = self.ships.get_mut(&ship) {
            state.subspace.set_forced(entity, false);
        }
        true
    }

    /// Pins the entity's frame to `ship` for the duration of `operation`,
    /// releasing it on every exit path — normal return or unwind — so an
    /// error in the middle of, say, processing one movement packet can
    /// never leak a pinned frame.
    ///
    /// Only a pin this scope created is released: if the entity was already
    /// pinned to `ship` when the scope began, that pre-existing pin is left
    /// in effect on exit.
    pub fn with_forced_frame<R>(
        &mut self,
        entity: EntityId,
        ship: ShipId,
        operation: impl FnOnce(&mut ShipRegistry) -> R,
    ) -> Result<R, AttachmentError> {
        let already_pinned = self.forced_ship_of(entity) == Some(ship);
        self.force_attachment(entity, ship)?;
        let mut registry = scopeguard::guard(self, move |registry| {
            if !already_pinned {
                registry.release_forced(entity);
            }
        });
        Ok(operation(&mut **registry))
    }

    /// Creates or overwrites the entity's local-space snapshot on the given
    /// ship. Quietly does nothing if the ship is not registered.
    pub fn record_attachment(
        &mut self,
        ship: ShipId,
        entity: EntityId,
        local_position: FreePoint,
        local_look: FreeVector,
        local_velocity: FreeVector,
    ) {
        if let Some(state) = self.ships.get_mut(&ship) {
            state
                .subspace
                .record_attachment(entity, local_position, local_look, local_velocity);
        } else {
            log::debug!("record_attachment for unregistered ship {ship:?}");
        }
    }

    /// The entity's recorded snapshot on whichever ship it is attached to
    /// (forced attachment first, then lowest ship id), together with that
    /// ship's id.
    pub fn attachment_of(&self, entity: EntityId) -> Option<(ShipId, &SubspaceRecord)> {
        if let Some(ship) = self.forced_ship_of(entity) {
            let record = self.ships.get(&ship)?.subspace.record(entity)?;
            return Some((ship, record));
        }
        self.ships
            .iter()
            .filter_map(|(&id, state)| Some((id, state.subspace.record(entity)?)))
            .min_by_key(|&(id, _)| id)
    }

    /// The world-space velocity implied by the entity's recorded local
    /// velocity plus the motion of its frame over the last tick, so that
    /// frame hand-offs report continuous velocities.
    pub fn world_velocity_of(&self, entity: EntityId, tick: Tick) -> Option<FreeVector> {
        let (ship, record) = self.attachment_of(entity)?;
        let pair = self.ships.get(&ship)?.transforms.pair();

        let carried = pair.current.local_direction_to_world(record.local_velocity);
        let dt = tick.delta_t_f64();
        if dt == 0.0 {
            return Some(carried);
        }
        let now = pair.current.local_to_world(record.local_position);
        let before = pair.previous.local_to_world(record.local_position);
        Some(carried + (now - before) / dt)
    }

    /// Advances every live ship's transform buffer by one tick, applying
    /// any queued transform (ships with none keep their current pose), and
    /// incrementally refreshes the spatial index for ships that moved.
    ///
    /// Must be called exactly once per simulation tick. Ships are
    /// independent, so no cross-ship ordering is defined.
    pub fn advance_all_transforms(&mut self) {
        let ids: Vec<ShipId> = self.ships.keys().copied().collect();
        for id in ids {
            let Some(state) = self.ships.get_mut(&id) else {
                continue;
            };
            let new_transform = state
                .pending_transform
                .take()
                .unwrap_or_else(|| state.transforms.current());
            state.transforms.advance(new_transform);

            let cells = index_cells(state.world_bounds(&new_transform));
            if cells != state.indexed_cells {
                self.set_indexed_cells(id, cells);
            }
        }
    }

    /// Detaches every non-forced record whose entity no longer resolves
    /// inside its ship's bounds (or no longer exists). Called once per tick
    /// after movement; `world_position_of` reads the host's entity storage.
    pub fn update_attachments(
        &mut self,
        mut world_position_of: impl FnMut(EntityId) -> Option<FreePoint>,
    ) {
        for state in self.ships.values_mut() {
            let transform = state.transforms.current();
            let local_bounds = state.field.bounds().to_free();
            state.subspace.prune(|entity, _| {
                world_position_of(entity)
                    .is_some_and(|position| local_bounds.contains(transform.world_to_local(position)))
            });
        }
    }

    /// Replaces the set of index cells the ship occupies.
    fn set_indexed_cells(&mut self, id: ShipId, cells: GridAab) {
        let Some(state) = self.ships.get_mut(&id) else {
            return;
        };
        for cell in state.indexed_cells.interior_iter() {
            remove_from_cell(&mut self.index, cell, id);
        }
        for cell in cells.interior_iter() {
            let bucket = self.index.entry(cell).or_default();
            if let Err(position) = bucket.binary_search(&id) {
                bucket.insert(position, id);
            }
        }
        state.indexed_cells = cells;
    }
}

/// The index cell containing a world position.
fn cell_containing(position: FreePoint) -> Cube {
    Cube::new(
        (position.x / INDEX_CELL_SIZE).floor() as GridCoordinate,
        (position.y / INDEX_CELL_SIZE).floor() as GridCoordinate,
        (position.z / INDEX_CELL_SIZE).floor() as GridCoordinate,
    )
}

/// The box of index cells a world-space bounding box touches.
fn index_cells(world_bounds: Aab) -> GridAab {
    let lower = world_bounds.lower_bounds_p();
    let upper = world_bounds.upper_bounds_p();
    GridAab::from_lower_upper(
        lower.map(|c| (c / INDEX_CELL_SIZE).floor() as GridCoordinate),
        upper.map(|c| (c / INDEX_CELL_SIZE).floor() as GridCoordinate + 1),
    )
}

fn remove_from_cell(index: &mut HashMap<Cube, Vec<ShipId>>, cell: Cube, id: ShipId) {
    if let Some(bucket) = index.get_mut(&cell) {
        bucket.retain(|&other| other != id);
        if bucket.is_empty() {
            index.remove(&cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rotation;
    use crate::physics::VoxelCollision;
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct BoxField(GridAab);

    impl VoxelField for BoxField {
        fn bounds(&self) -> GridAab {
            self.0
        }
        fn collision(&self, cube: Cube) -> VoxelCollision {
            if self.0.contains_cube(cube) {
                VoxelCollision::Hard
            } else {
                VoxelCollision::None
            }
        }
    }

    fn hull() -> Arc<BoxField> {
        Arc::new(BoxField(GridAab::from_lower_upper([-2, -2, -2], [2, 2, 2])))
    }

    fn transform_at(x: FreeCoordinate) -> ShipTransform {
        ShipTransform::new(
            point3(x, 0.0, 0.0),
            Rotation::identity(),
            FreePoint::origin(),
        )
    }

    #[test]
    fn ownership_follows_position() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        assert_eq!(registry.ship_owning(point3(0.5, 0.5, 0.5)), Some(ship));
        assert_eq!(registry.ship_owning(point3(100.0, 0.5, 0.5)), None);
    }

    #[test]
    fn overlapping_ships_prefer_earliest() {
        let mut registry = ShipRegistry::new();
        let first = registry.register_ship(hull(), transform_at(0.0));
        let second = registry.register_ship(hull(), transform_at(1.0));
        let point = point3(0.5, 0.5, 0.5); // inside both hulls

        assert_eq!(registry.ship_owning(point), Some(first));
        assert!(registry.unregister_ship(first));
        assert_eq!(registry.ship_owning(point), Some(second));
    }

    #[test]
    fn index_follows_advanced_transforms() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));

        registry.ship_mut(ship).unwrap().push_transform(transform_at(100.0));
        registry.advance_all_transforms();

        assert_eq!(registry.ship_owning(point3(100.0, 0.0, 0.0)), Some(ship));
        assert_eq!(registry.ship_owning(point3(0.0, 0.0, 0.0)), None);
        // A ship with nothing queued keeps its pose on later ticks.
        registry.advance_all_transforms();
        assert_eq!(
            registry.ship(ship).unwrap().transforms().current(),
            transform_at(100.0)
        );
    }

    #[test]
    fn forcing_rules() {
        let mut registry = ShipRegistry::new();
        let entity = EntityId(1);

        assert_eq!(
            registry.force_attachment(entity, ShipId(999)),
            Err(AttachmentError::UnknownShip(ShipId(999)))
        );

        let a = registry.register_ship(hull(), transform_at(0.0));
        let b = registry.register_ship(hull(), transform_at(50.0));

        assert_eq!(registry.force_attachment(entity, a), Ok(()));
        assert_eq!(registry.force_attachment(entity, a), Ok(()), "re-forcing is a no-op");
        assert_eq!(
            registry.force_attachment(entity, b),
            Err(AttachmentError::AlreadyForced { entity, ship: a })
        );

        assert!(registry.release_forced(entity));
        assert!(!registry.release_forced(entity));
        assert_eq!(registry.force_attachment(entity, b), Ok(()));
        assert_eq!(registry.forced_ship_of(entity), Some(b));
    }

    #[test]
    fn unregistering_clears_forced_attachments() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let entity = EntityId(1);
        registry.force_attachment(entity, ship).unwrap();

        assert!(registry.unregister_ship(ship));
        assert_eq!(registry.forced_ship_of(entity), None);
        assert!(!registry.release_forced(entity));
    }

    #[test]
    fn forced_frame_released_on_unwind() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let entity = EntityId(1);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry
                .with_forced_frame(entity, ship, |registry| {
                    assert_eq!(registry.forced_ship_of(entity), Some(ship));
                    panic!("boom");
                })
                .unwrap()
        }));
        assert!(result.is_err());
        assert_eq!(registry.forced_ship_of(entity), None);
    }

    #[test]
    fn forced_frame_released_on_return() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let entity = EntityId(1);

        let value = registry
            .with_forced_frame(entity, ship, |registry| {
                assert_eq!(registry.forced_ship_of(entity), Some(ship));
                42
            })
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(registry.forced_ship_of(entity), None);
    }

    #[test]
    fn nested_forced_frame_leaves_outer_pin_in_place() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let entity = EntityId(1);
        registry.force_attachment(entity, ship).unwrap();

        registry
            .with_forced_frame(entity, ship, |registry| {
                assert_eq!(registry.forced_ship_of(entity), Some(ship));
            })
            .unwrap();

        assert_eq!(
            registry.forced_ship_of(entity),
            Some(ship),
            "pre-existing pin must survive the scope"
        );
        assert!(registry.release_forced(entity));
    }

    #[test]
    fn update_attachments_prunes_departed_entities() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let inside = EntityId(1);
        let departed = EntityId(2);
        let pinned = EntityId(3);

        for entity in [inside, departed, pinned] {
            registry.record_attachment(
                ship,
                entity,
                FreePoint::origin(),
                vec3(0.0, 0.0, 1.0),
                FreeVector::zero(),
            );
        }
        registry.force_attachment(pinned, ship).unwrap();

        registry.update_attachments(|entity| match entity {
            EntityId(1) => Some(point3(0.5, 0.5, 0.5)),
            _ => None,
        });

        let subspace = registry.ship(ship).unwrap().subspace();
        assert!(subspace.record(inside).is_some());
        assert!(subspace.record(departed).is_none());
        assert!(subspace.record(pinned).is_some(), "forced records survive");
    }

    #[test]
    fn world_velocity_includes_frame_motion() {
        let mut registry = ShipRegistry::new();
        let ship = registry.register_ship(hull(), transform_at(0.0));
        let entity = EntityId(1);
        // Recording against an unknown ship is quietly ignored.
        registry.record_attachment(
            ShipId(999),
            entity,
            FreePoint::origin(),
            FreeVector::zero(),
            FreeVector::zero(),
        );
        registry.record_attachment(
            ship,
            entity,
            FreePoint::origin(),
            vec3(0.0, 0.0, 1.0),
            vec3(0.0, 0.0, 1.0),
        );

        registry.ship_mut(ship).unwrap().push_transform(transform_at(1.0));
        registry.advance_all_transforms();

        let velocity = registry
            .world_velocity_of(entity, Tick::from_seconds(0.5))
            .unwrap();
        // Local velocity carried into world space plus one tick of frame
        // motion: (1, 0, 0) over 0.5 s.
        assert_eq!(velocity, vec3(2.0, 0.0, 1.0));
    }
}
