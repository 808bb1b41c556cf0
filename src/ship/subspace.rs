use hashbrown::HashMap;

use crate::math::{FreePoint, FreeVector};

/// Identifies an entity managed by the host engine.
///
/// This crate never owns entity lifecycle; the id is opaque and is whatever
/// the host uses to key its entity storage.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityId(pub u64);

/// One entity's recorded pose and velocity in a ship's local reference
/// frame, as of the last tick on which the attachment held.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct SubspaceRecord {
    /// Entity position in ship-local coordinates.
    pub local_position: FreePoint,
    /// Entity look direction in ship-local coordinates.
    pub local_look: FreeVector,
    /// Entity velocity in ship-local coordinates.
    pub local_velocity: FreeVector,
    /// Whether this attachment was explicitly forced by a collaborator, and
    /// therefore must survive until explicitly released — even if the entity
    /// leaves the ship's bounds.
    pub forced: bool,
}

impl SubspaceRecord {
    fn placeholder() -> Self {
        Self {
            local_position: FreePoint::origin(),
            local_look: FreeVector::zero(),
            local_velocity: FreeVector::zero(),
            forced: false,
        }
    }
}

/// The set of entities currently attached to one ship's local reference
/// frame, with their recorded local-space snapshots.
#[derive(Debug, Default)]
pub struct Subspace {
    records: HashMap<EntityId, SubspaceRecord>,
}

impl Subspace {
    /// Creates an empty subspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or overwrites the entity's local-space snapshot. Called once
    /// per tick for every entity currently resolved as attached.
    ///
    /// The `forced` flag of an existing record is preserved; recording is
    /// about pose, forcing is a separate operation.
    pub fn record_attachment(
        &mut self,
        entity: EntityId,
        local_position: FreePoint,
        local_look: FreeVector,
        local_velocity: FreeVector,
    ) {
        let record = self
            .records
            .entry(entity)
            .or_insert_with(SubspaceRecord::placeholder);
        record.local_position = local_position;
        record.local_look = local_look;
        record.local_velocity = local_velocity;
    }

    /// Removes the entity's record. Not permitted (and a no-op, returning
    /// `false`) while the attachment is forced.
    pub fn detach(&mut self, entity: EntityId) -> bool {
        match self.records.get(&entity) {
            Some(record) if !record.forced => {
                self.records.remove(&entity);
                true
            }
            _ => false,
        }
    }

    /// The entity's current record, if it is attached.
    #[inline]
    pub fn record(&self, entity: EntityId) -> Option<&SubspaceRecord> {
        self.records.get(&entity)
    }

    /// Iterates over all attached entities.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records.keys().copied()
    }

    /// Number of attached entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no entities are attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sets or clears the forced flag, creating a placeholder record when
    /// forcing an entity that has no snapshot yet (it will be filled in on
    /// the next recorded tick).
    pub(crate) fn set_forced(&mut self, entity: EntityId, forced: bool) {
        if forced {
            self.records
                .entry(entity)
                .or_insert_with(SubspaceRecord::placeholder)
                .forced = true;
        } else if let Some(record) = self.records.get_mut(&entity) {
            record.forced = false;
        }
    }

    /// Removes every non-forced record whose entity fails `keep`.
    pub(crate) fn prune(&mut self, mut keep: impl FnMut(EntityId, &SubspaceRecord) -> bool) {
        self.records
            .retain(|&entity, record| record.forced || keep(entity, record));
    }
}
