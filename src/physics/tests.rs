//! Tests spanning collision resolution and movement interception.

use std::sync::Arc;

use euclid::{Angle, point3, vec3};
use pretty_assertions::assert_eq;

use crate::math::{Aab, Cube, Face6, FreePoint, FreeVector, GridAab, Rotation, ShipTransform};
use crate::physics::{
    Contact, EntityMotion, MovementHost, MovementOutcome, VoxelCollision, VoxelField,
    find_colliding_cubes, intercept_move, intercept_move_with, resolve_displacement,
};
use crate::ship::{EntityId, ShipId, ShipRegistry};

/// Voxel field that is solid everywhere within its bounds.
#[derive(Debug)]
struct Slab(GridAab);

impl VoxelField for Slab {
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

/// Voxel field with a solid floor at local `y = -1` and walkable air above
/// it up to the bounds' ceiling.
#[derive(Debug)]
struct Deck(GridAab);

impl VoxelField for Deck {
    fn bounds(&self) -> GridAab {
        self.0
    }
    fn collision(&self, cube: Cube) -> VoxelCollision {
        if cube.y == -1 && self.0.contains_cube(cube) {
            VoxelCollision::Hard
        } else {
            VoxelCollision::None
        }
    }
}

/// A deck wide enough that bodies in these tests never reach its edge.
fn floor() -> Deck {
    Deck(GridAab::from_lower_upper([-5, -1, -5], [5, 4, 5]))
}

/// A person-shaped collision box, relative to the feet position.
fn person_box() -> Aab {
    Aab::new(-0.3, 0.3, 0.0, 1.8, -0.3, 0.3)
}

/// Host whose single entity is a point teleported by exactly the requested
/// displacement, counting which movement path was taken.
#[derive(Debug, Default)]
struct TestHost {
    position: FreePoint,
    try_moves: usize,
    applies: usize,
}

impl MovementHost for TestHost {
    fn try_move(&mut self, _entity: EntityId, delta: FreeVector) -> MovementOutcome {
        self.try_moves += 1;
        self.position += delta;
        MovementOutcome::unobstructed(delta)
    }

    fn apply_resolved(&mut self, _entity: EntityId, delta: FreeVector) -> MovementOutcome {
        self.applies += 1;
        self.position += delta;
        MovementOutcome::unobstructed(delta)
    }
}

fn motion_at(position: FreePoint, delta: FreeVector) -> EntityMotion {
    EntityMotion {
        position,
        look: vec3(1.0, 0.0, 0.0),
        velocity: FreeVector::zero(),
        collision_box: person_box(),
        delta,
    }
}

#[test]
fn finds_solid_cubes_under_box() {
    let field = floor();
    let feet = person_box().translate(vec3(0.0, -0.5, 0.0));
    let cubes: Vec<Cube> = find_colliding_cubes(&field, feet).collect();
    assert_eq!(cubes.len(), 4, "{cubes:?}");
    assert!(cubes.iter().all(|cube| cube.y == -1));
}

#[test]
fn fall_is_clamped_at_floor() {
    let field = floor();
    let body = person_box().translate(vec3(0.0, 1.0, 0.0));
    let mut contacts: Vec<Contact> = Vec::new();
    let resolved =
        resolve_displacement(&field, body, vec3(0.0, -5.0, 0.0), |contact| {
            contacts.push(contact);
        });

    assert!(
        (resolved.displacement - vec3(0.0, -1.0, 0.0)).length() < 1e-6,
        "{:?}",
        resolved.displacement
    );
    assert!(resolved.on_ground);
    assert!(resolved.colliding);
    // Every cube under the footprint clamps at the same plane, so all four
    // are reported, by their upward faces.
    assert_eq!(contacts.len(), 4);
    assert!(
        contacts
            .iter()
            .all(|contact| contact.face == Face6::PY && contact.cube.y == -1),
        "{contacts:?}"
    );
}

#[test]
fn standing_still_on_floor() {
    let field = floor();
    // Feet exactly on the floor plane.
    let body = person_box();
    let resolved = resolve_displacement(&field, body, vec3(0.0, -1.0, 0.0), |_| {});
    assert_eq!(resolved.displacement, FreeVector::zero());
    assert!(resolved.on_ground);
}

#[test]
fn lands_before_sliding() {
    let field = floor();
    let body = person_box().translate(vec3(0.0, 0.5, 0.0));
    // Falling and strafing in the same step: the Y axis resolves first, so
    // the horizontal part happens at floor level, unobstructed.
    let resolved = resolve_displacement(&field, body, vec3(2.0, -3.0, 0.0), |_| {});
    assert!((resolved.displacement.y - -0.5).abs() < 1e-6);
    assert_eq!(resolved.displacement.x, 2.0);
    assert!(resolved.on_ground);
}

#[test]
fn embedded_body_may_stay_or_leave_but_is_never_ejected() {
    let field = Slab(GridAab::from_lower_upper([0, 0, 0], [1, 1, 1]));
    let body = Aab::new(0.2, 0.8, 0.2, 0.8, 0.2, 0.8);

    // Leaving under its own motion is unobstructed.
    let out = resolve_displacement(&field, body, vec3(0.0, 0.0, 5.0), |_| {});
    assert_eq!(out.displacement, vec3(0.0, 0.0, 5.0));
    assert!(!out.colliding);

    // Zero motion stays zero; nothing pushes the body out.
    let rest = resolve_displacement(&field, body, FreeVector::zero(), |_| {});
    assert_eq!(rest.displacement, FreeVector::zero());
    assert!(!rest.colliding);
}

#[test]
fn very_long_displacement_is_clamped_not_panicked() {
    let field = Slab(GridAab::from_lower_upper([0, 0, 0], [1, 1, 1]));
    let body = person_box().translate(vec3(20.0, 0.0, 0.0));
    let resolved = resolve_displacement(&field, body, vec3(1e9, 0.0, 0.0), |_| {});
    assert!(resolved.displacement.length() <= 1e5 * 1.000001);
}

#[test]
fn passthrough_without_ship() {
    let mut registry = ShipRegistry::new();
    let mut host = TestHost::default();
    let outcome = intercept_move(
        &mut registry,
        &mut host,
        EntityId(1),
        motion_at(point3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0)),
    );

    assert_eq!(outcome, MovementOutcome::unobstructed(vec3(1.0, 0.0, 0.0)));
    assert_eq!((host.try_moves, host.applies), (1, 0));
}

/// Registers a floor-slab ship at world x = 10, rotated 90° about +y.
fn rotated_floor_ship(registry: &mut ShipRegistry) -> ShipId {
    registry.register_ship(
        Arc::new(floor()),
        ShipTransform::new(
            point3(10.0, 0.0, 0.0),
            Rotation::around_y(Angle::degrees(90.0)),
            FreePoint::origin(),
        ),
    )
}

#[test]
fn fall_onto_rotated_ship() {
    let mut registry = ShipRegistry::new();
    let ship = rotated_floor_ship(&mut registry);
    let mut host = TestHost {
        position: point3(10.0, 1.0, 0.0),
        ..TestHost::default()
    };

    let start = host.position;
    let mut contacts: Vec<(ShipId, Contact)> = Vec::new();
    let outcome = intercept_move_with(
        &mut registry,
        &mut host,
        EntityId(1),
        motion_at(start, vec3(0.0, -5.0, 0.0)),
        |ship, contact| contacts.push((ship, contact)),
    );

    assert_eq!(outcome.ship, Some(ship));
    assert!(outcome.on_ground);
    assert!(outcome.colliding);
    assert!(
        (outcome.displacement - vec3(0.0, -1.0, 0.0)).length() < 1e-6,
        "{:?}",
        outcome.displacement
    );
    assert_eq!((host.try_moves, host.applies), (0, 1));
    assert!((host.position - point3(10.0, 0.0, 0.0)).length() < 1e-6);

    // Contacts are reported in ship-local coordinates.
    assert_eq!(contacts.len(), 4);
    assert!(
        contacts
            .iter()
            .all(|&(s, contact)| s == ship && contact.face == Face6::PY && contact.cube.y == -1),
        "{contacts:?}"
    );

    // The landing also recorded the entity in the ship's frame: feet at the
    // local origin, and the world +x look direction turned into local +z.
    let record = registry
        .ship(ship)
        .unwrap()
        .subspace()
        .record(EntityId(1))
        .unwrap();
    assert!(record.local_position.to_vector().length() < 1e-6);
    assert!((record.local_look - vec3(0.0, 0.0, 1.0)).length() < 1e-6);
}

#[test]
fn unobstructed_motion_survives_the_frame_round_trip() {
    let mut registry = ShipRegistry::new();
    let ship = rotated_floor_ship(&mut registry);
    let mut host = TestHost {
        position: point3(10.0, 1.0, 0.0),
        ..TestHost::default()
    };

    // Walking in the air above the rotated deck: into local coordinates,
    // through an unobstructed resolution, and back out — the world
    // displacement must be preserved, not rotated.
    let start = host.position;
    let outcome = intercept_move(
        &mut registry,
        &mut host,
        EntityId(1),
        motion_at(start, vec3(1.0, 0.0, 0.0)),
    );

    assert_eq!(outcome.ship, Some(ship));
    assert!(!outcome.colliding);
    assert!(
        (outcome.displacement - vec3(1.0, 0.0, 0.0)).length() < 1e-9,
        "{:?}",
        outcome.displacement
    );
}

#[test]
fn forced_attachment_overrides_positional_lookup() {
    let mut registry = ShipRegistry::new();
    let ship = rotated_floor_ship(&mut registry);
    let entity = EntityId(1);
    let mut host = TestHost::default();

    // Far outside the ship's bounds, but pinned to its frame.
    let far = point3(-200.0, 0.0, 0.0);
    registry.force_attachment(entity, ship).unwrap();
    let outcome = intercept_move(
        &mut registry,
        &mut host,
        entity,
        motion_at(far, vec3(0.0, -1.0, 0.0)),
    );
    assert_eq!(outcome.ship, Some(ship));
    assert!(!outcome.colliding, "nothing of the ship is out there");
    assert_eq!((host.try_moves, host.applies), (0, 1));

    registry.release_forced(entity);
    let outcome = intercept_move(
        &mut registry,
        &mut host,
        entity,
        motion_at(far, vec3(0.0, -1.0, 0.0)),
    );
    assert_eq!(outcome.ship, None);
    assert_eq!((host.try_moves, host.applies), (1, 1));
}
