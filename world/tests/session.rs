use std::sync::Arc;

use brickyard_core::{
    catalog, Command, Event, Footprint, GridCell, PieceId, PieceKind, PieceSize, Rotation, Scene,
};
use brickyard_world::{
    self as world,
    occupancy::{footprint_cells, OccupancyIndex},
    placement::can_place,
    query, World,
};
use proptest::prelude::*;

fn brick_2x4() -> Arc<PieceSize> {
    Arc::new(PieceSize::new(2, 4, PieceKind::Brick))
}

fn plate_2x2() -> Arc<PieceSize> {
    Arc::new(PieceSize::new(2, 2, PieceKind::Plate))
}

fn place(world: &mut World, size: &Arc<PieceSize>, rotation: Rotation, anchor: GridCell) -> bool {
    world.select_piece(Arc::clone(size));
    while query::tool(world).rotation() != rotation {
        let _ = world.rotate_clockwise();
    }
    world.place_piece(anchor)
}

#[test]
fn overlapping_brick_is_rejected() {
    let mut world = World::new();
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(0, 0, 0)));

    let footprint = footprint_cells(GridCell::new(0, 0, 0), &brick_2x4(), Rotation::Deg0);
    assert_eq!(footprint.cells().count(), 24);
    assert_eq!(query::occupancy(&world).len(), 24);

    assert!(!can_place(
        query::occupancy(&world),
        GridCell::new(1, 0, 0),
        &brick_2x4(),
        Rotation::Deg0
    ));
    assert!(!place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(1, 0, 0)));
    assert_eq!(query::pieces(&world).len(), 1);
}

#[test]
fn rotated_brick_leaves_room_behind_it() {
    let mut world = World::new();
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg90, GridCell::new(0, 0, 0)));

    let occupancy = query::occupancy(&world);
    assert!(occupancy.is_occupied(GridCell::new(3, 0, 1)));
    assert!(!occupancy.is_occupied(GridCell::new(0, 0, 2)));

    let square = Arc::new(PieceSize::new(2, 2, PieceKind::Brick));
    assert!(place(&mut world, &square, Rotation::Deg0, GridCell::new(0, 0, 2)));
}

#[test]
fn plate_stacks_on_top_of_brick_but_not_inside_it() {
    let mut world = World::new();
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(0, 0, 0)));
    let top = query::pieces(&world)[0].top_layer();
    assert_eq!(top, 3);

    assert!(!place(&mut world, &plate_2x2(), Rotation::Deg0, GridCell::new(0, 2, 0)));
    assert!(place(&mut world, &plate_2x2(), Rotation::Deg0, GridCell::new(0, top, 0)));
}

#[test]
fn unknown_removal_leaves_state_unchanged() {
    let mut world = World::new();
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(0, 0, 0)));
    let pieces_before = query::pieces(&world).to_vec();
    let occupancy_before = query::occupancy(&world).clone();

    assert!(world.remove_piece(PieceId::new(1234)).is_none());

    assert_eq!(query::pieces(&world), pieces_before.as_slice());
    assert_eq!(query::occupancy(&world), &occupancy_before);
}

#[test]
fn removal_frees_cells_for_new_pieces() {
    let mut world = World::new();
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(0, 0, 0)));
    let id = query::pieces(&world)[0].id;
    let mut events = Vec::new();

    world::apply(&mut world, Command::RemovePiece { piece: id }, &mut events);

    assert_eq!(
        events,
        vec![Event::PieceRemoved {
            piece: id,
            footprint: Footprint::from_anchor_and_dimensions(GridCell::new(0, 0, 0), 2, 3, 4),
        }]
    );
    assert!(query::occupancy(&world).is_empty());
    assert!(place(&mut world, &brick_2x4(), Rotation::Deg0, GridCell::new(1, 0, 0)));
}

#[test]
fn save_and_load_preserve_future_placement_legality() {
    let mut original = World::new();
    assert!(place(&mut original, &brick_2x4(), Rotation::Deg0, GridCell::new(0, 0, 0)));
    assert!(place(&mut original, &plate_2x2(), Rotation::Deg0, GridCell::new(0, 3, 0)));
    assert!(place(&mut original, &brick_2x4(), Rotation::Deg90, GridCell::new(6, 0, 6)));

    let restored = World::from_scene(query::scene(&original));

    assert_eq!(query::occupancy(&restored), query::occupancy(&original));
    let probe = catalog::find_by_part("3003").expect("2×2 brick");
    for x in 0..12 {
        for y in 0..5 {
            for z in 0..12 {
                let anchor = GridCell::new(x, y, z);
                assert_eq!(
                    can_place(query::occupancy(&restored), anchor, &probe, Rotation::Deg0),
                    can_place(query::occupancy(&original), anchor, &probe, Rotation::Deg0),
                    "legality diverged at {anchor}"
                );
            }
        }
    }
}

#[test]
fn loaded_scene_allocates_fresh_identifiers() {
    let mut original = World::new();
    assert!(original.place_piece(GridCell::new(0, 0, 0)));
    assert!(original.place_piece(GridCell::new(5, 0, 5)));
    let mut restored = World::from_scene(query::scene(&original));

    assert!(restored.place_piece(GridCell::new(10, 0, 10)));
    let ids: Vec<_> = query::pieces(&restored).iter().map(|piece| piece.id).collect();
    assert_eq!(ids, vec![PieceId::new(0), PieceId::new(1), PieceId::new(2)]);
}

#[test]
fn identifiers_stay_unique_after_the_last_one_is_loaded() {
    let mut source = World::new();
    assert!(source.place_piece(GridCell::new(0, 0, 0)));
    let mut scene = query::scene(&source);
    scene.bricks[0].id = PieceId::new(u32::MAX);
    let mut world = World::from_scene(scene);

    assert!(world.place_piece(GridCell::new(10, 0, 10)));
    assert!(world.place_piece(GridCell::new(4, 0, 4)));
    let ids: Vec<_> = query::pieces(&world).iter().map(|piece| piece.id).collect();
    assert_eq!(ids, vec![PieceId::new(u32::MAX), PieceId::new(0), PieceId::new(1)]);

    let removed = world.remove_piece(PieceId::new(0)).expect("piece #0 exists");
    assert_eq!(removed.anchor, GridCell::new(10, 0, 10));
    assert_eq!(query::pieces(&world).len(), 2);
    assert!(world.place_piece(GridCell::new(10, 0, 10)));
    assert_eq!(query::pieces(&world)[2].id, PieceId::new(0));
}

#[test]
fn overlapping_scene_loads_with_rebuilt_index() {
    let mut source = World::new();
    assert!(source.place_piece(GridCell::new(0, 0, 0)));
    assert!(source.place_piece(GridCell::new(4, 0, 0)));
    let mut scene = query::scene(&source);
    scene.bricks[1].anchor = GridCell::new(1, 0, 0);

    let world = World::from_scene(scene.clone());

    assert_eq!(query::pieces(&world).len(), 2);
    assert_eq!(query::occupancy(&world), &OccupancyIndex::rebuild(&scene.bricks));
}

#[derive(Clone, Debug)]
struct Attempt {
    w: u32,
    l: u32,
    kind: PieceKind,
    rotation: Rotation,
    anchor: GridCell,
}

fn attempt_strategy() -> impl Strategy<Value = Attempt> {
    (
        1u32..=4,
        1u32..=4,
        prop_oneof![Just(PieceKind::Brick), Just(PieceKind::Plate)],
        prop::sample::select(Rotation::ALL.to_vec()),
        (0i32..8, 0i32..6, 0i32..8),
    )
        .prop_map(|(w, l, kind, rotation, (x, y, z))| Attempt {
            w,
            l,
            kind,
            rotation,
            anchor: GridCell::new(x, y, z),
        })
}

fn run_attempts(attempts: &[Attempt]) -> World {
    let mut world = World::new();
    for attempt in attempts {
        let size = Arc::new(PieceSize::new(attempt.w, attempt.l, attempt.kind));
        let _ = place(&mut world, &size, attempt.rotation, attempt.anchor);
    }
    world
}

proptest! {
    #[test]
    fn committed_footprints_never_overlap(
        attempts in prop::collection::vec(attempt_strategy(), 1..40),
    ) {
        let world = run_attempts(&attempts);
        let pieces = query::pieces(&world);
        for (index, first) in pieces.iter().enumerate() {
            for second in &pieces[index + 1..] {
                prop_assert!(!first.footprint().intersects(&second.footprint()));
            }
        }

        let covered: usize = pieces
            .iter()
            .map(|piece| piece.footprint().cells().count())
            .sum();
        prop_assert_eq!(covered, query::occupancy(&world).len());
    }

    #[test]
    fn rebuild_matches_incremental_index(
        attempts in prop::collection::vec(attempt_strategy(), 1..40),
    ) {
        let world = run_attempts(&attempts);
        let rebuilt = OccupancyIndex::rebuild(query::pieces(&world));
        prop_assert_eq!(&rebuilt, query::occupancy(&world));
    }

    #[test]
    fn scene_round_trips_through_load(
        attempts in prop::collection::vec(attempt_strategy(), 0..30),
    ) {
        let world = run_attempts(&attempts);
        let scene = query::scene(&world);
        let mut restored = World::new();
        let mut events = Vec::new();

        world::apply(&mut restored, Command::LoadScene { scene: scene.clone() }, &mut events);

        let reloaded: Scene = query::scene(&restored);
        prop_assert_eq!(reloaded, scene);
    }

    #[test]
    fn removal_restores_previous_index(
        attempts in prop::collection::vec(attempt_strategy(), 1..30),
    ) {
        let mut world = run_attempts(&attempts);
        let Some(last) = query::pieces(&world).last().cloned() else {
            return Ok(());
        };
        let remaining: Vec<_> = query::pieces(&world)
            .iter()
            .filter(|piece| piece.id != last.id)
            .cloned()
            .collect();

        prop_assert!(world.remove_piece(last.id).is_some());
        prop_assert_eq!(query::occupancy(&world), &OccupancyIndex::rebuild(&remaining));
    }
}
