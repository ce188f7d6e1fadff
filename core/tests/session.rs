use jigsaw_core::{
    EngineRules, InvalidOperationError, OccupiedSlotError, PartitionSpec, PieceId, Point, Polygon,
    Puzzle, PuzzleError, PuzzleSession, ReleaseOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn grid_puzzle(width: f32, height: f32, rows: u32, cols: u32) -> Puzzle {
    let mut rng = StdRng::seed_from_u64(0);
    Puzzle::generate(width, height, &PartitionSpec::Rectangular { rows, cols }, &mut rng).unwrap()
}

fn free_rules() -> EngineRules {
    EngineRules {
        snap_to_frame: false,
        ..EngineRules::neighbor_snap()
    }
}

fn assert_pool_and_board_partition(session: &PuzzleSession) {
    let total = session.pieces().len();
    let mut seen = vec![0u8; total];
    for id in session.pool() {
        seen[*id] += 1;
    }
    for (id, _) in session.placed() {
        seen[id] += 1;
    }
    assert!(seen.iter().all(|count| *count == 1), "pool/board overlap: {seen:?}");
}

fn place(session: &mut PuzzleSession, id: PieceId, at: Point) -> ReleaseOutcome {
    session.pick_up_from_pool(id, at).unwrap();
    let release = session.release().unwrap();
    assert_pool_and_board_partition(session);
    release.outcome
}

fn position(session: &PuzzleSession, id: PieceId) -> Point {
    session.placed_piece(id).unwrap().position
}

fn assert_close(a: Point, b: Point) {
    assert!(a.distance(b) < 1e-3, "{a:?} != {b:?}");
}

#[test]
fn exact_slot_two_by_two_solves_after_four_correct_drops() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), EngineRules::exact_slot(), 4);
    let outcome = place(&mut session, 2, Point::new(3.0, 104.0));
    assert_eq!(outcome, ReleaseOutcome::Slotted { slot: 2, correct: true });
    assert_eq!(position(&session, 2), Point::new(0.0, 100.0));
    assert!(session.placed_piece(2).unwrap().locked);
    assert!(!session.is_solved());

    for (id, at) in [(0, Point::new(-4.0, 6.0)), (1, Point::new(95.0, 2.0)), (3, Point::new(110.0, 90.0))] {
        let outcome = place(&mut session, id, at);
        assert_eq!(outcome, ReleaseOutcome::Slotted { slot: id, correct: true });
    }
    assert!(session.pool().is_empty());
    assert!(session.is_solved());
    assert!(session.is_solved());
}

#[test]
fn exact_slot_wrong_slot_stays_unlocked_and_movable() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), EngineRules::exact_slot(), 4);
    let outcome = place(&mut session, 0, Point::new(100.0, 100.0));
    assert_eq!(outcome, ReleaseOutcome::Slotted { slot: 3, correct: false });
    assert!(!session.placed_piece(0).unwrap().locked);

    session.pick_up_from_board(0).unwrap();
    session.drag_to(Point::new(1.0, 1.0)).unwrap();
    let release = session.release().unwrap();
    assert_eq!(release.outcome, ReleaseOutcome::Slotted { slot: 0, correct: true });
    assert_eq!(
        session.pick_up_from_board(0),
        Err(InvalidOperationError::PieceLocked(0))
    );
}

#[test]
fn exact_slot_occupied_drop_is_rejected_without_changes() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), EngineRules::exact_slot(), 9);
    place(&mut session, 0, Point::ZERO);
    let pool_before = session.pool().to_vec();
    let order_before = session.draw_order().to_vec();

    session.pick_up_from_pool(1, Point::new(5.0, 5.0)).unwrap();
    match session.release() {
        Err(PuzzleError::OccupiedSlot(OccupiedSlotError { slot, occupant })) => {
            assert_eq!(slot, 0);
            assert_eq!(occupant, 0);
        }
        other => panic!("expected occupied slot, got {other:?}"),
    }
    assert_eq!(session.pool(), pool_before.as_slice());
    assert_eq!(session.draw_order(), order_before.as_slice());
    assert!(session.placed_piece(1).is_none());
    assert!(!session.is_dragging());
    assert_pool_and_board_partition(&session);
}

#[test]
fn exact_slot_occupied_drop_from_board_restores_the_piece() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), EngineRules::exact_slot(), 9);
    assert_eq!(
        place(&mut session, 0, Point::new(100.0, 100.0)),
        ReleaseOutcome::Slotted { slot: 3, correct: false }
    );
    place(&mut session, 2, Point::new(0.0, 100.0));
    let before = *session.placed_piece(0).unwrap();
    let pool_before = session.pool().to_vec();
    let order_before = session.draw_order().to_vec();
    assert_eq!(order_before.last(), Some(&2));

    session.pick_up_from_board(0).unwrap();
    session.drag_to(Point::new(2.0, 98.0)).unwrap();
    match session.release() {
        Err(PuzzleError::OccupiedSlot(OccupiedSlotError { slot, occupant })) => {
            assert_eq!(slot, 2);
            assert_eq!(occupant, 2);
        }
        other => panic!("expected occupied slot, got {other:?}"),
    }
    let after = *session.placed_piece(0).unwrap();
    assert_eq!(after, before);
    assert_eq!(after.position, Point::new(100.0, 100.0));
    assert_eq!(after.slot, Some(3));
    assert!(!after.locked);
    assert_eq!(session.draw_order(), order_before.as_slice());
    assert_eq!(session.pool(), pool_before.as_slice());
    assert!(!session.is_dragging());
    assert_pool_and_board_partition(&session);
}

#[test]
fn exact_slot_drop_outside_every_slot_returns_to_pool() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), EngineRules::exact_slot(), 2);
    let pool_before = session.pool().to_vec();
    let outcome = place(&mut session, 3, Point::new(250.0, 250.0));
    assert_eq!(outcome, ReleaseOutcome::ReturnedToPool { pieces: vec![3] });
    assert_eq!(session.pool(), pool_before.as_slice());
}

#[test]
fn triangle_snaps_onto_locked_neighbor() {
    let a = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
    ]);
    let b = Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    ]);
    let puzzle = Puzzle::from_polygons(100.0, 100.0, vec![a, b]);
    let rules = EngineRules {
        snap_threshold: 20.0,
        ..EngineRules::neighbor_snap()
    };
    let mut session = PuzzleSession::new(puzzle, rules, 1);

    let outcome = place(&mut session, 0, Point::new(2.0, -3.0));
    assert_eq!(outcome, ReleaseOutcome::Framed { group: vec![0] });
    assert_eq!(position(&session, 0), Point::ZERO);
    assert!(session.placed_piece(0).unwrap().locked);

    session.pick_up_from_pool(1, Point::new(-40.0, 60.0)).unwrap();
    session.drag_to(Point::new(12.0, -9.0)).unwrap();
    let release = session.release().unwrap();
    assert_eq!(release.outcome, ReleaseOutcome::Snapped { group: vec![0, 1] });
    assert_close(position(&session, 1), Point::ZERO);
    assert!(session.placed_piece(1).unwrap().locked);
    assert_eq!(session.connected_group(0), vec![0, 1]);
    assert_eq!(session.connected_group(1), vec![0, 1]);
    assert!(release.solved);
}

#[test]
fn snap_needs_distance_below_threshold() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 100.0, 1, 2), free_rules(), 1);
    place(&mut session, 0, Point::new(50.0, 20.0));
    // Expected position for piece 1 is (150, 20).
    let outcome = place(&mut session, 1, Point::new(170.0, 20.0));
    assert_eq!(outcome, ReleaseOutcome::Loose);
    assert_eq!(session.connected_group(1), vec![1]);
    assert!(!session.placed_piece(1).unwrap().locked);
    assert_eq!(position(&session, 1), Point::new(170.0, 20.0));
}

#[test]
fn snap_merge_is_transitive() {
    let mut session = PuzzleSession::new(grid_puzzle(300.0, 100.0, 1, 3), free_rules(), 7);
    assert_eq!(place(&mut session, 1, Point::new(140.0, 60.0)), ReleaseOutcome::Loose);
    let outcome = place(&mut session, 2, Point::new(243.0, 62.0));
    assert_eq!(outcome, ReleaseOutcome::Snapped { group: vec![1, 2] });
    let outcome = place(&mut session, 0, Point::new(42.0, 57.0));
    assert_eq!(outcome, ReleaseOutcome::Snapped { group: vec![0, 1, 2] });
    for id in 0..3 {
        assert_eq!(session.connected_group(id), vec![0, 1, 2]);
        assert!(session.placed_piece(id).unwrap().locked);
    }
    assert_close(position(&session, 0), Point::new(40.0, 60.0));
    assert_close(position(&session, 2), Point::new(240.0, 60.0));
}

#[test]
fn dropping_between_two_groups_merges_both() {
    let mut session = PuzzleSession::new(grid_puzzle(300.0, 100.0, 1, 3), free_rules(), 7);
    place(&mut session, 0, Point::new(10.0, 10.0));
    place(&mut session, 2, Point::new(210.0, 10.0));
    let outcome = place(&mut session, 1, Point::new(104.0, 12.0));
    assert_eq!(outcome, ReleaseOutcome::Snapped { group: vec![0, 1, 2] });
    assert!(session.is_solved());
}

#[test]
fn dragging_a_group_is_rigid() {
    let mut session = PuzzleSession::new(grid_puzzle(300.0, 100.0, 1, 3), free_rules(), 7);
    place(&mut session, 0, Point::new(10.0, 10.0));
    place(&mut session, 1, Point::new(111.0, 9.0));
    place(&mut session, 2, Point::new(212.0, 11.0));
    let before: Vec<Point> = (0..3).map(|id| position(&session, id)).collect();

    session.pick_up_from_board(1).unwrap();
    assert_eq!(session.dragged().map(<[PieceId]>::len), Some(3));
    for step in 0..50 {
        let t = step as f32 * 0.37;
        session
            .drag_to(Point::new(110.0 + t.sin() * 30.0, 10.0 + t * 1.5))
            .unwrap();
    }
    session.drag_to(Point::new(125.5, -14.25)).unwrap();
    let delta = Point::new(125.5, -14.25) - before[1];
    for id in 0..3 {
        assert_close(position(&session, id), before[id] + delta);
    }
    session.release().unwrap();
    assert_eq!(session.draw_order().len(), 3);
}

#[test]
fn pool_pick_up_released_off_board_goes_back() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), free_rules(), 5);
    let pool_before = session.pool().to_vec();
    let id = pool_before[2];
    session.pick_up_from_pool(id, Point::new(10.0, 10.0)).unwrap();
    session.drag_to(Point::new(900.0, 10.0)).unwrap();
    let release = session.release().unwrap();
    assert_eq!(release.outcome, ReleaseOutcome::ReturnedToPool { pieces: vec![id] });
    assert_eq!(session.pool(), pool_before.as_slice());
    assert!(session.draw_order().is_empty());
}

#[test]
fn board_drag_off_board_is_pulled_back() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), free_rules(), 5);
    place(&mut session, 0, Point::new(10.0, 10.0));
    session.pick_up_from_board(0).unwrap();
    session.drag_to(Point::new(2000.0, 20.0)).unwrap();
    assert_eq!(session.release().unwrap().outcome, ReleaseOutcome::Loose);
    let board = session.board();
    let centre = position(&session, 0) + Point::new(50.0, 50.0);
    assert!(board.contains(centre));
    assert!((centre.x - board.max.x).abs() < 1e-3);
    assert_eq!(centre.y, 70.0);
}

#[test]
fn return_to_pool_dissolves_the_group() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 100.0, 1, 2), free_rules(), 3);
    place(&mut session, 0, Point::new(10.0, 10.0));
    place(&mut session, 1, Point::new(112.0, 8.0));
    assert_eq!(session.connected_group(0), vec![0, 1]);

    let returned = session.return_to_pool(1).unwrap();
    assert_eq!(returned, vec![0, 1]);
    assert_eq!(session.placed().count(), 0);
    assert_eq!(session.pool().len(), 2);
    assert_eq!(session.group_members(0), &[0]);
    assert!(session.connected_group(0).is_empty());
    assert!(session.draw_order().is_empty());
    assert_pool_and_board_partition(&session);
}

#[test]
fn locked_groups_can_be_kept_on_the_board() {
    let rules = EngineRules {
        allow_return_locked: false,
        ..free_rules()
    };
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 100.0, 1, 2), rules, 3);
    place(&mut session, 0, Point::new(10.0, 10.0));
    place(&mut session, 1, Point::new(112.0, 8.0));
    assert_eq!(
        session.return_to_pool(0),
        Err(InvalidOperationError::PieceLocked(0))
    );
    assert_eq!(session.placed().count(), 2);
}

#[test]
fn invalid_operations_leave_state_untouched() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), free_rules(), 8);
    let pool_before = session.pool().to_vec();
    assert_eq!(session.pick_up_from_board(0), Err(InvalidOperationError::NotPlaced(0)));
    assert_eq!(
        session.drag_to(Point::ZERO),
        Err(InvalidOperationError::NoActiveDrag)
    );
    assert!(matches!(
        session.release(),
        Err(PuzzleError::InvalidOperation(InvalidOperationError::NoActiveDrag))
    ));
    assert_eq!(
        session.pick_up_from_pool(17, Point::ZERO),
        Err(InvalidOperationError::UnknownPiece(17))
    );
    assert_eq!(session.return_to_pool(1), Err(InvalidOperationError::NotPlaced(1)));
    assert_eq!(session.pool(), pool_before.as_slice());

    session.pick_up_from_pool(0, Point::new(30.0, 30.0)).unwrap();
    assert_eq!(
        session.pick_up_from_pool(1, Point::ZERO),
        Err(InvalidOperationError::DragInProgress)
    );
    assert_eq!(session.return_to_pool(0), Err(InvalidOperationError::DragInProgress));
    assert_eq!(
        session.pick_up_from_pool(0, Point::ZERO),
        Err(InvalidOperationError::DragInProgress)
    );
    session.abort_drag().unwrap();
    assert_eq!(
        session.pick_up_from_pool(0, Point::ZERO),
        Err(InvalidOperationError::NotInPool(0))
    );
    assert_pool_and_board_partition(&session);
}

#[test]
fn pointer_facade_keeps_the_grab_offset() {
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 200.0, 2, 2), free_rules(), 8);
    session.pointer_down(3, Point::new(60.0, 70.0)).unwrap();
    // Pool pieces are centred under the pointer.
    assert_eq!(position(&session, 3), Point::new(10.0, 20.0));
    session.pointer_move(Point::new(80.0, 75.0)).unwrap();
    session.pointer_move(Point::new(90.0, 90.0)).unwrap();
    let release = session.pointer_up(Point::new(95.0, 100.0)).unwrap();
    assert_eq!(release.outcome, ReleaseOutcome::Loose);
    assert_eq!(position(&session, 3), Point::new(45.0, 50.0));

    session.pointer_down(3, Point::new(50.0, 55.0)).unwrap();
    session.pointer_up(Point::new(60.0, 65.0)).unwrap();
    assert_eq!(position(&session, 3), Point::new(55.0, 60.0));
}

#[test]
fn frame_snap_aligns_and_completes_exact_position() {
    let rules = EngineRules {
        completion: jigsaw_core::CompletionRule::ExactPosition,
        ..EngineRules::neighbor_snap()
    };
    let mut session = PuzzleSession::new(grid_puzzle(200.0, 100.0, 1, 2), rules, 3);
    assert_eq!(
        place(&mut session, 1, Point::new(105.0, -6.0)),
        ReleaseOutcome::Framed { group: vec![1] }
    );
    assert!(!session.is_solved());
    let outcome = place(&mut session, 0, Point::new(-30.0, 0.0));
    assert_eq!(outcome, ReleaseOutcome::Loose);
    assert!(!session.is_solved());

    session.pick_up_from_board(0).unwrap();
    session.drag_to(Point::new(4.0, 3.0)).unwrap();
    let release = session.release().unwrap();
    assert_eq!(release.outcome, ReleaseOutcome::Snapped { group: vec![0, 1] });
    assert!(release.solved);
    assert_eq!(session.is_solved(), session.is_solved());
}

#[test]
fn same_seed_shuffles_the_pool_identically() {
    let a = PuzzleSession::new(grid_puzzle(300.0, 300.0, 3, 3), free_rules(), 42);
    let b = PuzzleSession::new(grid_puzzle(300.0, 300.0, 3, 3), free_rules(), 42);
    assert_eq!(a.pool(), b.pool());
    let mut sorted = a.pool().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..9).collect::<Vec<_>>());
}
