//! Property tests for detection and cascades

use proptest::prelude::*;

use paper_forge::core::{find_matches, has_match, Board, Engine, Ledger, Rules, SimpleRng};
use paper_forge::types::{TileKind, CELL_COUNT, GRID_SIZE};

fn any_kind() -> impl Strategy<Value = TileKind> {
    prop_oneof![
        6 => Just(TileKind::Data),
        6 => Just(TileKind::Theory),
        6 => Just(TileKind::Writing),
        6 => Just(TileKind::Coffee),
        6 => Just(TileKind::Bug),
        1 => Just(TileKind::Bomb),
        1 => Just(TileKind::Laser),
    ]
}

fn any_board() -> impl Strategy<Value = Board> {
    prop::collection::vec(any_kind(), CELL_COUNT).prop_map(|cells| {
        let mut arr = [TileKind::Empty; CELL_COUNT];
        arr.copy_from_slice(&cells);
        Board::from_kinds(arr)
    })
}

/// An index and one of its orthogonal neighbours.
fn adjacent_pair() -> impl Strategy<Value = (usize, usize)> {
    (0..CELL_COUNT, any::<bool>()).prop_map(|(i, horizontal)| {
        let (row, col) = (i / GRID_SIZE, i % GRID_SIZE);
        if horizontal {
            let c = if col + 1 < GRID_SIZE { col + 1 } else { col - 1 };
            (i, row * GRID_SIZE + c)
        } else {
            let r = if row + 1 < GRID_SIZE { row + 1 } else { row - 1 };
            (i, r * GRID_SIZE + col)
        }
    })
}

proptest! {
    #[test]
    fn groups_are_straight_uniform_ordinary_runs(board in any_board()) {
        let set = find_matches(&board);
        for group in set.groups() {
            prop_assert!(group.len() >= 3);
            prop_assert!(group.kind().is_ordinary());
            for pair in group.indices().windows(2) {
                let step = pair[1] - pair[0];
                prop_assert!(step == 1 || step == GRID_SIZE);
            }
            for &i in group.indices() {
                prop_assert_eq!(board.get(i), Some(group.kind()));
            }
        }
        prop_assert_eq!(set.is_empty(), !has_match(&board));
    }

    #[test]
    fn isolated_row_run_is_one_group(len in 3usize..=GRID_SIZE, start in 0usize..GRID_SIZE) {
        prop_assume!(start + len <= GRID_SIZE);
        // Stripes never match; stamp a Writing run over row 2 bounded by other kinds.
        let mut board = Board::from_rows(&[
            "D T C B D T",
            "T C B D T C",
            "C B D T C B",
            "B D T C B D",
            "D T C B D T",
            "T C B D T C",
        ]).unwrap();
        for col in start..start + len {
            board.set(2 * GRID_SIZE + col, TileKind::Writing);
        }
        let set = find_matches(&board);
        prop_assert_eq!(set.groups().len(), 1);
        prop_assert_eq!(set.groups()[0].len(), len);
    }

    #[test]
    fn swaps_terminate_and_leave_a_full_board(seed in any::<u32>(), (a, b) in adjacent_pair()) {
        let mut rng = SimpleRng::new(seed);
        let mut board = Board::random(&mut rng);
        let mut ledger = Ledger::new(20);
        let rules = Rules::default();

        let res = Engine::new(&mut board, &mut ledger, &mut rng, &rules).swap(a, b);

        // Real boards settle long before the safety cap.
        prop_assert!(res.passes.len() <= 50 && !res.capped);
        prop_assert!(!board.has_empty());
        if res.accepted {
            prop_assert!(!has_match(&board));
        }
        // One move per swap, plus a coffee refund at most once.
        prop_assert!(ledger.moves_remaining == 19 || ledger.moves_remaining == 22);
    }

    #[test]
    fn resolution_is_deterministic(seed in any::<u32>(), (a, b) in adjacent_pair()) {
        let run = || {
            let mut rng = SimpleRng::new(seed);
            let mut board = Board::random(&mut rng);
            let mut ledger = Ledger::new(20);
            let res = Engine::new(&mut board, &mut ledger, &mut rng, &Rules::default()).swap(a, b);
            (board, ledger, res)
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn event_fires_at_most_once(seed in any::<u32>(), swaps in prop::collection::vec(adjacent_pair(), 1..20)) {
        let mut rng = SimpleRng::new(seed);
        let mut board = Board::random(&mut rng);
        let mut ledger = Ledger::new(40);
        let rules = Rules { event_chance_percent: 100, ..Rules::default() };

        let mut events = 0;
        for (a, b) in swaps {
            let res = Engine::new(&mut board, &mut ledger, &mut rng, &rules).swap(a, b);
            events += res.passes.iter().filter(|p| p.event.is_some()).count();
        }
        prop_assert!(events <= 1);
        prop_assert_eq!(ledger.event_fired, events == 1);
    }
}
