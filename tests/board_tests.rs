//! Board and matcher tests through the public API

use paper_forge::core::{bomb_area, find_matches, has_match, laser_area, Axis, Board};
use paper_forge::types::{TileKind, CELL_COUNT, GRID_SIZE};

/// Shifted diagonal stripes: no row or column run of three anywhere.
const STRIPES: [&str; 6] = [
    "D T W C B D",
    "T W C B D T",
    "W C B D T W",
    "C B D T W C",
    "B D T W C B",
    "D T W C B D",
];

fn board(rows: &[&str; 6]) -> Board {
    Board::from_rows(rows).expect("valid rows")
}

#[test]
fn test_stripes_have_no_match() {
    let b = board(&STRIPES);
    assert!(!has_match(&b));
    assert!(find_matches(&b).is_empty());
    assert!(!b.has_empty());
}

#[test]
fn test_from_rows_rejects_bad_input() {
    assert!(Board::from_rows(&["DTWCBD"; 5]).is_none());
    assert!(Board::from_rows(&["DTWCBDX"; 6]).is_none());
    assert!(Board::from_rows(&["DTWCB?"; 6]).is_none());
}

#[test]
fn test_adjacency_is_orthogonal_and_row_bound() {
    assert!(Board::is_adjacent(0, 1));
    assert!(Board::is_adjacent(0, 6));
    assert!(Board::is_adjacent(7, 1));
    // End of one row and start of the next are not neighbours.
    assert!(!Board::is_adjacent(5, 6));
    assert!(!Board::is_adjacent(0, 7));
    assert!(!Board::is_adjacent(0, 2));
    assert!(!Board::is_adjacent(3, 3));
}

#[test]
fn test_run_of_three_in_a_row() {
    let b = board(&[
        "D D D C B D",
        "T W C B D T",
        "W C B D T W",
        "C B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    let set = find_matches(&b);
    assert_eq!(set.groups().len(), 1);
    let group = &set.groups()[0];
    assert_eq!(group.kind(), TileKind::Data);
    assert_eq!(group.axis(), Axis::Row);
    assert_eq!(group.indices(), &[0, 1, 2]);
    assert!(group.spawn().is_none());
}

#[test]
fn test_run_of_two_is_not_a_match() {
    let b = board(&[
        "D D T C B D",
        "T W C B D T",
        "W C B D T W",
        "C B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    assert!(find_matches(&b).is_empty());
}

#[test]
fn test_column_run_of_four_spawns_bomb() {
    let b = board(&[
        "T T W C B D",
        "T W C B D T",
        "T C B D T W",
        "T B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    let set = find_matches(&b);
    assert_eq!(set.groups().len(), 1);
    let group = &set.groups()[0];
    assert_eq!(group.axis(), Axis::Column);
    assert_eq!(group.indices(), &[0, 6, 12, 18]);
    assert_eq!(group.spawn(), Some((6, TileKind::Bomb)));
}

#[test]
fn test_row_run_of_six_spawns_one_laser() {
    let b = board(&[
        "W W W W W W",
        "T D C B D T",
        "D C B D T W",
        "C B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    let set = find_matches(&b);
    assert_eq!(set.groups().len(), 1);
    assert_eq!(set.groups()[0].len(), 6);
    assert_eq!(set.groups()[0].spawn(), Some((2, TileKind::Laser)));
}

#[test]
fn test_crossing_runs_share_a_cell() {
    let b = board(&[
        "C C C W B D",
        "C W T B D T",
        "C T B D T W",
        "W B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    let set = find_matches(&b);
    assert_eq!(set.groups().len(), 2);
    assert!(set.covers(0));
    assert_eq!(set.covered_count(), 5);
}

#[test]
fn test_specials_break_runs() {
    let b = board(&[
        "D D * D D B",
        "T W C B + T",
        "W C B D T W",
        "C B D T W C",
        "B D T W C B",
        "D T W C B D",
    ]);
    assert!(find_matches(&b).is_empty());
}

#[test]
fn test_collapse_drops_tiles_and_refill_tops_up() {
    let mut b = board(&STRIPES);
    b.set(Board::index(5, 0), TileKind::Empty);
    b.set(Board::index(4, 0), TileKind::Empty);
    b.collapse();

    // Column 0 was D T W C B D; the bottom two cleared, the rest slide down two rows.
    assert_eq!(b.at(0, 0), Some(TileKind::Empty));
    assert_eq!(b.at(1, 0), Some(TileKind::Empty));
    assert_eq!(b.at(2, 0), Some(TileKind::Data));
    assert_eq!(b.at(5, 0), Some(TileKind::Coffee));

    let mut rng = paper_forge::core::SequenceRng::constant(TileKind::Writing);
    assert_eq!(b.refill(&mut rng), 2);
    assert_eq!(b.at(0, 0), Some(TileKind::Writing));
    assert!(!b.has_empty());
}

#[test]
fn test_special_areas() {
    // Interior, edge and corner bombs.
    assert_eq!(bomb_area(14).len(), 9);
    assert_eq!(bomb_area(2).len(), 6);
    assert_eq!(bomb_area(0).len(), 4);
    assert_eq!(bomb_area(CELL_COUNT - 1).len(), 4);

    for index in [0, 14, 35] {
        let area = laser_area(index);
        assert_eq!(area.len(), 2 * GRID_SIZE - 1);
        assert!(area.contains(&index));
    }
}
