//! Match detection - finds runs of three or more equal ordinary tiles
//!
//! Each row is scanned left to right, then each column top to bottom. A run
//! grows while consecutive cells share an ordinary kind and closes on a kind
//! change, on a special or empty cell, or at the end of the line. Closed runs
//! of length >= 3 become [`MatchGroup`]s; shorter runs are dropped.
//!
//! Detection is allocation-free: groups live in fixed-capacity arrays sized for
//! the worst case of two runs on every line.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::types::{TileKind, CELL_COUNT, GRID_SIZE, MAX_GROUPS_PER_PASS, MIN_MATCH_LEN};

/// Direction a group runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

/// A maximal run of one ordinary kind along a single row or column.
///
/// Indices are listed left to right for rows and top to bottom for columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    kind: TileKind,
    axis: Axis,
    indices: ArrayVec<usize, GRID_SIZE>,
}

impl MatchGroup {
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The special tile this group earns, if any, and where it lands.
    ///
    /// Exactly four tiles earn a bomb on the second listed index; five or more
    /// earn a laser on the third listed index.
    pub fn spawn(&self) -> Option<(usize, TileKind)> {
        match self.len() {
            4 => Some((self.indices[1], TileKind::Bomb)),
            n if n >= 5 => Some((self.indices[2], TileKind::Laser)),
            _ => None,
        }
    }
}

/// All groups found in one detection pass, plus the union of their cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    groups: ArrayVec<MatchGroup, MAX_GROUPS_PER_PASS>,
    covered: [bool; CELL_COUNT],
}

impl MatchSet {
    fn new() -> Self {
        Self {
            groups: ArrayVec::new(),
            covered: [false; CELL_COUNT],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in detection order: rows top to bottom, then columns left to right.
    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    /// True if `index` belongs to at least one group
    pub fn covers(&self, index: usize) -> bool {
        self.covered.get(index).copied().unwrap_or(false)
    }

    /// Distinct covered indices in ascending order
    pub fn covered_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.covered
            .iter()
            .enumerate()
            .filter_map(|(i, hit)| hit.then_some(i))
    }

    /// Number of distinct covered cells (a crossing cell counts once)
    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|hit| **hit).count()
    }

    /// True if any group is of `kind`
    pub fn contains_kind(&self, kind: TileKind) -> bool {
        self.groups.iter().any(|g| g.kind == kind)
    }

    fn close_run(&mut self, kind: TileKind, axis: Axis, run: &[usize]) {
        if run.len() < MIN_MATCH_LEN || !kind.is_ordinary() {
            return;
        }
        for &i in run {
            self.covered[i] = true;
        }
        let mut indices = ArrayVec::new();
        indices.extend(run.iter().copied());
        self.groups.push(MatchGroup { kind, axis, indices });
    }
}

/// Scan `board` for every row and column group.
pub fn find_matches(board: &Board) -> MatchSet {
    let mut set = MatchSet::new();

    for row in 0..GRID_SIZE {
        let line: [usize; GRID_SIZE] = std::array::from_fn(|col| Board::index(row, col));
        scan_line(board, &line, Axis::Row, &mut set);
    }
    for col in 0..GRID_SIZE {
        let line: [usize; GRID_SIZE] = std::array::from_fn(|row| Board::index(row, col));
        scan_line(board, &line, Axis::Column, &mut set);
    }

    set
}

/// True if the board has at least one group
pub fn has_match(board: &Board) -> bool {
    !find_matches(board).is_empty()
}

fn scan_line(board: &Board, line: &[usize; GRID_SIZE], axis: Axis, set: &mut MatchSet) {
    let cells = board.cells();
    let mut run: ArrayVec<usize, GRID_SIZE> = ArrayVec::new();
    let mut run_kind = TileKind::Empty;

    for &idx in line {
        let kind = cells[idx];
        if kind.is_ordinary() && kind == run_kind {
            run.push(idx);
            continue;
        }

        set.close_run(run_kind, axis, &run);
        run.clear();
        run_kind = kind;
        if kind.is_ordinary() {
            run.push(idx);
        }
    }

    set.close_run(run_kind, axis, &run);
}
