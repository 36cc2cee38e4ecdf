//! Board module - manages the forge grid
//!
//! The board is a 6x6 grid where each cell holds a [`TileKind`].
//! Uses a flat array for cache locality and zero-allocation updates.
//! Coordinates: index = row * GRID_SIZE + col, row 0 is the top row.
//!
//! At rest every cell holds an ordinary or special kind. `Empty` only appears
//! between the clear and refill steps of a resolution.

use std::fmt;

use crate::rng::RandomSource;
use crate::types::{TileKind, CELL_COUNT, GRID_SIZE};

/// The forge board - 6 columns x 6 rows using flat array storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (row * GRID_SIZE + col)
    cells: [TileKind; CELL_COUNT],
}

impl Board {
    /// Create a board with every cell set to `kind`
    pub fn filled(kind: TileKind) -> Self {
        Self {
            cells: [kind; CELL_COUNT],
        }
    }

    /// Create a board of random ordinary kinds
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let mut cells = [TileKind::Empty; CELL_COUNT];
        for cell in &mut cells {
            *cell = rng.ordinary_kind();
        }
        Self { cells }
    }

    /// Create from a flat row-major array
    pub fn from_kinds(cells: [TileKind; CELL_COUNT]) -> Self {
        Self { cells }
    }

    /// Parse one string per row, one letter per cell (see [`TileKind::letter`]).
    ///
    /// Whitespace inside a row is ignored. Returns `None` unless the input
    /// describes exactly `GRID_SIZE` rows of `GRID_SIZE` known letters.
    ///
    /// ```
    /// use paper_forge_core::Board;
    /// use paper_forge_core::types::TileKind;
    ///
    /// let board = Board::from_rows(&[
    ///     "D T W C B D",
    ///     "T W C B D T",
    ///     "W C B D T W",
    ///     "C B D T W C",
    ///     "B D T W C B",
    ///     "D T W C B *",
    /// ])
    /// .unwrap();
    /// assert_eq!(board.get(35), Some(TileKind::Bomb));
    /// ```
    pub fn from_rows(rows: &[&str]) -> Option<Self> {
        if rows.len() != GRID_SIZE {
            return None;
        }
        let mut cells = [TileKind::Empty; CELL_COUNT];
        for (row, line) in rows.iter().enumerate() {
            let mut col = 0;
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                if col >= GRID_SIZE {
                    return None;
                }
                cells[Self::index(row, col)] = TileKind::from_letter(ch)?;
                col += 1;
            }
            if col != GRID_SIZE {
                return None;
            }
        }
        Some(Self { cells })
    }

    /// Calculate flat index from (row, col)
    #[inline(always)]
    pub const fn index(row: usize, col: usize) -> usize {
        row * GRID_SIZE + col
    }

    #[inline(always)]
    pub const fn row_of(index: usize) -> usize {
        index / GRID_SIZE
    }

    #[inline(always)]
    pub const fn col_of(index: usize) -> usize {
        index % GRID_SIZE
    }

    #[inline(always)]
    pub const fn in_bounds(index: usize) -> bool {
        index < CELL_COUNT
    }

    /// Two indices are adjacent when they are horizontal neighbours on the
    /// same row, or vertical neighbours (exactly one row apart).
    pub fn is_adjacent(a: usize, b: usize) -> bool {
        let diff = a.abs_diff(b);
        (diff == 1 && Self::row_of(a) == Self::row_of(b)) || diff == GRID_SIZE
    }

    /// Get cell at index
    /// Returns None if out of bounds
    pub fn get(&self, index: usize) -> Option<TileKind> {
        self.cells.get(index).copied()
    }

    /// Get cell at (row, col)
    pub fn at(&self, row: usize, col: usize) -> Option<TileKind> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return None;
        }
        self.get(Self::index(row, col))
    }

    /// Set cell at index
    /// Returns false if out of bounds
    pub fn set(&mut self, index: usize, kind: TileKind) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = kind;
                true
            }
            None => false,
        }
    }

    /// Swap two cells. Returns false if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if !Self::in_bounds(a) || !Self::in_bounds(b) {
            return false;
        }
        self.cells.swap(a, b);
        true
    }

    /// Number of cells holding `kind`
    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|c| **c == kind).count()
    }

    /// True if any cell is a transient hole
    pub fn has_empty(&self) -> bool {
        self.cells.contains(&TileKind::Empty)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[TileKind; CELL_COUNT] {
        &self.cells
    }

    /// Compact each column downward, keeping the relative order of the
    /// surviving tiles. Holes end up at the top of each column.
    /// Uses a two-pointer pass per column with zero allocation.
    pub fn collapse(&mut self) {
        for col in 0..GRID_SIZE {
            let mut write_row = GRID_SIZE;
            for read_row in (0..GRID_SIZE).rev() {
                let read = Self::index(read_row, col);
                if self.cells[read] == TileKind::Empty {
                    continue;
                }
                write_row -= 1;
                if write_row != read_row {
                    let write = Self::index(write_row, col);
                    self.cells[write] = self.cells[read];
                    self.cells[read] = TileKind::Empty;
                }
            }
        }
    }

    /// Fill every hole with a random ordinary kind, scanning in index order.
    /// Returns the number of cells filled.
    pub fn refill<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut filled = 0;
        for cell in &mut self.cells {
            if *cell == TileKind::Empty {
                *cell = rng.ordinary_kind();
                filled += 1;
            }
        }
        filled
    }

    /// Gravity followed by refill: the settle step after any clear.
    pub fn settle<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.collapse();
        self.refill(rng)
    }

    /// Copy the board into a row-major 2D array
    pub fn write_grid(&self, out: &mut [[TileKind; GRID_SIZE]; GRID_SIZE]) {
        for (row, line) in out.iter_mut().enumerate() {
            let start = row * GRID_SIZE;
            line.copy_from_slice(&self.cells[start..start + GRID_SIZE]);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::filled(TileKind::Empty)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self.cells[Self::index(row, col)].letter())?;
            }
            if row + 1 < GRID_SIZE {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}
