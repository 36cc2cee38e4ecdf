//! Keyboard cursor over the forge grid.
//!
//! Cursor actions move a highlighted cell; `Tap` reports the cell under the
//! cursor so the host can pass it to the session. Movement clamps at the
//! edges.

use crate::types::{GameAction, GRID_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Flat board index under the cursor
    pub fn index(&self) -> usize {
        self.row * GRID_SIZE + self.col
    }

    /// Jump to `index` (e.g. after a mouse click). Out-of-range indices are ignored.
    pub fn set_index(&mut self, index: usize) {
        if index < GRID_SIZE * GRID_SIZE {
            self.row = index / GRID_SIZE;
            self.col = index % GRID_SIZE;
        }
    }

    /// Apply a cursor action. Returns the tapped index for `Tap`; every
    /// other action yields `None`.
    pub fn apply(&mut self, action: GameAction) -> Option<usize> {
        match action {
            GameAction::CursorUp => self.row = self.row.saturating_sub(1),
            GameAction::CursorDown => self.row = (self.row + 1).min(GRID_SIZE - 1),
            GameAction::CursorLeft => self.col = self.col.saturating_sub(1),
            GameAction::CursorRight => self.col = (self.col + 1).min(GRID_SIZE - 1),
            GameAction::Tap => return Some(self.index()),
            GameAction::Review | GameAction::Collect | GameAction::Restart => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_top_left() {
        let cursor = Cursor::new();
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_cursor_moves_and_clamps() {
        let mut cursor = Cursor::new();
        cursor.apply(GameAction::CursorUp);
        cursor.apply(GameAction::CursorLeft);
        assert_eq!(cursor.index(), 0);

        cursor.apply(GameAction::CursorRight);
        cursor.apply(GameAction::CursorDown);
        assert_eq!((cursor.row(), cursor.col()), (1, 1));
        assert_eq!(cursor.index(), 7);

        for _ in 0..10 {
            cursor.apply(GameAction::CursorDown);
            cursor.apply(GameAction::CursorRight);
        }
        assert_eq!(cursor.index(), GRID_SIZE * GRID_SIZE - 1);
    }

    #[test]
    fn test_tap_reports_index() {
        let mut cursor = Cursor::new();
        cursor.set_index(14);
        assert_eq!(cursor.apply(GameAction::Tap), Some(14));
        assert_eq!(cursor.apply(GameAction::Review), None);
        assert_eq!(cursor.index(), 14);
    }

    #[test]
    fn test_set_index_ignores_out_of_range() {
        let mut cursor = Cursor::new();
        cursor.set_index(8);
        cursor.set_index(99);
        assert_eq!(cursor.index(), 8);
    }
}
