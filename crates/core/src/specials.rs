//! Special tile activation
//!
//! A bomb clears the 3x3 square around itself, clipped at the edges. A laser
//! clears its whole row and column. Both pay a flat rate per non-empty cell
//! swept, cost one move, and then hand the board to the normal cascade.
//! Specials caught inside the blast are cleared, never chained.

use arrayvec::ArrayVec;
use tracing::debug;

use crate::board::Board;
use crate::resolve::{Blast, Engine, Phase, Resolution, Trigger};
use crate::rng::RandomSource;
use crate::scoring::apply_delta;
use crate::types::{NoticeKind, TileKind, GRID_SIZE};

/// Cells swept by a bomb at `index`, in index order
pub fn bomb_area(index: usize) -> ArrayVec<usize, 9> {
    let mut area = ArrayVec::new();
    if !Board::in_bounds(index) {
        return area;
    }
    let row = Board::row_of(index);
    let col = Board::col_of(index);
    for r in row.saturating_sub(1)..=(row + 1).min(GRID_SIZE - 1) {
        for c in col.saturating_sub(1)..=(col + 1).min(GRID_SIZE - 1) {
            area.push(Board::index(r, c));
        }
    }
    area
}

/// Cells swept by a laser at `index`: the row, then the rest of the column.
/// The crossing cell appears once.
pub fn laser_area(index: usize) -> ArrayVec<usize, { 2 * GRID_SIZE - 1 }> {
    let mut area = ArrayVec::new();
    if !Board::in_bounds(index) {
        return area;
    }
    let row = Board::row_of(index);
    let col = Board::col_of(index);
    for c in 0..GRID_SIZE {
        area.push(Board::index(row, c));
    }
    for r in (0..GRID_SIZE).filter(|r| *r != row) {
        area.push(Board::index(r, col));
    }
    area
}

impl<R: RandomSource + ?Sized> Engine<'_, R> {
    /// Detonate the bomb at `index`. Callers check the tile kind.
    pub fn activate_bomb(&mut self, index: usize) -> Resolution {
        let cleared = self.sweep(&bomb_area(index));
        let score_delta = self.rules.scoring.bomb_score(cleared);
        self.finish_activation(
            Trigger::Bomb { index },
            NoticeKind::BombDetonated,
            Blast {
                cleared,
                score_delta,
            },
        )
    }

    /// Fire the laser at `index`. Callers check the tile kind.
    pub fn activate_laser(&mut self, index: usize) -> Resolution {
        let cleared = self.sweep(&laser_area(index));
        let score_delta = self.rules.scoring.laser_score(cleared);
        self.finish_activation(
            Trigger::Laser { index },
            NoticeKind::LaserFired,
            Blast {
                cleared,
                score_delta,
            },
        )
    }

    /// Empty every non-empty cell in `area`, returning how many were emptied.
    fn sweep(&mut self, area: &[usize]) -> usize {
        let mut cleared = 0;
        for &i in area {
            if matches!(self.board.get(i), Some(kind) if kind != TileKind::Empty) {
                self.board.set(i, TileKind::Empty);
                cleared += 1;
            }
        }
        cleared
    }

    fn finish_activation(&mut self, trigger: Trigger, notice: NoticeKind, blast: Blast) -> Resolution {
        let mut res = Resolution::new(trigger, self.ledger.score);
        self.charge_move();
        self.ledger.score = apply_delta(self.ledger.score, blast.score_delta);
        res.blast = Some(blast);
        res.notices.push(notice);
        res.frame(Phase::ScoreAndMark, self.board);
        debug!(?trigger, cleared = blast.cleared, delta = blast.score_delta, "special activated");

        self.board.settle(&mut *self.rng);
        res.frame(Phase::Refill, self.board);

        self.cascade(&mut res);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{Ledger, Rules};
    use crate::rng::SequenceRng;

    fn board(rows: &[&str]) -> Board {
        Board::from_rows(rows).expect("valid test board")
    }

    #[test]
    fn test_bomb_area_clips_at_edges() {
        assert_eq!(bomb_area(14).as_slice(), &[7, 8, 9, 13, 14, 15, 19, 20, 21]);
        assert_eq!(bomb_area(0).as_slice(), &[0, 1, 6, 7]);
        assert_eq!(bomb_area(2).len(), 6);
        assert_eq!(bomb_area(35).as_slice(), &[28, 29, 34, 35]);
        assert!(bomb_area(36).is_empty());
    }

    #[test]
    fn test_laser_area_counts_crossing_once() {
        let area = laser_area(14);
        assert_eq!(area.len(), 11);
        assert_eq!(area.iter().filter(|i| **i == 14).count(), 1);
        assert_eq!(laser_area(0).len(), 11);
        assert!(laser_area(99).is_empty());
    }

    // Refill script that rebuilds the quiet pattern above the blast.
    const BOMB_REFILL: [u32; 9] = [1, 2, 3, 2, 3, 4, 3, 4, 0];

    fn after_bomb() -> Board {
        board(&[
            "D T W C B D",
            "T W C B D T",
            "W C B D T W",
            "C T W C W C",
            "B D T W C B",
            "D T W C B D",
        ])
    }

    #[test]
    fn test_bomb_clears_square_and_pays_per_cell() {
        let mut b = board(&[
            "D T W C B D",
            "T W C B D T",
            "W C * D T W",
            "C B D T W C",
            "B D T W C B",
            "D T W C B D",
        ]);
        let mut ledger = Ledger::new(20);
        let mut rng = SequenceRng::new(BOMB_REFILL.to_vec());
        let rules = Rules::default();

        let res = Engine::new(&mut b, &mut ledger, &mut rng, &rules).activate_bomb(14);

        assert_eq!(res.trigger, Trigger::Bomb { index: 14 });
        assert_eq!(res.blast.map(|b| b.cleared), Some(9));
        assert_eq!(ledger.score, 270);
        assert_eq!(ledger.moves_remaining, 19);
        assert_eq!(res.notices, vec![NoticeKind::BombDetonated]);
        assert!(res.passes.is_empty());
        assert_eq!(b, after_bomb());
        // No match afterwards, so no event roll was drawn.
        assert_eq!(rng.draws(), 9);
    }

    #[test]
    fn test_bomb_sweeps_specials_without_chaining() {
        let mut b = board(&[
            "D T W C B D",
            "T W C B D T",
            "W C * + T W",
            "C B D T W C",
            "B D T W C B",
            "D T W C B D",
        ]);
        let mut ledger = Ledger::new(20);
        let mut rng = SequenceRng::new(BOMB_REFILL.to_vec());
        let rules = Rules::default();

        let res = Engine::new(&mut b, &mut ledger, &mut rng, &rules).activate_bomb(14);

        assert_eq!(ledger.score, 270);
        assert_eq!(res.notices.len(), 1);
        assert_eq!(b.count(TileKind::Laser), 0);
        assert_eq!(b, after_bomb());
    }

    #[test]
    fn test_laser_clears_row_and_column() {
        let mut b = board(&[
            "D T W C B D",
            "T W C B D T",
            "W C + D T W",
            "C B D T W C",
            "B D T W C B",
            "D T W C B D",
        ]);
        let mut ledger = Ledger::new(20);
        let mut rng = SequenceRng::new(vec![2, 3, 4, 0, 1, 2, 2, 3, 0, 1, 2]);
        let rules = Rules::default();

        let res = Engine::new(&mut b, &mut ledger, &mut rng, &rules).activate_laser(14);

        assert_eq!(res.blast.map(|b| b.cleared), Some(11));
        assert_eq!(ledger.score, 550);
        assert_eq!(ledger.moves_remaining, 19);
        assert_eq!(res.last_notice(), Some(NoticeKind::LaserFired));
        assert_eq!(
            b,
            board(&[
                "W C B D T W",
                "D T W C B D",
                "T W C B D T",
                "C B D T W C",
                "B D T W C B",
                "D T W C B D",
            ])
        );
    }

    #[test]
    fn test_activation_floors_moves_at_zero() {
        let mut b = board(&[
            "D T W C B D",
            "T W C B D T",
            "W C * D T W",
            "C B D T W C",
            "B D T W C B",
            "D T W C B D",
        ]);
        let mut ledger = Ledger::new(0);
        let mut rng = SequenceRng::new(BOMB_REFILL.to_vec());
        let rules = Rules::default();

        Engine::new(&mut b, &mut ledger, &mut rng, &rules).activate_bomb(14);

        assert_eq!(ledger.moves_remaining, 0);
    }
}
