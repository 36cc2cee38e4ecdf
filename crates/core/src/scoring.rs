//! Scoring module - data-driven point tables for the forge
//!
//! Match points are `group length × per-tile value`, with the per-tile value
//! looked up in a [`ScoringPolicy`]. The default table rewards coffee, pays a
//! flat rate for research tiles and charges for matched bugs. Special
//! activations pay a flat rate per cleared cell.
//!
//! The running score never goes below zero: every delta is applied with
//! [`apply_delta`].

use crate::matcher::{MatchGroup, MatchSet};
use crate::types::{
    TileKind, BOMB_POINTS_PER_CELL, LASER_POINTS_PER_CELL, LEFTOVER_BUG_PENALTY,
};

/// Per-tile values for matches and per-cell values for activations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoringPolicy {
    pub data: i32,
    pub theory: i32,
    pub writing: i32,
    pub coffee: i32,
    pub bug: i32,
    pub bomb_per_cell: i32,
    pub laser_per_cell: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            data: 50,
            theory: 50,
            writing: 50,
            coffee: 80,
            bug: -20,
            bomb_per_cell: BOMB_POINTS_PER_CELL,
            laser_per_cell: LASER_POINTS_PER_CELL,
        }
    }
}

impl ScoringPolicy {
    /// Value of one matched tile of `kind`. Specials and holes are worth 0.
    pub fn per_tile(&self, kind: TileKind) -> i32 {
        match kind {
            TileKind::Data => self.data,
            TileKind::Theory => self.theory,
            TileKind::Writing => self.writing,
            TileKind::Coffee => self.coffee,
            TileKind::Bug => self.bug,
            TileKind::Bomb | TileKind::Laser | TileKind::Empty => 0,
        }
    }

    pub fn group_score(&self, group: &MatchGroup) -> i32 {
        group.len() as i32 * self.per_tile(group.kind())
    }

    /// Sum of every group's score. Crossing cells are paid once per group.
    pub fn pass_score(&self, matches: &MatchSet) -> i32 {
        matches.groups().iter().map(|g| self.group_score(g)).sum()
    }

    pub fn bomb_score(&self, cleared: usize) -> i32 {
        cleared as i32 * self.bomb_per_cell
    }

    pub fn laser_score(&self, cleared: usize) -> i32 {
        cleared as i32 * self.laser_per_cell
    }
}

/// Apply a signed delta to the running score, flooring at zero.
pub fn apply_delta(score: u32, delta: i32) -> u32 {
    score.saturating_add_signed(delta)
}

/// Score handed to the reviewer: each bug left on the board costs
/// `LEFTOVER_BUG_PENALTY`, floored at zero.
pub fn final_score(score: u32, bugs_on_board: usize) -> u32 {
    score.saturating_sub(LEFTOVER_BUG_PENALTY.saturating_mul(bugs_on_board as u32))
}
