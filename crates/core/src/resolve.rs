//! Resolution engine - swap, match, score, spawn, refill, repeat
//!
//! One player action runs to completion inside a single call:
//!
//! ```text
//! SWAPPING -> CHECK_MATCH -> no match -> SWAP_REVERT -> IDLE
//!                         -> match    -> SCORE_AND_MARK -> REFILL -> CHECK_MATCH ...
//! ```
//!
//! Every board-changing phase is recorded as a [`Frame`] so a host can replay
//! the cascade at its own pace. The final board, score and move count are
//! fixed before any playback starts.

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::board::Board;
use crate::matcher::{find_matches, MatchSet};
use crate::rng::RandomSource;
use crate::scoring::{apply_delta, ScoringPolicy};
use crate::types::{
    NoticeKind, TileKind, BUG_EVENT_PENALTY, COFFEE_EVENT_MOVES, EVENT_CHANCE_PERCENT,
    MAX_CASCADE_PASSES, MAX_GROUPS_PER_PASS,
};

/// Counters the engine mutates on behalf of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ledger {
    pub score: u32,
    pub moves_remaining: u32,
    /// The one-time context event has already fired this session.
    pub event_fired: bool,
}

impl Ledger {
    pub fn new(moves: u32) -> Self {
        Self {
            score: 0,
            moves_remaining: moves,
            event_fired: false,
        }
    }

    fn charge_move(&mut self) {
        self.moves_remaining = self.moves_remaining.saturating_sub(1);
    }
}

/// Tunable rules consulted during resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rules {
    pub scoring: ScoringPolicy,
    pub event_chance_percent: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            scoring: ScoringPolicy::default(),
            event_chance_percent: EVENT_CHANCE_PERCENT,
        }
    }
}

/// What started a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Swap { from: usize, to: usize },
    Bomb { index: usize },
    Laser { index: usize },
}

/// Board-changing phases of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Two tiles exchanged, not yet checked
    Swapping,
    /// Swap produced no match and was undone
    SwapRevert,
    /// Matched (or blasted) cells emptied, spawns placed
    ScoreAndMark,
    /// Gravity and random refill applied
    Refill,
}

/// Board state right after a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub phase: Phase,
    pub board: Board,
}

/// A special tile placed by a large group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spawn {
    pub index: usize,
    pub kind: TileKind,
}

/// One match → score → clear → refill iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePass {
    pub matches: MatchSet,
    pub score_delta: i32,
    pub cleared: usize,
    pub spawns: ArrayVec<Spawn, MAX_GROUPS_PER_PASS>,
    pub event: Option<NoticeKind>,
}

/// Cells removed directly by a special tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blast {
    pub cleared: usize,
    pub score_delta: i32,
}

/// Full report of one player action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub trigger: Trigger,
    /// False only for a swap that produced no match.
    pub accepted: bool,
    pub blast: Option<Blast>,
    pub passes: Vec<CascadePass>,
    pub frames: Vec<Frame>,
    pub notices: Vec<NoticeKind>,
    pub score_before: u32,
    pub score_after: u32,
    /// The pass limit stopped the cascade.
    pub capped: bool,
}

impl Resolution {
    pub(crate) fn new(trigger: Trigger, score_before: u32) -> Self {
        Self {
            trigger,
            accepted: true,
            blast: None,
            passes: Vec::new(),
            frames: Vec::new(),
            notices: Vec::new(),
            score_before,
            score_after: score_before,
            capped: false,
        }
    }

    pub(crate) fn frame(&mut self, phase: Phase, board: &Board) {
        self.frames.push(Frame {
            phase,
            board: *board,
        });
    }

    pub fn score_delta(&self) -> i64 {
        self.score_after as i64 - self.score_before as i64
    }

    /// Most recent notice raised during the action
    pub fn last_notice(&self) -> Option<NoticeKind> {
        self.notices.last().copied()
    }

    /// Every special tile spawned during the cascade, in order
    pub fn spawns(&self) -> impl Iterator<Item = &Spawn> + '_ {
        self.passes.iter().flat_map(|p| p.spawns.iter())
    }
}

/// Borrowed view over everything a resolution mutates.
pub struct Engine<'a, R: RandomSource + ?Sized> {
    pub board: &'a mut Board,
    pub ledger: &'a mut Ledger,
    pub rng: &'a mut R,
    pub rules: &'a Rules,
}

impl<'a, R: RandomSource + ?Sized> Engine<'a, R> {
    pub fn new(board: &'a mut Board, ledger: &'a mut Ledger, rng: &'a mut R, rules: &'a Rules) -> Self {
        Self {
            board,
            ledger,
            rng,
            rules,
        }
    }

    /// Swap two cells and resolve. The move is spent even when the swap is
    /// reverted. Callers check adjacency and bounds.
    pub fn swap(&mut self, from: usize, to: usize) -> Resolution {
        let mut res = Resolution::new(Trigger::Swap { from, to }, self.ledger.score);
        self.ledger.charge_move();

        self.board.swap(from, to);
        res.frame(Phase::Swapping, self.board);

        let matches = find_matches(self.board);
        if matches.is_empty() {
            self.board.swap(from, to);
            res.frame(Phase::SwapRevert, self.board);
            res.accepted = false;
            debug!(from, to, "swap rejected, no match");
        } else {
            self.cascade_from(matches, &mut res);
        }

        res.score_after = self.ledger.score;
        res
    }

    /// Run the match loop on the current board until it is stable.
    pub fn cascade(&mut self, res: &mut Resolution) {
        let matches = find_matches(self.board);
        if !matches.is_empty() {
            self.cascade_from(matches, res);
        }
        res.score_after = self.ledger.score;
    }

    fn cascade_from(&mut self, first: MatchSet, res: &mut Resolution) {
        let mut matches = first;
        loop {
            if res.passes.len() >= MAX_CASCADE_PASSES {
                warn!(passes = res.passes.len(), "cascade pass limit reached");
                res.capped = true;
                break;
            }

            let pass = self.score_and_mark(matches, res);
            debug!(
                pass = res.passes.len() + 1,
                groups = pass.matches.groups().len(),
                cleared = pass.cleared,
                delta = pass.score_delta,
                spawns = pass.spawns.len(),
                "cascade pass"
            );
            res.passes.push(pass);

            self.board.settle(&mut *self.rng);
            res.frame(Phase::Refill, self.board);

            matches = find_matches(self.board);
            if matches.is_empty() {
                break;
            }
        }
    }

    fn score_and_mark(&mut self, matches: MatchSet, res: &mut Resolution) -> CascadePass {
        let score_delta = self.rules.scoring.pass_score(&matches);
        self.ledger.score = apply_delta(self.ledger.score, score_delta);

        let event = self.roll_context_event(&matches);
        if let Some(notice) = event {
            res.notices.push(notice);
        }

        for index in matches.covered_indices() {
            self.board.set(index, TileKind::Empty);
        }

        let mut spawns = ArrayVec::new();
        for group in matches.groups() {
            if let Some((index, kind)) = group.spawn() {
                self.board.set(index, kind);
                spawns.push(Spawn { index, kind });
            }
        }
        res.frame(Phase::ScoreAndMark, self.board);

        CascadePass {
            cleared: matches.covered_count(),
            matches,
            score_delta,
            spawns,
            event,
        }
    }

    /// The once-per-session flavor event. Rolled once per pass until it fires.
    fn roll_context_event(&mut self, matches: &MatchSet) -> Option<NoticeKind> {
        if self.ledger.event_fired {
            return None;
        }
        if self.rng.percent_roll() >= self.rules.event_chance_percent {
            return None;
        }

        let notice = if matches.contains_kind(TileKind::Bug) {
            self.ledger.score = self.ledger.score.saturating_sub(BUG_EVENT_PENALTY);
            NoticeKind::BugDiscovered
        } else if matches.contains_kind(TileKind::Coffee) {
            self.ledger.moves_remaining += COFFEE_EVENT_MOVES;
            NoticeKind::CoffeeDelivered
        } else {
            return None;
        };

        self.ledger.event_fired = true;
        debug!(event = notice.as_str(), "context event fired");
        Some(notice)
    }

    pub(crate) fn charge_move(&mut self) {
        self.ledger.charge_move();
    }
}
