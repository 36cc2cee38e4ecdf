//! Session controller - move budget, selection and the status machine
//!
//! ```text
//! PLAYING --tap--> RESOLVING --playback drained--> PLAYING
//!    |                                                |
//!    +------------- moves == 0 and idle --------------+--> GENERATING --review--> REVIEW --collect--> done
//! ```
//!
//! Every outcome (board, score, moves, events) is decided inside [`Session::tap`].
//! [`Session::tick`] only drives presentation: the notice banner and the
//! frame-by-frame playback of a cascade. With a zero step delay the session
//! never leaves PLAYING during a tap.

use tracing::{debug, info};

use crate::board::Board;
use crate::resolve::{Engine, Frame, Ledger, Resolution, Rules};
use crate::review::{PaperResult, PaperReviewer};
use crate::rng::{RandomSource, SimpleRng};
use crate::scoring::final_score;
use crate::snapshot::{EventNotice, SessionSnapshot, TimersSnapshot};
use crate::types::{
    ForgeStatus, NoticeKind, SkillStats, TileKind, CASCADE_STEP_MS, DEFAULT_MOVE_BUDGET, NOTICE_MS,
};

/// Tunables for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub move_budget: u32,
    /// Delay between presented cascade frames. Zero resolves instantly.
    pub cascade_step_ms: u32,
    pub notice_ms: u32,
    pub rules: Rules,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_budget: DEFAULT_MOVE_BUDGET,
            cascade_step_ms: CASCADE_STEP_MS,
            notice_ms: NOTICE_MS,
            rules: Rules::default(),
        }
    }
}

impl SessionConfig {
    /// Default rules without cascade playback.
    pub fn instant() -> Self {
        Self {
            cascade_step_ms: 0,
            ..Self::default()
        }
    }
}

/// What a tap did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Out of range, not playing, or a cascade is still on screen
    Ignored,
    Selected(usize),
    Deselected,
    /// A swap was attempted or a special fired
    Resolved(Resolution),
}

#[derive(Debug, Clone)]
struct Playback {
    frames: Vec<Frame>,
    step_ms: u32,
    remaining_ms: u32,
}

impl Playback {
    fn total_ms(&self) -> u32 {
        self.step_ms.saturating_mul(self.frames.len() as u32)
    }

    fn current(&self) -> usize {
        let elapsed = self.total_ms() - self.remaining_ms;
        ((elapsed / self.step_ms.max(1)) as usize).min(self.frames.len().saturating_sub(1))
    }
}

/// One run of the mini-game
#[derive(Debug, Clone)]
pub struct Session<R: RandomSource = SimpleRng> {
    board: Board,
    ledger: Ledger,
    selected: Option<usize>,
    status: ForgeStatus,
    notice: Option<EventNotice>,
    playback: Option<Playback>,
    final_score: Option<u32>,
    result: Option<PaperResult>,
    /// Monotonic id, bumped by restart.
    episode_id: u32,
    config: SessionConfig,
    rng: R,
}

impl<R: RandomSource> Session<R> {
    /// Start a session on a freshly randomized board.
    pub fn new(config: SessionConfig, mut rng: R) -> Self {
        let board = Board::random(&mut rng);
        Self::with_board(config, board, rng)
    }

    /// Start a session on a given board.
    pub fn with_board(config: SessionConfig, board: Board, rng: R) -> Self {
        let mut session = Self {
            board,
            ledger: Ledger::new(config.move_budget),
            selected: None,
            status: ForgeStatus::Playing,
            notice: None,
            playback: None,
            final_score: None,
            result: None,
            episode_id: 0,
            config,
            rng,
        };
        info!(moves = config.move_budget, "forge session started");
        session.check_end();
        session
    }

    /// Throw away the current run and deal a new board.
    pub fn restart(&mut self) {
        self.board = Board::random(&mut self.rng);
        self.ledger = Ledger::new(self.config.move_budget);
        self.selected = None;
        self.status = ForgeStatus::Playing;
        self.notice = None;
        self.playback = None;
        self.final_score = None;
        self.result = None;
        self.episode_id = self.episode_id.wrapping_add(1);
        info!(episode = self.episode_id, "forge session restarted");
        self.check_end();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The board to draw: the current playback frame while resolving.
    pub fn display_board(&self) -> &Board {
        match &self.playback {
            Some(pb) => pb
                .frames
                .get(pb.current())
                .map(|f| &f.board)
                .unwrap_or(&self.board),
            None => &self.board,
        }
    }

    pub fn score(&self) -> u32 {
        self.ledger.score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.ledger.moves_remaining
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn status(&self) -> ForgeStatus {
        self.status
    }

    pub fn notice(&self) -> Option<EventNotice> {
        self.notice
    }

    pub fn event_fired(&self) -> bool {
        self.ledger.event_fired
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    pub fn result(&self) -> Option<&PaperResult> {
        self.result.as_ref()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True while a cascade is still being presented
    pub fn is_busy(&self) -> bool {
        self.playback.is_some()
    }

    /// Select, deselect, swap or activate.
    pub fn tap(&mut self, index: usize) -> TapOutcome {
        if self.status != ForgeStatus::Playing || self.playback.is_some() {
            return TapOutcome::Ignored;
        }
        let Some(kind) = self.board.get(index) else {
            return TapOutcome::Ignored;
        };

        if kind.is_special() {
            self.selected = None;
            let rules = self.config.rules;
            let mut engine = Engine::new(&mut self.board, &mut self.ledger, &mut self.rng, &rules);
            let res = match kind {
                TileKind::Bomb => engine.activate_bomb(index),
                _ => engine.activate_laser(index),
            };
            self.after_resolution(&res);
            return TapOutcome::Resolved(res);
        }

        match self.selected {
            None => {
                self.selected = Some(index);
                TapOutcome::Selected(index)
            }
            Some(current) if current == index => {
                self.selected = None;
                TapOutcome::Deselected
            }
            Some(current) if Board::is_adjacent(current, index) => {
                self.selected = None;
                let rules = self.config.rules;
                let res = Engine::new(&mut self.board, &mut self.ledger, &mut self.rng, &rules)
                    .swap(current, index);
                self.after_resolution(&res);
                TapOutcome::Resolved(res)
            }
            Some(_) => {
                self.selected = Some(index);
                TapOutcome::Selected(index)
            }
        }
    }

    fn after_resolution(&mut self, res: &Resolution) {
        if let Some(kind) = res.last_notice() {
            self.show_notice(kind);
        }
        debug!(
            accepted = res.accepted,
            passes = res.passes.len(),
            delta = res.score_delta(),
            moves = self.ledger.moves_remaining,
            "action resolved"
        );

        if self.config.cascade_step_ms > 0 && !res.frames.is_empty() {
            let mut playback = Playback {
                frames: res.frames.clone(),
                step_ms: self.config.cascade_step_ms,
                remaining_ms: 0,
            };
            playback.remaining_ms = playback.total_ms();
            self.playback = Some(playback);
            self.status = ForgeStatus::Resolving;
        } else {
            self.check_end();
        }
    }

    fn show_notice(&mut self, kind: NoticeKind) {
        self.notice = Some(EventNotice {
            kind,
            remaining_ms: self.config.notice_ms,
        });
    }

    /// Advance presentation timers. Returns true if what a host should draw
    /// changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let mut changed = false;

        if let Some(notice) = &mut self.notice {
            notice.remaining_ms = notice.remaining_ms.saturating_sub(elapsed_ms);
            if notice.remaining_ms == 0 {
                self.notice = None;
                changed = true;
            }
        }

        if let Some(pb) = &mut self.playback {
            let before = pb.current();
            pb.remaining_ms = pb.remaining_ms.saturating_sub(elapsed_ms);
            if pb.remaining_ms == 0 {
                self.playback = None;
                self.status = ForgeStatus::Playing;
                self.check_end();
                changed = true;
            } else if pb.current() != before {
                changed = true;
            }
        }

        changed
    }

    fn check_end(&mut self) {
        if self.status != ForgeStatus::Playing
            || self.playback.is_some()
            || self.ledger.moves_remaining > 0
        {
            return;
        }
        let bugs = self.board.count(TileKind::Bug);
        let score = final_score(self.ledger.score, bugs);
        self.final_score = Some(score);
        self.status = ForgeStatus::Generating;
        self.selected = None;
        info!(
            score = self.ledger.score,
            bugs,
            final_score = score,
            "move budget spent, generating paper"
        );
    }

    /// Hand the final score to `reviewer`. Only valid while generating.
    pub fn review<V>(&mut self, reviewer: &mut V, skills: &SkillStats) -> Option<&PaperResult>
    where
        V: PaperReviewer + ?Sized,
    {
        if self.status != ForgeStatus::Generating {
            return None;
        }
        let score = self.final_score?;
        let result = reviewer.review(score, skills);
        info!(
            status = result.status.as_str(),
            tier = result.tier.label(),
            "paper reviewed"
        );
        self.result = Some(result);
        self.status = ForgeStatus::Review;
        self.result.as_ref()
    }

    /// Accept the reviewed outcome, ending the session. Hands the session
    /// back unchanged if no review has been made yet.
    pub fn collect(mut self) -> Result<PaperResult, Self> {
        if self.status != ForgeStatus::Review {
            return Err(self);
        }
        match self.result.take() {
            Some(result) => {
                info!(episode = self.episode_id, "paper collected");
                Ok(result)
            }
            None => Err(self),
        }
    }

    /// Quit without a result.
    pub fn abandon(self) {
        info!(
            episode = self.episode_id,
            score = self.ledger.score,
            moves = self.ledger.moves_remaining,
            "forge session abandoned"
        );
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        self.display_board().write_grid(&mut out.board);
        out.episode_id = self.episode_id;
        out.score = self.ledger.score;
        out.moves_remaining = self.ledger.moves_remaining;
        out.selected = self.selected;
        out.status = self.status;
        out.notice = self.notice;
        out.event_fired = self.ledger.event_fired;
        out.final_score = self.final_score;
        out.result.clone_from(&self.result);
        out.timers = TimersSnapshot {
            playback_ms: self.playback.as_ref().map_or(0, |pb| pb.remaining_ms),
            notice_ms: self.notice.map_or(0, |n| n.remaining_ms),
        };
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut s = SessionSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
