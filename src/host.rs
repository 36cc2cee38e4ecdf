//! Host-side session owner.
//!
//! [`ForgeHost`] keeps the live [`Session`], the reviewer and the running
//! career tally. Keyboard, mouse and bridge commands all funnel through it so
//! both front ends see the same rules.

use tracing::info;

use crate::adapter::{ClientCommand, ProtocolError};
use crate::config::RunnerConfig;
use crate::core::{
    PaperResult, RandomSource, Session, SessionConfig, SessionSnapshot, SimpleRng, TableReviewer,
    TapOutcome,
};
use crate::types::{ForgeStatus, GameAction, SkillStats};

/// Totals across collected papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Career {
    pub papers: u32,
    pub published: u32,
    pub citations: u32,
    pub mood: i32,
}

impl Career {
    fn record(&mut self, result: &PaperResult) {
        self.papers += 1;
        if result.is_published() {
            self.published += 1;
        }
        self.citations = self.citations.saturating_add(result.citations);
        self.mood = self.mood.saturating_add(result.mood_delta());
    }
}

pub struct ForgeHost {
    session: Session<SimpleRng>,
    reviewer: TableReviewer<SimpleRng>,
    skills: SkillStats,
    config: SessionConfig,
    /// Seeds each session dealt after a collect.
    seeds: SimpleRng,
    career: Career,
    last_result: Option<PaperResult>,
    dirty: bool,
}

impl ForgeHost {
    pub fn new(config: &RunnerConfig) -> Self {
        let mut seeds = SimpleRng::new(config.seed);
        let session = Session::new(config.session, SimpleRng::new(seeds.next_u32()));
        let reviewer = TableReviewer::new(SimpleRng::new(seeds.next_u32()));
        info!(seed = config.seed, "forge host ready");
        Self::from_parts(session, reviewer, seeds)
    }

    /// Wrap an existing session (fixed boards in tests and demos).
    pub fn from_parts(
        session: Session<SimpleRng>,
        reviewer: TableReviewer<SimpleRng>,
        seeds: SimpleRng,
    ) -> Self {
        let mut host = Self {
            config: *session.config(),
            session,
            reviewer,
            skills: SkillStats::default(),
            seeds,
            career: Career::default(),
            last_result: None,
            dirty: true,
        };
        host.review_if_generating();
        host
    }

    pub fn session(&self) -> &Session<SimpleRng> {
        &self.session
    }

    pub fn career(&self) -> Career {
        self.career
    }

    /// The paper collected most recently, if any.
    pub fn last_result(&self) -> Option<&PaperResult> {
        self.last_result.as_ref()
    }

    pub fn set_skills(&mut self, skills: SkillStats) {
        self.skills = skills;
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        self.session.snapshot_into(out);
    }

    /// True once since the last call if anything observable changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn tap(&mut self, index: usize) -> TapOutcome {
        let outcome = self.session.tap(index);
        if outcome != TapOutcome::Ignored {
            self.dirty = true;
            self.review_if_generating();
        }
        outcome
    }

    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let changed = self.session.tick(elapsed_ms);
        self.dirty |= changed;
        if changed {
            self.review_if_generating();
        }
        changed
    }

    /// A session that has spent its budget goes straight to the reviewer.
    fn review_if_generating(&mut self) {
        if self.session.status() == ForgeStatus::Generating {
            self.review();
        }
    }

    /// Send the paper to review. False unless the session is generating.
    pub fn review(&mut self) -> bool {
        let reviewed = self
            .session
            .review(&mut self.reviewer, &self.skills)
            .is_some();
        self.dirty |= reviewed;
        reviewed
    }

    /// Collect a reviewed paper and deal a fresh session.
    pub fn collect(&mut self) -> Option<&PaperResult> {
        if self.session.status() != ForgeStatus::Review {
            return None;
        }
        let next = Session::new(self.config, SimpleRng::new(self.seeds.next_u32()));
        let finished = std::mem::replace(&mut self.session, next);
        match finished.collect() {
            Ok(result) => {
                self.career.record(&result);
                info!(
                    papers = self.career.papers,
                    published = self.career.published,
                    mood = self.career.mood,
                    "career updated"
                );
                self.last_result = Some(result);
                self.dirty = true;
                self.review_if_generating();
                self.last_result.as_ref()
            }
            Err(session) => {
                self.session = session;
                None
            }
        }
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.dirty = true;
        self.review_if_generating();
    }

    /// Quit the current run without a result.
    pub fn abandon(self) {
        self.session.abandon();
    }

    /// Apply a non-cursor keyboard action.
    pub fn apply_action(&mut self, action: GameAction) {
        match action {
            GameAction::Review => self.review_if_generating(),
            GameAction::Collect => {
                self.collect();
            }
            GameAction::Restart => self.restart(),
            GameAction::CursorUp
            | GameAction::CursorDown
            | GameAction::CursorLeft
            | GameAction::CursorRight
            | GameAction::Tap => {}
        }
    }

    /// Apply a bridge command. Refusals map onto `invalid_command`.
    pub fn apply(&mut self, cmd: ClientCommand) -> Result<(), ProtocolError> {
        match cmd {
            ClientCommand::Tap(index) => {
                self.tap(index);
                Ok(())
            }
            // Reviews run on their own; this only confirms one is on hand.
            ClientCommand::Review => {
                self.review_if_generating();
                (self.session.status() == ForgeStatus::Review)
                    .then_some(())
                    .ok_or(ProtocolError::Rejected("no paper has been reviewed yet"))
            }
            ClientCommand::Collect => self
                .collect()
                .map(|_| ())
                .ok_or(ProtocolError::Rejected("no reviewed paper to collect")),
            ClientCommand::Restart => {
                self.restart();
                Ok(())
            }
        }
    }
}
