//! Paper review - turns a final score into a publication outcome
//!
//! The session calls a [`PaperReviewer`] exactly once at the end of a run.
//! Any `FnMut(u32, &SkillStats) -> PaperResult` is a reviewer, so hosts can
//! plug in their own generator; [`TableReviewer`] is the built-in one that
//! assembles a title and feedback from fixed phrase tables.

use crate::rng::{RandomSource, SimpleRng};
use crate::types::{PaperStatus, SkillStats, Tier};

/// Outcome handed to the surrounding game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperResult {
    pub title: String,
    pub tier: Tier,
    pub score: u32,
    pub status: PaperStatus,
    pub feedback: String,
    /// Always starts at zero; grows outside the forge.
    pub citations: u32,
    pub potential: u32,
}

impl PaperResult {
    /// Accepted papers and minor revisions count as published.
    pub fn is_published(&self) -> bool {
        matches!(self.status, PaperStatus::Accepted | PaperStatus::MinorRevision)
    }

    /// Mood change the host applies on collecting the result
    pub fn mood_delta(&self) -> i32 {
        match self.status {
            PaperStatus::Accepted => 20,
            PaperStatus::Rejected => -20,
            PaperStatus::MinorRevision | PaperStatus::MajorRevision => -10,
        }
    }
}

/// Map a final score onto its tier and status.
pub fn grade(score: u32) -> (Tier, PaperStatus) {
    match score {
        s if s > 800 => (Tier::Top, PaperStatus::Accepted),
        s if s > 500 => (Tier::High, PaperStatus::MinorRevision),
        s if s > 200 => (Tier::Mid, PaperStatus::MajorRevision),
        _ => (Tier::Low, PaperStatus::Rejected),
    }
}

/// Produces the review at the end of a session.
pub trait PaperReviewer {
    fn review(&mut self, final_score: u32, skills: &SkillStats) -> PaperResult;
}

impl<F> PaperReviewer for F
where
    F: FnMut(u32, &SkillStats) -> PaperResult,
{
    fn review(&mut self, final_score: u32, skills: &SkillStats) -> PaperResult {
        self(final_score, skills)
    }
}

const TITLE_PREFIXES: &[&str] = &[
    "Towards ",
    "On ",
    "A Novel Approach to ",
    "Multimodal ",
    "Deep ",
    "Adaptive ",
    "Heterogeneous ",
    "Quantum ",
    "Cloud-Native ",
];

const TITLE_SUBJECTS: &[&str] = &[
    "Convolutional Slacking",
    "Caffeine Intake",
    "Advisor Promises",
    "Lab Involution",
    "Receding Hairlines",
    "Takeout Delivery Latency",
    "Terminal Procrastination",
    "Paper Padding Techniques",
    "Idle Behaviour",
];

const TITLE_SUFFIXES: &[&str] = &[
    ": A Sustainability Study",
    ": Performance Optimisation",
    " via Automated Generation",
    ": A Crash Analysis",
    " on Heterogeneous Hardware",
    ": A Topological Analysis",
    " in Everyday Research",
    ": Theory and Practice",
];

const FEEDBACK_ACCEPTED: &[&str] = &[
    "A work of genius. Recommend an immediate Nobel Prize.",
    "Solves a problem that has haunted academia for years (what to eat for lunch).",
    "This is a seminal work. Accepted as is.",
    "Flawless work, nothing to criticise.",
    "Not only solves the problem but raises deeper ones. Profound.",
];

const FEEDBACK_MINOR: &[&str] = &[
    "Solid work, please polish the language.",
    "Two more experiments and it is done. Figure 3 is clear and even pretty.",
    "Interesting findings, but the related work is thin.",
    "Good overall, accept after fixing a few typos.",
    "Clear logic and detailed data. Briefly justify the parameter choices.",
];

const FEEDBACK_REJECTED: &[&str] = &[
    "Insufficient novelty, and the figures look hand drawn.",
    "Consider submitting to a short story magazine; the logic does not hold.",
    "Too little data, the conclusions are made up.",
    "Too many grammar errors and no baseline comparison.",
    "Reviewer #2 believes your method was disproven in 1990.",
    "The introduction reads like an essay and the method like a riddle.",
];

/// Table-driven reviewer: random title fragments and status feedback.
#[derive(Debug, Clone, Default)]
pub struct TableReviewer<R = SimpleRng> {
    rng: R,
}

impl<R: RandomSource> TableReviewer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pool[self.rng.next_below(pool.len() as u32) as usize]
    }

    fn title(&mut self) -> String {
        let prefix = self.pick(TITLE_PREFIXES);
        let subject = self.pick(TITLE_SUBJECTS);
        let suffix = self.pick(TITLE_SUFFIXES);
        format!("{prefix}{subject}{suffix}")
    }
}

impl<R: RandomSource> PaperReviewer for TableReviewer<R> {
    fn review(&mut self, final_score: u32, _skills: &SkillStats) -> PaperResult {
        let (tier, status) = grade(final_score);
        let title = self.title();
        // Major revisions draw from the minor pool.
        let pool = match status {
            PaperStatus::Accepted => FEEDBACK_ACCEPTED,
            PaperStatus::MinorRevision | PaperStatus::MajorRevision => FEEDBACK_MINOR,
            PaperStatus::Rejected => FEEDBACK_REJECTED,
        };
        let feedback = self.pick(pool).to_string();

        PaperResult {
            title,
            tier,
            score: final_score,
            status,
            feedback,
            citations: 0,
            potential: tier.potential(),
        }
    }
}
