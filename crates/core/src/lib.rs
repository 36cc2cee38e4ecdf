//! Core forge logic - pure, deterministic, and testable
//!
//! This crate contains every rule of the paper forge: the board, match
//! detection, scoring, cascades, special tiles, the session state machine and
//! the review hand-off. It has **no dependencies** on terminals, sockets or
//! clocks:
//!
//! - **Deterministic**: same board, same random script, same outcome
//! - **Testable**: every random decision goes through [`RandomSource`]
//! - **Portable**: runs in the terminal host, behind the TCP bridge, or headless
//!
//! # Module Structure
//!
//! - [`board`]: 6x6 grid, gravity and refill
//! - [`matcher`]: row and column group detection
//! - [`scoring`]: data-driven point table
//! - [`resolve`]: swap → match → score → refill cascade engine
//! - [`specials`]: bomb and laser activation
//! - [`session`]: move budget, selection, status machine and presentation timers
//! - [`review`]: final score → paper outcome
//! - [`rng`]: injectable random sources
//!
//! # Rules
//!
//! - **Matches**: three or more equal ordinary tiles in a row or column
//! - **Specials**: a group of four leaves a bomb (3x3 blast), five or more a laser (row + column)
//! - **Moves**: every swap attempt or activation costs one, rejected swaps included
//! - **Context event**: once per session a 30% roll on a match either punishes a bug or rewards coffee
//! - **End**: when the budget is spent each bug left on the board costs 10 points
//!
//! # Example
//!
//! ```
//! use paper_forge_core::{Session, SessionConfig, SimpleRng, TapOutcome};
//! use paper_forge_core::types::ForgeStatus;
//!
//! let mut session = Session::new(SessionConfig::instant(), SimpleRng::new(12345));
//! assert_eq!(session.tap(0), TapOutcome::Selected(0));
//!
//! // Adjacent tap attempts a swap, accepted or not.
//! assert!(matches!(session.tap(1), TapOutcome::Resolved(_)));
//! assert_eq!(session.status(), ForgeStatus::Playing);
//! assert!(session.selected().is_none());
//! ```
//!
//! # Timing
//!
//! Outcomes never depend on time. [`Session::tick`](session::Session::tick)
//! only advances the notice banner (2500ms) and cascade playback (300ms per
//! frame by default).

pub mod board;
pub mod matcher;
pub mod resolve;
pub mod review;
pub mod rng;
pub mod scoring;
pub mod session;
pub mod snapshot;
pub mod specials;

pub use paper_forge_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use matcher::{find_matches, has_match, Axis, MatchGroup, MatchSet};
pub use resolve::{Blast, CascadePass, Engine, Frame, Ledger, Phase, Resolution, Rules, Spawn, Trigger};
pub use review::{grade, PaperResult, PaperReviewer, TableReviewer};
pub use rng::{RandomSource, SequenceRng, SimpleRng};
pub use scoring::{apply_delta, final_score, ScoringPolicy};
pub use session::{Session, SessionConfig, TapOutcome};
pub use snapshot::{EventNotice, SessionSnapshot, TimersSnapshot};
pub use specials::{bomb_area, laser_area};
