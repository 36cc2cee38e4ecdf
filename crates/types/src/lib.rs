//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the Paper Forge
//! workspace. All types are pure data with no external dependencies, so they
//! can be shared by the rules engine, the terminal host and the JSON bridge.
//!
//! # Board Dimensions
//!
//! The forge board is a square grid:
//!
//! - **Side**: 6 cells (`GRID_SIZE`)
//! - **Cells**: 36, stored row-major (`index = row * GRID_SIZE + col`)
//!
//! # Rules Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_MOVE_BUDGET` | 20 | Moves granted at session start |
//! | `EVENT_CHANCE_PERCENT` | 30 | Roll needed for the one-time context event |
//! | `BUG_EVENT_PENALTY` | 30 | Score lost when the bug event fires |
//! | `COFFEE_EVENT_MOVES` | 3 | Moves gained when the coffee event fires |
//! | `LEFTOVER_BUG_PENALTY` | 10 | Final-score deduction per bug left on the board |
//! | `BOMB_POINTS_PER_CELL` | 30 | Bomb activation score per cleared cell |
//! | `LASER_POINTS_PER_CELL` | 50 | Laser activation score per cleared cell |
//! | `MAX_CASCADE_PASSES` | 64 | Hard bound on match passes per action |
//!
//! # Presentation Timing
//!
//! Timing values are in milliseconds and never influence scoring:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Host frame interval (~60 FPS) |
//! | `CASCADE_STEP_MS` | 300 | Playback delay per cascade frame |
//! | `NOTICE_MS` | 2500 | Lifetime of an event notice |
//!
//! # Examples
//!
//! ```
//! use paper_forge_types::{TileKind, GameAction, GRID_SIZE, CELL_COUNT};
//!
//! let kind = TileKind::Coffee;
//! assert!(kind.is_ordinary());
//! assert_eq!(TileKind::from_str("coffee"), Some(kind));
//! assert_eq!(TileKind::from_letter('C'), Some(kind));
//!
//! assert!(TileKind::Bomb.is_special());
//! assert_eq!(GameAction::from_str("tap"), Some(GameAction::Tap));
//!
//! assert_eq!(GRID_SIZE, 6);
//! assert_eq!(CELL_COUNT, 36);
//! ```

/// Board side length in cells (6)
pub const GRID_SIZE: usize = 6;

/// Total number of cells on the board (36)
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Moves granted to a fresh session
pub const DEFAULT_MOVE_BUDGET: u32 = 20;

/// Host frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Playback delay per cascade frame
pub const CASCADE_STEP_MS: u32 = 300;

/// Lifetime of an event notice
pub const NOTICE_MS: u32 = 2500;

/// Percent chance that a qualifying cascade fires the one-time context event
pub const EVENT_CHANCE_PERCENT: u32 = 30;

/// Score removed by the "bug discovered" event
pub const BUG_EVENT_PENALTY: u32 = 30;

/// Moves granted by the "coffee delivered" event
pub const COFFEE_EVENT_MOVES: u32 = 3;

/// Final-score deduction per BUG tile still on the board at session end
pub const LEFTOVER_BUG_PENALTY: u32 = 10;

/// Bomb activation points per cleared cell
pub const BOMB_POINTS_PER_CELL: i32 = 30;

/// Laser activation points per cleared cell
pub const LASER_POINTS_PER_CELL: i32 = 50;

/// Upper bound on match passes within one resolution
pub const MAX_CASCADE_PASSES: usize = 64;

/// Minimum run length that forms a match group
pub const MIN_MATCH_LEN: usize = 3;

/// Largest number of groups a single pass can yield (two runs per line, every line).
pub const MAX_GROUPS_PER_PASS: usize = 2 * GRID_SIZE * (GRID_SIZE / MIN_MATCH_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_rule_defaults() {
        assert_eq!(GRID_SIZE, 6);
        assert_eq!(DEFAULT_MOVE_BUDGET, 20);
        assert_eq!(EVENT_CHANCE_PERCENT, 30);
        assert_eq!(BUG_EVENT_PENALTY, 30);
        assert_eq!(COFFEE_EVENT_MOVES, 3);
        assert_eq!(LEFTOVER_BUG_PENALTY, 10);
        assert_eq!(BOMB_POINTS_PER_CELL, 30);
        assert_eq!(LASER_POINTS_PER_CELL, 50);
        assert_eq!(NOTICE_MS, 2500);
    }

    #[test]
    fn group_capacity_covers_two_runs_per_line() {
        // 6 rows + 6 columns, each able to hold two disjoint runs of 3.
        assert_eq!(MAX_GROUPS_PER_PASS, 24);
    }

    #[test]
    fn tile_kind_letters_roundtrip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_letter(kind.letter()), Some(kind));
            assert_eq!(TileKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn wire_names_parse_back() {
        for status in [
            ForgeStatus::Playing,
            ForgeStatus::Resolving,
            ForgeStatus::Generating,
            ForgeStatus::Review,
        ] {
            assert_eq!(ForgeStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(PaperStatus::from_str("MINOR_REVISION"), Some(PaperStatus::MinorRevision));
        assert_eq!(NoticeKind::from_str("coffeeDelivered"), Some(NoticeKind::CoffeeDelivered));
        assert_eq!(Tier::from_label("SCI Zone 3/4"), Some(Tier::Mid));
        assert_eq!(Tier::from_label("arXiv"), None);
        assert_eq!(ForgeStatus::from_str("PLAYING"), None);
    }

    #[test]
    fn ordinary_and_special_sets_are_disjoint() {
        for kind in TileKind::ORDINARY {
            assert!(kind.is_ordinary());
            assert!(!kind.is_special());
        }
        assert!(TileKind::Bomb.is_special());
        assert!(TileKind::Laser.is_special());
        assert!(!TileKind::Empty.is_ordinary());
        assert!(!TileKind::Empty.is_special());
    }
}

/// The kinds of tile that can occupy a board cell
///
/// - **Data / Theory / Writing / Coffee / Bug**: ordinary kinds, matched by runs
/// - **Bomb / Laser**: special kinds, removed only by activation or by being swept
/// - **Empty**: transient hole that exists only inside a resolution step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    Data,
    Theory,
    Writing,
    Coffee,
    Bug,
    Bomb,
    Laser,
    #[default]
    Empty,
}

impl TileKind {
    /// Kinds drawn by the refill and participating in matches.
    pub const ORDINARY: [TileKind; 5] = [
        TileKind::Data,
        TileKind::Theory,
        TileKind::Writing,
        TileKind::Coffee,
        TileKind::Bug,
    ];

    /// Every kind, in declaration order.
    pub const ALL: [TileKind; 8] = [
        TileKind::Data,
        TileKind::Theory,
        TileKind::Writing,
        TileKind::Coffee,
        TileKind::Bug,
        TileKind::Bomb,
        TileKind::Laser,
        TileKind::Empty,
    ];

    pub fn is_ordinary(&self) -> bool {
        matches!(
            self,
            TileKind::Data | TileKind::Theory | TileKind::Writing | TileKind::Coffee | TileKind::Bug
        )
    }

    pub fn is_special(&self) -> bool {
        matches!(self, TileKind::Bomb | TileKind::Laser)
    }

    /// Parse tile kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use paper_forge_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("DATA"), Some(TileKind::Data));
    /// assert_eq!(TileKind::from_str("laser"), Some(TileKind::Laser));
    /// assert_eq!(TileKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "data" => Some(TileKind::Data),
            "theory" => Some(TileKind::Theory),
            "writing" => Some(TileKind::Writing),
            "coffee" => Some(TileKind::Coffee),
            "bug" => Some(TileKind::Bug),
            "bomb" => Some(TileKind::Bomb),
            "laser" => Some(TileKind::Laser),
            "empty" => Some(TileKind::Empty),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Data => "data",
            TileKind::Theory => "theory",
            TileKind::Writing => "writing",
            TileKind::Coffee => "coffee",
            TileKind::Bug => "bug",
            TileKind::Bomb => "bomb",
            TileKind::Laser => "laser",
            TileKind::Empty => "empty",
        }
    }

    /// Single-character form used by board text dumps and the wire protocol.
    pub fn letter(&self) -> char {
        match self {
            TileKind::Data => 'D',
            TileKind::Theory => 'T',
            TileKind::Writing => 'W',
            TileKind::Coffee => 'C',
            TileKind::Bug => 'B',
            TileKind::Bomb => '*',
            TileKind::Laser => '+',
            TileKind::Empty => '.',
        }
    }

    /// Inverse of [`TileKind::letter`]. Letters are case-insensitive.
    pub fn from_letter(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'D' => Some(TileKind::Data),
            'T' => Some(TileKind::Theory),
            'W' => Some(TileKind::Writing),
            'C' => Some(TileKind::Coffee),
            'B' => Some(TileKind::Bug),
            '*' => Some(TileKind::Bomb),
            '+' => Some(TileKind::Laser),
            '.' => Some(TileKind::Empty),
            _ => None,
        }
    }
}

/// Session status machine
///
/// `Playing → Resolving → Playing … → Generating → Review`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgeStatus {
    /// Accepting taps
    Playing,
    /// A cascade is being played back; taps are rejected
    Resolving,
    /// Moves are exhausted; waiting for the paper review
    Generating,
    /// Review result available; only collection remains
    Review,
}

impl ForgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForgeStatus::Playing => "playing",
            ForgeStatus::Resolving => "resolving",
            ForgeStatus::Generating => "generating",
            ForgeStatus::Review => "review",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "playing" => Some(ForgeStatus::Playing),
            "resolving" => Some(ForgeStatus::Resolving),
            "generating" => Some(ForgeStatus::Generating),
            "review" => Some(ForgeStatus::Review),
            _ => None,
        }
    }
}

/// Review verdict attached to a forged paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperStatus {
    Accepted,
    MinorRevision,
    MajorRevision,
    Rejected,
}

impl PaperStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaperStatus::Accepted => "ACCEPTED",
            PaperStatus::MinorRevision => "MINOR_REVISION",
            PaperStatus::MajorRevision => "MAJOR_REVISION",
            PaperStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACCEPTED" => Some(PaperStatus::Accepted),
            "MINOR_REVISION" => Some(PaperStatus::MinorRevision),
            "MAJOR_REVISION" => Some(PaperStatus::MajorRevision),
            "REJECTED" => Some(PaperStatus::Rejected),
            _ => None,
        }
    }
}

/// Venue tier the review places a paper in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Low,
    Mid,
    High,
    Top,
}

impl Tier {
    /// Human-readable venue label
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Top => "Nature/Science (Top)",
            Tier::High => "SCI Zone 1/2",
            Tier::Mid => "SCI Zone 3/4",
            Tier::Low => "Predatory Journal",
        }
    }

    /// Hidden growth potential granted to papers of this tier
    pub fn potential(&self) -> u32 {
        match self {
            Tier::Top => 50,
            Tier::High => 20,
            Tier::Mid => 5,
            Tier::Low => 0,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [Tier::Top, Tier::High, Tier::Mid, Tier::Low]
            .into_iter()
            .find(|t| t.label() == label)
    }
}

/// Transient host-facing notices raised by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    BugDiscovered,
    CoffeeDelivered,
    BombDetonated,
    LaserFired,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::BugDiscovered => "Major logic flaw discovered! (score -30)",
            NoticeKind::CoffeeDelivered => "Late-night takeout arrived (moves +3)",
            NoticeKind::BombDetonated => "Inspiration bomb! 3x3 area cleared!",
            NoticeKind::LaserFired => "Full row and column cleared!",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::BugDiscovered => "bugDiscovered",
            NoticeKind::CoffeeDelivered => "coffeeDelivered",
            NoticeKind::BombDetonated => "bombDetonated",
            NoticeKind::LaserFired => "laserFired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bugDiscovered" => Some(NoticeKind::BugDiscovered),
            "coffeeDelivered" => Some(NoticeKind::CoffeeDelivered),
            "bombDetonated" => Some(NoticeKind::BombDetonated),
            "laserFired" => Some(NoticeKind::LaserFired),
            _ => None,
        }
    }
}

/// Player skill context handed to the paper reviewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SkillStats {
    pub theory: u32,
    pub experiment: u32,
    pub writing: u32,
    pub presentation: u32,
    pub survival: u32,
}

/// Host actions
///
/// Used by the terminal host (cursor driven) and by the JSON bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move the board cursor one row up
    CursorUp,
    /// Move the board cursor one row down
    CursorDown,
    /// Move the board cursor one column left
    CursorLeft,
    /// Move the board cursor one column right
    CursorRight,
    /// Tap the tile under the cursor (select, swap or activate)
    Tap,
    /// Submit the finished board for review
    Review,
    /// Accept the review and leave the forge
    Collect,
    /// Start a fresh session
    Restart,
}

impl GameAction {
    /// Parse action from string (for the JSON bridge)
    ///
    /// # Examples
    ///
    /// ```
    /// use paper_forge_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("cursorLeft"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("collect"), Some(GameAction::Collect));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "tap" => Some(GameAction::Tap),
            "review" => Some(GameAction::Review),
            "collect" => Some(GameAction::Collect),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::Tap => "tap",
            GameAction::Review => "review",
            GameAction::Collect => "collect",
            GameAction::Restart => "restart",
        }
    }
}
