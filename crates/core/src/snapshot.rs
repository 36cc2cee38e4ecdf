use crate::review::PaperResult;
use crate::types::{ForgeStatus, NoticeKind, TileKind, GRID_SIZE};

/// Transient banner raised by an event or activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventNotice {
    pub kind: NoticeKind,
    pub remaining_ms: u32,
}

impl EventNotice {
    pub fn message(&self) -> &'static str {
        self.kind.message()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TimersSnapshot {
    /// Cascade playback left before the session accepts taps again.
    pub playback_ms: u32,
    pub notice_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The board as currently presented (a playback frame while resolving).
    pub board: [[TileKind; GRID_SIZE]; GRID_SIZE],
    pub episode_id: u32,
    pub score: u32,
    pub moves_remaining: u32,
    pub selected: Option<usize>,
    pub status: ForgeStatus,
    pub notice: Option<EventNotice>,
    pub event_fired: bool,
    pub final_score: Option<u32>,
    pub result: Option<PaperResult>,
    pub timers: TimersSnapshot,
}

impl SessionSnapshot {
    pub fn clear(&mut self) {
        self.board = [[TileKind::Empty; GRID_SIZE]; GRID_SIZE];
        self.episode_id = 0;
        self.score = 0;
        self.moves_remaining = 0;
        self.selected = None;
        self.status = ForgeStatus::Playing;
        self.notice = None;
        self.event_fired = false;
        self.final_score = None;
        self.result = None;
        self.timers = TimersSnapshot::default();
    }

    /// True when a tap could change the board
    pub fn playable(&self) -> bool {
        self.status == ForgeStatus::Playing
    }

    /// Board rows as letter strings, top row first
    pub fn board_rows(&self) -> Vec<String> {
        self.board
            .iter()
            .map(|row| row.iter().map(|k| k.letter()).collect())
            .collect()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            board: [[TileKind::Empty; GRID_SIZE]; GRID_SIZE],
            episode_id: 0,
            score: 0,
            moves_remaining: 0,
            selected: None,
            status: ForgeStatus::Playing,
            notice: None,
            event_fired: false,
            final_score: None,
            result: None,
            timers: TimersSnapshot::default(),
        }
    }
}
