//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for the forge. It avoids widget
//! toolkits and renders into a plain framebuffer that is flushed to the
//! terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Diff frames so cascade playback only repaints changed tiles
//! - Share one layout between drawing and mouse hit-testing

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use paper_forge_core as core;
pub use paper_forge_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
