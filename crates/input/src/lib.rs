//! Terminal input module (session-facing).
//!
//! Independent of any UI framework. It maps `crossterm` key events into
//! [`crate::types::GameAction`] and tracks the keyboard cursor that stands in
//! for a pointer on terminals without mouse support.

pub mod cursor;
pub mod map;

pub use paper_forge_types as types;

pub use cursor::Cursor;
pub use map::{handle_key_event, should_quit};
