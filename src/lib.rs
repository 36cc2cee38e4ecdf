//! Paper Forge (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof (`paper_forge::{core,adapter,term,input,types}`)
//! and holds the host-side glue shared by the binary and the integration tests.

pub use paper_forge_adapter as adapter;
pub use paper_forge_core as core;
pub use paper_forge_input as input;
pub use paper_forge_term as term;
pub use paper_forge_types as types;

pub mod config;
pub mod host;
pub mod observe;
