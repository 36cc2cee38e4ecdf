//! Runner configuration and logging setup.
//!
//! - `FORGE_SEED`: board/review seed (default: random)
//! - `FORGE_MOVES`: move budget per session (default: 20)
//! - `FORGE_LOG_PATH`: write `tracing` output to this file; without it nothing is logged
//! - `FORGE_LOG`: filter directives (default: `paper_forge=info`)

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::core::SessionConfig;
use crate::types::DEFAULT_MOVE_BUDGET;

pub const DEFAULT_LOG_FILTER: &str = "paper_forge=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    pub seed: u32,
    pub session: SessionConfig,
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let seed = lookup("FORGE_SEED")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or_else(rand::random);
        let move_budget = lookup("FORGE_MOVES")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_MOVE_BUDGET);

        Self {
            seed,
            session: SessionConfig {
                move_budget,
                ..SessionConfig::default()
            },
        }
    }
}

/// Install the file logger when `FORGE_LOG_PATH` is set.
///
/// The terminal owns stdout, so there is no console fallback. Returns whether
/// a subscriber was installed.
pub fn init_logging() -> Result<bool> {
    let Some(path) = std::env::var("FORGE_LOG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path))?;

    let filter = EnvFilter::try_from_env("FORGE_LOG")
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("parsing FORGE_LOG")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing logger: {}", e))?;

    tracing::info!(%path, "logging started");
    Ok(true)
}
