// src/error.rs
use thiserror::Error;

use crate::cache::CacheError;

/// Conditions that abort a run before (or instead of) partial work.
/// Only the binary entry point turns these into an exit code.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("could not get config: {0:#}")]
    Config(anyhow::Error),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("board error: {0:#}")]
    Board(anyhow::Error),
}
