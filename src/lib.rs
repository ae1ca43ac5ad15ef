// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod sync;

// ---- Re-exports for stable public API ----
pub use crate::board::{BoardContext, BoardSink, CardRequest};
pub use crate::cache::DedupCache;
pub use crate::config::{AggregatorConfig, SourceConfig, SourceKind};
pub use crate::error::FatalError;
pub use crate::ingest::types::{ConsultationRecord, ConsultationSource};
pub use crate::sync::{run, SyncReport};
