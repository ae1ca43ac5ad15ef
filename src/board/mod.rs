// src/board/mod.rs
pub mod trello;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Board-side ids resolved once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardContext {
    pub board_id: String,
    pub list_id: String,
    /// label name → label id
    pub labels: HashMap<String, String>,
}

impl BoardContext {
    pub fn resolve_label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}

/// A "create card" request as handed to the board sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    pub board_id: String,
    pub list_id: String,
    pub name: String,
    pub desc: String,
    pub due: Option<DateTime<Utc>>,
    pub label_ids: Vec<String>,
}

#[async_trait::async_trait]
pub trait BoardSink {
    async fn create_card(&self, card: &CardRequest) -> Result<()>;
}

// --- Test helper ---
/// In-memory sink that records every request. Cards whose name is listed
/// in `fail_on` are recorded and then rejected.
pub struct RecordingBoard {
    pub calls: std::sync::Mutex<Vec<CardRequest>>,
    pub fail_on: Vec<String>,
}

impl RecordingBoard {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
            fail_on: vec![],
        }
    }

    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
            fail_on: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn created(&self) -> Vec<CardRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for RecordingBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BoardSink for RecordingBoard {
    async fn create_card(&self, card: &CardRequest) -> Result<()> {
        self.calls.lock().unwrap().push(card.clone());
        if self.fail_on.iter().any(|n| n == &card.name) {
            anyhow::bail!("board rejected card {}", card.name);
        }
        Ok(())
    }
}
