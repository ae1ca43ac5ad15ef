// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Common shape every feed adapter normalizes its entries into.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ConsultationRecord {
    pub id: String,    // stable per consultation, used for dedup
    pub title: String, // unescaped, display-ready
    pub url: String,   // canonical link, becomes the card description
    pub label: String, // board label *name*, resolved at sync time
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait ConsultationSource {
    async fn fetch_latest(&self) -> Result<Vec<ConsultationRecord>>;
    fn name(&self) -> &'static str;
}
