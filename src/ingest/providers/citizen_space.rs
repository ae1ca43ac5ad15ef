// src/ingest/providers/citizen_space.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde_json::Value;

use crate::config::SearchWindow;
use crate::ingest::end_date::parse_search_date;
use crate::ingest::types::{ConsultationRecord, ConsultationSource};

const SEARCH_PATH: &str = "api/2.3/json_search_results";

/// Open consultations from a Citizen Space instance's JSON search API.
pub struct CitizenSpaceProvider {
    label: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

/// `dk=op` limits the search to open consultations.
pub fn search_url(base: &str, window: &SearchWindow) -> String {
    format!(
        "{}/{SEARCH_PATH}?dk=op&fd={}&td={}",
        base.trim_end_matches('/'),
        window.from,
        window.to
    )
}

impl CitizenSpaceProvider {
    pub fn from_fixture_str(label: &str, s: &str) -> Self {
        Self {
            label: label.to_string(),
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(
        label: &str,
        base_url: &str,
        window: &SearchWindow,
        client: reqwest::Client,
    ) -> Self {
        Self {
            label: label.to_string(),
            mode: Mode::Http {
                url: search_url(base_url, window),
                client,
            },
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<ConsultationRecord>> {
        let t0 = std::time::Instant::now();
        let items: Vec<Value> =
            serde_json::from_str(s).context("decoding citizen space search results")?;

        let mut out = Vec::with_capacity(items.len());
        for it in &items {
            let Some(id) = it.get("id").and_then(id_string) else {
                tracing::warn!(provider = self.name(), item = %it, "search result without id, skipping");
                continue;
            };
            let title = text_field(it, "title");

            let end_date = match it.get("enddate").and_then(Value::as_str) {
                Some(raw) => match parse_search_date(raw) {
                    Ok(d) => Some(d),
                    Err(e) => {
                        // Kept with no due date rather than dropped.
                        tracing::warn!(error = %e, title = %title, "failed to parse date for consultation");
                        counter!("ingest_end_date_errors_total").increment(1);
                        None
                    }
                },
                None => None,
            };

            out.push(ConsultationRecord {
                id,
                title,
                url: text_field(it, "url"),
                label: self.label.clone(),
                end_date,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

/// Ids come back as strings on current instances, as numbers on some older ones.
fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(it: &Value, key: &str) -> String {
    it.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[async_trait]
impl ConsultationSource for CitizenSpaceProvider {
    async fn fetch_latest(&self) -> Result<Vec<ConsultationRecord>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .context("citizen space http get()")?
                    .error_for_status()
                    .context("citizen space non-2xx")?
                    .text()
                    .await
                    .context("citizen space http .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "CitizenSpace"
    }
}
