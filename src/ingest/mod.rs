// src/ingest/mod.rs
pub mod end_date;
pub mod providers;
pub mod types;

use crate::config::{SearchWindow, SourceConfig, SourceKind};
use crate::ingest::providers::{citizen_space::CitizenSpaceProvider, civiq_rss::CiviqRssProvider};
use crate::ingest::types::{ConsultationRecord, ConsultationSource};
use metrics::counter;

/// Map configured sources onto adapters, in configured order.
/// Unknown source types are logged and skipped.
pub fn build_sources(
    configs: &[SourceConfig],
    client: &reqwest::Client,
    window: &SearchWindow,
) -> Vec<Box<dyn ConsultationSource>> {
    let mut out: Vec<Box<dyn ConsultationSource>> = Vec::with_capacity(configs.len());
    for cfg in configs {
        match &cfg.kind {
            SourceKind::CitizenSpace => out.push(Box::new(CitizenSpaceProvider::from_url(
                &cfg.label,
                &cfg.url,
                window,
                client.clone(),
            ))),
            SourceKind::RssCiviq => out.push(Box::new(CiviqRssProvider::from_url(
                &cfg.label,
                &cfg.url,
                client.clone(),
            ))),
            SourceKind::Unknown(raw) => {
                tracing::warn!(source_type = %raw, url = %cfg.url, "do not have source type, skipping");
            }
        }
    }
    out
}

/// Poll every source once, sequentially, and concatenate their records.
/// A failing source contributes nothing; the others still run.
pub async fn collect_records(sources: &[Box<dyn ConsultationSource>]) -> Vec<ConsultationRecord> {
    crate::metrics::ensure_described();

    let mut all = Vec::new();
    for s in sources {
        match s.fetch_latest().await {
            Ok(mut v) => {
                tracing::debug!(source = s.name(), count = v.len(), "source fetched");
                all.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = s.name(), "error getting consultations");
                counter!("ingest_source_errors_total").increment(1);
            }
        }
    }
    all
}
