// src/sync.rs
//! Record → card orchestration.
//!
//! Per record: resolve label, skip if cached, otherwise create the card and
//! only then remember the id. Nothing is retried; a failed card leaves the
//! cache untouched so the next run tries again.

use metrics::counter;
use std::path::Path;

use crate::board::trello::TrelloClient;
use crate::board::{BoardContext, BoardSink, CardRequest};
use crate::cache::DedupCache;
use crate::config::AggregatorConfig;
use crate::error::FatalError;
use crate::ingest::types::{ConsultationRecord, ConsultationSource};
use crate::ingest::{build_sources, collect_records};

/// Terminal state of one record in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Skipped,
    CacheUpdated,
    CardCreateFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Card creations attempted without a label (duplicates not counted).
    pub labels_missing: usize,
}

impl SyncReport {
    fn record(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::CacheUpdated => self.created += 1,
            RecordOutcome::CardCreateFailed => self.failed += 1,
        }
    }
}

/// Build the card for `record`. The flag is `false` when the record's
/// label is unknown on the board; the card then carries no labels at all.
pub fn card_for(record: &ConsultationRecord, board: &BoardContext) -> (CardRequest, bool) {
    let label_id = board.resolve_label(&record.label);
    let card = CardRequest {
        board_id: board.board_id.clone(),
        list_id: board.list_id.clone(),
        name: record.title.clone(),
        desc: record.url.clone(),
        due: record.end_date,
        label_ids: label_id.map(str::to_string).into_iter().collect(),
    };
    (card, label_id.is_some())
}

async fn sync_record<S: BoardSink + ?Sized>(
    record: &ConsultationRecord,
    board: &BoardContext,
    sink: &S,
    cache: &mut DedupCache,
    report: &mut SyncReport,
) -> RecordOutcome {
    let (card, label_found) = card_for(record, board);

    if cache.contains(&record.id) {
        tracing::debug!(id = %record.id, "already carded, skipping");
        counter!("sync_duplicates_total").increment(1);
        return RecordOutcome::Skipped;
    }

    // Only reported for records that go on to card creation.
    if !label_found {
        tracing::warn!(label = %record.label, id = %record.id, "could not find label in board; card will have no labels");
        counter!("sync_labels_missing_total").increment(1);
        report.labels_missing += 1;
    }

    match sink.create_card(&card).await {
        Ok(()) => {
            cache.add(record.id.clone());
            counter!("sync_cards_created_total").increment(1);
            tracing::info!(id = %record.id, title = %record.title, "card created");
            RecordOutcome::CacheUpdated
        }
        Err(e) => {
            tracing::warn!(error = ?e, title = %record.title, "error creating card");
            counter!("sync_cards_failed_total").increment(1);
            RecordOutcome::CardCreateFailed
        }
    }
}

/// Card every record not yet in `cache`, in order. The cache is taken by
/// value and handed back with the ids of successfully created cards appended.
pub async fn sync_records<S: BoardSink + ?Sized>(
    records: &[ConsultationRecord],
    board: &BoardContext,
    sink: &S,
    mut cache: DedupCache,
) -> (DedupCache, SyncReport) {
    crate::metrics::ensure_described();

    let mut report = SyncReport {
        fetched: records.len(),
        ..SyncReport::default()
    };
    for record in records {
        let outcome = sync_record(record, board, sink, &mut cache, &mut report).await;
        report.record(outcome);
    }
    (cache, report)
}

/// Collect → sync → persist. The cache file is rewritten even when no card
/// was created; it is only touched after every record has been processed.
pub async fn run_pipeline<S: BoardSink + ?Sized>(
    sources: &[Box<dyn ConsultationSource>],
    board: &BoardContext,
    sink: &S,
    cache: DedupCache,
    cache_path: &Path,
) -> Result<SyncReport, FatalError> {
    let records = collect_records(sources).await;
    let (cache, report) = sync_records(&records, board, sink, cache).await;
    cache.save(cache_path)?;

    tracing::info!(
        fetched = report.fetched,
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        labels_missing = report.labels_missing,
        cached = cache.len(),
        "sync finished"
    );
    Ok(report)
}

/// Full run against Trello: cache and board lookups are fatal, everything
/// after that degrades per source / per record.
pub async fn run(config: &AggregatorConfig) -> Result<SyncReport, FatalError> {
    let cache_path = config.cache_path().map_err(FatalError::Config)?;
    let cache = DedupCache::load(&cache_path)?;
    tracing::info!(path = %cache_path.display(), cached = cache.len(), "cache loaded");

    let trello = TrelloClient::new(config.trello_key.clone(), config.trello_token.clone());
    let board = trello
        .board_context(&config.trello_board_id, &config.trello_list_name)
        .await
        .map_err(FatalError::Board)?;

    let client = reqwest::Client::new();
    let sources = build_sources(&config.sources, &client, &config.search_window);

    run_pipeline(&sources, &board, &trello, cache, &cache_path).await
}
