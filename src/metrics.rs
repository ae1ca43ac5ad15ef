// src/metrics.rs
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metric descriptions. The facade is a no-op until a recorder
/// is installed by whoever embeds the library.
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_records_total",
            "Consultation records parsed from sources."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Source fetch/decode errors (source contributed nothing)."
        );
        describe_counter!(
            "ingest_end_date_errors_total",
            "Records whose end date could not be parsed."
        );
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
        describe_counter!("sync_cards_created_total", "Cards created on the board.");
        describe_counter!("sync_cards_failed_total", "Card creation failures.");
        describe_counter!(
            "sync_duplicates_total",
            "Records skipped because their id was already cached."
        );
        describe_counter!(
            "sync_labels_missing_total",
            "Records whose label name does not exist on the board."
        );
    });
}
