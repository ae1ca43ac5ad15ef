// tests/sync_pipeline.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use consultation_aggregator::board::RecordingBoard;
use consultation_aggregator::ingest::providers::citizen_space::CitizenSpaceProvider;
use consultation_aggregator::sync::{run_pipeline, sync_records};
use consultation_aggregator::{BoardContext, ConsultationRecord, ConsultationSource, DedupCache};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

struct FixtureSource(Vec<ConsultationRecord>);

#[async_trait]
impl ConsultationSource for FixtureSource {
    async fn fetch_latest(&self) -> Result<Vec<ConsultationRecord>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "FixtureSource"
    }
}

fn rec(id: &str, label: &str) -> ConsultationRecord {
    ConsultationRecord {
        id: id.into(),
        title: format!("Consultation {id}"),
        url: format!("https://haveyoursay.example.org/en/node/{id}"),
        label: label.into(),
        end_date: None,
    }
}

fn board() -> BoardContext {
    BoardContext {
        board_id: "board-1".into(),
        list_id: "list-open".into(),
        labels: HashMap::from([
            ("Gov".to_string(), "label-gov".to_string()),
            ("Civiq".to_string(), "label-civiq".to_string()),
        ]),
    }
}

fn cache_file(dir: &Path, body: &str) -> PathBuf {
    let p = dir.join(".ConsultationCache");
    fs::write(&p, body).unwrap();
    p
}

fn saved_ids(p: &Path) -> Vec<String> {
    serde_json::from_str(&fs::read_to_string(p).unwrap()).unwrap()
}

#[tokio::test]
async fn only_uncached_record_is_carded() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(dir.path(), r#"["abc"]"#);
    let sources: Vec<Box<dyn ConsultationSource>> =
        vec![Box::new(FixtureSource(vec![rec("abc", "Gov"), rec("def", "Gov")]))];
    let sink = RecordingBoard::new();

    let cache = DedupCache::load(&path).unwrap();
    let report = run_pipeline(&sources, &board(), &sink, cache, &path)
        .await
        .unwrap();

    let created = sink.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].name, "Consultation def");
    assert_eq!(created[0].desc, "https://haveyoursay.example.org/en/node/def");
    assert_eq!(created[0].board_id, "board-1");
    assert_eq!(created[0].list_id, "list-open");
    assert_eq!(created[0].label_ids, vec!["label-gov".to_string()]);
    assert_eq!((report.created, report.skipped), (1, 1));
    assert_eq!(saved_ids(&path), ["abc", "def"]);
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(dir.path(), "[]");
    let sources: Vec<Box<dyn ConsultationSource>> =
        vec![Box::new(FixtureSource(vec![rec("1", "Gov"), rec("2", "Civiq")]))];

    let first = RecordingBoard::new();
    run_pipeline(&sources, &board(), &first, DedupCache::load(&path).unwrap(), &path)
        .await
        .unwrap();
    assert_eq!(first.created().len(), 2);

    let second = RecordingBoard::new();
    let report = run_pipeline(&sources, &board(), &second, DedupCache::load(&path).unwrap(), &path)
        .await
        .unwrap();
    assert!(second.created().is_empty());
    assert_eq!(report.skipped, 2);
    assert_eq!(saved_ids(&path), ["1", "2"]);
}

#[tokio::test]
async fn same_id_from_two_sources_is_carded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(dir.path(), "[]");
    let sources: Vec<Box<dyn ConsultationSource>> = vec![
        Box::new(FixtureSource(vec![rec("dup", "Gov")])),
        Box::new(FixtureSource(vec![rec("dup", "Civiq"), rec("other", "Civiq")])),
    ];
    let sink = RecordingBoard::new();

    run_pipeline(&sources, &board(), &sink, DedupCache::load(&path).unwrap(), &path)
        .await
        .unwrap();

    assert_eq!(sink.created().len(), 2);
    assert_eq!(saved_ids(&path), ["dup", "other"]);
}

#[tokio::test]
async fn missing_label_still_attempts_card_without_labels() {
    let sink = RecordingBoard::new();
    let (cache, report) =
        sync_records(&[rec("x", "Foo")], &board(), &sink, DedupCache::new()).await;

    let created = sink.created();
    assert_eq!(created.len(), 1);
    assert!(created[0].label_ids.is_empty());
    assert_eq!(report.labels_missing, 1);
    assert!(cache.contains("x"));
}

#[tokio::test]
async fn missing_label_on_cached_record_is_not_reported() {
    let sink = RecordingBoard::new();
    let cache: DedupCache = vec!["x".to_string()].into_iter().collect();
    let (_, report) =
        sync_records(&[rec("x", "Foo"), rec("y", "Foo")], &board(), &sink, cache).await;

    assert_eq!(sink.created().len(), 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.labels_missing, 1);
}

#[tokio::test]
async fn failed_card_is_not_cached_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = cache_file(dir.path(), r#"["old"]"#);
    let sources: Vec<Box<dyn ConsultationSource>> = vec![Box::new(FixtureSource(vec![
        rec("a", "Gov"),
        rec("b", "Gov"),
        rec("c", "Gov"),
    ]))];
    let sink = RecordingBoard::failing_on(&["Consultation b"]);

    let report = run_pipeline(&sources, &board(), &sink, DedupCache::load(&path).unwrap(), &path)
        .await
        .unwrap();

    assert_eq!(sink.created().len(), 3);
    assert_eq!((report.created, report.failed), (2, 1));
    assert_eq!(saved_ids(&path), ["old", "a", "c"]);
}

#[tokio::test]
async fn cache_is_rewritten_even_without_new_cards() {
    let dir = tempfile::tempdir().unwrap();
    // Duplicates on disk collapse on the rewrite.
    let path = cache_file(dir.path(), r#"["a", "a"]"#);
    let sources: Vec<Box<dyn ConsultationSource>> = vec![];
    let sink = RecordingBoard::new();

    let report = run_pipeline(&sources, &board(), &sink, DedupCache::load(&path).unwrap(), &path)
        .await
        .unwrap();

    assert_eq!(report.fetched, 0);
    assert_eq!(saved_ids(&path), ["a"]);
}

#[tokio::test]
async fn unparseable_search_date_is_carded_without_due() {
    let json = r#"[
        {"id": "p1", "title": "Parks", "url": "https://cs/p1", "enddate": "not-a-date"},
        {"id": "p2", "title": "Pools", "url": "https://cs/p2", "enddate": "2018/06/30"}
    ]"#;
    let sources: Vec<Box<dyn ConsultationSource>> =
        vec![Box::new(CitizenSpaceProvider::from_fixture_str("Gov", json))];
    let records = consultation_aggregator::ingest::collect_records(&sources).await;
    let sink = RecordingBoard::new();

    sync_records(&records, &board(), &sink, DedupCache::new()).await;

    let created = sink.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].due, None);
    assert_eq!(
        created[1].due,
        Some(Utc.with_ymd_and_hms(2018, 6, 30, 0, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn unwritable_cache_path_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("cache.json");
    let sources: Vec<Box<dyn ConsultationSource>> = vec![];
    let sink = RecordingBoard::new();

    let err = run_pipeline(&sources, &board(), &sink, DedupCache::new(), &path)
        .await
        .unwrap_err();
    assert!(matches!(err, consultation_aggregator::FatalError::Cache(_)));
}
