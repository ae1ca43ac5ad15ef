// src/ingest/providers/civiq_rss.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::{Deserializer, EntityResolver};
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity};
use quick_xml::events::BytesText;
use serde::Deserialize;
use url::Url;

use crate::ingest::end_date::extract_end_date;
use crate::ingest::types::{ConsultationRecord, ConsultationSource};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    // Items may be interleaved with other channel elements (atom:link etc.).
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    description: Option<String>,
    guid: Option<Guid>,
    // `link` is never read: Civiq item links point at the wrong host.
}
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Consultations from a Civiq (Drupal) RSS feed.
pub struct CiviqRssProvider {
    label: String,
    feed_url: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

/// `{scheme}://{host}[:port]` of the feed, with path/query/fragment dropped.
pub fn site_root(feed_url: &str) -> Result<String> {
    let parsed = Url::parse(feed_url).with_context(|| format!("parsing feed url {feed_url}"))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(anyhow!("feed url {feed_url} has no host"));
    }
    Ok(origin.ascii_serialization())
}

pub fn node_url(root: &str, guid: &str) -> String {
    format!("{root}/en/node/{guid}")
}

impl CiviqRssProvider {
    pub fn from_fixture_str(label: &str, feed_url: &str, s: &str) -> Self {
        Self {
            label: label.to_string(),
            feed_url: feed_url.to_string(),
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(label: &str, feed_url: &str, client: reqwest::Client) -> Self {
        Self {
            label: label.to_string(),
            feed_url: feed_url.to_string(),
            mode: Mode::Http { client },
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<ConsultationRecord>> {
        let t0 = std::time::Instant::now();
        let root = site_root(&self.feed_url)?;
        let mut de = Deserializer::from_str_with_resolver(s, HtmlEntities);
        let rss = Rss::deserialize(&mut de).context("parsing civiq rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let guid = it
                .guid
                .map(|g| g.value.trim().to_string())
                .unwrap_or_default();
            if guid.is_empty() {
                tracing::warn!(provider = self.name(), title = ?it.title, "rss item without guid, skipping");
                continue;
            }

            let title =
                html_escape::decode_html_entities(it.title.as_deref().unwrap_or_default())
                    .trim()
                    .to_string();

            let end_date = match extract_end_date(it.description.as_deref().unwrap_or_default()) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(error = %e, guid = %guid, "error parsing date");
                    counter!("ingest_end_date_errors_total").increment(1);
                    None
                }
            };

            out.push(ConsultationRecord {
                url: node_url(&root, &guid),
                id: guid,
                title,
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

#[async_trait]
impl ConsultationSource for CiviqRssProvider {
    async fn fetch_latest(&self) -> Result<Vec<ConsultationRecord>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { client } => {
                let body = client
                    .get(&self.feed_url)
                    .send()
                    .await
                    .context("civiq http get()")?
                    .error_for_status()
                    .context("civiq non-2xx")?
                    .text()
                    .await
                    .context("civiq http .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "CiviqRss"
    }
}

/// Drupal leaks HTML named entities (`&eacute;`, `&hellip;`, ...) into
/// otherwise plain XML; resolve the whole HTML5 set instead of failing the feed.
struct HtmlEntities;

impl EntityResolver for HtmlEntities {
    type Error = std::convert::Infallible;

    fn capture(&mut self, _doctype: BytesText) -> Result<(), Self::Error> {
        Ok(())
    }

    fn resolve(&self, entity: &str) -> Option<&str> {
        resolve_predefined_entity(entity).or_else(|| resolve_html5_entity(entity))
    }
}
