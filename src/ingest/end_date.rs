// src/ingest/end_date.rs
//! Closing-date extraction for both feed flavours.
//!
//! Civiq embeds the closing date in the item description as a Drupal
//! date field (`<span class="date-display-end" content="...">`), usually
//! HTML-escaped once more inside the RSS payload. Citizen Space exposes a
//! plain `YYYY/MM/DD` string.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use thiserror::Error;

const END_DATE_SELECTOR: &str = ".date-display-end";
const SEARCH_DATE_FORMAT: &str = "%Y/%m/%d";

static END_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse(END_DATE_SELECTOR).unwrap());

#[derive(Debug, Error)]
pub enum EndDateError {
    #[error("invalid end date timestamp {raw:?}: {source}")]
    InvalidTimestamp {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid search date {raw:?} (expected YYYY/MM/DD): {source}")]
    InvalidSearchDate {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Pull the end date out of a (possibly HTML-escaped) description fragment.
///
/// Returns `Ok(None)` when the fragment carries no `.date-display-end`
/// element or the element has no `content` attribute.
pub fn extract_end_date(description: &str) -> Result<Option<DateTime<Utc>>, EndDateError> {
    let unescaped = html_escape::decode_html_entities(description);
    let fragment = Html::parse_fragment(&unescaped);

    let Some(raw) = fragment
        .select(&END_DATE)
        .next()
        .and_then(|el| el.value().attr("content"))
    else {
        return Ok(None);
    };

    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|source| EndDateError::InvalidTimestamp {
            raw: raw.to_string(),
            source,
        })
}

/// Parse a Citizen Space `enddate` (`YYYY/MM/DD`) as midnight UTC.
pub fn parse_search_date(raw: &str) -> Result<DateTime<Utc>, EndDateError> {
    let date = NaiveDate::parse_from_str(raw.trim(), SEARCH_DATE_FORMAT).map_err(|source| {
        EndDateError::InvalidSearchDate {
            raw: raw.to_string(),
            source,
        }
    })?;
    Ok(date.and_time(NaiveTime::default()).and_utc())
}
