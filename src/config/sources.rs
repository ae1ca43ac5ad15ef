// src/config/sources.rs
use serde::{Deserialize, Serialize};

/// Feed flavour of a configured source.
///
/// Unknown `type` strings are kept (not rejected) so the run can log and
/// skip them while the remaining sources still sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    CitizenSpace,
    RssCiviq,
    Unknown(String),
}

impl From<String> for SourceKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "citizen_space" => SourceKind::CitizenSpace,
            // "civiq" is the older spelling still found in deployed configs.
            "rss_civiq" | "civiq" => SourceKind::RssCiviq,
            _ => SourceKind::Unknown(raw),
        }
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::CitizenSpace => "citizen_space".to_string(),
            SourceKind::RssCiviq => "rss_civiq".to_string(),
            SourceKind::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub url: String,
    pub label: String,
}

fn default_from() -> String {
    "2018/01/01".to_string()
}
fn default_to() -> String {
    "2018/12/31".to_string()
}

/// Date window (`YYYY/MM/DD`) passed to the Citizen Space search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchWindow {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
}

impl Default for SearchWindow {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
        }
    }
}
