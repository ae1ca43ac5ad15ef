// src/config/mod.rs
pub mod sources;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use sources::{SearchWindow, SourceConfig, SourceKind};

pub const ENV_CONFIG_PATH: &str = "CONSULTATION_CONFIG_PATH";
pub const ENV_TRELLO_KEY: &str = "TRELLO_KEY";
pub const ENV_TRELLO_TOKEN: &str = "TRELLO_TOKEN";

const CACHE_FILE_NAME: &str = ".ConsultationCache";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub trello_key: String,
    #[serde(default)]
    pub trello_token: String,
    pub trello_board_id: String,
    pub trello_list_name: String,
    /// Defaults to `$HOME/.ConsultationCache` when absent.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    #[serde(default)]
    pub search_window: SearchWindow,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl AggregatorConfig {
    /// Where the dedup cache lives for this run.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.cache_path {
            return Ok(p.clone());
        }
        let home = std::env::var_os("HOME")
            .ok_or_else(|| anyhow!("HOME is not set and no cache_path configured"))?;
        Ok(PathBuf::from(home).join(CACHE_FILE_NAME))
    }

    /// Env credentials win over file values; then required fields are checked.
    fn resolve(mut self) -> Result<Self> {
        if let Ok(k) = std::env::var(ENV_TRELLO_KEY) {
            if !k.trim().is_empty() {
                self.trello_key = k;
            }
        }
        if let Ok(t) = std::env::var(ENV_TRELLO_TOKEN) {
            if !t.trim().is_empty() {
                self.trello_token = t;
            }
        }

        for (name, value) in [
            ("trello_key", &self.trello_key),
            ("trello_token", &self.trello_token),
            ("trello_board_id", &self.trello_board_id),
            ("trello_list_name", &self.trello_list_name),
        ] {
            if value.trim().is_empty() {
                bail!("missing required config field `{name}`");
            }
        }
        Ok(self)
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<AggregatorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing config {}", path.display()))?
        .resolve()
}

/// Load config using env var + fallbacks:
/// 1) $CONSULTATION_CONFIG_PATH
/// 2) config.toml
/// 3) config.json
pub fn load_config_default() -> Result<AggregatorConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Err(anyhow!("no config found (set {ENV_CONFIG_PATH} or add config.toml/config.json)"))
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AggregatorConfig> {
    match hint_ext {
        "toml" => return toml::from_str(s).context("invalid TOML config"),
        "json" => return serde_json::from_str(s).context("invalid JSON config"),
        _ => {}
    }
    // No usable extension: sniff.
    if s.trim_start().starts_with('{') {
        serde_json::from_str(s).context("invalid JSON config")
    } else {
        toml::from_str(s).context("invalid TOML config")
    }
}
