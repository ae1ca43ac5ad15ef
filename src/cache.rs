// src/cache.rs
//! Persisted list of consultation ids that already have a card.
//!
//! On disk this is a plain JSON array of strings. A missing or malformed
//! file is a startup failure: the cache is never auto-created, otherwise a
//! lost file would silently re-card every open consultation.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("reading cache {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("decoding cache {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding cache: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("writing cache {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupCache {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let data = fs::read_to_string(path).map_err(|source| CacheError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ids: Vec<String> =
            serde_json::from_str(&data).map_err(|source| CacheError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_ids(ids))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Append `id`. Returns `false` (and changes nothing) if it is already present.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Write the full list back to `path`.
    ///
    /// Goes through a sibling temp file + rename so the previous cache
    /// stays intact if the process dies mid-write.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let body = serde_json::to_vec(&self.ids)?;
        let tmp = tmp_path(path);
        let write_err = |source: io::Error| CacheError::Write {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp, body).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn from_ids(ids: Vec<String>) -> Self {
        let mut cache = Self::new();
        for id in ids {
            cache.add(id);
        }
        cache
    }
}

impl FromIterator<String> for DedupCache {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from_ids(iter.into_iter().collect())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
