//! Response cache.
//!
//! Maps the raw query of an invocation to the items it produced, so a
//! repeated query can skip the handler entirely. Backed by one JSON file,
//! rewritten whole on every store. There is no locking: two concurrent runs
//! sharing the file race and the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WorkflowResult;
use crate::model::{Icon, Item};

/// Simplified item as stored in the record file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedItem {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub icon_path: Option<String>,
    #[serde(default)]
    pub arg: String,
}

impl From<&Item> for CachedItem {
    fn from(item: &Item) -> Self {
        Self {
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            icon_path: item.icon.as_ref().map(|icon| icon.path.clone()),
            arg: item.arg.clone(),
        }
    }
}

impl CachedItem {
    /// Rebuild a result item. Uid is fresh; the icon only comes back when
    /// a non-empty path was stored.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new(self.title.clone())
            .subtitle(self.subtitle.clone())
            .arg(self.arg.clone());
        if let Some(path) = self.icon_path.as_deref().filter(|p| !p.is_empty()) {
            item = item.icon(Icon::new(path));
        }
        item
    }
}

type Record = BTreeMap<String, Vec<CachedItem>>;

/// File-backed query to items cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    path: PathBuf,
}

impl ResponseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items stored for `key`.
    ///
    /// `None` for the empty query, a missing file, an unknown key, or a file
    /// that cannot be parsed (logged, treated as a miss).
    pub fn lookup(&self, key: Option<&str>) -> Option<Vec<Item>> {
        let key = cacheable(key)?;
        if !self.path.exists() {
            tracing::debug!(key, path = %self.path.display(), "no cache file");
            return None;
        }

        let record = match self.read() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "unreadable cache file: {}", e);
                return None;
            }
        };

        let entries = record.get(key)?;
        tracing::debug!(key, items = entries.len(), "cache hit");
        Some(
            entries
                .iter()
                .filter(|entry| !entry.title.is_empty())
                .map(CachedItem::to_item)
                .collect(),
        )
    }

    /// Replace the items stored for `key` and rewrite the file.
    ///
    /// The empty query is never stored.
    pub fn store(&self, key: Option<&str>, items: &[Item]) -> WorkflowResult<()> {
        let Some(key) = cacheable(key) else {
            tracing::debug!("empty query, not caching");
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut record = if self.path.exists() {
            self.read().unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), "replacing unreadable cache file: {}", e);
                Record::new()
            })
        } else {
            Record::new()
        };

        record.insert(key.to_string(), items.iter().map(CachedItem::from).collect());

        let contents = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, contents)?;
        tracing::debug!(key, items = items.len(), path = %self.path.display(), "cached response");
        Ok(())
    }

    fn read(&self) -> WorkflowResult<Record> {
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Record::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

fn cacheable(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}
