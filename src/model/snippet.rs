//! Snippet records for snippet packs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::item::fresh_uid;
use crate::error::PackageResult;

/// Wrapper key the host expects around every snippet file.
const SNIPPET_KEY: &str = "alfredsnippet";

/// A reusable expansion text.
///
/// Stored on disk as `<name> [<uid>].json`:
///
/// ```json
/// {
///   "alfredsnippet": {
///     "snippet": "## Example",
///     "dontautoexpand": true,
///     "uid": "543b95e5-469e-4d8d-b4b7-d16336e08a28",
///     "name": "Example ~ Markdown",
///     "keyword": ":example:"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    /// Expansion text
    pub snippet: String,

    /// Display name
    pub name: String,

    /// Trigger keyword, wrapped by the pack prefix and suffix
    pub keyword: String,

    #[serde(default = "fresh_uid")]
    pub uid: String,

    /// Only expand when picked from the viewer, never while typing
    #[serde(default = "default_dont_auto_expand")]
    pub dontautoexpand: bool,
}

fn default_dont_auto_expand() -> bool {
    true
}

impl Snippet {
    pub fn new(
        snippet: impl Into<String>,
        name: impl Into<String>,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            snippet: snippet.into(),
            name: name.into(),
            keyword: keyword.into(),
            uid: fresh_uid(),
            dontautoexpand: default_dont_auto_expand(),
        }
    }

    /// File name inside the pack; the uid keeps equal names apart.
    pub fn file_name(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
            .collect();
        format!("{} [{}].json", name, self.uid)
    }

    /// Plain field-name to value mapping, including the wrapper key.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ SNIPPET_KEY: self })
    }

    /// Write the snippet file into `dir` and return its path.
    pub fn save(&self, dir: &Path) -> PackageResult<PathBuf> {
        let path = dir.join(self.file_name());
        let contents = serde_json::to_string_pretty(&self.to_value())?;
        fs::write(&path, contents)?;
        Ok(path)
    }
}
