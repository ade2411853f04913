//! Script filter result items.
//!
//! Mirrors the JSON format Alfred reads from a script filter:
//!
//! ```json
//! {
//!     "items": [
//!         {
//!             "uid": "desktop",
//!             "title": "Desktop",
//!             "subtitle": "~/Desktop",
//!             "arg": "~/Desktop",
//!             "autocomplete": "Desktop",
//!             "icon": { "type": "fileicon", "path": "~/Desktop" }
//!         }
//!     ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WorkflowError, WorkflowResult};

/// How the host interprets an icon path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    /// Use the icon of the file at `path`
    FileIcon,
    /// Use the icon for the UTI given in `path`
    FileType,
}

/// Icon shown next to a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Icon {
    pub path: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<IconKind>,
}

impl Icon {
    /// Icon read from an image file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().into_owned(),
            kind: None,
        }
    }

    /// Icon with an explicit kind.
    pub fn with_kind(path: impl AsRef<Path>, kind: IconKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::new(path)
        }
    }

    /// Whether the path points at a remote resource.
    pub fn is_remote(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

/// A single selectable entry in a script filter response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    /// Primary text (required)
    pub title: String,

    /// Secondary text
    #[serde(default)]
    pub subtitle: String,

    /// Stable identifier, used by the host to learn ordering
    #[serde(default = "fresh_uid")]
    pub uid: String,

    /// Value passed to the next workflow object on selection
    #[serde(default)]
    pub arg: String,

    /// Text inserted into the query on tab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

pub(crate) fn fresh_uid() -> String {
    Uuid::new_v4().to_string()
}

impl Item {
    /// Create an item with a fresh uid and empty subtitle and argument.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: String::new(),
            uid: fresh_uid(),
            arg: String::new(),
            autocomplete: None,
            icon: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arg = arg.into();
        self
    }

    pub fn autocomplete(mut self, text: impl Into<String>) -> Self {
        self.autocomplete = Some(text.into());
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set an icon from a path; empty paths leave the item without icon.
    pub fn icon_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.icon = if path.as_os_str().is_empty() {
            None
        } else {
            Some(Icon::new(path))
        };
        self
    }

    /// Check the invariants an item must hold before it reaches the output.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.title.is_empty() {
            return Err(WorkflowError::InvalidItem(format!(
                "item '{}' has an empty title",
                self.uid
            )));
        }
        Ok(())
    }

    /// Plain field-name to value mapping of this item.
    pub fn to_value(&self) -> serde_json::Value {
        // Plain strings and options only, serialization cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// The payload printed on standard output: `{"items": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub items: Vec<Item>,
}

impl Feedback {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Payload holding exactly one item.
    pub fn single(item: Item) -> Self {
        Self { items: vec![item] }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize to the compact JSON the host expects.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
