//! Workflow manifest (`info.plist`) parsing.
//!
//! Only the bundle identifier is read; the rest of the plist belongs to the
//! host.

use std::path::Path;

use serde::Deserialize;

use crate::error::{WorkflowError, WorkflowResult};

/// Fields of the workflow's `info.plist` used at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowManifest {
    /// Reverse-DNS identifier of the workflow
    #[serde(rename = "bundleid")]
    pub bundle_id: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

impl WorkflowManifest {
    /// Load and validate the manifest at `path`.
    ///
    /// Every failure is a configuration error: the workflow cannot run
    /// without knowing who it is.
    pub fn load(path: &Path) -> WorkflowResult<Self> {
        if !path.exists() {
            return Err(WorkflowError::Config {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        let manifest: WorkflowManifest =
            plist::from_file(path).map_err(|e| WorkflowError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> WorkflowResult<()> {
        if self.bundle_id.trim().is_empty() {
            return Err(WorkflowError::Config {
                path: path.to_path_buf(),
                message: "bundleid is required".to_string(),
            });
        }
        Ok(())
    }
}
