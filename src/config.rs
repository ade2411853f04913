use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::icons::SYSTEM_ICON_DIR;

/// Optional per-workflow overrides, read from the workflow root.
pub const CONFIG_FILE: &str = "workflow.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Workflow directory; relative paths below resolve against it
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub cache_file: String,
    pub workflow_manifest: PathBuf,
    pub requirements_file: PathBuf,
    pub package_dir: PathBuf,
    pub icon_dir: PathBuf,
    /// Reuse stored responses for repeated queries
    pub cache: bool,
    /// Program and leading arguments used to install missing requirements
    pub installer: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_dir: PathBuf::from("db"),
            cache_file: "results.json".to_string(),
            workflow_manifest: PathBuf::from("info.plist"),
            requirements_file: PathBuf::from("requirements.txt"),
            package_dir: PathBuf::from("lib"),
            icon_dir: PathBuf::from(SYSTEM_ICON_DIR),
            cache: false,
            installer: vec!["brew".to_string(), "install".to_string()],
        }
    }
}

impl WorkflowConfig {
    /// Defaults rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Defaults rooted at `root`, overridden by `<root>/workflow.toml`.
    pub fn load(root: impl Into<PathBuf>) -> WorkflowResult<Self> {
        let root = root.into();
        let path = root.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<WorkflowConfig>(&content).map_err(|e| WorkflowError::Config {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };

        config.root = root;
        Ok(config)
    }

    /// Resolve a configured path: `~` expanded, relative paths under `root`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let expanded = PathBuf::from(expanded);
        if expanded.is_absolute() {
            expanded
        } else {
            self.root.join(expanded)
        }
    }

    pub fn data_path(&self) -> PathBuf {
        self.resolve(&self.data_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.data_path().join(&self.cache_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.workflow_manifest)
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.resolve(&self.requirements_file)
    }

    pub fn package_path(&self) -> PathBuf {
        self.resolve(&self.package_dir)
    }

    pub fn icon_path(&self) -> PathBuf {
        self.resolve(&self.icon_dir)
    }
}
