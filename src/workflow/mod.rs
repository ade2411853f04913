//! Script filter runtime.
//!
//! One process answers one query. [`Runner`] drives the run:
//!
//! ```text
//! Runner::execute(args, handler)
//! ├── Workflow::new        parse query, read info.plist
//! ├── ResponseCache        cached items for the raw query? -> emit
//! ├── requirements         missing tools? -> detached install, info item -> emit
//! ├── handler(&mut Workflow)   adds items via add_result / insert_result
//! ├── ResponseCache::store (cache enabled, handler succeeded)
//! └── emit {"items": [...]}
//! ```
//!
//! Every failure along the way becomes one error item; the process always
//! prints a payload and exits 0.

pub mod cache;
pub mod icons;
pub mod manifest;
pub mod query;
pub mod report;
pub mod requirements;
mod runner;

use std::fs;
use std::path::{Path, PathBuf};

pub use cache::{CachedItem, ResponseCache};
pub use icons::IconDownloader;
pub use manifest::WorkflowManifest;
pub use query::{Query, PAGE_MARKER};
pub use report::ErrorReport;
pub use requirements::{CommandInstaller, Installer, Requirement};
pub use runner::{emit, HandlerFuture, Runner};

use crate::config::WorkflowConfig;
use crate::error::WorkflowResult;
use crate::model::{Feedback, Icon, Item};

/// State of one script filter invocation, handed to the handler.
pub struct Workflow {
    query: Query,
    bundle_id: String,
    config: WorkflowConfig,
    data_dir: PathBuf,
    icon_dir: PathBuf,
    items: Vec<Item>,
    downloader: Option<Box<dyn IconDownloader>>,
}

impl Workflow {
    /// Build the state for one run from the argument list (program name
    /// excluded). Fails when the workflow manifest cannot be read.
    pub fn new<I>(args: I, config: WorkflowConfig) -> WorkflowResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let query = Query::from_args(args);
        tracing::debug!(
            raw = ?query.raw(),
            query = ?query.normalized(),
            page = query.page_count(),
            "parsed arguments"
        );

        let manifest = WorkflowManifest::load(&config.manifest_path())?;
        tracing::debug!(
            bundle_id = %manifest.bundle_id,
            name = manifest.name.as_deref().unwrap_or("-"),
            version = manifest.version.as_deref().unwrap_or("-"),
            "loaded workflow manifest"
        );

        let data_dir = config.data_path();
        fs::create_dir_all(&data_dir)?;

        Ok(Self {
            query,
            bundle_id: manifest.bundle_id,
            icon_dir: config.icon_path(),
            data_dir,
            config,
            items: Vec::new(),
            downloader: None,
        })
    }

    /// Resolve remote icons of added items through `downloader`.
    pub fn set_icon_downloader(&mut self, downloader: Box<dyn IconDownloader>) {
        self.downloader = Some(downloader);
    }

    /// The argument exactly as received, pagination markers included.
    pub fn raw_query(&self) -> Option<&str> {
        self.query.raw()
    }

    /// The query without pagination markers.
    pub fn query(&self) -> Option<&str> {
        self.query.normalized()
    }

    /// Requested page, starting at 1.
    pub fn page_count(&self) -> usize {
        self.query.page_count()
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Directory for workflow data; exists once the workflow is built.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn icon_dir(&self) -> &Path {
        &self.icon_dir
    }

    /// Items collected so far, in output order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Append an item to the response.
    pub fn add_result(&mut self, item: Item) -> WorkflowResult<()> {
        let item = self.prepare(item)?;
        self.items.push(item);
        Ok(())
    }

    /// Insert an item at `index`; indexes past the end append.
    pub fn insert_result(&mut self, index: usize, item: Item) -> WorkflowResult<()> {
        let item = self.prepare(item)?;
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        Ok(())
    }

    fn prepare(&self, mut item: Item) -> WorkflowResult<Item> {
        item.validate()?;

        if let (Some(downloader), Some(icon)) = (&self.downloader, item.icon.as_mut()) {
            if icon.is_remote() {
                tracing::debug!(url = %icon.path, "downloading icon");
                let local = downloader.download(&icon.path)?;
                icon.path = local.to_string_lossy().into_owned();
            }
        }
        Ok(item)
    }

    pub(crate) fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Append an item the runner itself produced (error, install notice).
    pub(crate) fn push_internal(&mut self, item: Item) {
        self.items.push(item);
    }

    pub(crate) fn icon(&self, name: &str) -> Icon {
        Icon::new(self.icon_dir.join(name))
    }

    pub fn into_feedback(self) -> Feedback {
        Feedback::new(self.items)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::WorkflowError;
    use tempfile::TempDir;

    pub(crate) fn write_info_plist(root: &Path, bundle_id: &str) {
        let plist = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>bundleid</key>
	<string>{}</string>
</dict>
</plist>"#,
            bundle_id
        );
        fs::write(root.join("info.plist"), plist).unwrap();
    }

    fn workflow(temp_dir: &TempDir, args: &[&str]) -> Workflow {
        write_info_plist(temp_dir.path(), "com.example.test");
        Workflow::new(args.iter().copied(), WorkflowConfig::with_root(temp_dir.path())).unwrap()
    }

    #[test]
    fn test_new_reads_query_and_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let wf = workflow(&temp_dir, &["rust++"]);

        assert_eq!(wf.raw_query(), Some("rust++"));
        assert_eq!(wf.query(), Some("rust"));
        assert_eq!(wf.page_count(), 3);
        assert_eq!(wf.bundle_id(), "com.example.test");
        assert!(wf.data_dir().is_dir());
        assert!(wf.items().is_empty());
    }

    #[test]
    fn test_new_without_manifest_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Workflow::new(Vec::<String>::new(), WorkflowConfig::with_root(temp_dir.path()));
        assert!(matches!(result, Err(WorkflowError::Config { .. })));
    }

    #[test]
    fn test_add_and_insert_keep_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut wf = workflow(&temp_dir, &[]);

        wf.add_result(Item::new("b")).unwrap();
        wf.add_result(Item::new("c")).unwrap();
        wf.insert_result(0, Item::new("a")).unwrap();
        wf.insert_result(99, Item::new("d")).unwrap();

        let titles: Vec<_> = wf.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_add_rejects_empty_title() {
        let temp_dir = TempDir::new().unwrap();
        let mut wf = workflow(&temp_dir, &[]);
        assert!(wf.add_result(Item::new("")).is_err());
        assert!(wf.items().is_empty());
    }

    #[test]
    fn test_remote_icon_goes_through_downloader() {
        let temp_dir = TempDir::new().unwrap();
        let mut wf = workflow(&temp_dir, &[]);
        let cache_dir = temp_dir.path().join("icons");
        wf.set_icon_downloader(Box::new(move |url: &str| -> WorkflowResult<PathBuf> {
            let name = url.rsplit('/').next().unwrap_or("icon.png");
            Ok(cache_dir.join(name))
        }));

        wf.add_result(Item::new("remote").icon_path("https://example.com/logo.png"))
            .unwrap();
        wf.add_result(Item::new("local").icon_path("local.png")).unwrap();

        let expected = temp_dir.path().join("icons").join("logo.png");
        assert_eq!(
            wf.items()[0].icon.as_ref().unwrap().path,
            expected.to_string_lossy()
        );
        assert_eq!(wf.items()[1].icon.as_ref().unwrap().path, "local.png");
    }

    #[test]
    fn test_remote_icon_kept_without_downloader() {
        let temp_dir = TempDir::new().unwrap();
        let mut wf = workflow(&temp_dir, &[]);
        wf.add_result(Item::new("remote").icon_path("https://example.com/logo.png"))
            .unwrap();
        assert_eq!(
            wf.items()[0].icon.as_ref().unwrap().path,
            "https://example.com/logo.png"
        );
    }

    #[test]
    fn test_downloader_failure_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        let mut wf = workflow(&temp_dir, &[]);
        wf.set_icon_downloader(Box::new(|_: &str| -> WorkflowResult<PathBuf> {
            Err(WorkflowError::display("offline", "no network"))
        }));

        let err = wf
            .add_result(Item::new("remote").icon_path("http://example.com/a.png"))
            .unwrap_err();
        assert!(err.is_display());
        assert!(wf.items().is_empty());
    }
}
