//! Drives one script filter invocation from arguments to emitted JSON.

use std::any::Any;
use std::env;
use std::future::Future;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::pin::Pin;

use super::cache::ResponseCache;
use super::icons::{IconDownloader, DOWNLOAD_ICON, ERROR_ICON};
use super::report::ErrorReport;
use super::requirements::{self, CommandInstaller, Installer, Requirement};
use super::Workflow;
use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::model::{Feedback, Icon, Item};

/// Future returned by a handler; it borrows the workflow while it runs.
///
/// Handlers are closures `|wf| Box::pin(..)`, which is the usual way to
/// pass an `async fn`:
///
/// ```ignore
/// async fn search(wf: &mut Workflow) -> WorkflowResult<()> {
///     wf.add_result(Item::new("Hello"))
/// }
///
/// Runner::new().cache(true).run(|wf| Box::pin(search(wf)));
/// ```
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = WorkflowResult<()>> + 'a>>;

const INSTALLING_TITLE: &str = "Requirements are installing (you can close Alfred)";

/// Lifecycle driver for a script filter process.
pub struct Runner {
    root: PathBuf,
    config: Option<WorkflowConfig>,
    cache: Option<bool>,
    installer: Option<Box<dyn Installer>>,
    downloader: Option<Box<dyn IconDownloader>>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Runner for the workflow in the current directory; configuration is
    /// read from its `workflow.toml` when the run starts.
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("."),
            config: None,
            cache: None,
            installer: None,
            downloader: None,
        }
    }

    /// Runner with a fixed configuration.
    pub fn with_config(config: WorkflowConfig) -> Self {
        Self {
            root: config.root.clone(),
            config: Some(config),
            ..Self::new()
        }
    }

    /// Workflow directory to load configuration from.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Enable or disable the response cache for this run.
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = Some(enabled);
        self
    }

    /// Replace the default requirement installer.
    pub fn installer(mut self, installer: impl Installer + 'static) -> Self {
        self.installer = Some(Box::new(installer));
        self
    }

    /// Resolve remote item icons through `downloader`.
    pub fn icon_downloader(mut self, downloader: impl IconDownloader + 'static) -> Self {
        self.downloader = Some(Box::new(downloader));
        self
    }

    /// Answer the query in the process arguments, print the payload to
    /// standard output and exit with status 0.
    pub fn run<H>(self, handler: H) -> !
    where
        H: for<'a> FnOnce(&'a mut Workflow) -> HandlerFuture<'a>,
    {
        crate::logging::init();

        let args = env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned());
        let feedback = self.execute(args, handler);

        if let Err(e) = emit(&feedback, &mut io::stdout().lock()) {
            tracing::error!("failed to write response: {}", e);
        }
        std::process::exit(0)
    }

    /// Answer the query in `args` (program name excluded).
    ///
    /// Never fails: errors end up as an item of the returned payload.
    pub fn execute<I, H>(self, args: I, handler: H) -> Feedback
    where
        I: IntoIterator,
        I::Item: Into<String>,
        H: for<'a> FnOnce(&'a mut Workflow) -> HandlerFuture<'a>,
    {
        let Runner {
            root,
            config,
            cache,
            installer,
            downloader,
        } = self;

        let mut config = match config.map_or_else(|| WorkflowConfig::load(&root), Ok) {
            Ok(config) => config,
            Err(err) => {
                let fallback = WorkflowConfig::with_root(root);
                return Feedback::single(error_item(&err, &fallback.icon_path()));
            }
        };
        if let Some(enabled) = cache {
            config.cache = enabled;
        }

        let icon_dir = config.icon_path();
        let mut workflow = match Workflow::new(args, config) {
            Ok(workflow) => workflow,
            Err(err) => return Feedback::single(error_item(&err, &icon_dir)),
        };
        if let Some(downloader) = downloader {
            workflow.set_icon_downloader(downloader);
        }

        let installer: Box<dyn Installer> = match installer {
            Some(installer) => installer,
            None => Box::new(
                CommandInstaller::new(workflow.config().installer.clone())
                    .with_package_dir(workflow.config().package_path()),
            ),
        };

        if let Err(err) = drive(&mut workflow, installer.as_ref(), handler) {
            tracing::debug!("run failed: {}", err);
            let item = error_item(&err, workflow.icon_dir());
            workflow.push_internal(item);
        }

        tracing::debug!(items = workflow.items().len(), "emitting response");
        workflow.into_feedback()
    }
}

/// Cache lookup, requirement check, handler, cache store.
fn drive<H>(workflow: &mut Workflow, installer: &dyn Installer, handler: H) -> WorkflowResult<()>
where
    H: for<'a> FnOnce(&'a mut Workflow) -> HandlerFuture<'a>,
{
    let cache = workflow
        .config()
        .cache
        .then(|| ResponseCache::new(workflow.config().cache_path()));

    if let Some(cache) = &cache {
        if let Some(items) = cache.lookup(workflow.raw_query()) {
            tracing::debug!(items = items.len(), "answered from cache");
            workflow.replace_items(items);
            return Ok(());
        }
    }

    if let Some(requirements) = requirements::load(&workflow.config().requirements_path())? {
        let missing: Vec<Requirement> = requirements
            .into_iter()
            .filter(|r| !installer.is_satisfied(r))
            .collect();

        if !missing.is_empty() {
            tracing::debug!(missing = missing.len(), "requirements not satisfied");
            let command = installer.install(&missing)?;
            let icon = workflow.icon(DOWNLOAD_ICON);
            workflow.push_internal(
                Item::new(INSTALLING_TITLE)
                    .subtitle(format!("Executed command: {}", command))
                    .arg(command)
                    .icon(icon),
            );
            return Ok(());
        }
        tracing::debug!("requirements satisfied");
    }

    call_handler(workflow, handler)?;
    tracing::debug!(items = workflow.items().len(), "handler finished");

    if let Some(cache) = &cache {
        cache.store(workflow.raw_query(), workflow.items())?;
    }
    Ok(())
}

/// Run the handler to completion on a single-threaded runtime.
fn call_handler<H>(workflow: &mut Workflow, handler: H) -> WorkflowResult<()>
where
    H: for<'a> FnOnce(&'a mut Workflow) -> HandlerFuture<'a>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        runtime.block_on(handler(&mut *workflow))
    }));

    match outcome {
        Ok(result) => result,
        Err(payload) => Err(WorkflowError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn error_item(err: &WorkflowError, icon_dir: &Path) -> Item {
    let report = ErrorReport::from_error(err);
    let title = if report.title.is_empty() {
        "Unknown error".to_string()
    } else {
        report.title
    };
    Item::new(title)
        .subtitle(report.subtitle)
        .arg(report.arg)
        .icon(Icon::new(icon_dir.join(ERROR_ICON)))
}

/// Write the payload as one JSON line.
pub fn emit<W: Write>(feedback: &Feedback, out: &mut W) -> io::Result<()> {
    let json = feedback.to_json().map_err(io::Error::from)?;
    writeln!(out, "{}", json)?;
    out.flush()
}
