//! alfred-workflow - Script filter toolkit for Alfred workflows.
//!
//! A script filter is a short-lived process: the host passes the typed query
//! as the first argument and reads a JSON list of result items from standard
//! output. This crate handles that round trip and leaves the search itself to
//! a handler.
//!
//! # Architecture
//!
//! - [`model`] - Result items, icons, the output payload and snippet records
//! - [`workflow`] - Per-run state, response cache, requirements, the runner
//! - [`snippets`] - `.alfredsnippets` pack builder
//! - [`config`] - Optional `workflow.toml` overrides
//! - [`cli`] - Authoring commands behind the `alfred-workflow` binary
//!
//! # Example
//!
//! ```ignore
//! use alfred_workflow::{Item, Runner, Workflow, WorkflowResult};
//!
//! async fn search(wf: &mut Workflow) -> WorkflowResult<()> {
//!     let query = wf.query().unwrap_or_default().to_string();
//!     wf.add_result(Item::new(format!("Search for {}", query)).arg(query))
//! }
//!
//! fn main() {
//!     Runner::new().cache(true).run(|wf| Box::pin(search(wf)));
//! }
//! ```

pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod snippets;
pub mod workflow;

mod error;

pub use config::WorkflowConfig;
pub use error::{PackageError, PackageResult, WorkflowError, WorkflowResult};
pub use model::{Feedback, Icon, IconKind, Item, Snippet};
pub use snippets::SnippetPack;
pub use workflow::{HandlerFuture, Runner, Workflow};
