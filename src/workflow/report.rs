//! Turns a failed run into the one item the user gets to see.
//!
//! The host renders a single-line subtitle, so unexpected failures show
//! their root cause there and carry the full trace as the item argument,
//! ready to be copied.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as _;
use std::fmt::Write as _;

use crate::error::WorkflowError;

/// Display texts for an error item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub title: String,
    pub subtitle: String,
    pub arg: String,
}

impl ErrorReport {
    pub fn from_error(err: &WorkflowError) -> Self {
        if let WorkflowError::Display {
            title,
            subtitle,
            arg,
        } = err
        {
            return Self {
                title: title.clone(),
                subtitle: subtitle.clone(),
                arg: arg.clone(),
            };
        }

        let trace = trace(err);
        let subtitle = trace
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string();

        Self {
            title: err.to_string(),
            subtitle,
            arg: trace,
        }
    }
}

/// Stack backtrace, then the error and each of its sources, root cause last.
fn trace(err: &WorkflowError) -> String {
    let backtrace = match err {
        WorkflowError::Unexpected(inner) if inner.backtrace().status() == BacktraceStatus::Captured => {
            inner.backtrace().to_string()
        }
        _ => Backtrace::force_capture().to_string(),
    };

    let mut trace = String::from("stack backtrace:\n");
    trace.push_str(backtrace.trim_end());
    let _ = write!(trace, "\nError: {}", err);

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(trace, "\nCaused by: {}", cause);
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_display_error_is_verbatim() {
        let err = WorkflowError::display("X", "Y").with_arg("Z");
        let report = ErrorReport::from_error(&err);
        assert_eq!(
            report,
            ErrorReport {
                title: "X".to_string(),
                subtitle: "Y".to_string(),
                arg: "Z".to_string(),
            }
        );
    }

    #[test]
    fn test_unexpected_error_has_trace() {
        let err = WorkflowError::from(anyhow::anyhow!("boom"));
        let report = ErrorReport::from_error(&err);

        assert_eq!(report.title, "boom");
        assert_eq!(report.subtitle, "Error: boom");
        assert!(report.arg.lines().count() > 1);
        assert!(report.arg.starts_with("stack backtrace:"));
        assert!(report.arg.ends_with("Error: boom"));
    }

    #[test]
    fn test_subtitle_is_root_cause() {
        let result: anyhow::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "config.json missing",
        ))
        .context("loading settings");
        let err = WorkflowError::from(result.unwrap_err());
        let report = ErrorReport::from_error(&err);

        assert_eq!(report.title, "loading settings");
        assert_eq!(report.subtitle, "Caused by: config.json missing");
        assert!(report.arg.contains("Error: loading settings"));
    }

    #[test]
    fn test_io_error_is_traced() {
        let err = WorkflowError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let report = ErrorReport::from_error(&err);
        assert_eq!(report.title, "IO error: denied");
        assert!(report.arg.contains('\n'));
    }
}
