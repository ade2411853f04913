//! Error types for alfred-workflow
//!
//! Two families live here. [`WorkflowError`] is everything a live script
//! filter run can hit; the runner turns each one into a result item so the
//! host always receives a payload. [`PackageError`] belongs to snippet
//! packaging, an offline authoring step, and goes straight to the caller.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while answering a script filter query.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// User-facing error, displayed exactly as given
    #[error("{title}")]
    Display {
        title: String,
        subtitle: String,
        arg: String,
    },

    /// The workflow manifest or configuration is missing, unreadable or incomplete
    #[error("Configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A result item broke the non-empty title rule
    #[error("Invalid result item: {0}")]
    InvalidItem(String),

    /// The handler panicked
    #[error("Handler panicked: {0}")]
    Panicked(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else
    #[error(transparent)]
    Unexpected(anyhow::Error),
}

impl WorkflowError {
    /// Build a user-facing error with an empty argument.
    pub fn display(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        WorkflowError::Display {
            title: title.into(),
            subtitle: subtitle.into(),
            arg: String::new(),
        }
    }

    /// Attach the argument passed to the host when the error item is selected.
    ///
    /// Only user-facing errors carry an argument; other variants are returned
    /// unchanged.
    pub fn with_arg(self, value: impl Into<String>) -> Self {
        match self {
            WorkflowError::Display {
                title, subtitle, ..
            } => WorkflowError::Display {
                title,
                subtitle,
                arg: value.into(),
            },
            other => other,
        }
    }

    /// Whether the error is meant to be shown verbatim.
    pub fn is_display(&self) -> bool {
        matches!(self, WorkflowError::Display { .. })
    }
}

impl From<anyhow::Error> for WorkflowError {
    fn from(err: anyhow::Error) -> Self {
        // A display error that travelled through anyhow keeps its texts.
        match err.downcast::<WorkflowError>() {
            Ok(inner) => inner,
            Err(err) => WorkflowError::Unexpected(err),
        }
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors raised while writing a snippet pack.
#[derive(Debug, Error)]
pub enum PackageError {
    /// IO errors (unwritable destination, missing icon, ...)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive errors
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Snippet serialization errors
    #[error("Snippet serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pack manifest serialization errors
    #[error("Pack manifest error: {0}")]
    Plist(#[from] plist::Error),

    /// The archive could not be moved into place
    #[error("Failed to move archive to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for packaging operations
pub type PackageResult<T> = Result<T, PackageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_error_with_arg() {
        let err = WorkflowError::display("No results", "Try another query").with_arg("copy me");
        match err {
            WorkflowError::Display {
                title,
                subtitle,
                arg,
            } => {
                assert_eq!(title, "No results");
                assert_eq!(subtitle, "Try another query");
                assert_eq!(arg, "copy me");
            }
            _ => panic!("Expected display error"),
        }
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_display_error() {
        let wrapped = anyhow::Error::new(WorkflowError::display("Offline", "Check network"));
        let err = WorkflowError::from(wrapped);
        assert!(err.is_display());
        assert_eq!(err.to_string(), "Offline");
    }

    #[test]
    fn test_anyhow_other_is_unexpected() {
        let err = WorkflowError::from(anyhow::anyhow!("boom"));
        assert!(matches!(err, WorkflowError::Unexpected(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
