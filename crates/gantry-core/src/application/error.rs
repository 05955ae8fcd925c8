//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not in the
//! model itself. Model errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Named template missing from both the override directory and the
    /// embedded set.
    #[error("template '{template}' not found (searched: {searched})")]
    TemplateNotFound { template: String, searched: String },

    /// Template parsing or evaluation failed.
    #[error("rendering '{template}' failed: {reason}")]
    RenderingFailed { template: String, reason: String },

    /// A template model could not be serialized.
    #[error("model for '{generator}' could not be serialized: {reason}")]
    ModelSerialization { generator: String, reason: String },

    /// Filesystem operation failed.
    #[error("filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// In-memory filesystem lock poisoned.
    #[error("filesystem store is unavailable")]
    StoreLockError,

    /// Web or data project path does not exist.
    #[error("project not found at {path}")]
    ProjectNotFound { path: PathBuf },

    /// Source could not be parsed by the symbol backend.
    #[error("could not analyze {path}: {reason}")]
    SourceAnalysis { path: PathBuf, reason: String },

    /// No DB context, or the requested one, was found.
    #[error("no DB context named '{name}' was found")]
    ContextNotFound { name: String },

    /// The data project declares no DB context at all.
    #[error("the data project declares no #[db_context] type")]
    NoContext,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { template, .. } => vec![
                format!("Check the spelling of '{template}'"),
                "Run `gantry templates` to list available templates".into(),
            ],
            Self::RenderingFailed { template, .. } => vec![
                format!("If '{template}' is overridden, compare it with the embedded version"),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::StoreLockError => vec![
                "A previous operation panicked while holding the store".into(),
            ],
            Self::ProjectNotFound { path } => vec![
                format!("Directory does not exist: {}", path.display()),
                "Pass --data-project and --web-project, or set them in gantry.toml".into(),
            ],
            Self::SourceAnalysis { path, .. } => vec![
                format!("Make sure {} is valid Rust", path.display()),
            ],
            Self::ContextNotFound { .. } | Self::NoContext => vec![
                "Annotate your context struct with #[db_context]".into(),
                "Or pass --context with its name".into(),
            ],
            Self::ModelSerialization { .. } => vec!["This is a bug, please report it".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } | Self::RenderingFailed { .. } => ErrorCategory::Template,
            Self::ProjectNotFound { .. } | Self::ContextNotFound { .. } | Self::NoContext => {
                ErrorCategory::Configuration
            }
            Self::SourceAnalysis { .. } => ErrorCategory::Analysis,
            Self::FilesystemError { .. }
            | Self::StoreLockError
            | Self::ModelSerialization { .. } => ErrorCategory::Internal,
        }
    }
}
