//! Unified error handling for Gantry Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Gantry Core operations.
#[derive(Debug, Error, Clone)]
pub enum GantryError {
    /// Errors from the domain layer (model and security violations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and I/O failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl GantryError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Check gantry.toml and GANTRY_* environment variables".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Gantry".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Analysis => ErrorCategory::Analysis,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Fatal before any output is written.
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Analysis,
    Template,
    NotFound,
    Validation,
    Internal,
}

/// Convenient result type alias.
pub type GantryResult<T> = Result<T, GantryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_errors_are_configuration_errors() {
        let err: GantryError = DomainError::InvalidStrategy {
            strategy: "Broken".into(),
            contract: "DataSource",
            reason: "no type argument".into(),
        }
        .into();
        assert!(err.is_configuration());
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn missing_template_is_a_template_error() {
        let err: GantryError = ApplicationError::TemplateNotFound {
            template: "vue/x.j2".into(),
            searched: "embedded".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Template);
        assert!(err.to_string().contains("vue/x.j2"));
    }
}
