// ============================================================================
// domain/error.rs - MODEL ANALYSIS ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they are attached to generators and reported later)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Not Found
    // ========================================================================
    #[error("type '{identity}' is not known to the repository")]
    TypeNotFound { identity: String },

    #[error("class '{class}' has no property named '{property}'")]
    PropertyNotFound { class: String, property: String },

    #[error("class '{class}' has no method named '{method}'")]
    MethodNotFound { class: String, method: String },

    // ========================================================================
    // Analysis
    // ========================================================================
    #[error("role of '{class}.{property}' is ambiguous: {reason}")]
    AmbiguousRole {
        class: String,
        property: String,
        reason: String,
    },

    #[error("type '{reference}' referenced by '{class}' cannot be resolved")]
    UnresolvedType { class: String, reference: String },

    #[error("class '{class}' failed validation: {reason}")]
    InvalidModel { class: String, reason: String },

    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("strategy '{strategy}' does not satisfy the {contract} contract: {reason}")]
    InvalidStrategy {
        strategy: String,
        contract: &'static str,
        reason: String,
    },

    #[error("'{class}' is not a DB context")]
    NotAContext { class: String },

    #[error("invalid type identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: String, reason: String },

    // ========================================================================
    // Security
    // ========================================================================
    #[error("cannot emit an authorization marker for '{member}': access is denied to everyone")]
    DenyAllEmission { member: String },

    #[error("write to '{class}.{property}' rejected: {reason}")]
    WriteDenied {
        class: String,
        property: String,
        reason: String,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TypeNotFound { identity } => vec![
                format!("'{identity}' was never discovered"),
                "Make sure the type is declared in the data project".into(),
            ],
            Self::PropertyNotFound { property, .. } => vec![
                format!("Property lookup is case-sensitive: '{property}'"),
                "Run `gantry analyze` to list the discovered properties".into(),
            ],
            Self::AmbiguousRole { property, .. } => vec![
                format!("Annotate '{property}' with #[key] or #[foreign_key(\"Nav\")]"),
                "Rename the property so only one naming convention applies".into(),
            ],
            Self::UnresolvedType { reference, .. } => vec![
                format!("Declare '{reference}' in the data project or remove the reference"),
            ],
            Self::InvalidStrategy { contract, .. } => vec![
                format!("Implement {contract}<T> for exactly one served type T"),
                "Use #[declared_for(Type)] to redirect the strategy to another type".into(),
            ],
            Self::NotAContext { class } => vec![
                format!("Annotate '{class}' with #[db_context]"),
                "Or pass --context with the name of your context struct".into(),
            ],
            Self::DenyAllEmission { .. } => vec![
                "Routes denied to everyone must be omitted, not annotated".into(),
                "This is a bug in the generator, please report it".into(),
            ],
            Self::InvalidOutputPath { .. } => vec![
                "Output suffixes must be relative and stay below the output root".into(),
            ],
            Self::WriteDenied { .. } => vec![
                "The current principal may not modify this property".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TypeNotFound { .. }
            | Self::PropertyNotFound { .. }
            | Self::MethodNotFound { .. } => ErrorCategory::NotFound,
            Self::AmbiguousRole { .. } | Self::UnresolvedType { .. } | Self::InvalidModel { .. } => {
                ErrorCategory::Analysis
            }
            Self::InvalidStrategy { .. }
            | Self::NotAContext { .. }
            | Self::InvalidIdentity(_)
            | Self::InvalidOutputPath { .. } => ErrorCategory::Configuration,
            Self::WriteDenied { .. } => ErrorCategory::Validation,
            Self::DenyAllEmission { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Analysis,
    Configuration,
    NotFound,
    Internal,
}
