//! Application layer for Gantry.
//!
//! This layer contains:
//! - **Services**: use case orchestration (analysis, generation, cleanup)
//! - **Suites**: the generator trees built from an analyzed model
//! - **Ports**: interface definitions (traits) for external dependencies
//! - **Errors**: application-specific error types
//!
//! Business rules about types, security and generator semantics live in
//! `crate::domain`; this layer wires them to the ports.

pub mod error;
pub mod ports;
pub mod services;
pub mod suites;

pub use services::{
    Analysis, AnalysisService, CleanOutcome, GenerationOptions, GenerationService, OutputCleaner,
};

pub use suites::{SuiteKind, TEMPLATE_NAMES, TreeOptions, build_tree};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, TemplateRenderer, TemplateResolver, TypeSource};

pub use error::ApplicationError;
