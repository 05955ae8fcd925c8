//! Gantry Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Gantry, a
//! CRUD scaffolding generator: it reads a data project's types, infers the
//! entity model and its security rules, and drives a tree of generators
//! that write server controllers, DTOs and client view models.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           gantry-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (AnalysisService, GenerationService)    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (TypeSource, Filesystem, Templates)     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    gantry-adapters (Infrastructure)     │
//! │ (SymbolTypeSource, MiniJinjaRenderer)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (types, repository, security, nodes)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gantry_core::prelude::*;
//!
//! let analysis = AnalysisService::new(source).analyze(None)?;
//! let tree = build_tree(&analysis, &TreeOptions::default())?;
//! let service = GenerationService::new(filesystem, resolver, renderer);
//! let report = service.run(&tree, Path::new("./out"), &GenerationOptions::default(), &CancellationToken::new())?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

/// What external crates should use.
pub mod prelude {
    pub use crate::application::{
        Analysis, AnalysisService, GenerationOptions, GenerationService, SuiteKind, TreeOptions,
        build_tree,
        ports::{Filesystem, TemplateRenderer, TemplateResolver, TypeSource},
    };
    pub use crate::domain::generation::{
        CancellationToken, GenerationReport, GeneratorNode, ResolvedTemplate, TemplateDescriptor,
        TemplateOrigin, list_generators,
    };
    pub use crate::domain::{
        Backend, ClassViewModel, ReflectionRepository, TypeDescriptor, TypeIdentity, TypeViewModel,
    };
    pub use crate::error::{GantryError, GantryResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
