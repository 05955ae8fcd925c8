//! Infrastructure adapters for Gantry.
//!
//! This crate implements the ports defined in `gantry_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod renderer;
pub mod source;
pub mod templates;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::MiniJinjaRenderer;
pub use source::{Reflect, ReflectType, ReflectionTypeSource, SymbolTypeSource};
pub use templates::OverridingTemplateResolver;
