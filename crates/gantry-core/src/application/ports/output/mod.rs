//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `gantry-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::generation::{ResolvedTemplate, TemplateDescriptor};
use crate::error::GantryResult;

pub use crate::domain::source::TypeSource;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `gantry_adapters::filesystem::LocalFilesystem` (production)
/// - `gantry_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> GantryResult<()>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> GantryResult<()>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> GantryResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Whether `path` itself is a symbolic link, without following it.
    fn is_symlink(&self, path: &Path) -> bool;

    /// Immediate children of a directory, sorted.
    fn list_dir(&self, path: &Path) -> GantryResult<Vec<PathBuf>>;

    fn remove_file(&self, path: &Path) -> GantryResult<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> GantryResult<()>;
}

/// Port for template lookup.
///
/// Resolution never reads content; [`TemplateResolver::read`] does.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateResolver: Send + Sync {
    /// Prefer a filesystem override, fall back to the embedded template.
    fn resolve(&self, descriptor: &TemplateDescriptor) -> GantryResult<ResolvedTemplate>;

    fn read(&self, template: &ResolvedTemplate) -> GantryResult<String>;

    /// Every known template, resolved.
    fn available(&self) -> Vec<ResolvedTemplate>;
}

/// Port for template rendering.
///
/// Implemented by `gantry_adapters::renderer::MiniJinjaRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render `source` (named `name` in diagnostics) against `model`.
    fn render(&self, name: &str, source: &str, model: &Value) -> GantryResult<String>;
}
