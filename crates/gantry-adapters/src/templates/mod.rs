//! Template lookup: embedded defaults plus per-project overrides.
//!
//! ```text
//! <override_dir>/
//! ├── server/controller.rs.j2      ← replaces the embedded controller
//! └── vue/models.g.ts.j2
//! ```
//!
//! A template is looked up by logical path. An override file at the same
//! relative path wins; otherwise the embedded copy is used.

mod embedded;
mod resolver;

pub use embedded::{EMBEDDED, embedded};
pub use resolver::OverridingTemplateResolver;
