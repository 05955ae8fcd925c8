//! Type sources: the two backends that feed the reflection repository.
//!
//! - [`SymbolTypeSource`] parses a data project's Rust source with `syn`.
//! - [`ReflectionTypeSource`] reads descriptors registered at runtime by
//!   types implementing [`Reflect`].
//!
//! Both produce the same [`TypeDescriptor`](gantry_core::domain::TypeDescriptor)
//! facts for the same declared model.

pub mod reflection;
pub mod symbol;

pub use reflection::{Reflect, ReflectType, ReflectionTypeSource};
pub use symbol::SymbolTypeSource;
