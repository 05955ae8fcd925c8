//! The unified view-model graph built by the repository.
//!
//! Nothing here knows which type source produced it.

mod class;
mod method;
mod property;

pub use class::{ClassFlags, ClassId, ClassViewModel, EnumValue, EnumViewModel};
pub use method::{InjectedKind, MethodViewModel, ParameterViewModel};
pub use property::{PropertyRole, PropertyViewModel};
