//! The type-source capability: where class facts come from.
//!
//! Two backends implement it (runtime reflection over registered
//! descriptors, and symbol analysis of parsed source). The repository and
//! everything after it only ever see this trait.

use std::fmt;

use super::descriptor::TypeDescriptor;
use super::types::TypeIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Reflection,
    Symbol,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reflection => write!(f, "reflection"),
            Self::Symbol => write!(f, "symbol"),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TypeSource: Send + Sync {
    fn backend(&self) -> Backend;

    /// Every declared type, in a stable order.
    fn types(&self) -> Vec<TypeIdentity>;

    /// Raw facts for one type, `None` if the source does not declare it.
    fn describe(&self, identity: &TypeIdentity) -> Option<TypeDescriptor>;

    /// Declared types whose simple name is `name`.
    fn find_by_name(&self, name: &str) -> Vec<TypeIdentity> {
        self.types().into_iter().filter(|t| t.name() == name).collect()
    }
}
