//! Reflection backend: descriptors declared by the model types themselves.
//!
//! A model type implements [`Reflect`] and describes itself with the same
//! builders the symbol backend fills from source:
//!
//! ```rust,ignore
//! impl Reflect for Product {
//!     fn identity() -> TypeIdentity {
//!         TypeIdentity::new("shop", "Product")
//!     }
//!
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::class(Self::identity())
//!             .field(field::<i32>("ProductId").source_name("product_id"))
//!             .field(field::<Option<Supplier>>("Supplier"))
//!     }
//! }
//! reflect_types!(class Product, Supplier; enum Status);
//! ```
//!
//! Field types are mapped through [`ReflectType`], so `Option`, `Vec` and
//! friends translate the same way the symbol backend translates syntax.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use tracing::trace;
use uuid::Uuid;

use gantry_core::domain::{
    Backend, FieldDescriptor, Primitive, TypeDescriptor, TypeIdentity, TypeSource, TypeViewModel,
};

/// A model type that can describe itself.
pub trait Reflect: 'static {
    fn identity() -> TypeIdentity;

    fn describe() -> TypeDescriptor;
}

/// Maps a Rust type to the shared type model.
pub trait ReflectType {
    fn type_view() -> TypeViewModel;
}

/// A field whose type is taken from `T`.
pub fn field<T: ReflectType>(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, T::type_view())
}

macro_rules! primitive {
    ($($ty:ty => $primitive:ident),+ $(,)?) => {
        $(impl ReflectType for $ty {
            fn type_view() -> TypeViewModel {
                TypeViewModel::primitive(Primitive::$primitive)
            }
        })+
    };
}

primitive! {
    bool => Bool,
    i8 => I8, i16 => I16, i32 => I32, isize => I32, i64 => I64, i128 => I64,
    u8 => U8, u16 => U16, u32 => U32, usize => U32, u64 => U64, u128 => U64,
    f32 => F32, f64 => F64,
    char => Char,
    String => String, &'static str => String,
    NaiveDate => Date, NaiveDateTime => DateTime,
    Uuid => Uuid,
    () => Unit,
}

impl<Tz: TimeZone> ReflectType for DateTime<Tz> {
    fn type_view() -> TypeViewModel {
        TypeViewModel::primitive(Primitive::DateTime)
    }
}

impl<T: ReflectType> ReflectType for Option<T> {
    fn type_view() -> TypeViewModel {
        T::type_view().into_nullable()
    }
}

macro_rules! collection {
    ($($ty:ident),+) => {
        $(impl<T: ReflectType> ReflectType for $ty<T> {
            fn type_view() -> TypeViewModel {
                TypeViewModel::collection(T::type_view())
            }
        })+
    };
}

collection!(Vec, VecDeque, HashSet, BTreeSet);

macro_rules! wrapper {
    ($($ty:ident),+) => {
        $(impl<T: ReflectType> ReflectType for $ty<T> {
            fn type_view() -> TypeViewModel {
                T::type_view()
            }
        })+
    };
}

wrapper!(Box, Arc, Rc);

/// Implement [`ReflectType`] for model types: `class` types map to class
/// references, `enum` types to enum references.
#[macro_export]
macro_rules! reflect_types {
    ($(class $($class:ty),+)? $(; enum $($enum:ty),+)? $(;)?) => {
        $($(impl $crate::source::ReflectType for $class {
            fn type_view() -> ::gantry_core::domain::TypeViewModel {
                ::gantry_core::domain::TypeViewModel::class(
                    <$class as $crate::source::Reflect>::identity(),
                )
            }
        })+)?
        $($(impl $crate::source::ReflectType for $enum {
            fn type_view() -> ::gantry_core::domain::TypeViewModel {
                ::gantry_core::domain::TypeViewModel::enumeration(
                    <$enum as $crate::source::Reflect>::identity(),
                )
            }
        })+)?
    };
}

/// Type source over a runtime registry of [`Reflect`] types.
#[derive(Debug, Clone, Default)]
pub struct ReflectionTypeSource {
    descriptors: Vec<TypeDescriptor>,
}

impl ReflectionTypeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`. Registering the same identity twice keeps the first.
    pub fn register<T: Reflect>(mut self) -> Self {
        self.insert(T::describe());
        self
    }

    /// Register a descriptor built by hand.
    pub fn with_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    fn insert(&mut self, descriptor: TypeDescriptor) {
        if self.descriptors.iter().any(|d| d.identity == descriptor.identity) {
            trace!(identity = %descriptor.identity, "Already registered");
            return;
        }
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl TypeSource for ReflectionTypeSource {
    fn backend(&self) -> Backend {
        Backend::Reflection
    }

    fn types(&self) -> Vec<TypeIdentity> {
        self.descriptors.iter().map(|d| d.identity.clone()).collect()
    }

    fn describe(&self, identity: &TypeIdentity) -> Option<TypeDescriptor> {
        self.descriptors.iter().find(|d| &d.identity == identity).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Supplier;

    impl Reflect for Supplier {
        fn identity() -> TypeIdentity {
            TypeIdentity::new("shop", "Supplier")
        }

        fn describe() -> TypeDescriptor {
            TypeDescriptor::class(Self::identity()).field(field::<i64>("SupplierId"))
        }
    }

    crate::reflect_types!(class Supplier);

    #[test]
    fn rust_types_map_like_source_syntax() {
        assert_eq!(
            <Option<Option<DateTime<Utc>>>>::type_view(),
            TypeViewModel::primitive(Primitive::DateTime).into_nullable()
        );
        assert_eq!(
            <Arc<Vec<Supplier>>>::type_view(),
            TypeViewModel::collection(TypeViewModel::class(Supplier::identity()))
        );
        assert_eq!(<&'static str>::type_view(), TypeViewModel::primitive(Primitive::String));
    }

    #[test]
    fn registration_is_idempotent() {
        let source = ReflectionTypeSource::new()
            .register::<Supplier>()
            .register::<Supplier>();
        assert_eq!(source.len(), 1);
        assert_eq!(source.backend(), Backend::Reflection);
        assert!(source.describe(&Supplier::identity()).is_some());
    }
}
