// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Gantry.
//!
//! Everything needed to turn raw type facts into a generator tree lives
//! here, with no filesystem or template-engine access:
//!
//! - **Type model**: [`TypeViewModel`], [`ClassViewModel`] and friends
//! - **Repository**: per-run arena of discovered classes ([`ReflectionRepository`])
//! - **Usage analysis**: contexts, entities and strategies ([`TypeUsageAnalyzer`])
//! - **Security**: permissions, principals and authorization markers
//! - **Mapping**: per-instance property restrictions ([`DtoMapper`])
//! - **Generation**: the generator tree, known-good set and run report
//!
// Public API - what the world sees
pub mod annotations;
pub mod descriptor;
pub mod error;
pub mod generation;
pub mod mapping;
pub mod model;
pub mod naming;
pub mod repository;
pub mod security;
pub mod source;
pub mod types;
pub mod usage;
pub mod validation;

// Re-exports for convenience
pub use annotations::{Annotation, AnnotationArg, AnnotationValue, Annotations};
pub use descriptor::{FieldDescriptor, MethodDescriptor, ParameterDescriptor, TypeDescriptor, TypeShape};
pub use error::{DomainError, ErrorCategory};
pub use mapping::{DtoMapper, Instance, MappingContext, PropertyRestriction};
pub use model::{
    ClassFlags, ClassId, ClassViewModel, EnumValue, EnumViewModel, InjectedKind, MethodViewModel,
    ParameterViewModel, PropertyRole, PropertyViewModel,
};
pub use repository::{ReflectionRepository, RegisteredType};
pub use security::{
    AuthorizationMarker, ClassSecurityInfo, Operation, Principal, PropertySecurityInfo, RoleList,
    SecurityPermission,
};
pub use source::{Backend, TypeSource};
pub use types::{Primitive, TypeIdentity, TypeKind, TypeViewModel};
pub use usage::{
    CrudStrategyTypeUsage, DataSourceTypeUsage, EntityTypeUsage, StrategyIndex, StrategyKind,
    TypeUsageAnalyzer,
};
pub use validation::{DomainValidator, ModelValidation};
