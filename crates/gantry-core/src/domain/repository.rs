//! Per-run registry of discovered types.
//!
//! The repository is an arena: every class gets a [`ClassId`] the moment it
//! is first referenced, before any of its members are resolved. Members are
//! populated from a FIFO work queue, so self- and mutually-referential
//! classes terminate and discovery order is deterministic.
//!
//! One repository belongs to one generation run. Concurrent runs build
//! their own.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::{debug, trace, warn};

use super::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor, TypeShape};
use super::error::DomainError;
use super::model::{
    ClassId, ClassViewModel, EnumViewModel, InjectedKind, MethodViewModel, ParameterViewModel,
    PropertyRole, PropertyViewModel,
};
use super::security::method_permission;
use super::source::TypeSource;
use super::types::{TypeIdentity, TypeKind, TypeViewModel};
use super::usage::EntityTypeUsage;

/// What an identity resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisteredType {
    Class(ClassId),
    Enum,
}

struct PendingClass {
    id: ClassId,
    fields: Vec<FieldDescriptor>,
    methods: Vec<MethodDescriptor>,
    base: Option<TypeIdentity>,
    implements: Vec<TypeViewModel>,
}

#[derive(Default)]
pub struct ReflectionRepository {
    classes: Vec<ClassViewModel>,
    index: HashMap<TypeIdentity, ClassId>,
    enums: BTreeMap<TypeIdentity, EnumViewModel>,
    pending: VecDeque<PendingClass>,
    pub(crate) entity_usages: Vec<EntityTypeUsage>,
    pub(crate) analyzed_contexts: Vec<ClassId>,
}

impl ReflectionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every type the source declares, populate them and infer roles.
    pub fn discover_all(&mut self, source: &dyn TypeSource) -> Result<(), DomainError> {
        for identity in source.types() {
            self.register(source, &identity)?;
        }
        self.drain(source);
        self.finalize();
        debug!(
            classes = self.classes.len(),
            enums = self.enums.len(),
            backend = %source.backend(),
            "Type discovery complete"
        );
        Ok(())
    }

    /// Return the class for `identity`, building it (and everything it
    /// references) if it is not known yet.
    pub fn get_or_add_class(
        &mut self,
        source: &dyn TypeSource,
        identity: &TypeIdentity,
    ) -> Result<ClassId, DomainError> {
        match self.get_or_add_type(source, identity)? {
            RegisteredType::Class(id) => Ok(id),
            RegisteredType::Enum => Err(DomainError::TypeNotFound {
                identity: format!("{identity} (an enum, not a class)"),
            }),
        }
    }

    /// Add-if-absent for any declared type.
    pub fn get_or_add_type(
        &mut self,
        source: &dyn TypeSource,
        identity: &TypeIdentity,
    ) -> Result<RegisteredType, DomainError> {
        let registered = self.register(source, identity)?;
        if !self.pending.is_empty() {
            self.drain(source);
            self.finalize();
        }
        Ok(registered)
    }

    fn register(
        &mut self,
        source: &dyn TypeSource,
        identity: &TypeIdentity,
    ) -> Result<RegisteredType, DomainError> {
        if let Some(id) = self.index.get(identity) {
            return Ok(RegisteredType::Class(*id));
        }
        if self.enums.contains_key(identity) {
            return Ok(RegisteredType::Enum);
        }

        let TypeDescriptor {
            identity,
            annotations,
            shape,
        } = source
            .describe(identity)
            .ok_or_else(|| DomainError::TypeNotFound {
                identity: identity.to_string(),
            })?;

        match shape {
            TypeShape::Enum { variants } => {
                trace!(%identity, "Registered enum");
                self.enums
                    .insert(identity.clone(), EnumViewModel::new(identity, &variants));
                Ok(RegisteredType::Enum)
            }
            TypeShape::Class {
                fields,
                methods,
                base,
                implements,
            } => {
                let id = ClassId(self.classes.len());
                trace!(%identity, ?id, "Registered class placeholder");
                self.index.insert(identity.clone(), id);
                self.classes
                    .push(ClassViewModel::placeholder(id, identity, annotations));
                self.pending.push_back(PendingClass {
                    id,
                    fields,
                    methods,
                    base,
                    implements,
                });
                Ok(RegisteredType::Class(id))
            }
        }
    }

    fn drain(&mut self, source: &dyn TypeSource) {
        while let Some(pending) = self.pending.pop_front() {
            self.populate(source, pending);
        }
    }

    fn populate(&mut self, source: &dyn TypeSource, pending: PendingClass) {
        let PendingClass {
            id,
            fields,
            methods,
            base,
            implements,
        } = pending;
        let owner = self.classes[id.0].name().to_string();
        let mut issues = Vec::new();

        let properties: Vec<PropertyViewModel> = fields
            .into_iter()
            .enumerate()
            .map(|(i, field)| {
                self.register_references(source, &field.ty, &owner, &mut issues);
                PropertyViewModel::new(field.name, field.source_name, field.ty, field.annotations, i)
            })
            .collect();

        let methods: Vec<MethodViewModel> = methods
            .into_iter()
            .map(|method| self.build_method(source, method, &owner, &mut issues))
            .collect();

        if let Some(base) = &base {
            if let Err(e) = self.register(source, base) {
                warn!(class = %owner, base = %base, "Base type could not be resolved");
                issues.push(DomainError::UnresolvedType {
                    class: owner.clone(),
                    reference: e.to_string(),
                });
            }
        }
        for contract in &implements {
            if let TypeKind::Generic { arguments, .. } = contract.kind() {
                for argument in arguments {
                    self.register_references(source, argument, &owner, &mut issues);
                }
            }
        }

        let class = &mut self.classes[id.0];
        class.properties = properties;
        class.methods = methods;
        class.base_type = base;
        class.implements = implements;
        class.issues.extend(issues);
        class.complete = true;
    }

    fn build_method(
        &mut self,
        source: &dyn TypeSource,
        method: MethodDescriptor,
        owner: &str,
        issues: &mut Vec<DomainError>,
    ) -> MethodViewModel {
        let parameters = method
            .parameters
            .into_iter()
            .map(|p| {
                let injected = p
                    .ty
                    .class_identity()
                    .and_then(|id| InjectedKind::from_type_name(id.name()));
                if injected.is_none() {
                    self.register_references(source, &p.ty, owner, issues);
                }
                let injected = injected.or_else(|| {
                    p.ty.class_identity()
                        .and_then(|id| self.class_by_identity(id))
                        .filter(|c| c.flags().is_service)
                        .map(|_| InjectedKind::Service)
                });
                ParameterViewModel {
                    name: p.name,
                    ty: p.ty,
                    has_default: p.has_default,
                    injected,
                }
            })
            .collect();
        self.register_references(source, &method.return_type, owner, issues);

        MethodViewModel::new(
            method.name,
            method.source_name,
            parameters,
            method.return_type,
            method.is_static,
            method_permission(&method.annotations),
        )
    }

    /// Register every enum/class a type mentions, recording unresolvable ones.
    fn register_references(
        &mut self,
        source: &dyn TypeSource,
        ty: &TypeViewModel,
        owner: &str,
        issues: &mut Vec<DomainError>,
    ) {
        match ty.kind() {
            TypeKind::Primitive(_) => {}
            TypeKind::Enum(identity) | TypeKind::Class(identity) => {
                if self.register(source, identity).is_err() {
                    issues.push(DomainError::UnresolvedType {
                        class: owner.to_string(),
                        reference: identity.to_string(),
                    });
                }
            }
            TypeKind::Collection(element) => {
                self.register_references(source, element, owner, issues);
            }
            TypeKind::Generic { arguments, .. } => {
                for argument in arguments {
                    self.register_references(source, argument, owner, issues);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Role inference
    // ------------------------------------------------------------------------

    /// Infer property roles over the complete graph. Safe to call repeatedly.
    pub fn finalize(&mut self) {
        for class in &mut self.classes {
            class
                .issues
                .retain(|e| !matches!(e, DomainError::AmbiguousRole { .. }));
            for property in &mut class.properties {
                property.set_role(PropertyRole::Value);
                property.clear_links();
            }
        }

        for i in 0..self.classes.len() {
            let issue = assign_primary_key(&mut self.classes[i]);
            self.classes[i].issues.extend(issue);
        }

        for i in 0..self.classes.len() {
            let plan = self.plan_relationships(&self.classes[i]);
            let class = &mut self.classes[i];
            for step in plan.steps {
                let property = &mut class.properties[step.index];
                property.set_role(step.role);
                match step.link {
                    Link::None => {}
                    Link::Navigation(nav) => property.link_navigation(nav),
                    Link::ForeignKey(fk) => property.link_foreign_key(fk),
                }
            }
            class.issues.extend(plan.issues);
        }
    }

    fn plan_relationships(&self, class: &ClassViewModel) -> RelationshipPlan {
        let mut plan = RelationshipPlan::default();
        let props = class.properties();
        // (navigation, foreign key) pairs, linked once every claim is known.
        let mut claims: Vec<(usize, usize)> = Vec::new();

        for (index, prop) in props.iter().enumerate() {
            if prop.is_primary_key() {
                continue;
            }
            let ty = prop.ty();

            if let Some(element) = ty.element_type() {
                let is_entity = element
                    .class_identity()
                    .and_then(|id| self.class_by_identity(id))
                    .is_some_and(ClassViewModel::is_entity);
                if is_entity {
                    plan.push(index, PropertyRole::CollectionNavigation, Link::None);
                }
                continue;
            }

            if ty.is_class() {
                let fk_candidates: Vec<usize> = props
                    .iter()
                    .enumerate()
                    .filter(|(i, p)| {
                        *i != index
                            && !p.is_primary_key()
                            && p.ty().is_primitive()
                            && (annotated_fk_target(p) == Some(prop.name())
                                || p.name() == format!("{}Id", prop.name())
                                || annotated_fk_target(prop) == Some(p.name()))
                    })
                    .map(|(i, _)| i)
                    .collect();

                match fk_candidates.as_slice() {
                    [] => {}
                    [fk] => claims.push((index, *fk)),
                    many => plan.issues.push(DomainError::AmbiguousRole {
                        class: class.name().to_string(),
                        property: prop.name().to_string(),
                        reason: format!(
                            "{} candidate foreign keys: {}",
                            many.len(),
                            many.iter()
                                .map(|i| props[*i].name())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    }),
                }
                continue;
            }

            // A foreign key to an entity whose navigation is not modeled.
            if let Some(target) = annotated_fk_target(prop) {
                let sibling_exists = props.iter().any(|p| p.name() == target);
                let targets_entity = self.find_class(target).is_some_and(ClassViewModel::is_entity);
                if !sibling_exists && targets_entity && ty.is_primitive() {
                    plan.push(index, PropertyRole::ForeignKey, Link::Navigation(None));
                }
            }
        }

        // A foreign key links to exactly one navigation; competing claims
        // leave every party unlinked and are reported instead.
        for &(nav, fk) in &claims {
            let rivals: Vec<&str> = claims
                .iter()
                .filter(|(_, other)| *other == fk)
                .map(|(n, _)| props[*n].name())
                .collect();
            if rivals.len() > 1 {
                if rivals[0] == props[nav].name() {
                    plan.issues.push(DomainError::AmbiguousRole {
                        class: class.name().to_string(),
                        property: props[fk].name().to_string(),
                        reason: format!("claimed by navigations {}", rivals.join(", ")),
                    });
                }
                continue;
            }
            plan.push(
                nav,
                PropertyRole::ReferenceNavigation,
                Link::ForeignKey(props[fk].name().to_string()),
            );
            plan.push(
                fk,
                PropertyRole::ForeignKey,
                Link::Navigation(Some(props[nav].name().to_string())),
            );
        }

        plan
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn class(&self, id: ClassId) -> &ClassViewModel {
        &self.classes[id.0]
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut ClassViewModel {
        &mut self.classes[id.0]
    }

    pub fn class_by_identity(&self, identity: &TypeIdentity) -> Option<&ClassViewModel> {
        self.index.get(identity).map(|id| &self.classes[id.0])
    }

    /// Look a class up by simple name or by full `ns::Name` path.
    ///
    /// A simple name shared by several namespaces matches the first
    /// discovered.
    pub fn find_class(&self, name: &str) -> Option<&ClassViewModel> {
        if name.contains("::") {
            let identity = TypeIdentity::parse(name).ok()?;
            return self.class_by_identity(&identity);
        }
        self.classes.iter().find(|c| c.name() == name)
    }

    /// Classes in discovery order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassViewModel> {
        self.classes.iter()
    }

    pub fn enums(&self) -> impl Iterator<Item = &EnumViewModel> {
        self.enums.values()
    }

    pub fn enum_by_identity(&self, identity: &TypeIdentity) -> Option<&EnumViewModel> {
        self.enums.get(identity)
    }

    /// Classes whose declared base type has the given simple name.
    pub fn derived_types(&self, base_name: &str) -> Vec<&ClassViewModel> {
        self.classes
            .iter()
            .filter(|c| c.base_type().is_some_and(|b| b.name() == base_name))
            .collect()
    }

    /// Usages produced by context analysis, in context-property order.
    pub fn entity_usages(&self) -> &[EntityTypeUsage] {
        &self.entity_usages
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

enum Link {
    None,
    Navigation(Option<String>),
    ForeignKey(String),
}

struct Step {
    index: usize,
    role: PropertyRole,
    link: Link,
}

#[derive(Default)]
struct RelationshipPlan {
    steps: Vec<Step>,
    issues: Vec<DomainError>,
}

impl RelationshipPlan {
    fn push(&mut self, index: usize, role: PropertyRole, link: Link) {
        self.steps.push(Step { index, role, link });
    }
}

fn annotated_fk_target(prop: &PropertyViewModel) -> Option<&str> {
    prop.annotations()
        .get("foreign_key")
        .and_then(|a| a.first_text())
}

/// Pick the primary key: an explicit `#[key]` wins, else `Id` or
/// `{ClassName}Id` (case-insensitive) on a scalar property.
fn assign_primary_key(class: &mut ClassViewModel) -> Option<DomainError> {
    let annotated: Vec<usize> = class
        .properties
        .iter()
        .enumerate()
        .filter(|(_, p)| p.annotations().has("key"))
        .map(|(i, _)| i)
        .collect();

    let conventional = format!("{}Id", class.name());
    let candidates = if annotated.is_empty() {
        class
            .properties
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.ty().is_primitive()
                    && (p.name().eq_ignore_ascii_case("Id")
                        || p.name().eq_ignore_ascii_case(&conventional))
            })
            .map(|(i, _)| i)
            .collect()
    } else {
        annotated
    };

    let first = *candidates.first()?;
    class.properties[first].set_role(PropertyRole::PrimaryKey);

    (candidates.len() > 1).then(|| DomainError::AmbiguousRole {
        class: class.name().to_string(),
        property: class.properties[first].name().to_string(),
        reason: format!("{} primary key candidates", candidates.len()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotations::Annotation;
    use crate::domain::descriptor::{MethodDescriptor, ParameterDescriptor};
    use crate::domain::source::{Backend, MockTypeSource};
    use crate::domain::types::Primitive;

    fn id(name: &str) -> TypeIdentity {
        TypeIdentity::new("shop", name)
    }

    fn int() -> TypeViewModel {
        TypeViewModel::primitive(Primitive::I32)
    }

    fn source_of(descriptors: Vec<TypeDescriptor>) -> MockTypeSource {
        let mut source = MockTypeSource::new();
        let ids: Vec<TypeIdentity> = descriptors.iter().map(|d| d.identity.clone()).collect();
        source.expect_backend().return_const(Backend::Reflection);
        source.expect_types().returning(move || ids.clone());
        source
            .expect_describe()
            .returning(move |wanted| descriptors.iter().find(|d| &d.identity == wanted).cloned());
        source
    }

    fn shop() -> Vec<TypeDescriptor> {
        vec![
            TypeDescriptor::class(id("Product"))
                .field(FieldDescriptor::new("ProductId", int()))
                .field(FieldDescriptor::new("Name", TypeViewModel::primitive(Primitive::String)))
                .field(FieldDescriptor::new(
                    "Orders",
                    TypeViewModel::collection(TypeViewModel::class(id("Order"))),
                )),
            TypeDescriptor::class(id("Order"))
                .field(FieldDescriptor::new("OrderId", int()))
                .field(FieldDescriptor::new("ProductId", int()))
                .field(FieldDescriptor::new("Product", TypeViewModel::class(id("Product"))))
                .field(FieldDescriptor::new(
                    "Parent",
                    TypeViewModel::class(id("Order")).into_nullable(),
                ))
                .field(FieldDescriptor::new("ParentId", int().into_nullable())),
        ]
    }

    #[test]
    fn cyclic_graph_terminates_and_registers_once() {
        let source = source_of(shop());
        let mut repo = ReflectionRepository::new();

        let order = repo.get_or_add_class(&source, &id("Order")).unwrap();
        assert_eq!(repo.len(), 2);
        assert!(repo.class(order).is_complete());

        let again = repo.get_or_add_class(&source, &id("Order")).unwrap();
        assert_eq!(order, again);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn roles_follow_naming_conventions() {
        let source = source_of(shop());
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let order = repo.find_class("Order").unwrap();
        let role = |name: &str| order.property_by_name(name).unwrap().role();
        assert_eq!(role("OrderId"), PropertyRole::PrimaryKey);
        assert_eq!(role("ProductId"), PropertyRole::ForeignKey);
        assert_eq!(role("Product"), PropertyRole::ReferenceNavigation);
        assert_eq!(role("Parent"), PropertyRole::ReferenceNavigation);
        assert_eq!(role("ParentId"), PropertyRole::ForeignKey);

        let fk = order.property_by_name("ProductId").unwrap();
        assert_eq!(fk.navigation(), Some("Product"));
        let nav = order.property_by_name("Product").unwrap();
        assert_eq!(nav.foreign_key(), Some("ProductId"));

        let product = repo.find_class("Product").unwrap();
        assert_eq!(
            product.property_by_name("Orders").unwrap().role(),
            PropertyRole::CollectionNavigation
        );
        assert_eq!(product.property_by_name("Name").unwrap().role(), PropertyRole::Value);
    }

    #[test]
    fn property_lookup_is_case_sensitive() {
        let source = source_of(shop());
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let product = repo.find_class("Product").unwrap();
        assert!(product.property_by_name("Name").is_ok());
        assert!(matches!(
            product.property_by_name("name"),
            Err(DomainError::PropertyNotFound { .. })
        ));
    }

    #[test]
    fn explicit_key_wins_over_convention() {
        let source = source_of(vec![
            TypeDescriptor::class(id("Tag"))
                .field(FieldDescriptor::new("TagId", int()))
                .field(
                    FieldDescriptor::new("Code", TypeViewModel::primitive(Primitive::String))
                        .annotate(Annotation::new("key")),
                ),
        ]);
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let tag = repo.find_class("Tag").unwrap();
        assert_eq!(tag.primary_key().unwrap().name(), "Code");
        assert!(tag.issues().is_empty());
    }

    #[test]
    fn competing_keys_are_reported_as_ambiguous() {
        let source = source_of(vec![
            TypeDescriptor::class(id("Tag"))
                .field(FieldDescriptor::new("Id", int()))
                .field(FieldDescriptor::new("TagId", int())),
        ]);
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();
        repo.finalize();

        let tag = repo.find_class("Tag").unwrap();
        assert_eq!(tag.primary_key().unwrap().name(), "Id");
        assert_eq!(tag.issues().len(), 1);
        assert!(matches!(tag.issues()[0], DomainError::AmbiguousRole { .. }));
    }

    #[test]
    fn foreign_key_claimed_by_two_navigations_is_ambiguous() {
        let source = source_of(vec![
            TypeDescriptor::class(id("Person")).field(FieldDescriptor::new("PersonId", int())),
            TypeDescriptor::class(id("Case"))
                .field(FieldDescriptor::new("CaseId", int()))
                .field(FieldDescriptor::new("OwnerId", int()))
                .field(FieldDescriptor::new("Owner", TypeViewModel::class(id("Person"))))
                .field(
                    FieldDescriptor::new("Reviewer", TypeViewModel::class(id("Person")))
                        .annotate(Annotation::new("foreign_key").string("OwnerId")),
                ),
        ]);
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let case = repo.find_class("Case").unwrap();
        let fk = case.property_by_name("OwnerId").unwrap();
        assert_eq!(fk.role(), PropertyRole::Value);
        assert_eq!(fk.navigation(), None);
        assert_eq!(case.property_by_name("Owner").unwrap().foreign_key(), None);
        assert_eq!(case.property_by_name("Reviewer").unwrap().foreign_key(), None);
        assert!(matches!(
            case.issues(),
            [DomainError::AmbiguousRole { property, reason, .. }]
                if property == "OwnerId" && reason.contains("Owner, Reviewer")
        ));
    }

    #[test]
    fn unresolved_reference_is_attached_to_the_class() {
        let source = source_of(vec![
            TypeDescriptor::class(id("Invoice"))
                .field(FieldDescriptor::new("InvoiceId", int()))
                .field(FieldDescriptor::new("Customer", TypeViewModel::class(id("Customer")))),
        ]);
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let invoice = repo.find_class("Invoice").unwrap();
        assert!(matches!(
            invoice.issues(),
            [DomainError::UnresolvedType { reference, .. }] if reference == "shop::Customer"
        ));
        assert_eq!(
            invoice.property_by_name("Customer").unwrap().role(),
            PropertyRole::Value
        );
    }

    #[test]
    fn injected_parameters_are_classified() {
        let source = source_of(vec![
            TypeDescriptor::class(id("Product"))
                .field(FieldDescriptor::new("ProductId", int()))
                .method(
                    MethodDescriptor::new("Discount", TypeViewModel::primitive(Primitive::F64))
                        .parameter(ParameterDescriptor::new(
                            "User",
                            TypeViewModel::class(TypeIdentity::new("", "CurrentUser")),
                        ))
                        .parameter(ParameterDescriptor::new(
                            "Percent",
                            TypeViewModel::primitive(Primitive::F64),
                        )),
                ),
        ]);
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();

        let product = repo.find_class("Product").unwrap();
        let method = product.method_by_name("Discount").unwrap();
        assert_eq!(method.parameters()[0].injected, Some(InjectedKind::CurrentUser));
        assert_eq!(method.client_parameters().count(), 1);
        assert!(product.issues().is_empty());
    }

    #[test]
    fn unknown_type_is_not_found() {
        let source = source_of(shop());
        let mut repo = ReflectionRepository::new();
        assert!(matches!(
            repo.get_or_add_class(&source, &id("Nope")),
            Err(DomainError::TypeNotFound { .. })
        ));
    }
}
