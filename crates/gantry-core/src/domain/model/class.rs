use serde::Serialize;

use super::method::MethodViewModel;
use super::property::{PropertyRole, PropertyViewModel};
use crate::domain::annotations::Annotations;
use crate::domain::error::DomainError;
use crate::domain::naming::display_name;
use crate::domain::security::ClassSecurityInfo;
use crate::domain::types::{TypeIdentity, TypeViewModel};

/// Index of a class in its repository arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClassId(pub(crate) usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassFlags {
    pub is_db_context: bool,
    pub is_dto: bool,
    pub is_service: bool,
    pub is_internal_use: bool,
}

impl ClassFlags {
    pub fn from_annotations(annotations: &Annotations) -> Self {
        Self {
            is_db_context: annotations.has("db_context"),
            is_dto: annotations.has("dto"),
            is_service: annotations.has("service"),
            is_internal_use: annotations.has("internal_use"),
        }
    }
}

/// Metadata node for a structured type.
///
/// Owned by exactly one repository; properties and methods are never
/// shared between repositories.
#[derive(Debug, Clone)]
pub struct ClassViewModel {
    id: ClassId,
    identity: TypeIdentity,
    display_name: String,
    annotations: Annotations,
    flags: ClassFlags,
    security: ClassSecurityInfo,
    pub(crate) properties: Vec<PropertyViewModel>,
    pub(crate) methods: Vec<MethodViewModel>,
    pub(crate) base_type: Option<TypeIdentity>,
    pub(crate) implements: Vec<TypeViewModel>,
    pub(crate) on_context: bool,
    pub(crate) context_property: Option<String>,
    pub(crate) issues: Vec<DomainError>,
    pub(crate) complete: bool,
}

impl ClassViewModel {
    /// A registered but not yet populated node.
    pub(crate) fn placeholder(id: ClassId, identity: TypeIdentity, annotations: Annotations) -> Self {
        let display = annotations
            .get("display")
            .and_then(|a| a.named_str("name").or_else(|| a.first_text()))
            .map_or_else(|| display_name(identity.name()), str::to_string);

        Self {
            id,
            display_name: display,
            flags: ClassFlags::from_annotations(&annotations),
            security: ClassSecurityInfo::from_annotations(&annotations),
            properties: Vec::new(),
            methods: Vec::new(),
            base_type: None,
            implements: Vec::new(),
            on_context: false,
            context_property: None,
            issues: Vec::new(),
            complete: false,
            identity,
            annotations,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn namespace(&self) -> &str {
        self.identity.namespace()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    pub fn security(&self) -> &ClassSecurityInfo {
        &self.security
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyViewModel] {
        &self.properties
    }

    /// Client-visible properties ordered for display: primary key first,
    /// then by display order.
    pub fn client_properties(&self) -> Vec<&PropertyViewModel> {
        let mut props: Vec<&PropertyViewModel> = self
            .properties
            .iter()
            .filter(|p| p.is_client_property())
            .collect();
        props.sort_by_key(|p| (!p.is_primary_key(), p.display_order()));
        props
    }

    /// Exact, case-sensitive lookup.
    pub fn property_by_name(&self, name: &str) -> Result<&PropertyViewModel, DomainError> {
        self.properties
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| DomainError::PropertyNotFound {
                class: self.name().to_string(),
                property: name.to_string(),
            })
    }

    pub fn methods(&self) -> &[MethodViewModel] {
        &self.methods
    }

    /// Methods somebody is allowed to call.
    pub fn client_methods(&self) -> impl Iterator<Item = &MethodViewModel> {
        self.methods.iter().filter(|m| !m.security().is_denied())
    }

    pub fn method_by_name(&self, name: &str) -> Result<&MethodViewModel, DomainError> {
        self.methods
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| DomainError::MethodNotFound {
                class: self.name().to_string(),
                method: name.to_string(),
            })
    }

    pub fn primary_key(&self) -> Option<&PropertyViewModel> {
        self.properties.iter().find(|p| p.role() == PropertyRole::PrimaryKey)
    }

    pub fn base_type(&self) -> Option<&TypeIdentity> {
        self.base_type.as_ref()
    }

    pub fn implements(&self) -> &[TypeViewModel] {
        &self.implements
    }

    /// A persisted type: has a key and is not a context, DTO or service.
    pub fn is_entity(&self) -> bool {
        let f = self.flags;
        !(f.is_db_context || f.is_dto || f.is_service) && self.primary_key().is_some()
    }

    /// Eligible for generated output.
    pub fn is_generated(&self) -> bool {
        !self.flags.is_internal_use && !self.flags.is_db_context && !self.flags.is_service
    }

    pub fn is_on_context(&self) -> bool {
        self.on_context
    }

    /// Name of the context collection that serves this entity.
    pub fn context_property(&self) -> Option<&str> {
        self.context_property.as_deref()
    }

    /// Analysis problems found while building this class.
    pub fn issues(&self) -> &[DomainError] {
        &self.issues
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// One member of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumViewModel {
    pub identity: TypeIdentity,
    pub values: Vec<EnumValue>,
}

impl EnumViewModel {
    pub fn new(identity: TypeIdentity, variants: &[(String, i64)]) -> Self {
        Self {
            values: variants
                .iter()
                .map(|(name, value)| EnumValue {
                    display_name: display_name(name),
                    name: name.clone(),
                    value: *value,
                })
                .collect(),
            identity,
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }
}
