use serde::Serialize;

use crate::domain::annotations::Annotations;
use crate::domain::naming::{camel_case, display_name};
use crate::domain::security::PropertySecurityInfo;
use crate::domain::types::TypeViewModel;

/// Mutually exclusive role of a property within its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyRole {
    Value,
    PrimaryKey,
    ForeignKey,
    ReferenceNavigation,
    CollectionNavigation,
}

impl PropertyRole {
    pub fn is_navigation(self) -> bool {
        matches!(self, Self::ReferenceNavigation | Self::CollectionNavigation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyViewModel {
    name: String,
    source_name: String,
    ty: TypeViewModel,
    role: PropertyRole,
    security: PropertySecurityInfo,
    annotations: Annotations,
    display_name: String,
    display_order: i64,
    dont_serialize: bool,
    internal_use: bool,
    /// For a foreign key: the sibling reference-navigation it backs.
    navigation: Option<String>,
    /// For a reference navigation: the sibling foreign key.
    foreign_key: Option<String>,
}

impl PropertyViewModel {
    pub(crate) fn new(
        name: String,
        source_name: String,
        ty: TypeViewModel,
        annotations: Annotations,
        declaration_index: usize,
    ) -> Self {
        let display = annotations
            .get("display")
            .and_then(|a| a.named_str("name").or_else(|| a.first_text()))
            .map_or_else(|| display_name(&name), str::to_string);
        let display_order = annotations
            .get("display_order")
            .and_then(|a| a.first_int())
            .unwrap_or((declaration_index as i64 + 1) * 10);

        Self {
            security: PropertySecurityInfo::from_annotations(&annotations),
            dont_serialize: annotations.has("dont_serialize"),
            internal_use: annotations.has("internal_use"),
            display_name: display,
            display_order,
            role: PropertyRole::Value,
            navigation: None,
            foreign_key: None,
            name,
            source_name,
            ty,
            annotations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// camelCase name used on the wire and in client code.
    pub fn json_name(&self) -> String {
        camel_case(&self.name)
    }

    pub fn ty(&self) -> &TypeViewModel {
        &self.ty
    }

    pub fn role(&self) -> PropertyRole {
        self.role
    }

    pub fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }

    pub fn security(&self) -> &PropertySecurityInfo {
        &self.security
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn display_order(&self) -> i64 {
        self.display_order
    }

    pub fn dont_serialize(&self) -> bool {
        self.dont_serialize
    }

    pub fn is_internal_use(&self) -> bool {
        self.internal_use
    }

    /// Exposed to generated clients at all.
    pub fn is_client_property(&self) -> bool {
        !self.internal_use && !self.dont_serialize
    }

    pub fn is_read_only(&self) -> bool {
        self.security.is_read_only() || self.role == PropertyRole::CollectionNavigation
    }

    pub fn is_primary_key(&self) -> bool {
        self.role == PropertyRole::PrimaryKey
    }

    pub fn navigation(&self) -> Option<&str> {
        self.navigation.as_deref()
    }

    pub fn foreign_key(&self) -> Option<&str> {
        self.foreign_key.as_deref()
    }

    pub(crate) fn set_role(&mut self, role: PropertyRole) {
        self.role = role;
    }

    pub(crate) fn clear_links(&mut self) {
        self.navigation = None;
        self.foreign_key = None;
    }

    pub(crate) fn link_navigation(&mut self, navigation: Option<String>) {
        self.navigation = navigation;
    }

    pub(crate) fn link_foreign_key(&mut self, foreign_key: String) {
        self.foreign_key = Some(foreign_key);
    }
}
