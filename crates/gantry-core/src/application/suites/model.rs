//! Typed template models, one shape per kind of generated artifact.
//!
//! Templates only ever see these structs (serialized to JSON values), so a
//! field rename here is a template-breaking change.

use serde::Serialize;

use crate::application::services::Analysis;
use crate::domain::{
    AuthorizationMarker, ClassViewModel, EnumValue, EnumViewModel, MethodViewModel, Operation,
    PropertyRole, PropertyViewModel, SecurityPermission, TypeKind, TypeViewModel,
    naming::{camel_case, sanitize_identifier, snake_case},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionModel {
    /// `deny_all`, `allow_anonymous`, `authenticated` or `roles`.
    pub level: &'static str,
    pub roles: Vec<String>,
}

impl From<&SecurityPermission> for PermissionModel {
    fn from(permission: &SecurityPermission) -> Self {
        let level = match permission {
            SecurityPermission::DenyAll => "deny_all",
            SecurityPermission::AllowAnonymous => "allow_anonymous",
            SecurityPermission::AuthenticatedOnly => "authenticated",
            SecurityPermission::RoleRestricted(_) => "roles",
        };
        Self {
            level,
            roles: permission.role_union().into_iter().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyModel {
    pub name: String,
    pub ident: String,
    pub source_name: String,
    pub json_name: String,
    pub display_name: String,
    pub display_order: i64,
    pub role: PropertyRole,
    pub type_name: String,
    pub rust_type: String,
    pub dto_type: String,
    pub ts_type: String,
    pub nullable: bool,
    pub is_collection: bool,
    pub is_primary_key: bool,
    pub is_read_only: bool,
    /// Class or enum name for non-primitive types.
    pub related_type: Option<String>,
    pub navigation: Option<String>,
    pub foreign_key: Option<String>,
    pub read: PermissionModel,
    pub write: PermissionModel,
    pub restrictions: Vec<String>,
}

impl PropertyModel {
    pub fn new(property: &PropertyViewModel) -> Self {
        let ty = property.ty();
        let security = property.security();
        Self {
            name: property.name().to_string(),
            ident: sanitize_identifier(&snake_case(property.name())),
            source_name: property.source_name().to_string(),
            json_name: property.json_name(),
            display_name: property.display_name().to_string(),
            display_order: property.display_order(),
            role: property.role(),
            type_name: ty.name(),
            rust_type: ty.rust_type(),
            dto_type: dto_type(ty),
            ts_type: ty.ts_type(),
            nullable: ty.is_nullable(),
            is_collection: ty.is_collection(),
            is_primary_key: property.is_primary_key(),
            is_read_only: property.is_read_only(),
            related_type: match ty.pure_type().kind() {
                TypeKind::Class(id) | TypeKind::Enum(id) => Some(id.name().to_string()),
                _ => None,
            },
            navigation: property.navigation().map(str::to_string),
            foreign_key: property.foreign_key().map(str::to_string),
            read: (&security.read).into(),
            write: (&security.write).into(),
            restrictions: security.restrictions.clone(),
        }
    }
}

/// Rust type of a property on a generated DTO, before the `Option` every
/// DTO field is wrapped in. Classes become their DTOs.
fn dto_type(ty: &TypeViewModel) -> String {
    match ty.kind() {
        TypeKind::Class(id) => format!("Box<{}Dto>", id.name()),
        TypeKind::Collection(element) => match element.kind() {
            TypeKind::Class(id) => format!("Vec<{}Dto>", id.name()),
            _ => ty.underlying().rust_type(),
        },
        _ => ty.underlying().rust_type(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterModel {
    pub name: String,
    pub json_name: String,
    pub rust_type: String,
    pub ts_type: String,
    pub has_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodModel {
    pub name: String,
    pub ident: String,
    pub json_name: String,
    pub display_name: String,
    pub is_static: bool,
    pub rust_return: String,
    pub ts_return: String,
    pub parameters: Vec<ParameterModel>,
    pub marker: String,
}

impl MethodModel {
    /// `None` for methods nobody may call.
    pub fn new(method: &MethodViewModel) -> Option<Self> {
        let marker = AuthorizationMarker::try_emit(method.security(), method.name()).ok()?;
        Some(Self {
            name: method.name().to_string(),
            ident: sanitize_identifier(&snake_case(method.name())),
            json_name: method.json_name(),
            display_name: method.display_name(),
            is_static: method.is_static(),
            rust_return: method.return_type().rust_type(),
            ts_return: method.return_type().ts_type(),
            parameters: method
                .client_parameters()
                .map(|p| ParameterModel {
                    name: p.name.clone(),
                    json_name: p.json_name(),
                    rust_type: p.ty.rust_type(),
                    ts_type: p.ty.ts_type(),
                    has_default: p.has_default,
                })
                .collect(),
            marker: marker.attribute(),
        })
    }
}

/// One generated HTTP route and its authorization marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteModel {
    pub name: &'static str,
    pub verb: &'static str,
    pub path: String,
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceModel {
    pub name: String,
    pub is_default: bool,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    pub name: String,
    pub snake_name: String,
    pub camel_name: String,
    pub display_name: String,
    pub namespace: String,
    pub is_entity: bool,
    pub is_dto: bool,
    pub context_property: Option<String>,
    pub base_type: Option<String>,
    pub primary_key: Option<PropertyModel>,
    pub properties: Vec<PropertyModel>,
    pub methods: Vec<MethodModel>,
    pub routes: Vec<RouteModel>,
    pub data_sources: Vec<DataSourceModel>,
    pub behaviors: Option<String>,
    pub read: PermissionModel,
    pub write: PermissionModel,
    pub create: PermissionModel,
    pub delete: PermissionModel,
}

impl ClassModel {
    pub fn new(analysis: &Analysis, class: &ClassViewModel) -> Self {
        let repo = &analysis.repository;
        let security = class.security();
        let snake_name = snake_case(class.name());

        Self {
            name: class.name().to_string(),
            camel_name: camel_case(class.name()),
            display_name: class.display_name().to_string(),
            namespace: class.namespace().to_string(),
            is_entity: class.is_entity(),
            is_dto: class.flags().is_dto,
            context_property: class.context_property().map(str::to_string),
            base_type: class.base_type().map(|b| b.name().to_string()),
            primary_key: class.primary_key().map(PropertyModel::new),
            properties: class
                .client_properties()
                .into_iter()
                .map(PropertyModel::new)
                .collect(),
            methods: class.client_methods().filter_map(MethodModel::new).collect(),
            routes: routes(class, &snake_name),
            data_sources: analysis
                .strategies
                .data_sources_for(class.id())
                .map(|d| DataSourceModel {
                    name: repo.class(d.usage.strategy).name().to_string(),
                    is_default: d.is_default,
                    parameters: d.parameters.clone(),
                })
                .collect(),
            behaviors: analysis
                .strategies
                .behaviors_for(class.id())
                .map(|b| repo.class(b.strategy).name().to_string()),
            read: security.permission(Operation::Read).into(),
            write: security.permission(Operation::Write).into(),
            create: security.permission(Operation::Create).into(),
            delete: security.permission(Operation::Delete).into(),
            snake_name,
        }
    }
}

/// The five CRUD routes, minus any whose permission denies everyone.
fn routes(class: &ClassViewModel, snake_name: &str) -> Vec<RouteModel> {
    let security = class.security();
    let save = if security.write.is_denied() {
        &security.create
    } else {
        &security.write
    };
    let base = format!("/api/{snake_name}");

    [
        ("get", "GET", format!("{base}/get/{{id}}"), &security.read),
        ("list", "GET", format!("{base}/list"), &security.read),
        ("count", "GET", format!("{base}/count"), &security.read),
        ("save", "POST", format!("{base}/save"), save),
        ("delete", "POST", format!("{base}/delete/{{id}}"), &security.delete),
    ]
    .into_iter()
    .filter_map(|(name, verb, path, permission)| {
        let marker = AuthorizationMarker::try_emit(permission, &format!("{}.{name}", class.name())).ok()?;
        Some(RouteModel {
            name,
            verb,
            path,
            marker: marker.attribute(),
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumModel {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl From<&EnumViewModel> for EnumModel {
    fn from(e: &EnumViewModel) -> Self {
        Self {
            name: e.name().to_string(),
            values: e.values.clone(),
        }
    }
}

/// Model for suite-wide files (all classes in one output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteModel {
    pub root_namespace: String,
    pub area: Option<String>,
    pub version: &'static str,
    pub classes: Vec<ClassModel>,
    pub enums: Vec<EnumModel>,
}
