//! Normalized permission model for classes, properties and methods.
//!
//! Raw `read`/`edit`/`create`/`delete`/`init`/`execute` annotations are
//! folded into one [`SecurityPermission`] per (member, operation). The same
//! value drives authorization-marker emission in generated server code and
//! runtime checks in the DTO mapping layer.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::annotations::{Annotation, Annotations};
use super::error::DomainError;

/// CRUD operation a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Create,
    Delete,
}

impl Operation {
    /// Annotation name that configures this operation on a class.
    pub fn annotation(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "edit",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Create => "create",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Principal
// ============================================================================

/// An authenticated user: a name and the roles they hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

// ============================================================================
// SecurityPermission
// ============================================================================

/// One alternative set of acceptable roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleList(Vec<String>);

impl RoleList {
    /// Parse a comma-separated role string. Blank entries are dropped.
    pub fn parse(roles: &str) -> Self {
        Self(
            roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn roles(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "roles", rename_all = "snake_case")]
pub enum SecurityPermission {
    DenyAll,
    AllowAnonymous,
    /// Alternative role lists: holding any role of any list grants access.
    RoleRestricted(Vec<RoleList>),
    AuthenticatedOnly,
}

impl SecurityPermission {
    /// Fold every annotation named `name` into a permission.
    ///
    /// Returns `None` when no such annotation is present so callers can
    /// apply their own default.
    pub fn from_annotations(annotations: &Annotations, name: &str) -> Option<Self> {
        let matching: Vec<&Annotation> = annotations.all(name).collect();
        if matching.is_empty() {
            return None;
        }

        if matching.iter().any(|a| a.has_flag("deny_all")) {
            return Some(Self::DenyAll);
        }
        if matching.iter().any(|a| a.has_flag("allow_anonymous")) {
            return Some(Self::AllowAnonymous);
        }

        let lists: Vec<RoleList> = matching
            .iter()
            .flat_map(|a| {
                a.strings()
                    .chain(a.named_values("roles").filter_map(|v| v.as_str()))
                    .map(RoleList::parse)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .collect();

        if lists.is_empty() {
            Some(Self::AuthenticatedOnly)
        } else {
            Some(Self::RoleRestricted(lists))
        }
    }

    pub fn roles(roles: &str) -> Self {
        Self::RoleRestricted(vec![RoleList::parse(roles)])
    }

    /// Evaluate against a principal; `None` is an anonymous caller.
    pub fn is_allowed(&self, principal: Option<&Principal>) -> bool {
        match self {
            Self::DenyAll => false,
            Self::AllowAnonymous => true,
            Self::AuthenticatedOnly => principal.is_some(),
            Self::RoleRestricted(lists) => principal.is_some_and(|p| {
                lists
                    .iter()
                    .flat_map(RoleList::roles)
                    .any(|role| p.is_in_role(role))
            }),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::DenyAll)
    }

    /// Every role across every list, declaration order, duplicates removed.
    pub fn role_union(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        match self {
            Self::RoleRestricted(lists) => lists
                .iter()
                .flat_map(RoleList::roles)
                .map(String::as_str)
                .filter(|r| seen.insert(*r))
                .collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// AuthorizationMarker
// ============================================================================

/// Authorization annotation placed on a generated route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthorizationMarker {
    AllowAnonymous,
    /// `roles` is the comma-joined role union, `None` for any authenticated user.
    Authorize { roles: Option<String> },
}

impl AuthorizationMarker {
    /// Emit the marker for a permission.
    ///
    /// # Panics
    ///
    /// Panics on [`SecurityPermission::DenyAll`]. Routes that nobody may call
    /// must be left out by the caller; use [`Self::try_emit`] where the
    /// permission is not known to be emittable.
    pub fn emit(permission: &SecurityPermission, member: &str) -> Self {
        match Self::try_emit(permission, member) {
            Ok(marker) => marker,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_emit(permission: &SecurityPermission, member: &str) -> Result<Self, DomainError> {
        match permission {
            SecurityPermission::DenyAll => Err(DomainError::DenyAllEmission {
                member: member.to_string(),
            }),
            SecurityPermission::AllowAnonymous => Ok(Self::AllowAnonymous),
            SecurityPermission::AuthenticatedOnly => Ok(Self::Authorize { roles: None }),
            SecurityPermission::RoleRestricted(_) => Ok(Self::Authorize {
                roles: Some(permission.role_union().join(",")),
            }),
        }
    }

    /// The marker as a Rust attribute.
    pub fn attribute(&self) -> String {
        match self {
            Self::AllowAnonymous => "#[allow_anonymous]".to_string(),
            Self::Authorize { roles: None } => "#[authorize]".to_string(),
            Self::Authorize { roles: Some(roles) } => format!("#[authorize(roles = {roles:?})]"),
        }
    }
}

// ============================================================================
// Class / property / method security
// ============================================================================

/// Class-level permissions. Unannotated operations require authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSecurityInfo {
    pub read: SecurityPermission,
    pub write: SecurityPermission,
    pub create: SecurityPermission,
    pub delete: SecurityPermission,
}

impl ClassSecurityInfo {
    pub fn from_annotations(annotations: &Annotations) -> Self {
        let get = |op: Operation| {
            SecurityPermission::from_annotations(annotations, op.annotation())
                .unwrap_or(SecurityPermission::AuthenticatedOnly)
        };
        Self {
            read: get(Operation::Read),
            write: get(Operation::Write),
            create: get(Operation::Create),
            delete: get(Operation::Delete),
        }
    }

    pub fn permission(&self, operation: Operation) -> &SecurityPermission {
        match operation {
            Operation::Read => &self.read,
            Operation::Write => &self.write,
            Operation::Create => &self.create,
            Operation::Delete => &self.delete,
        }
    }
}

impl Default for ClassSecurityInfo {
    fn default() -> Self {
        Self::from_annotations(&Annotations::new())
    }
}

/// Property-level permissions.
///
/// Unannotated operations carry no property-level restriction. A property
/// with a `read` annotation but no `edit` annotation is read-only. Writing
/// always requires read access as well, see [`Self::can_write`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySecurityInfo {
    pub read: SecurityPermission,
    pub write: SecurityPermission,
    pub create: SecurityPermission,
    /// Names of per-instance restrictions evaluated by the mapping layer.
    pub restrictions: Vec<String>,
}

impl PropertySecurityInfo {
    pub fn from_annotations(annotations: &Annotations) -> Self {
        let read = SecurityPermission::from_annotations(annotations, "read");
        let edit = SecurityPermission::from_annotations(annotations, "edit");
        let internal = annotations.has("internal_use");

        let write = match (&read, edit) {
            _ if internal => SecurityPermission::DenyAll,
            (Some(_), None) => SecurityPermission::DenyAll,
            (_, Some(edit)) => edit,
            (None, None) => SecurityPermission::AllowAnonymous,
        };
        let create = if write.is_denied() {
            SecurityPermission::DenyAll
        } else {
            SecurityPermission::from_annotations(annotations, "init").unwrap_or_else(|| write.clone())
        };
        let read = if internal {
            SecurityPermission::DenyAll
        } else {
            read.unwrap_or(SecurityPermission::AllowAnonymous)
        };

        let restrictions = annotations
            .all("restrict")
            .filter_map(|a| a.first_text().map(str::to_string))
            .collect();

        Self {
            read,
            write,
            create,
            restrictions,
        }
    }

    pub fn can_read(&self, principal: Option<&Principal>) -> bool {
        self.read.is_allowed(principal)
    }

    pub fn can_write(&self, principal: Option<&Principal>) -> bool {
        self.read.is_allowed(principal) && self.write.is_allowed(principal)
    }

    pub fn can_create(&self, principal: Option<&Principal>) -> bool {
        self.read.is_allowed(principal) && self.create.is_allowed(principal)
    }

    pub fn is_read_only(&self) -> bool {
        self.write.is_denied()
    }
}

impl Default for PropertySecurityInfo {
    fn default() -> Self {
        Self::from_annotations(&Annotations::new())
    }
}

/// Execute permission of a client-callable method.
pub fn method_permission(annotations: &Annotations) -> SecurityPermission {
    SecurityPermission::from_annotations(annotations, "execute")
        .unwrap_or(SecurityPermission::AuthenticatedOnly)
}
