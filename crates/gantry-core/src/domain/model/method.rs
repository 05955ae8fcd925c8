use serde::Serialize;

use crate::domain::naming::{camel_case, display_name};
use crate::domain::security::SecurityPermission;
use crate::domain::types::TypeViewModel;

/// Parameters supplied by the server rather than the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectedKind {
    CurrentUser,
    CancellationToken,
    Service,
}

impl InjectedKind {
    /// Classify a parameter type by name. Services are classified by the
    /// repository since they need class flags.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "CurrentUser" | "Principal" => Some(Self::CurrentUser),
            "CancellationToken" => Some(Self::CancellationToken),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterViewModel {
    pub name: String,
    pub ty: TypeViewModel,
    pub has_default: bool,
    pub injected: Option<InjectedKind>,
}

impl ParameterViewModel {
    pub fn json_name(&self) -> String {
        camel_case(&self.name)
    }

    pub fn is_client_parameter(&self) -> bool {
        self.injected.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodViewModel {
    name: String,
    source_name: String,
    parameters: Vec<ParameterViewModel>,
    return_type: TypeViewModel,
    is_static: bool,
    security: SecurityPermission,
}

impl MethodViewModel {
    pub(crate) fn new(
        name: String,
        source_name: String,
        parameters: Vec<ParameterViewModel>,
        return_type: TypeViewModel,
        is_static: bool,
        security: SecurityPermission,
    ) -> Self {
        Self {
            name,
            source_name,
            parameters,
            return_type,
            is_static,
            security,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn json_name(&self) -> String {
        camel_case(&self.name)
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }

    pub fn parameters(&self) -> &[ParameterViewModel] {
        &self.parameters
    }

    /// Parameters the client must supply, in declaration order.
    pub fn client_parameters(&self) -> impl Iterator<Item = &ParameterViewModel> {
        self.parameters.iter().filter(|p| p.is_client_parameter())
    }

    pub fn return_type(&self) -> &TypeViewModel {
        &self.return_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn security(&self) -> &SecurityPermission {
        &self.security
    }
}
