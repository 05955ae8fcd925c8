//! Raw type facts produced by a type source.
//!
//! A descriptor is what a backend knows about one declared type before the
//! repository infers roles, security and relationships. Property and method
//! names are already in their canonical PascalCase form.

use super::annotations::{Annotation, Annotations};
use super::types::{TypeIdentity, TypeViewModel};

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub identity: TypeIdentity,
    pub annotations: Annotations,
    pub shape: TypeShape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Class {
        fields: Vec<FieldDescriptor>,
        methods: Vec<MethodDescriptor>,
        base: Option<TypeIdentity>,
        /// Generic contracts the type implements, e.g. `DataSource<Product>`.
        implements: Vec<TypeViewModel>,
    },
    Enum {
        variants: Vec<(String, i64)>,
    },
}

impl TypeDescriptor {
    pub fn class(identity: TypeIdentity) -> Self {
        Self {
            identity,
            annotations: Annotations::new(),
            shape: TypeShape::Class {
                fields: Vec::new(),
                methods: Vec::new(),
                base: None,
                implements: Vec::new(),
            },
        }
    }

    pub fn enumeration(identity: TypeIdentity, variants: Vec<(String, i64)>) -> Self {
        Self {
            identity,
            annotations: Annotations::new(),
            shape: TypeShape::Enum { variants },
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        if let TypeShape::Class { fields, .. } = &mut self.shape {
            fields.push(field);
        }
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        if let TypeShape::Class { methods, .. } = &mut self.shape {
            methods.push(method);
        }
        self
    }

    pub fn base(mut self, identity: TypeIdentity) -> Self {
        if let TypeShape::Class { base, .. } = &mut self.shape {
            *base = Some(identity);
        }
        self
    }

    pub fn implements(mut self, contract: TypeViewModel) -> Self {
        if let TypeShape::Class { implements, .. } = &mut self.shape {
            implements.push(contract);
        }
        self
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.shape, TypeShape::Enum { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Identifier as declared, e.g. `product_id` for `ProductId`.
    pub source_name: String,
    pub ty: TypeViewModel,
    pub annotations: Annotations,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeViewModel) -> Self {
        let name = name.into();
        Self {
            source_name: name.clone(),
            name,
            ty,
            annotations: Annotations::new(),
        }
    }

    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    pub name: String,
    pub source_name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: TypeViewModel,
    pub is_static: bool,
    pub annotations: Annotations,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, return_type: TypeViewModel) -> Self {
        let name = name.into();
        Self {
            source_name: name.clone(),
            name,
            parameters: Vec::new(),
            return_type,
            is_static: false,
            annotations: Annotations::new(),
        }
    }

    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: TypeViewModel,
    pub has_default: bool,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeViewModel) -> Self {
        Self {
            name: name.into(),
            ty,
            has_default: false,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}
