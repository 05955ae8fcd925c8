//! Referenced types: primitives, enums, classes, collections and generics.

use std::fmt;

use serde::Serialize;

use super::error::DomainError;

// ============================================================================
// TypeIdentity
// ============================================================================

/// Repository key of a type: namespace + name + generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeIdentity {
    namespace: String,
    name: String,
    arguments: Vec<TypeIdentity>,
}

impl TypeIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<TypeIdentity>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Parse `a::b::Name` (no generic arguments).
    pub fn parse(path: &str) -> Result<Self, DomainError> {
        let segments: Vec<&str> = path.trim().split("::").collect();
        if segments.iter().any(|s| s.trim().is_empty() || s.contains(char::is_whitespace)) {
            return Err(DomainError::InvalidIdentity(path.to_string()));
        }
        let (name, namespace) = segments
            .split_last()
            .ok_or_else(|| DomainError::InvalidIdentity(path.to_string()))?;
        Ok(Self::new(namespace.join("::"), *name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[TypeIdentity] {
        &self.arguments
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}::", self.namespace)?;
        }
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

// ============================================================================
// Primitive
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
    Char,
    String,
    DateTime,
    Date,
    Uuid,
    Unit,
}

impl Primitive {
    /// Map a source-level scalar name (`i32`, `String`, `DateTime`, ...) to a primitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let p = match name {
            "bool" => Self::Bool,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" | "isize" => Self::I32,
            "i64" | "i128" => Self::I64,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" | "usize" => Self::U32,
            "u64" | "u128" => Self::U64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "Decimal" => Self::Decimal,
            "char" => Self::Char,
            "String" | "str" => Self::String,
            "DateTime" | "NaiveDateTime" | "SystemTime" => Self::DateTime,
            "NaiveDate" | "Date" => Self::Date,
            "Uuid" => Self::Uuid,
            _ => return None,
        };
        Some(p)
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::F32
                | Self::F64
                | Self::Decimal
        )
    }

    pub fn rust_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "Decimal",
            Self::Char => "char",
            Self::String => "String",
            Self::DateTime => "DateTime<Utc>",
            Self::Date => "NaiveDate",
            Self::Uuid => "Uuid",
            Self::Unit => "()",
        }
    }

    pub fn ts_name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Char | Self::String | Self::Uuid => "string",
            Self::DateTime | Self::Date => "Date",
            Self::Unit => "void",
            _ => "number",
        }
    }
}

// ============================================================================
// TypeViewModel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeKind {
    Primitive(Primitive),
    Enum(TypeIdentity),
    Class(TypeIdentity),
    /// Always exactly one element type.
    Collection(Box<TypeViewModel>),
    Generic {
        identity: TypeIdentity,
        arguments: Vec<TypeViewModel>,
    },
}

/// Any referenced type.
///
/// Nullability is a flag on the outer type, so the underlying type of a
/// nullable type is never itself nullable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeViewModel {
    kind: TypeKind,
    nullable: bool,
}

impl TypeViewModel {
    pub fn primitive(primitive: Primitive) -> Self {
        Self::from_kind(TypeKind::Primitive(primitive))
    }

    pub fn enumeration(identity: TypeIdentity) -> Self {
        Self::from_kind(TypeKind::Enum(identity))
    }

    pub fn class(identity: TypeIdentity) -> Self {
        Self::from_kind(TypeKind::Class(identity))
    }

    pub fn collection(element: TypeViewModel) -> Self {
        Self::from_kind(TypeKind::Collection(Box::new(element)))
    }

    pub fn generic(identity: TypeIdentity, arguments: Vec<TypeViewModel>) -> Self {
        Self::from_kind(TypeKind::Generic {
            identity,
            arguments,
        })
    }

    fn from_kind(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// Wrap in nullability. Wrapping an already nullable type is a no-op.
    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The underlying (never nullable) type.
    pub fn underlying(&self) -> TypeViewModel {
        Self {
            kind: self.kind.clone(),
            nullable: false,
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum(_))
    }

    pub fn element_type(&self) -> Option<&TypeViewModel> {
        match &self.kind {
            TypeKind::Collection(element) => Some(element),
            _ => None,
        }
    }

    /// Strip nullability and collections down to the innermost type.
    pub fn pure_type(&self) -> TypeViewModel {
        match &self.kind {
            TypeKind::Collection(element) => element.pure_type(),
            _ => self.underlying(),
        }
    }

    /// Identity of the class this type is, or holds a collection of.
    pub fn class_identity(&self) -> Option<&TypeIdentity> {
        match &self.kind {
            TypeKind::Class(identity) => Some(identity),
            TypeKind::Collection(element) => element.class_identity(),
            _ => None,
        }
    }

    /// Display name of the unwrapped type (`Product`, `i32`, `Product[]`).
    pub fn name(&self) -> String {
        match &self.kind {
            TypeKind::Primitive(p) => p.rust_name().to_string(),
            TypeKind::Enum(id) | TypeKind::Class(id) => id.name().to_string(),
            TypeKind::Collection(element) => format!("{}[]", element.name()),
            TypeKind::Generic {
                identity,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(TypeViewModel::name).collect();
                format!("{}<{}>", identity.name(), args.join(", "))
            }
        }
    }

    /// Type as written in generated Rust source.
    pub fn rust_type(&self) -> String {
        let inner = match &self.kind {
            TypeKind::Primitive(p) => p.rust_name().to_string(),
            TypeKind::Enum(id) | TypeKind::Class(id) => id.name().to_string(),
            TypeKind::Collection(element) => format!("Vec<{}>", element.rust_type()),
            TypeKind::Generic {
                identity,
                arguments,
            } => {
                let args: Vec<String> = arguments.iter().map(TypeViewModel::rust_type).collect();
                format!("{}<{}>", identity.name(), args.join(", "))
            }
        };
        if self.nullable {
            format!("Option<{inner}>")
        } else {
            inner
        }
    }

    /// Type as written in generated TypeScript.
    pub fn ts_type(&self) -> String {
        let inner = match &self.kind {
            TypeKind::Primitive(p) => p.ts_name().to_string(),
            TypeKind::Enum(id) | TypeKind::Class(id) => id.name().to_string(),
            TypeKind::Collection(element) => {
                let element = element.ts_type();
                if element.contains(' ') {
                    format!("({element})[]")
                } else {
                    format!("{element}[]")
                }
            }
            TypeKind::Generic { .. } => "unknown".to_string(),
        };
        if self.nullable {
            format!("{inner} | null")
        } else {
            inner
        }
    }
}

impl fmt::Display for TypeViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rust_type())
    }
}
