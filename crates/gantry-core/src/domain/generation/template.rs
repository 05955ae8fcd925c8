use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Logical template path such as `vue/models.g.ts.j2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TemplateDescriptor(String);

impl TemplateDescriptor {
    pub fn new(logical_path: impl Into<String>) -> Self {
        Self(logical_path.into())
    }

    pub fn logical_path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateDescriptor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Where a resolved template's contents live. Nothing is read at
/// resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum TemplateOrigin {
    Embedded,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    pub descriptor: TemplateDescriptor,
    pub origin: TemplateOrigin,
}

impl ResolvedTemplate {
    pub fn is_override(&self) -> bool {
        matches!(self.origin, TemplateOrigin::File(_))
    }
}

impl fmt::Display for TemplateOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
