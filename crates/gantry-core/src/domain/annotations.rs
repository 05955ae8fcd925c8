//! Backend-neutral annotation facts.
//!
//! Both type sources translate whatever they read (attributes in parsed
//! source, or descriptors declared at runtime) into [`Annotation`] values.
//! Everything downstream, security parsing included, reads only this form.

use serde::Serialize;

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// A bare path such as `allow_anonymous` or `Product`.
    Path(String),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Path(s) => Some(s),
            _ => None,
        }
    }
}

/// One positional or named annotation argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationArg {
    pub key: Option<String>,
    pub value: AnnotationValue,
}

/// A named annotation with ordered arguments, e.g. `#[read("Admin", "Manager")]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub name: String,
    pub args: Vec<AnnotationArg>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Add a positional bare-path argument (`allow_anonymous`).
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.args.push(AnnotationArg {
            key: None,
            value: AnnotationValue::Path(flag.into()),
        });
        self
    }

    /// Add a positional string argument (`"Admin,Manager"`).
    pub fn string(mut self, value: impl Into<String>) -> Self {
        self.args.push(AnnotationArg {
            key: None,
            value: AnnotationValue::Str(value.into()),
        });
        self
    }

    /// Add a positional integer argument.
    pub fn int(mut self, value: i64) -> Self {
        self.args.push(AnnotationArg {
            key: None,
            value: AnnotationValue::Int(value),
        });
        self
    }

    /// Add a `key = value` argument.
    pub fn named(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.args.push(AnnotationArg {
            key: Some(key.into()),
            value,
        });
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args
            .iter()
            .any(|a| a.key.is_none() && a.value == AnnotationValue::Path(flag.to_string()))
    }

    /// Positional string arguments in declaration order.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(|a| match (&a.key, &a.value) {
            (None, AnnotationValue::Str(s)) => Some(s.as_str()),
            _ => None,
        })
    }

    /// All values of a named argument in declaration order.
    ///
    /// The iterator borrows only `self`, so results outlive `key`.
    pub fn named_values<'a>(
        &'a self,
        key: &str,
    ) -> impl Iterator<Item = &'a AnnotationValue> + use<'a> {
        let key = key.to_string();
        self.args
            .iter()
            .filter(move |a| a.key.as_deref() == Some(key.as_str()))
            .map(|a| &a.value)
    }

    pub fn named_str(&self, key: &str) -> Option<&str> {
        self.named_values(key).find_map(AnnotationValue::as_str)
    }

    /// First positional argument rendered as text (string or path).
    pub fn first_text(&self) -> Option<&str> {
        self.args
            .iter()
            .filter(|a| a.key.is_none())
            .find_map(|a| a.value.as_str())
    }

    pub fn first_int(&self) -> Option<i64> {
        self.args.iter().find_map(|a| match a.value {
            AnnotationValue::Int(i) => Some(i),
            _ => None,
        })
    }
}

/// Ordered annotations attached to a type, field, method or parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    pub fn with(mut self, annotation: Annotation) -> Self {
        self.0.push(annotation);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.0.iter().filter(move |a| a.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_queries() {
        let anno = Annotation::new("read")
            .string("Admin,Manager")
            .string("SuperUser")
            .flag("allow_anonymous")
            .named("roles", AnnotationValue::Str("Auditor".into()));

        assert_eq!(anno.strings().collect::<Vec<_>>(), ["Admin,Manager", "SuperUser"]);
        assert!(anno.has_flag("allow_anonymous"));
        assert!(!anno.has_flag("deny_all"));
        assert_eq!(anno.named_str("roles"), Some("Auditor"));
        assert_eq!(anno.first_text(), Some("Admin,Manager"));
    }

    #[test]
    fn annotations_lookup_by_name() {
        let annos = Annotations::new()
            .with(Annotation::new("key"))
            .with(Annotation::new("read").string("A"))
            .with(Annotation::new("read").string("B"));

        assert!(annos.has("key"));
        assert_eq!(annos.all("read").count(), 2);
        assert!(annos.get("edit").is_none());
    }

    #[test]
    fn named_lookup_outlives_a_temporary_key() {
        let anno = Annotation::new("read").named("roles", AnnotationValue::Str("Auditor".into()));

        let found = {
            let key = String::from("roles");
            anno.named_str(&key)
        };

        assert_eq!(found, Some("Auditor"));
    }
}
