use std::collections::BTreeMap;

use crate::domain::{
    error::DomainError,
    model::{ClassId, ClassViewModel},
    repository::ReflectionRepository,
};

/// Outcome of a model validation pass.
///
/// Errors are keyed by class so the pipeline can fail exactly the
/// generators bound to that class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelValidation {
    pub errors: BTreeMap<ClassId, Vec<DomainError>>,
    pub warnings: Vec<String>,
}

impl ModelValidation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn errors_for(&self, class: ClassId) -> &[DomainError] {
        self.errors.get(&class).map_or(&[], Vec::as_slice)
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

/// Centralized model validation.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_model(repo: &ReflectionRepository) -> ModelValidation {
        let mut result = ModelValidation::default();

        for class in repo.classes().filter(|c| c.is_generated()) {
            let errors = Self::validate_class(repo, class);
            if !errors.is_empty() {
                result.errors.insert(class.id(), errors);
            }
            if class.flags().is_dto && class.properties().is_empty() {
                result
                    .warnings
                    .push(format!("DTO '{}' declares no properties", class.name()));
            }
        }

        result
    }

    fn validate_class(repo: &ReflectionRepository, class: &ClassViewModel) -> Vec<DomainError> {
        let invalid = |reason: String| DomainError::InvalidModel {
            class: class.name().to_string(),
            reason,
        };
        let mut errors = Vec::new();

        if class.is_on_context() && class.primary_key().is_none() {
            errors.push(invalid("entity has no primary key".into()));
        }

        for property in class.properties() {
            let Some(target) = property
                .annotations()
                .get("foreign_key")
                .and_then(|a| a.first_text())
            else {
                continue;
            };
            let sibling = class.properties().iter().any(|p| p.name() == target);
            if !sibling && repo.find_class(target).is_none() {
                errors.push(invalid(format!(
                    "foreign key '{}' references unknown navigation '{target}'",
                    property.name()
                )));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotations::Annotation;
    use crate::domain::descriptor::{FieldDescriptor, TypeDescriptor};
    use crate::domain::source::{Backend, MockTypeSource};
    use crate::domain::types::{Primitive, TypeIdentity, TypeViewModel};
    use crate::domain::usage::TypeUsageAnalyzer;

    fn repo_of(descriptors: Vec<TypeDescriptor>) -> ReflectionRepository {
        let mut source = MockTypeSource::new();
        let ids: Vec<TypeIdentity> = descriptors.iter().map(|d| d.identity.clone()).collect();
        source.expect_backend().return_const(Backend::Symbol);
        source.expect_types().returning(move || ids.clone());
        source
            .expect_describe()
            .returning(move |wanted| descriptors.iter().find(|d| &d.identity == wanted).cloned());
        let mut repo = ReflectionRepository::new();
        repo.discover_all(&source).unwrap();
        repo
    }

    fn id(name: &str) -> TypeIdentity {
        TypeIdentity::new("app", name)
    }

    #[test]
    fn keyless_entity_on_context_is_an_error() {
        let mut repo = repo_of(vec![
            TypeDescriptor::class(id("Db"))
                .annotate(Annotation::new("db_context"))
                .field(FieldDescriptor::new(
                    "Notes",
                    TypeViewModel::collection(TypeViewModel::class(id("Note"))),
                )),
            TypeDescriptor::class(id("Note"))
                .field(FieldDescriptor::new("Text", TypeViewModel::primitive(Primitive::String))),
        ]);
        let db = repo.find_class("Db").unwrap().id();
        TypeUsageAnalyzer::analyze_context(&mut repo, db).unwrap();

        let result = DomainValidator::validate_model(&repo);
        let note = repo.find_class("Note").unwrap().id();
        assert_eq!(result.errors_for(note).len(), 1);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn dangling_foreign_key_is_an_error_and_empty_dto_a_warning() {
        let repo = repo_of(vec![
            TypeDescriptor::class(id("Line"))
                .field(FieldDescriptor::new("LineId", TypeViewModel::primitive(Primitive::I32)))
                .field(
                    FieldDescriptor::new("ThingId", TypeViewModel::primitive(Primitive::I32))
                        .annotate(Annotation::new("foreign_key").string("Thing")),
                ),
            TypeDescriptor::class(id("Empty")).annotate(Annotation::new("dto")),
        ]);

        let result = DomainValidator::validate_model(&repo);
        let line = repo.find_class("Line").unwrap().id();
        assert!(matches!(
            result.errors_for(line),
            [DomainError::InvalidModel { reason, .. }] if reason.contains("Thing")
        ));
        assert_eq!(result.warnings, vec!["DTO 'Empty' declares no properties".to_string()]);
        assert!(!result.is_clean());
    }
}
