use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use gantry_core::{
    application::{ApplicationError, ports::TemplateResolver},
    domain::generation::{ResolvedTemplate, TemplateDescriptor, TemplateOrigin},
    error::GantryResult,
};

use super::embedded::{EMBEDDED, embedded};

/// Resolves templates against an optional override directory, falling
/// back to the embedded set.
#[derive(Debug, Clone, Default)]
pub struct OverridingTemplateResolver {
    override_dir: Option<PathBuf>,
}

impl OverridingTemplateResolver {
    /// Embedded templates only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    fn override_path(&self, descriptor: &TemplateDescriptor) -> Option<PathBuf> {
        let dir = self.override_dir.as_ref()?;
        let candidate = descriptor
            .logical_path()
            .split('/')
            .fold(dir.clone(), |path, segment| path.join(segment));
        candidate.is_file().then_some(candidate)
    }
}

impl TemplateResolver for OverridingTemplateResolver {
    #[instrument(skip(self), fields(template = %descriptor))]
    fn resolve(&self, descriptor: &TemplateDescriptor) -> GantryResult<ResolvedTemplate> {
        if let Some(path) = self.override_path(descriptor) {
            debug!(path = %path.display(), "Using template override");
            return Ok(ResolvedTemplate {
                descriptor: descriptor.clone(),
                origin: TemplateOrigin::File(path),
            });
        }
        if embedded(descriptor.logical_path()).is_some() {
            return Ok(ResolvedTemplate {
                descriptor: descriptor.clone(),
                origin: TemplateOrigin::Embedded,
            });
        }

        let searched = match &self.override_dir {
            Some(dir) => format!("{}, embedded", dir.display()),
            None => "embedded".to_string(),
        };
        Err(ApplicationError::TemplateNotFound {
            template: descriptor.to_string(),
            searched,
        }
        .into())
    }

    fn read(&self, template: &ResolvedTemplate) -> GantryResult<String> {
        match &template.origin {
            TemplateOrigin::File(path) => {
                std::fs::read_to_string(path).map_err(|e| {
                    ApplicationError::FilesystemError {
                        path: path.clone(),
                        reason: format!("Failed to read template: {e}"),
                    }
                    .into()
                })
            }
            TemplateOrigin::Embedded => embedded(template.descriptor.logical_path())
                .map(str::to_string)
                .ok_or_else(|| {
                    ApplicationError::TemplateNotFound {
                        template: template.descriptor.to_string(),
                        searched: "embedded".into(),
                    }
                    .into()
                }),
        }
    }

    fn available(&self) -> Vec<ResolvedTemplate> {
        EMBEDDED
            .iter()
            .filter_map(|(path, _)| self.resolve(&TemplateDescriptor::new(*path)).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_is_the_fallback() {
        let resolver = OverridingTemplateResolver::new();
        let resolved = resolver.resolve(&"server/dto.rs.j2".into()).unwrap();
        assert_eq!(resolved.origin, TemplateOrigin::Embedded);
        assert!(resolver.read(&resolved).unwrap().contains("Dto"));
    }

    #[test]
    fn override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vue")).unwrap();
        std::fs::write(dir.path().join("vue/models.g.ts.j2"), "// custom").unwrap();

        let resolver = OverridingTemplateResolver::with_overrides(dir.path());
        let resolved = resolver.resolve(&"vue/models.g.ts.j2".into()).unwrap();
        assert!(resolved.is_override());
        assert_eq!(resolver.read(&resolved).unwrap(), "// custom");

        let overridden: Vec<_> = resolver
            .available()
            .into_iter()
            .filter(ResolvedTemplate::is_override)
            .collect();
        assert_eq!(overridden.len(), 1);
    }

    #[test]
    fn unknown_template_lists_search_locations() {
        let resolver = OverridingTemplateResolver::with_overrides("/nowhere");
        let err = resolver.resolve(&"react/app.tsx.j2".into()).unwrap_err();
        assert!(err.to_string().contains("/nowhere, embedded"));
    }
}
