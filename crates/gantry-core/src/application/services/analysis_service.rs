//! Analysis Service - builds the per-run model from a type source.
//!
//! 1. Discover every declared type into a fresh repository
//! 2. Pick the DB context(s) and record entity usages
//! 3. Resolve data-source and behavior strategies
//! 4. Validate the model
//!
//! Configuration errors (no context, broken strategy) abort here, before
//! any output exists. Analysis issues stay attached to their classes.

use tracing::{info, instrument, warn};

use crate::{
    application::{ApplicationError, ports::TypeSource},
    domain::{
        ClassId, DomainValidator, EntityTypeUsage, ModelValidation, ReflectionRepository,
        StrategyIndex, TypeUsageAnalyzer,
    },
    error::GantryResult,
};

/// Everything the generator suites need about one data project.
pub struct Analysis {
    pub repository: ReflectionRepository,
    pub contexts: Vec<ClassId>,
    pub usages: Vec<EntityTypeUsage>,
    pub strategies: StrategyIndex,
    pub validation: ModelValidation,
}

impl Analysis {
    /// Entities reachable from the analyzed contexts, in context order.
    pub fn entities(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.usages.iter().map(|u| u.entity)
    }

    /// Analysis issues and validation errors, one line each.
    pub fn problems(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .repository
            .classes()
            .flat_map(|c| c.issues().iter().map(ToString::to_string))
            .collect();
        lines.extend(
            self.validation
                .errors
                .values()
                .flatten()
                .map(ToString::to_string),
        );
        lines
    }
}

pub struct AnalysisService {
    source: Box<dyn TypeSource>,
}

impl AnalysisService {
    pub fn new(source: Box<dyn TypeSource>) -> Self {
        Self { source }
    }

    /// Analyze the source. `context` selects one DB context by name;
    /// otherwise every `#[db_context]` type is used.
    #[instrument(skip_all, fields(backend = %self.source.backend(), context = context.unwrap_or("*")))]
    pub fn analyze(&self, context: Option<&str>) -> GantryResult<Analysis> {
        let mut repository = ReflectionRepository::new();
        repository.discover_all(self.source.as_ref())?;

        let contexts: Vec<ClassId> = match context {
            Some(name) => {
                let class = repository
                    .find_class(name)
                    .filter(|c| c.flags().is_db_context)
                    .ok_or_else(|| ApplicationError::ContextNotFound {
                        name: name.to_string(),
                    })?;
                vec![class.id()]
            }
            None => repository
                .classes()
                .filter(|c| c.flags().is_db_context)
                .map(|c| c.id())
                .collect(),
        };
        if contexts.is_empty() {
            return Err(ApplicationError::NoContext.into());
        }

        let mut usages = Vec::new();
        for &ctx in &contexts {
            usages.extend(TypeUsageAnalyzer::analyze_context(&mut repository, ctx)?);
        }

        let strategies = TypeUsageAnalyzer::discover_strategies(&repository)?;
        let validation = DomainValidator::validate_model(&repository);

        for class in repository.classes() {
            for issue in class.issues() {
                warn!(class = class.name(), %issue, "Analysis issue");
            }
        }
        for warning in &validation.warnings {
            warn!(%warning, "Model warning");
        }

        info!(
            classes = repository.len(),
            entities = usages.len(),
            data_sources = strategies.data_sources.len(),
            behaviors = strategies.behaviors.len(),
            errors = validation.error_count(),
            "Analysis complete"
        );

        Ok(Analysis {
            repository,
            contexts,
            usages,
            strategies,
            validation,
        })
    }
}
