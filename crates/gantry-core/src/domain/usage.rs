//! Higher-level usage facts derived from the class graph: which classes are
//! entities on a context, and which strategy classes serve which entity.

use serde::Serialize;
use tracing::{debug, info};

use super::error::DomainError;
use super::model::{ClassId, ClassViewModel};
use super::repository::ReflectionRepository;
use super::types::TypeKind;

/// Binds a context, one of its entity collections, and the entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTypeUsage {
    pub context: ClassId,
    pub property: String,
    pub entity: ClassId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DataSource,
    Behaviors,
}

impl StrategyKind {
    /// Name of the generic contract the strategy must close.
    pub fn contract(self) -> &'static str {
        match self {
            Self::DataSource => "DataSource",
            Self::Behaviors => "Behaviors",
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::DataSource, Self::Behaviors]
    }
}

/// A strategy class and the entity type it operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrudStrategyTypeUsage {
    pub strategy: ClassId,
    pub kind: StrategyKind,
    /// Type argument of the closed contract.
    pub served_type: ClassId,
    /// Whose strategy list this one joins: the served type unless overridden.
    pub declared_for: ClassId,
}

/// A data-source strategy plus the facts clients need to invoke it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceTypeUsage {
    pub usage: CrudStrategyTypeUsage,
    pub is_default: bool,
    /// Client-settable parameters (the strategy's public properties).
    pub parameters: Vec<String>,
}

/// All strategies discovered in a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyIndex {
    pub data_sources: Vec<DataSourceTypeUsage>,
    pub behaviors: Vec<CrudStrategyTypeUsage>,
}

impl StrategyIndex {
    pub fn data_sources_for(&self, class: ClassId) -> impl Iterator<Item = &DataSourceTypeUsage> {
        self.data_sources
            .iter()
            .filter(move |d| d.usage.declared_for == class)
    }

    pub fn behaviors_for(&self, class: ClassId) -> Option<&CrudStrategyTypeUsage> {
        self.behaviors.iter().find(|b| b.declared_for == class)
    }
}

pub struct TypeUsageAnalyzer;

impl TypeUsageAnalyzer {
    /// Produce one [`EntityTypeUsage`] per entity collection of `context`
    /// and tag each entity as on-context.
    ///
    /// Usages are created on the first call for a context; later calls
    /// return the recorded ones unchanged.
    pub fn analyze_context(
        repo: &mut ReflectionRepository,
        context: ClassId,
    ) -> Result<Vec<EntityTypeUsage>, DomainError> {
        let class = repo.class(context);
        if !class.flags().is_db_context {
            return Err(DomainError::NotAContext {
                class: class.name().to_string(),
            });
        }

        if repo.analyzed_contexts.contains(&context) {
            return Ok(usages_of(repo, context));
        }

        let mut usages = Vec::new();
        for property in class.properties() {
            let Some(element) = property.ty().element_type() else {
                continue;
            };
            let Some(entity) = element
                .class_identity()
                .and_then(|id| repo.class_by_identity(id))
            else {
                continue;
            };
            usages.push(EntityTypeUsage {
                context,
                property: property.name().to_string(),
                entity: entity.id(),
            });
        }

        for usage in &usages {
            let entity = repo.class_mut(usage.entity);
            entity.on_context = true;
            entity.context_property = Some(usage.property.clone());
            debug!(entity = entity.name(), property = %usage.property, "Entity on context");
        }

        info!(
            context = repo.class(context).name(),
            entities = usages.len(),
            "Context analyzed"
        );
        repo.entity_usages.extend(usages.iter().cloned());
        repo.analyzed_contexts.push(context);
        Ok(usages)
    }

    /// Resolve the served and declared-for types of a strategy class.
    ///
    /// Fails when the class does not implement `kind`'s contract over
    /// exactly one class type argument.
    pub fn strategy_usage(
        repo: &ReflectionRepository,
        strategy: ClassId,
        kind: StrategyKind,
    ) -> Result<CrudStrategyTypeUsage, DomainError> {
        let class = repo.class(strategy);
        let invalid = |reason: String| DomainError::InvalidStrategy {
            strategy: class.name().to_string(),
            contract: kind.contract(),
            reason,
        };

        let contract = class
            .implements()
            .iter()
            .find_map(|c| match c.kind() {
                TypeKind::Generic {
                    identity,
                    arguments,
                } if identity.name() == kind.contract() => Some(arguments),
                _ => None,
            })
            .ok_or_else(|| invalid("contract is not implemented".into()))?;

        let [argument] = contract.as_slice() else {
            return Err(invalid(format!(
                "expected exactly one type argument, found {}",
                contract.len()
            )));
        };

        let served = argument
            .class_identity()
            .filter(|_| argument.is_class())
            .and_then(|id| repo.class_by_identity(id))
            .ok_or_else(|| invalid(format!("type argument '{argument}' is not a known class")))?;

        let declared_for = match class.annotations().get("declared_for") {
            Some(annotation) => {
                let target = annotation
                    .first_text()
                    .ok_or_else(|| invalid("declared_for needs a type".into()))?;
                repo.find_class(target)
                    .ok_or_else(|| invalid(format!("declared_for type '{target}' is unknown")))?
                    .id()
            }
            None => served.id(),
        };

        Ok(CrudStrategyTypeUsage {
            strategy,
            kind,
            served_type: served.id(),
            declared_for,
        })
    }

    /// Find every class implementing a strategy contract and resolve it.
    pub fn discover_strategies(repo: &ReflectionRepository) -> Result<StrategyIndex, DomainError> {
        let mut index = StrategyIndex::default();

        for class in repo.classes() {
            for kind in StrategyKind::all() {
                if !implements_contract(class, kind) {
                    continue;
                }
                let usage = Self::strategy_usage(repo, class.id(), kind)?;
                match kind {
                    StrategyKind::DataSource => index.data_sources.push(DataSourceTypeUsage {
                        usage,
                        is_default: class.annotations().has("default_source"),
                        parameters: class
                            .client_properties()
                            .iter()
                            .map(|p| p.name().to_string())
                            .collect(),
                    }),
                    StrategyKind::Behaviors => index.behaviors.push(usage),
                }
            }
        }

        Ok(index)
    }
}

fn implements_contract(class: &ClassViewModel, kind: StrategyKind) -> bool {
    class.implements().iter().any(|c| match c.kind() {
        TypeKind::Generic { identity, .. } => identity.name() == kind.contract(),
        _ => false,
    })
}

fn usages_of(repo: &ReflectionRepository, context: ClassId) -> Vec<EntityTypeUsage> {
    repo.entity_usages()
        .iter()
        .filter(|u| u.context == context)
        .cloned()
        .collect()
}
