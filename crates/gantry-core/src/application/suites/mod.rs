//! Generator suites: turn an [`Analysis`] into a generator tree.
//!
//! ```text
//! Root (areas/{area}?)
//! ├── Server    src/generated       {snake}_controller.g.rs, {snake}_dto.g.rs, metadata.g.json
//! ├── Vue       src/generated       models / api-clients / viewmodels / metadata .g.ts
//! └── Knockout  scripts/generated   ko.{Name}.g.ts, ko.{Name}List.g.ts
//! ```

mod knockout;
pub mod model;
mod server;
mod vue;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    application::{ApplicationError, services::Analysis},
    domain::{
        ClassViewModel, DomainError,
        generation::{GeneratorNode, LeafGenerator, RelativePath, TemplateDescriptor},
    },
    error::GantryResult,
};

use model::{ClassModel, EnumModel, SuiteModel};

/// Every embedded template, by logical path.
pub const TEMPLATE_NAMES: &[&str] = &[
    server::CONTROLLER,
    server::DTO,
    vue::MODELS,
    vue::API_CLIENTS,
    vue::VIEWMODELS,
    vue::METADATA,
    knockout::VIEWMODEL,
    knockout::LIST_VIEWMODEL,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    Server,
    Vue,
    Knockout,
}

impl SuiteKind {
    pub fn all() -> [Self; 3] {
        [Self::Server, Self::Vue, Self::Knockout]
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Vue => write!(f, "vue"),
            Self::Knockout => write!(f, "knockout"),
        }
    }
}

impl FromStr for SuiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "server" => Ok(Self::Server),
            "vue" => Ok(Self::Vue),
            "knockout" | "ko" => Ok(Self::Knockout),
            other => Err(format!("unknown suite '{other}' (expected server, vue or knockout)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub suites: Vec<SuiteKind>,
    pub area: Option<String>,
    pub root_namespace: String,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            suites: SuiteKind::all().to_vec(),
            area: None,
            root_namespace: "app".to_string(),
        }
    }
}

/// Build the full generator tree for an analyzed model.
pub fn build_tree(analysis: &Analysis, options: &TreeOptions) -> GantryResult<GeneratorNode> {
    let mut root = GeneratorNode::composite("Root");
    if let Some(area) = &options.area {
        root = root.suffix(RelativePath::try_new(format!("areas/{area}"))?);
    }

    let ctx = SuiteContext::new(analysis, options);
    for suite in &options.suites {
        debug!(%suite, "Building suite");
        let node = match suite {
            SuiteKind::Server => server::build(&ctx)?,
            SuiteKind::Vue => vue::build(&ctx)?,
            SuiteKind::Knockout => knockout::build(&ctx)?,
        };
        root = root.child(node);
    }
    Ok(root.build())
}

/// Shared inputs for suite builders.
pub(crate) struct SuiteContext<'a> {
    analysis: &'a Analysis,
    options: &'a TreeOptions,
}

impl<'a> SuiteContext<'a> {
    fn new(analysis: &'a Analysis, options: &'a TreeOptions) -> Self {
        Self { analysis, options }
    }

    /// Entities served by a context, in context order.
    fn entities(&self) -> Vec<&'a ClassViewModel> {
        let repo = &self.analysis.repository;
        let mut seen = HashSet::new();
        self.analysis
            .entities()
            .filter(|id| seen.insert(*id))
            .map(|id| repo.class(id))
            .filter(|c| c.is_generated() && c.is_entity())
            .collect()
    }

    /// Entities plus DTO classes: everything that gets client types.
    fn exposed(&self) -> Vec<&'a ClassViewModel> {
        let mut classes = self.entities();
        classes.extend(
            self.analysis
                .repository
                .classes()
                .filter(|c| c.flags().is_dto && c.is_generated()),
        );
        classes
    }

    fn class_model(&self, class: &ClassViewModel) -> ClassModel {
        ClassModel::new(self.analysis, class)
    }

    fn suite_model(&self, classes: &[&ClassViewModel]) -> SuiteModel {
        SuiteModel {
            root_namespace: self.options.root_namespace.clone(),
            area: self.options.area.clone(),
            version: crate::VERSION,
            classes: classes.iter().map(|c| self.class_model(c)).collect(),
            enums: self.analysis.repository.enums().map(EnumModel::from).collect(),
        }
    }

    /// Issues that fail every leaf bound to `class`.
    fn issues(&self, class: &ClassViewModel) -> Vec<DomainError> {
        let mut issues = class.issues().to_vec();
        issues.extend(self.analysis.validation.errors_for(class.id()).iter().cloned());
        issues
    }

    /// A template leaf bound to one class.
    fn class_leaf(
        &self,
        name: impl Into<String>,
        file: String,
        template: &str,
        class: &ClassViewModel,
    ) -> GantryResult<LeafGenerator> {
        let name = name.into();
        let model = to_model(&name, &self.class_model(class))?;
        Ok(LeafGenerator::template(
            name,
            RelativePath::try_new(file)?,
            TemplateDescriptor::new(template),
            model,
        )
        .for_model(class.name(), Some(class.id()))
        .with_issues(self.issues(class)))
    }

    /// A template leaf over a whole suite.
    fn suite_leaf(
        &self,
        name: &str,
        file: &str,
        template: &str,
        model: &SuiteModel,
    ) -> GantryResult<LeafGenerator> {
        Ok(LeafGenerator::template(
            name,
            RelativePath::try_new(file)?,
            TemplateDescriptor::new(template),
            to_model(name, model)?,
        )
        .for_model("Suite", None))
    }
}

fn to_model(generator: &str, model: &impl Serialize) -> GantryResult<Value> {
    serde_json::to_value(model).map_err(|e| {
        ApplicationError::ModelSerialization {
            generator: generator.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
