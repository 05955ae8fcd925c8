//! The generator tree: a closed set of node kinds built with builders.
//!
//! A composite contributes a path suffix, optional cleaners and children;
//! a leaf contributes a file name and knows how to produce its content.
//! A leaf's final location is the concatenation of every ancestor suffix
//! and its own file name, nothing else.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::path::RelativePath;
use super::template::TemplateDescriptor;
use crate::domain::error::DomainError;
use crate::domain::model::ClassId;

/// How far a cleaner descends below its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanDepth {
    TopLevel,
    Recursive,
}

/// A directory (relative to the declaring composite) whose stale files
/// are removed after a complete run.
///
/// With `suffixes` set, only files whose names end in one of them belong
/// to the cleaner; anything else in the directory is left alone, so two
/// suites can share an output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanerSpec {
    pub directory: RelativePath,
    pub depth: CleanDepth,
    pub suffixes: Vec<String>,
}

impl CleanerSpec {
    pub fn new(directory: RelativePath, depth: CleanDepth) -> Self {
        Self {
            directory,
            depth,
            suffixes: Vec::new(),
        }
    }

    /// Restrict the cleaner to file names ending in one of `suffixes`.
    pub fn owning(mut self, suffixes: &[&str]) -> Self {
        self.suffixes = suffixes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn owns(&self, file: &Path) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }
        file.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.suffixes.iter().any(|s| name.ends_with(s.as_str())))
    }
}

pub type Emitter = Arc<dyn Fn() -> Result<String, String> + Send + Sync>;

/// How a leaf produces its text.
#[derive(Clone)]
pub enum LeafSource {
    /// Render a template against a serialized, generator-specific model.
    Template {
        template: TemplateDescriptor,
        model: Value,
    },
    /// Produce content directly in code.
    Emit(Emitter),
}

impl fmt::Debug for LeafSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template { template, .. } => f.debug_tuple("Template").field(template).finish(),
            Self::Emit(_) => f.write_str("Emit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeafGenerator {
    name: String,
    file_name: RelativePath,
    source: LeafSource,
    model_type: String,
    class: Option<ClassId>,
    issues: Vec<DomainError>,
}

impl LeafGenerator {
    pub fn template(
        name: impl Into<String>,
        file_name: RelativePath,
        template: TemplateDescriptor,
        model: Value,
    ) -> Self {
        Self::with_source(name, file_name, LeafSource::Template { template, model })
    }

    pub fn emit(
        name: impl Into<String>,
        file_name: RelativePath,
        emitter: impl Fn() -> Result<String, String> + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(name, file_name, LeafSource::Emit(Arc::new(emitter)))
    }

    fn with_source(name: impl Into<String>, file_name: RelativePath, source: LeafSource) -> Self {
        Self {
            name: name.into(),
            file_name,
            source,
            model_type: String::new(),
            class: None,
            issues: Vec::new(),
        }
    }

    /// Bind the leaf to the model type it renders, for diagnostics.
    pub fn for_model(mut self, model_type: impl Into<String>, class: Option<ClassId>) -> Self {
        self.model_type = model_type.into();
        self.class = class;
        self
    }

    /// Analysis problems that make this leaf fail without rendering.
    pub fn with_issues(mut self, issues: impl IntoIterator<Item = DomainError>) -> Self {
        self.issues.extend(issues);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_name(&self) -> &RelativePath {
        &self.file_name
    }

    pub fn source(&self) -> &LeafSource {
        &self.source
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn class(&self) -> Option<ClassId> {
        self.class
    }

    pub fn issues(&self) -> &[DomainError] {
        &self.issues
    }
}

#[derive(Debug, Clone)]
pub struct CompositeGenerator {
    name: String,
    suffix: RelativePath,
    cleaners: Vec<CleanerSpec>,
    children: Vec<GeneratorNode>,
}

impl CompositeGenerator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suffix(&self) -> &RelativePath {
        &self.suffix
    }

    pub fn cleaners(&self) -> &[CleanerSpec] {
        &self.cleaners
    }

    /// Children in generation order.
    pub fn generators(&self) -> impl Iterator<Item = &GeneratorNode> {
        self.children.iter()
    }
}

#[derive(Debug, Clone)]
pub enum GeneratorNode {
    Composite(CompositeGenerator),
    Leaf(LeafGenerator),
}

impl GeneratorNode {
    pub fn composite(name: impl Into<String>) -> CompositeBuilder {
        CompositeBuilder {
            inner: CompositeGenerator {
                name: name.into(),
                suffix: RelativePath::root(),
                cleaners: Vec::new(),
                children: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Composite(c) => c.name(),
            Self::Leaf(l) => l.name(),
        }
    }

    /// This node's own contribution to the output path.
    pub fn suffix(&self) -> &RelativePath {
        match self {
            Self::Composite(c) => c.suffix(),
            Self::Leaf(l) => l.file_name(),
        }
    }

    /// Depth-first visit of every leaf with its path relative to the root.
    pub fn visit_leaves<'a>(&'a self, mut visit: impl FnMut(&'a LeafGenerator, PathBuf)) {
        fn walk<'a>(
            node: &'a GeneratorNode,
            base: &Path,
            visit: &mut dyn FnMut(&'a LeafGenerator, PathBuf),
        ) {
            let path = base.join(node.suffix());
            match node {
                GeneratorNode::Leaf(leaf) => visit(leaf, path),
                GeneratorNode::Composite(c) => {
                    for child in c.generators() {
                        walk(child, &path, visit);
                    }
                }
            }
        }
        walk(self, Path::new(""), &mut visit);
    }
}

impl From<LeafGenerator> for GeneratorNode {
    fn from(leaf: LeafGenerator) -> Self {
        Self::Leaf(leaf)
    }
}

/// Fluent construction of a composite node.
#[derive(Debug)]
pub struct CompositeBuilder {
    inner: CompositeGenerator,
}

impl CompositeBuilder {
    pub fn suffix(mut self, suffix: RelativePath) -> Self {
        self.inner.suffix = suffix;
        self
    }

    pub fn cleaner(mut self, cleaner: CleanerSpec) -> Self {
        self.inner.cleaners.push(cleaner);
        self
    }

    pub fn child(mut self, child: impl Into<GeneratorNode>) -> Self {
        self.inner.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = GeneratorNode>) -> Self {
        self.inner.children.extend(children);
        self
    }

    pub fn build(self) -> GeneratorNode {
        GeneratorNode::Composite(self.inner)
    }
}

impl From<CompositeBuilder> for GeneratorNode {
    fn from(builder: CompositeBuilder) -> Self {
        builder.build()
    }
}

/// One row of a flattened generator listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorListing {
    pub name: String,
    pub path: PathBuf,
    pub model_type: String,
}

/// Flatten a tree to its leaves, ordered by output path.
pub fn list_generators(root: &GeneratorNode) -> Vec<GeneratorListing> {
    let mut rows = Vec::new();
    root.visit_leaves(|leaf, path| {
        rows.push(GeneratorListing {
            name: leaf.name().to_string(),
            path,
            model_type: leaf.model_type().to_string(),
        });
    });
    rows.sort_by(|a, b| a.path.cmp(&b.path));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn leaf(name: &str, file: &str) -> LeafGenerator {
        LeafGenerator::emit(name, rel(file), || Ok(String::new()))
    }

    #[test]
    fn paths_are_concatenated_suffixes() {
        let tree = GeneratorNode::composite("Root")
            .suffix(rel("areas/admin"))
            .child(
                GeneratorNode::composite("Vue")
                    .suffix(rel("src/generated"))
                    .child(leaf("Models", "models.g.ts")),
            )
            .child(leaf("Metadata", "metadata.g.json"))
            .build();

        let rows = list_generators(&tree);
        let paths: Vec<_> = rows.iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("areas/admin/metadata.g.json"),
                PathBuf::from("areas/admin/src/generated/models.g.ts"),
            ]
        );
        assert_eq!(rows[1].name, "Models");
    }

    #[test]
    fn builder_records_cleaners() {
        let node = GeneratorNode::composite("Knockout")
            .cleaner(CleanerSpec::new(rel("scripts/generated"), CleanDepth::TopLevel))
            .build();
        let GeneratorNode::Composite(c) = node else {
            panic!("expected composite");
        };
        assert_eq!(c.cleaners().len(), 1);
        assert_eq!(c.generators().count(), 0);
    }

    #[test]
    fn cleaner_suffixes_decide_ownership() {
        let any = CleanerSpec::new(RelativePath::root(), CleanDepth::TopLevel);
        assert!(any.owns(Path::new("notes.md")));

        let server = any.clone().owning(&[".g.rs", ".g.json"]);
        assert!(server.owns(Path::new("/site/src/generated/person_dto.g.rs")));
        assert!(server.owns(Path::new("metadata.g.json")));
        assert!(!server.owns(Path::new("/site/src/generated/models.g.ts")));

        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["directory"], "");
        assert_eq!(json["suffixes"][1], ".g.json");
    }
}
