//! Vue suite: one TypeScript file per concern covering every exposed class.

use super::SuiteContext;
use crate::{
    domain::generation::{CleanDepth, CleanerSpec, GeneratorNode, RelativePath},
    error::GantryResult,
};

pub(super) const MODELS: &str = "vue/models.g.ts.j2";
pub(super) const API_CLIENTS: &str = "vue/api-clients.g.ts.j2";
pub(super) const VIEWMODELS: &str = "vue/viewmodels.g.ts.j2";
pub(super) const METADATA: &str = "vue/metadata.g.ts.j2";

pub(super) const OWNED: &[&str] = &[".g.ts"];

const FILES: [(&str, &str, &str); 4] = [
    ("VueModels", "models.g.ts", MODELS),
    ("VueApiClients", "api-clients.g.ts", API_CLIENTS),
    ("VueViewModels", "viewmodels.g.ts", VIEWMODELS),
    ("VueMetadata", "metadata.g.ts", METADATA),
];

pub(super) fn build(ctx: &SuiteContext<'_>) -> GantryResult<GeneratorNode> {
    let model = ctx.suite_model(&ctx.exposed());
    let mut node = GeneratorNode::composite("Vue")
        .suffix(RelativePath::try_new("src/generated")?)
        .cleaner(CleanerSpec::new(RelativePath::root(), CleanDepth::TopLevel).owning(OWNED));

    for (name, file, template) in FILES {
        node = node.child(ctx.suite_leaf(name, file, template, &model)?);
    }
    Ok(node.build())
}
