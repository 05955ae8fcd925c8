//! Server suite: controllers and DTOs in Rust, plus the JSON metadata.

use super::{SuiteContext, to_model};
use crate::{
    domain::{
        generation::{CleanDepth, CleanerSpec, GeneratorNode, LeafGenerator, RelativePath},
        naming::snake_case,
    },
    error::GantryResult,
};

pub(super) const CONTROLLER: &str = "server/controller.rs.j2";
pub(super) const DTO: &str = "server/dto.rs.j2";

/// Shares `src/generated` with the Vue suite, so only these are swept.
pub(super) const OWNED: &[&str] = &[".g.rs", ".g.json"];

pub(super) fn build(ctx: &SuiteContext<'_>) -> GantryResult<GeneratorNode> {
    let mut node = GeneratorNode::composite("Server")
        .suffix(RelativePath::try_new("src/generated")?)
        .cleaner(CleanerSpec::new(RelativePath::root(), CleanDepth::TopLevel).owning(OWNED));

    for class in ctx.entities() {
        let file = format!("{}_controller.g.rs", snake_case(class.name()));
        node = node.child(ctx.class_leaf(format!("{}Controller", class.name()), file, CONTROLLER, class)?);
    }
    for class in ctx.exposed() {
        let file = format!("{}_dto.g.rs", snake_case(class.name()));
        node = node.child(ctx.class_leaf(format!("{}Dto", class.name()), file, DTO, class)?);
    }

    let metadata = to_model("Metadata", &ctx.suite_model(&ctx.exposed()))?;
    let emitter = move || {
        serde_json::to_string_pretty(&metadata)
            .map(|json| json + "\n")
            .map_err(|e| e.to_string())
    };
    node = node.child(
        LeafGenerator::emit("Metadata", RelativePath::try_new("metadata.g.json")?, emitter)
            .for_model("Suite", None),
    );

    Ok(node.build())
}
