//! Legacy MV* suite: a view-model and a list view-model per class.

use super::SuiteContext;
use crate::{
    domain::generation::{CleanDepth, CleanerSpec, GeneratorNode, RelativePath},
    error::GantryResult,
};

pub(super) const VIEWMODEL: &str = "knockout/viewmodel.g.ts.j2";
pub(super) const LIST_VIEWMODEL: &str = "knockout/list-viewmodel.g.ts.j2";

const OWNED: &[&str] = &[".g.ts"];

pub(super) fn build(ctx: &SuiteContext<'_>) -> GantryResult<GeneratorNode> {
    let mut node = GeneratorNode::composite("Knockout")
        .suffix(RelativePath::try_new("scripts/generated")?)
        .cleaner(CleanerSpec::new(RelativePath::root(), CleanDepth::Recursive).owning(OWNED));

    for class in ctx.exposed() {
        let name = class.name();
        node = node
            .child(ctx.class_leaf(format!("Ko{name}"), format!("ko.{name}.g.ts"), VIEWMODEL, class)?)
            .child(ctx.class_leaf(
                format!("Ko{name}List"),
                format!("ko.{name}List.g.ts"),
                LIST_VIEWMODEL,
                class,
            )?);
    }
    Ok(node.build())
}
