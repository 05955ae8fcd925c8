mod cancel;
mod node;
mod path;
mod report;
mod template;

pub use cancel::CancellationToken;
pub use node::{
    CleanDepth, CleanerSpec, CompositeBuilder, CompositeGenerator, Emitter, GeneratorListing,
    GeneratorNode, LeafGenerator, LeafSource, list_generators,
};
pub use path::{KnownGoodSet, RelativePath, normalize};
pub use report::{GenerationFailure, GenerationReport};
pub use template::{ResolvedTemplate, TemplateDescriptor, TemplateOrigin};
