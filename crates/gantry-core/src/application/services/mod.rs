//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish the
//! high-level use cases: "analyze a data project" and "generate the output tree".

pub mod analysis_service;
pub mod cleaner_service;
pub mod generation_service;

pub use analysis_service::{Analysis, AnalysisService};
pub use cleaner_service::{CleanOutcome, OutputCleaner};
pub use generation_service::{GenerationOptions, GenerationService};
