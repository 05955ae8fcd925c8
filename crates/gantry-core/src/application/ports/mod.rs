//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `gantry-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations for writing and cleaning outputs
//!   - `TemplateResolver`: Override-or-embedded template lookup
//!   - `TemplateRenderer`: Template rendering
//!   - `TypeSource`: Class facts from reflection or source symbols
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{Filesystem, TemplateRenderer, TemplateResolver, TypeSource};
