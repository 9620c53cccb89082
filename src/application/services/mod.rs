//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, WidgetCatalog)
//! but are themselves concrete structs, not traits.

mod generate;
mod metarig;

pub use generate::{GenerateService, GeneratedRig, GenerationReport};
pub use metarig::MetarigService;
