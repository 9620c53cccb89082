//! Application layer: rig protocol, rig types and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod relink;
pub mod rig;
pub mod rigs;
pub mod services;
pub mod ui;
pub mod widgets;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use rig::{run_pipeline, DerivedBones, RigComponent, RigContext, Stage};
pub use widgets::{BuiltinWidgets, WidgetCatalog};
