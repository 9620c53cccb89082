//! Domain layer: armature, bones, constraints and naming rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod armature;
pub mod builder;
pub mod entities;
pub mod error;
pub mod naming;

pub use armature::{Armature, BoneNode};
pub use builder::ArmatureBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
