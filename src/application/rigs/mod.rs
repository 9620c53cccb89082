//! Rig component implementations
//!
//! Each rig type is registered under a dotted name (`basic.super_copy`) that
//! metarig bones reference in their rig assignment.

pub mod super_copy;

pub use super_copy::{BoneSet, SuperCopy, SuperCopyParams};

/// All rig types this crate can instantiate.
pub const RIG_TYPES: &[&str] = &[super_copy::RIG_TYPE];
