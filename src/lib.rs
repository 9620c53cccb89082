//! rigsmith: generate control and deform rigs from annotated metarigs.
//!
//! Layers, innermost first:
//! - [`domain`]: armature, bones, constraints and naming rules, no I/O
//! - [`application`]: rig protocol, rig types and services
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
