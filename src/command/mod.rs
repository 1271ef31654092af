// src/command/mod.rs

//! Turning configuration into a launchable command.
//!
//! - [`builder`] assembles the build tool's flags in CLI-contract order.
//! - [`extra_args`] tokenizes the freeform extra-arguments block.
//! - [`spec`] holds the immutable [`CommandSpec`] handed to the supervisor.

pub mod builder;
pub mod extra_args;
pub mod spec;

pub use builder::build_arguments;
pub use extra_args::tokenize_extra_args;
pub use spec::{CommandSpec, PreflightTargets};
