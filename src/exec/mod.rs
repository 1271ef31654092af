// src/exec/mod.rs

//! Low-level process helpers.
//!
//! - [`output`] gives a child one pipe for both stdout and stderr.
//! - [`probe`] runs short-lived diagnostic commands for the pre-flight
//!   checks, behind the `ProbeRunner` trait so tests can fake them.
//! - [`terminate`] sends the platform's graceful termination request.
//!
//! The long-running build process itself is owned by the supervisor worker.

pub mod output;
pub mod probe;
pub mod terminate;

pub use output::{MergedOutput, merged_output};
pub use probe::{ProbeOutput, ProbeRunner, TokioProbeRunner};
pub use terminate::{GracefulRequest, request_graceful_termination};
