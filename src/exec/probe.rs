// src/exec/probe.rs

//! Short-lived diagnostic subprocesses (version probe, package listing).
//!
//! The pre-flight checks talk to a `ProbeRunner` instead of spawning
//! processes directly, so tests can script the interpreter's answers while
//! production uses [`TokioProbeRunner`].

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

/// Captured result of a diagnostic command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Whether the command exited with status 0.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProbeOutput {
    /// Trimmed stdout, falling back to stderr (some interpreters print
    /// their version there).
    pub fn text(&self) -> &str {
        let out = self.stdout.trim();
        if out.is_empty() { self.stderr.trim() } else { out }
    }
}

/// Trait abstracting how diagnostic commands are run.
pub trait ProbeRunner: Send + Sync {
    /// Run `program args...` to completion and capture its output.
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = io::Result<ProbeOutput>> + Send + 'a>>;
}

/// Real probe runner backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct TokioProbeRunner {
    timeout: Duration,
}

impl TokioProbeRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioProbeRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl ProbeRunner for TokioProbeRunner {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = io::Result<ProbeOutput>> + Send + 'a>> {
        Box::pin(async move {
            debug!(program, ?args, "running diagnostic probe");

            let output = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output();

            let output = tokio::time::timeout(self.timeout, output)
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("'{program}' did not finish within {:?}", self.timeout),
                    )
                })??;

            Ok(ProbeOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_status() {
        let runner = TokioProbeRunner::default();
        let out = runner.run("sh", &["-c", "echo hi; exit 3"]).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.text(), "hi");
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let runner = TokioProbeRunner::default();
        let err = runner.run("definitely-not-a-real-binary-xyz", &[]).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn slow_probe_times_out() {
        let runner = TokioProbeRunner::new(Duration::from_millis(100));
        let err = runner.run("sleep", &["5"]).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
