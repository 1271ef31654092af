// src/preflight.rs

//! Pre-flight validation of a [`CommandSpec`] before anything is launched.
//!
//! Checks run in a fixed order and stop at the first failure:
//! 1. the interpreter answers a `--version` probe
//! 2. the build tool shows up in `<interpreter> -m pip list`
//!    (case-insensitive substring match)
//! 3. the target script is set and exists
//! 4. the icon, if configured, exists
//! 5. the spec output directory, if configured, exists
//! 6. the working directory exists
//!
//! Steps 1 and 2 spawn short-lived diagnostic processes through a
//! [`ProbeRunner`]. They are read-only and are not cancellable.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::command::CommandSpec;
use crate::errors::PreflightError;
use crate::exec::{ProbeRunner, TokioProbeRunner};
use crate::fs::{FileSystem, RealFileSystem};

/// Trait abstracting pre-flight validation, so the supervisor can be driven
/// with a scripted environment in tests.
pub trait Preflight: Send + Sync {
    fn check<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<(), PreflightError>> + Send + 'a>>;
}

/// Production pre-flight: probes the interpreter and inspects the filesystem.
#[derive(Debug, Clone)]
pub struct EnvironmentPreflight<P, F> {
    probe: P,
    fs: F,
}

impl EnvironmentPreflight<TokioProbeRunner, RealFileSystem> {
    /// Pre-flight against the real system.
    pub fn system() -> Self {
        Self::new(TokioProbeRunner::default(), RealFileSystem)
    }
}

impl<P: ProbeRunner, F: FileSystem> EnvironmentPreflight<P, F> {
    pub fn new(probe: P, fs: F) -> Self {
        Self { probe, fs }
    }

    async fn run_checks(&self, spec: &CommandSpec) -> Result<(), PreflightError> {
        let interpreter = spec.executable();

        self.check_interpreter(interpreter).await?;
        self.check_tool_installed(interpreter, &spec.targets().tool)
            .await?;
        self.check_paths(spec)?;

        info!(interpreter, tool = %spec.targets().tool, "pre-flight checks passed");
        Ok(())
    }

    async fn check_interpreter(&self, interpreter: &str) -> Result<(), PreflightError> {
        let unavailable = |reason: String| PreflightError::InterpreterUnavailable {
            interpreter: interpreter.to_string(),
            reason,
        };

        let output = self
            .probe
            .run(interpreter, &["--version"])
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.success {
            return Err(unavailable(format!(
                "version probe failed: {}",
                output.text()
            )));
        }

        debug!(interpreter, version = output.text(), "interpreter responded");
        Ok(())
    }

    async fn check_tool_installed(
        &self,
        interpreter: &str,
        tool: &str,
    ) -> Result<(), PreflightError> {
        let listing_failed = |reason: String| PreflightError::PackageListingFailed {
            interpreter: interpreter.to_string(),
            reason,
        };

        let output = self
            .probe
            .run(interpreter, &["-m", "pip", "list"])
            .await
            .map_err(|e| listing_failed(e.to_string()))?;

        if !output.success {
            return Err(listing_failed(output.text().to_string()));
        }

        let needle = tool.trim().to_lowercase();
        if needle.is_empty() || !output.stdout.to_lowercase().contains(&needle) {
            return Err(PreflightError::ToolNotInstalled {
                tool: tool.to_string(),
                interpreter: interpreter.to_string(),
            });
        }
        Ok(())
    }

    fn check_paths(&self, spec: &CommandSpec) -> Result<(), PreflightError> {
        let targets = spec.targets();

        if targets.script.as_os_str().is_empty() {
            return Err(PreflightError::ScriptNotSet);
        }
        let script = spec.resolve(&targets.script);
        if !self.fs.is_file(&script) {
            return Err(PreflightError::ScriptMissing(script));
        }

        if let Some(icon) = &targets.icon {
            let icon = spec.resolve(icon);
            if !self.fs.is_file(&icon) {
                return Err(PreflightError::IconMissing(icon));
            }
        }

        if let Some(dir) = &targets.spec_dir {
            let dir = spec.resolve(dir);
            if !self.fs.is_dir(&dir) {
                return Err(PreflightError::SpecDirMissing(dir));
            }
        }

        if !self.fs.is_dir(spec.working_dir()) {
            return Err(PreflightError::WorkingDirMissing(
                spec.working_dir().to_path_buf(),
            ));
        }
        Ok(())
    }
}

impl<P: ProbeRunner, F: FileSystem> Preflight for EnvironmentPreflight<P, F> {
    fn check<'a>(
        &'a self,
        spec: &'a CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<(), PreflightError>> + Send + 'a>> {
        Box::pin(self.run_checks(spec))
    }
}
