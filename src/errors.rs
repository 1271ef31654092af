// src/errors.rs

//! Crate-wide error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildvisorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Pre-flight check failed: {0}")]
    Preflight(#[from] PreflightError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a command failed its pre-flight validation.
///
/// The `Display` text is the human-readable reason shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("interpreter '{interpreter}' is not available: {reason}")]
    InterpreterUnavailable { interpreter: String, reason: String },

    #[error("could not list installed packages with '{interpreter}': {reason}")]
    PackageListingFailed { interpreter: String, reason: String },

    #[error("'{tool}' is not installed for interpreter '{interpreter}'")]
    ToolNotInstalled { tool: String, interpreter: String },

    #[error("no target script selected")]
    ScriptNotSet,

    #[error("target script does not exist: {}", .0.display())]
    ScriptMissing(PathBuf),

    #[error("icon file does not exist: {}", .0.display())]
    IconMissing(PathBuf),

    #[error("spec output directory does not exist: {}", .0.display())]
    SpecDirMissing(PathBuf),

    #[error("working directory does not exist: {}", .0.display())]
    WorkingDirMissing(PathBuf),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildvisorError>;
