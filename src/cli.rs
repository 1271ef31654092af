// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildvisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildvisor",
    version,
    about = "Run a packaging build (PyInstaller-style) with live output and clean cancellation.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Buildvisor.toml")]
    pub config: String,

    /// Write a starter config file to `--config` and exit.
    #[arg(long, conflicts_with_all = ["dry_run", "check"])]
    pub init: bool,

    /// Parse + validate the config, print the assembled command, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Run only the pre-flight checks (interpreter, tool, files).
    #[arg(long, conflicts_with = "dry_run")]
    pub check: bool,

    /// Override `[supervisor].grace_period_secs`.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub grace_period: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
