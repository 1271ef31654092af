// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod events;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod preflight;
pub mod supervisor;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::command::CommandSpec;
use crate::config::ConfigFile;
use crate::config::loader::{load_and_validate, write_template};
use crate::events::{BuildOutcome, ChannelSink, SupervisorEvent};
use crate::preflight::EnvironmentPreflight;
use crate::supervisor::{BuildSupervisor, SupervisorOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - command assembly and pre-flight checks
/// - the supervisor and its event channel
/// - Ctrl-C handling (stops the running build)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);

    if args.init {
        write_template(&config_path)?;
        println!("wrote starter config to {}", config_path.display());
        return Ok(());
    }

    let cfg = load_and_validate(&config_path)?;
    let spec = CommandSpec::from_config(&cfg, &config_root_dir(&config_path));

    if args.dry_run {
        print_dry_run(&cfg, &spec);
        return Ok(());
    }

    let preflight = Arc::new(EnvironmentPreflight::system());

    if args.check {
        spec.validate(preflight.as_ref()).await?;
        println!("pre-flight checks passed");
        return Ok(());
    }

    let options = SupervisorOptions {
        grace_period: args
            .grace_period
            .map(Duration::from_secs)
            .unwrap_or_else(|| cfg.supervisor.grace_period()),
        ..SupervisorOptions::default()
    };

    let (sink, mut events) = ChannelSink::channel();
    let supervisor = BuildSupervisor::new(Arc::new(sink), preflight, options);

    if !supervisor.execute(spec).await {
        while let Ok(event) = events.try_recv() {
            print_event(&event);
        }
        bail!("build was not started");
    }

    // Ctrl-C → stop the build; the worker still reports the outcome.
    {
        let supervisor = supervisor.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; stopping build");
            supervisor.stop().await;
        });
    }

    let outcome = drain_until_finished(&mut events).await?;
    if outcome.success {
        info!(message = %outcome.message, "build finished");
        Ok(())
    } else {
        bail!(outcome.message)
    }
}

async fn drain_until_finished(
    events: &mut mpsc::UnboundedReceiver<SupervisorEvent>,
) -> Result<BuildOutcome> {
    while let Some(event) = events.recv().await {
        print_event(&event);
        if let SupervisorEvent::Finished(outcome) = event {
            return Ok(outcome);
        }
    }
    bail!("supervisor event channel closed before the build finished")
}

/// Build output goes to stdout; everything else is logged.
fn print_event(event: &SupervisorEvent) {
    match event {
        SupervisorEvent::Output(line) => println!("{line}"),
        SupervisorEvent::Status(status) => info!(%status, "build status"),
        SupervisorEvent::LockChanged(locked) => debug!(locked, "build trigger lock changed"),
        SupervisorEvent::Finished(outcome) => debug!(%outcome, "build outcome"),
    }
}

/// Directory relative paths in the config are resolved against.
///
/// - If the config path has a non-empty parent (e.g. "configs/Buildvisor.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Buildvisor.toml" (parent = ""),
///   we fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Simple dry-run output: print the resolved configuration and command.
fn print_dry_run(cfg: &ConfigFile, spec: &CommandSpec) {
    println!("buildvisor dry-run");
    for line in spec.summary() {
        println!("  {line}");
    }
    println!(
        "  supervisor.grace_period_secs = {}",
        cfg.supervisor.grace_period_secs
    );
    println!();
    println!("working directory: {}", spec.working_dir().display());
    println!("command: {}", spec.command_line());

    debug!("dry-run complete (no execution)");
}
