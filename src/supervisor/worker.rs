// src/supervisor/worker.rs

//! Asynchronous body of one build run.
//!
//! The worker owns the child process. `stop` never touches the process
//! directly; it sends [`ControlRequest`]s that the worker applies between
//! output lines, so signals are only ever delivered to a child that has not
//! been reaped yet.

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::command::CommandSpec;
use crate::events::{BuildOutcome, EventSink, LINE_INTERRUPTED, RunStatus};
use crate::exec::{GracefulRequest, MergedOutput, merged_output, request_graceful_termination};

use super::state::{ControlRequest, Shared};

/// Everything the worker needs for one run.
pub(crate) struct RunContext {
    pub run_id: u64,
    pub spec: CommandSpec,
    pub shared: Arc<Shared>,
    pub sink: Arc<dyn EventSink>,
    pub stopped_by_user: Arc<AtomicBool>,
    pub control_rx: mpsc::UnboundedReceiver<ControlRequest>,
    pub exited_tx: watch::Sender<bool>,
}

/// Drive one run to its terminal outcome and finalize exactly once:
/// interruption notice (user stops only), unlock, `finished`, `on_finish`.
///
/// The process-driving part runs in its own task so that a panic in there
/// still ends in a normal finalization (with a failure outcome).
pub(crate) async fn run_build(ctx: RunContext) {
    let RunContext {
        run_id,
        spec,
        shared,
        sink,
        stopped_by_user,
        control_rx,
        exited_tx,
    } = ctx;

    let driver = tokio::spawn(drive_process(
        run_id,
        spec,
        Arc::clone(&shared),
        Arc::clone(&sink),
        Arc::clone(&stopped_by_user),
        control_rx,
    ));

    let result = match driver.await {
        Ok(result) => result,
        Err(join_err) => Err(anyhow!("build worker aborted: {join_err}")),
    };

    let outcome = {
        let mut inner = shared.lock();
        let outcome = determine_outcome(stopped_by_user.load(Ordering::SeqCst), &result);
        inner.finish_run(run_id, outcome.clone());
        outcome
    };

    // `stop` waits on this; the run is already released at this point.
    exited_tx.send_replace(true);

    match &result {
        Err(err) if !outcome.success => error!(run_id, error = %err, "build run failed"),
        _ => info!(run_id, success = outcome.success, message = %outcome.message, "build run finished"),
    }

    if outcome.is_user_interrupted() {
        sink.on_output(LINE_INTERRUPTED);
    }
    sink.on_lock_changed(false);
    sink.on_status(RunStatus::Finished);
    sink.on_finish(&outcome);
}

/// Map the raw run result onto the `(success, message)` contract.
///
/// A stop request wins over everything else, including errors and a
/// natural exit that raced with the stop.
pub(crate) fn determine_outcome(stopped_by_user: bool, result: &Result<ExitStatus>) -> BuildOutcome {
    if stopped_by_user {
        return BuildOutcome::user_interrupted();
    }

    match result {
        Ok(status) if status.success() => BuildOutcome::completed(),
        Ok(status) => match status.code() {
            Some(code) => BuildOutcome::exit_code(code),
            None => BuildOutcome::failed(status),
        },
        Err(err) => BuildOutcome::failed(format!("{err:#}")),
    }
}

async fn drive_process(
    run_id: u64,
    spec: CommandSpec,
    shared: Arc<Shared>,
    sink: Arc<dyn EventSink>,
    stopped_by_user: Arc<AtomicBool>,
    mut control_rx: mpsc::UnboundedReceiver<ControlRequest>,
) -> Result<ExitStatus> {
    announce(&spec, sink.as_ref());

    let (output, stdout, stderr) =
        merged_output().context("creating the build output pipe")?;

    let mut child = {
        let mut inner = shared.lock();
        if stopped_by_user.load(Ordering::SeqCst) {
            return Err(anyhow!("stopped before the build process was launched"));
        }

        let child = build_command(&spec, stdout, stderr)
            .spawn()
            .with_context(|| format!("launching '{}'", spec.executable()))?;

        if let Some(run) = inner.run_mut(run_id) {
            run.pid = child.id();
        }
        child
    };

    info!(run_id, pid = ?child.id(), program = spec.executable(), "build process started");

    let mut output = Some(output);

    let status = loop {
        tokio::select! {
            Some(request) = control_rx.recv() => {
                apply_control(run_id, request, &mut child, &mut output);
            }
            line = next_line(&mut output), if output.is_some() => {
                forward_line(run_id, line, &mut output, sink.as_ref());
            }
            status = child.wait(), if output.is_none() => {
                break status.context("waiting for the build process")?;
            }
        }
    };

    info!(run_id, exit_code = ?status.code(), success = status.success(), "build process exited");
    Ok(status)
}

/// Informational lines emitted before the process is launched.
fn announce(spec: &CommandSpec, sink: &dyn EventSink) {
    if !spec.summary().is_empty() {
        sink.on_output("build configuration:");
        for line in spec.summary() {
            sink.on_output(&format!("  {line}"));
        }
    }
    sink.on_output(&format!("working directory: {}", spec.working_dir().display()));
    sink.on_output(&format!("command: {}", spec.command_line()));
}

/// The child's working directory is set on the command itself; the
/// supervisor never changes its own current directory. Both output streams
/// go to the same pipe.
///
/// The returned command owns the parent's copies of the pipe's write end,
/// so it must not outlive the spawn.
fn build_command(spec: &CommandSpec, stdout: Stdio, stderr: Stdio) -> Command {
    let mut cmd = Command::new(spec.executable());
    cmd.args(spec.arguments())
        .current_dir(spec.working_dir())
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true);
    cmd
}

fn apply_control(
    run_id: u64,
    request: ControlRequest,
    child: &mut Child,
    output: &mut Option<MergedOutput>,
) {
    match request {
        ControlRequest::CloseOutput => {
            debug!(run_id, "closing build output");
            *output = None;
        }
        ControlRequest::Terminate(reply) => {
            let result = match child.id() {
                Some(pid) => request_graceful_termination(pid),
                None => Ok(GracefulRequest::Sent),
            };
            debug!(run_id, ?result, "graceful termination requested");
            let _ = reply.send(result);
        }
        ControlRequest::Kill => {
            warn!(run_id, pid = ?child.id(), "killing build process");
            if let Err(err) = child.start_kill() {
                warn!(run_id, error = %err, "failed to kill build process");
            }
        }
    }
}

async fn next_line(output: &mut Option<MergedOutput>) -> std::io::Result<Option<String>> {
    match output {
        Some(output) => output.next_line().await,
        None => std::future::pending().await,
    }
}

fn forward_line(
    run_id: u64,
    line: std::io::Result<Option<String>>,
    output: &mut Option<MergedOutput>,
    sink: &dyn EventSink,
) {
    match line {
        Ok(Some(line)) => sink.on_output(&line),
        Ok(None) => {
            debug!(run_id, "build output closed");
            *output = None;
        }
        Err(err) => {
            warn!(run_id, error = %err, "error reading build output");
            *output = None;
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::process::ExitStatusExt;

    use super::*;

    #[test]
    fn zero_exit_is_completed() {
        let outcome = determine_outcome(false, &Ok(ExitStatus::from_raw(0)));
        assert_eq!(outcome, BuildOutcome::completed());
    }

    #[test]
    fn nonzero_exit_reports_code() {
        let outcome = determine_outcome(false, &Ok(ExitStatus::from_raw(2 << 8)));
        assert!(!outcome.success);
        assert_eq!(outcome.message, "build failed with exit code 2");
    }

    #[test]
    fn signal_exit_is_a_failure() {
        let outcome = determine_outcome(false, &Ok(ExitStatus::from_raw(9)));
        assert!(!outcome.success);
        assert!(outcome.message.starts_with("build failed"));
    }

    #[test]
    fn stop_wins_over_exit_code_and_errors() {
        assert!(determine_outcome(true, &Ok(ExitStatus::from_raw(0))).is_user_interrupted());
        assert!(determine_outcome(true, &Ok(ExitStatus::from_raw(9))).is_user_interrupted());
        assert!(determine_outcome(true, &Err(anyhow!("broken pipe"))).is_user_interrupted());
    }

    #[test]
    fn launch_error_message_includes_cause() {
        let err = anyhow!("No such file or directory").context("launching 'nope'");
        let outcome = determine_outcome(false, &Err(err));
        assert!(!outcome.success);
        assert!(outcome.message.contains("launching 'nope'"));
        assert!(outcome.message.contains("No such file or directory"));
    }
}
