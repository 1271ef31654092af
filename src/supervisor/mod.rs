// src/supervisor/mod.rs

//! Build-process supervisor.
//!
//! [`BuildSupervisor`] runs at most one external build at a time:
//!
//! - [`BuildSupervisor::execute`] validates a [`CommandSpec`], then launches
//!   it on a dedicated Tokio task and returns immediately.
//! - [`BuildSupervisor::stop`] may be called concurrently from any task. It
//!   marks the run as stopped by the user *before* doing anything else, so
//!   the worker's outcome is race-free, then closes the output pipes, asks
//!   the process to exit, and kills it once the grace period runs out.
//! - Every accepted run finalizes exactly once in the worker: the
//!   interruption notice for user stops, unlock, `finished` status, then
//!   `on_finish`.
//!
//! The worker internals live in [`worker`]; shared state in [`state`].

mod state;
mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::command::CommandSpec;
use crate::events::{EventSink, RunStatus};
use crate::exec::GracefulRequest;
use crate::preflight::Preflight;

pub use state::SupervisorState;

use state::{ControlRequest, RunHandle, Shared};
use worker::{RunContext, run_build};

/// Default wait between the graceful termination request and the kill.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Tuning knobs for [`BuildSupervisor`].
#[derive(Debug, Clone, Copy)]
pub struct SupervisorOptions {
    /// How long `stop` waits for a graceful exit before killing the process.
    pub grace_period: Duration,
    /// How long `stop` waits for the process to disappear after the kill.
    pub kill_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            kill_timeout: Duration::from_secs(5),
        }
    }
}

/// Owns the lifecycle of one external build process at a time.
///
/// Cloning is cheap; clones drive the same supervisor (e.g. one clone for
/// the UI's "build" button and one for a Ctrl-C handler).
#[derive(Clone)]
pub struct BuildSupervisor {
    shared: Arc<Shared>,
    sink: Arc<dyn EventSink>,
    preflight: Arc<dyn Preflight>,
    options: SupervisorOptions,
}

impl std::fmt::Debug for BuildSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSupervisor")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl BuildSupervisor {
    pub fn new(
        sink: Arc<dyn EventSink>,
        preflight: Arc<dyn Preflight>,
        options: SupervisorOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            sink,
            preflight,
            options,
        }
    }

    /// Snapshot of the most recent run's state.
    pub fn state(&self) -> SupervisorState {
        self.shared.lock().state.clone()
    }

    /// Whether a build process is currently tracked as running.
    pub fn is_executing(&self) -> bool {
        self.shared.lock().run.is_some()
    }

    /// Validate `spec` and start it on a background task.
    ///
    /// Returns `false` without launching anything when another run is
    /// active, or when pre-flight validation fails (in which case a single
    /// output line describes the failure). Must be called from within a
    /// Tokio runtime.
    pub async fn execute(&self, spec: CommandSpec) -> bool {
        if self.is_executing() {
            warn!("build already running; ignoring execute request");
            return false;
        }

        if let Err(err) = spec.validate(self.preflight.as_ref()).await {
            warn!(reason = %err, "pre-flight check failed");
            self.sink.on_output(&format!("pre-flight check failed: {err}"));
            return false;
        }

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (exited_tx, exited_rx) = watch::channel(false);
        let stopped_by_user = Arc::new(AtomicBool::new(false));

        let run_id = {
            let mut inner = self.shared.lock();
            // Another execute may have won the race while we were validating.
            if inner.run.is_some() {
                warn!("build started concurrently; ignoring execute request");
                return false;
            }
            let run_id = inner.next_run_id();
            inner.begin_run(RunHandle {
                run_id,
                pid: None,
                stopped_by_user: Arc::clone(&stopped_by_user),
                control: control_tx,
                exited: exited_rx,
            });
            run_id
        };

        info!(run_id, command = %spec.command_line(), "build accepted");
        self.sink.on_status(RunStatus::Running);
        self.sink.on_lock_changed(true);

        tokio::spawn(run_build(RunContext {
            run_id,
            spec,
            shared: Arc::clone(&self.shared),
            sink: Arc::clone(&self.sink),
            stopped_by_user,
            control_rx,
            exited_tx,
        }));

        true
    }

    /// Request the running build to stop.
    ///
    /// Returns `false` when nothing is running. Otherwise waits until the
    /// process is gone (graceful request, then a kill after the grace
    /// period) and returns `true`. If terminating fails, the supervisor is
    /// still forced into a not-running state and unlocked, and `false` is
    /// returned. The terminal `on_finish` always comes from the worker.
    pub async fn stop(&self) -> bool {
        let (run_id, pid, control, mut exited) = {
            let mut inner = self.shared.lock();
            let Some(run) = inner.run.as_mut() else {
                debug!("stop requested but no build is running");
                return false;
            };
            if run.stopped_by_user.swap(true, Ordering::SeqCst) {
                debug!(run_id = run.run_id, "stop already in progress");
                return true;
            }
            let snapshot = (run.run_id, run.pid, run.control.clone(), run.exited.clone());
            inner.state = SupervisorState::StoppingByUser;
            snapshot
        };

        info!(run_id, ?pid, "stop requested by user");
        self.sink.on_status(RunStatus::Stopping);

        match self.terminate(&control, &mut exited).await {
            Ok(()) => true,
            Err(err) => {
                error!(run_id, error = %format!("{err:#}"), "failed to terminate build process");
                let _ = control.send(ControlRequest::Kill);
                self.shared.lock().release_run(run_id);
                self.sink.on_lock_changed(false);
                self.sink.on_status(RunStatus::Stopped);
                false
            }
        }
    }

    async fn terminate(
        &self,
        control: &mpsc::UnboundedSender<ControlRequest>,
        exited: &mut watch::Receiver<bool>,
    ) -> Result<()> {
        // A send error means the worker already finished with the process.
        let _ = control.send(ControlRequest::CloseOutput);

        let (reply_tx, reply_rx) = oneshot::channel();
        let graceful = if control.send(ControlRequest::Terminate(reply_tx)).is_ok() {
            match reply_rx.await {
                Ok(result) => result.context("requesting graceful termination")?,
                Err(_) => GracefulRequest::Sent,
            }
        } else {
            GracefulRequest::Sent
        };

        if graceful == GracefulRequest::Sent
            && wait_for_exit(exited, self.options.grace_period).await
        {
            return Ok(());
        }

        warn!(
            grace_period = ?self.options.grace_period,
            "build process still running after grace period; killing it"
        );
        let _ = control.send(ControlRequest::Kill);

        if !wait_for_exit(exited, self.options.kill_timeout).await {
            bail!(
                "build process did not exit within {:?} after being killed",
                self.options.kill_timeout
            );
        }
        Ok(())
    }
}

/// Wait until the worker reports the process as gone, up to `limit`.
async fn wait_for_exit(exited: &mut watch::Receiver<bool>, limit: Duration) -> bool {
    match timeout(limit, exited.wait_for(|gone| *gone)).await {
        Ok(Ok(_)) => true,
        // The worker dropped its sender, so it is done with the process.
        Ok(Err(_)) => true,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::errors::PreflightError;
    use crate::events::{BuildOutcome, ChannelSink, SupervisorEvent};

    struct AlwaysOk;

    impl Preflight for AlwaysOk {
        fn check<'a>(
            &'a self,
            _spec: &'a CommandSpec,
        ) -> Pin<Box<dyn Future<Output = Result<(), PreflightError>> + Send + 'a>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn supervisor(options: SupervisorOptions) -> (BuildSupervisor, UnboundedReceiver<SupervisorEvent>) {
        let (sink, rx) = ChannelSink::channel();
        (
            BuildSupervisor::new(Arc::new(sink), Arc::new(AlwaysOk), options),
            rx,
        )
    }

    /// Install a run whose "worker" is a task under the test's control.
    fn install_run(
        sup: &BuildSupervisor,
    ) -> (u64, mpsc::UnboundedReceiver<ControlRequest>, watch::Sender<bool>) {
        let (control, control_rx) = mpsc::unbounded_channel();
        let (exited_tx, exited) = watch::channel(false);
        let mut inner = sup.shared.lock();
        let run_id = inner.next_run_id();
        inner.begin_run(RunHandle {
            run_id,
            pid: Some(4242),
            stopped_by_user: Arc::new(AtomicBool::new(false)),
            control,
            exited,
        });
        (run_id, control_rx, exited_tx)
    }

    fn drain(rx: &mut UnboundedReceiver<SupervisorEvent>) -> Vec<SupervisorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn graceful_exit_within_grace_period() {
        let (sup, mut rx) = supervisor(SupervisorOptions::default());
        let (_, mut control_rx, exited_tx) = install_run(&sup);

        let worker = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(request) = control_rx.recv().await {
                match request {
                    ControlRequest::CloseOutput => seen.push("close"),
                    ControlRequest::Terminate(reply) => {
                        seen.push("terminate");
                        let _ = reply.send(Ok(GracefulRequest::Sent));
                        exited_tx.send_replace(true);
                    }
                    ControlRequest::Kill => seen.push("kill"),
                }
            }
            seen
        });

        assert!(sup.stop().await);
        assert_eq!(
            drain(&mut rx),
            vec![SupervisorEvent::Status(RunStatus::Stopping)]
        );
        assert_eq!(sup.state(), SupervisorState::StoppingByUser);

        // The worker owns finalization; simulate it releasing the run.
        sup.shared.lock().finish_run(1, BuildOutcome::user_interrupted());
        drop(sup);
        assert_eq!(worker.await.unwrap(), vec!["close", "terminate"]);
    }

    #[tokio::test]
    async fn termination_failure_forces_not_running() {
        let (sup, mut rx) = supervisor(SupervisorOptions {
            grace_period: Duration::from_millis(20),
            kill_timeout: Duration::from_millis(20),
        });
        let (run_id, mut control_rx, exited_tx) = install_run(&sup);

        // A worker that acknowledges requests but whose process never exits.
        let worker = tokio::spawn(async move {
            let mut kills = 0;
            while let Some(request) = control_rx.recv().await {
                match request {
                    ControlRequest::Terminate(reply) => {
                        let _ = reply.send(Ok(GracefulRequest::Sent));
                    }
                    ControlRequest::Kill => kills += 1,
                    ControlRequest::CloseOutput => {}
                }
            }
            drop(exited_tx);
            kills
        });

        assert!(!sup.stop().await);
        assert!(!sup.is_executing());
        assert_eq!(
            drain(&mut rx),
            vec![
                SupervisorEvent::Status(RunStatus::Stopping),
                SupervisorEvent::LockChanged(false),
                SupervisorEvent::Status(RunStatus::Stopped),
            ]
        );

        // The late worker finalization still lands on this run.
        sup.shared.lock().finish_run(run_id, BuildOutcome::user_interrupted());
        assert_eq!(
            sup.state(),
            SupervisorState::Terminal(BuildOutcome::user_interrupted())
        );

        drop(sup);
        assert_eq!(worker.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn second_stop_returns_true_without_side_effects() {
        let (sup, mut rx) = supervisor(SupervisorOptions::default());
        let (_, mut control_rx, _exited_tx) = install_run(&sup);
        sup.shared
            .lock()
            .run
            .as_ref()
            .unwrap()
            .stopped_by_user
            .store(true, Ordering::SeqCst);

        assert!(sup.stop().await);
        assert!(drain(&mut rx).is_empty());
        assert!(control_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stop_without_run_returns_false() {
        let (sup, mut rx) = supervisor(SupervisorOptions::default());
        assert!(!sup.stop().await);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(sup.state(), SupervisorState::Idle);
    }

    #[tokio::test]
    async fn execute_is_rejected_while_a_run_is_tracked() {
        let (sup, mut rx) = supervisor(SupervisorOptions::default());
        let _run = install_run(&sup);

        assert!(!sup.execute(CommandSpec::new("true", Vec::<String>::new(), ".")).await);
        assert!(drain(&mut rx).is_empty());
    }
}
