// src/supervisor/state.rs

//! State shared between the supervisor handle and its worker task.
//!
//! Everything here sits behind one `std::sync::Mutex` that is never held
//! across an `.await`.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};

use crate::events::BuildOutcome;
use crate::exec::GracefulRequest;

/// Lifecycle of the most recent build run.
///
/// Transitions only move forward within a run:
/// `Idle -> Running -> (StoppingByUser ->) Terminal`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SupervisorState {
    #[default]
    Idle,
    Running,
    StoppingByUser,
    Terminal(BuildOutcome),
}

impl SupervisorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Terminal(_))
    }
}

/// Requests sent from `stop` to the worker that owns the child process.
#[derive(Debug)]
pub(crate) enum ControlRequest {
    /// Stop reading output and drop the pipes.
    CloseOutput,
    /// Ask the child to exit gracefully; the reply carries the signal result.
    Terminate(oneshot::Sender<io::Result<GracefulRequest>>),
    /// Kill the child unconditionally.
    Kill,
}

/// The live run: how to reach the worker, plus the stopped-by-user flag.
#[derive(Debug)]
pub(crate) struct RunHandle {
    pub run_id: u64,
    pub pid: Option<u32>,
    /// Shared with the worker so the flag stays visible even after `stop`
    /// released this handle.
    pub stopped_by_user: Arc<AtomicBool>,
    pub control: mpsc::UnboundedSender<ControlRequest>,
    pub exited: watch::Receiver<bool>,
}

#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub state: SupervisorState,
    pub run: Option<RunHandle>,
    /// Id of the run `state` describes.
    pub current_run: u64,
    last_run_id: u64,
}

impl Inner {
    pub fn next_run_id(&mut self) -> u64 {
        self.last_run_id += 1;
        self.last_run_id
    }

    /// Install a freshly accepted run.
    pub fn begin_run(&mut self, handle: RunHandle) {
        self.current_run = handle.run_id;
        self.state = SupervisorState::Running;
        self.run = Some(handle);
    }

    pub fn run_mut(&mut self, run_id: u64) -> Option<&mut RunHandle> {
        self.run.as_mut().filter(|run| run.run_id == run_id)
    }

    /// Drop the handle of `run_id` if it is still tracked.
    pub fn release_run(&mut self, run_id: u64) -> Option<RunHandle> {
        if self.run.as_ref().is_some_and(|run| run.run_id == run_id) {
            self.run.take()
        } else {
            None
        }
    }

    /// Record the terminal outcome of `run_id`.
    ///
    /// Only touches state that still belongs to that run: a newer run that
    /// started after `stop` released this one is left alone.
    pub fn finish_run(&mut self, run_id: u64, outcome: BuildOutcome) {
        self.release_run(run_id);
        if self.current_run == run_id {
            self.state = SupervisorState::Terminal(outcome);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Shared {
    inner: Mutex<Inner>,
}

impl Shared {
    pub fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
