// src/events.rs

//! Observer side of the supervisor.
//!
//! The supervisor reports everything through an [`EventSink`]: output lines,
//! coarse status transitions, the lock/unlock notification for UI triggers,
//! and exactly one terminal [`BuildOutcome`] per execution. UIs that prefer
//! draining a queue can use [`ChannelSink`].

use std::fmt;

use tokio::sync::mpsc;

pub const MSG_COMPLETED: &str = "completed";
pub const MSG_USER_INTERRUPTED: &str = "user interrupted";
pub const LINE_INTERRUPTED: &str = "build interrupted by user";

/// Coarse state labels. The text is rendered verbatim by UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Running,
    Stopping,
    Stopped,
    Finished,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Stopping => "stopping",
            RunStatus::Stopped => "stopped",
            RunStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal result of one build run.
///
/// A user-initiated stop is reported as a success with
/// [`MSG_USER_INTERRUPTED`]; cancellation is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub success: bool,
    pub message: String,
}

impl BuildOutcome {
    pub fn completed() -> Self {
        Self {
            success: true,
            message: MSG_COMPLETED.to_string(),
        }
    }

    pub fn user_interrupted() -> Self {
        Self {
            success: true,
            message: MSG_USER_INTERRUPTED.to_string(),
        }
    }

    pub fn exit_code(code: i32) -> Self {
        Self {
            success: false,
            message: format!("build failed with exit code {code}"),
        }
    }

    pub fn failed(reason: impl fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("build failed: {reason}"),
        }
    }

    pub fn is_user_interrupted(&self) -> bool {
        self.success && self.message == MSG_USER_INTERRUPTED
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.success { "success" } else { "failure" };
        write!(f, "{label}: {}", self.message)
    }
}

/// Callbacks driven by the supervisor.
///
/// Implementations are called from the supervisor's worker task as well as
/// from whichever task calls `execute`/`stop`, so they must be cheap and
/// must not block.
pub trait EventSink: Send + Sync {
    /// One line of combined build output, or a supervisor informational line.
    fn on_output(&self, line: &str);

    fn on_status(&self, status: RunStatus);

    /// Called exactly once per accepted `execute`.
    fn on_finish(&self, outcome: &BuildOutcome);

    /// `true` when a run starts, `false` when it ends. Receiving `false`
    /// twice for one run is possible and harmless.
    fn on_lock_changed(&self, _locked: bool) {}
}

/// One sink callback, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    Output(String),
    Status(RunStatus),
    LockChanged(bool),
    Finished(BuildOutcome),
}

/// Sink that forwards every callback over an unbounded channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SupervisorEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<SupervisorEvent>) -> Self {
        Self { tx }
    }

    /// Convenience: create a sink together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SupervisorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: SupervisorEvent) {
        let _ = self.tx.send(event);
    }
}

impl EventSink for ChannelSink {
    fn on_output(&self, line: &str) {
        self.send(SupervisorEvent::Output(line.to_string()));
    }

    fn on_status(&self, status: RunStatus) {
        self.send(SupervisorEvent::Status(status));
    }

    fn on_finish(&self, outcome: &BuildOutcome) {
        self.send(SupervisorEvent::Finished(outcome.clone()));
    }

    fn on_lock_changed(&self, locked: bool) {
        self.send(SupervisorEvent::LockChanged(locked));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_are_stable() {
        let labels: Vec<_> = [
            RunStatus::Running,
            RunStatus::Stopping,
            RunStatus::Stopped,
            RunStatus::Finished,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(labels, ["running", "stopping", "stopped", "finished"]);
    }

    #[test]
    fn channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.on_status(RunStatus::Running);
        sink.on_output("hello");
        sink.on_lock_changed(false);
        sink.on_finish(&BuildOutcome::completed());

        assert_eq!(rx.try_recv().unwrap(), SupervisorEvent::Status(RunStatus::Running));
        assert_eq!(rx.try_recv().unwrap(), SupervisorEvent::Output("hello".into()));
        assert_eq!(rx.try_recv().unwrap(), SupervisorEvent::LockChanged(false));
        assert_eq!(
            rx.try_recv().unwrap(),
            SupervisorEvent::Finished(BuildOutcome::completed())
        );
    }

    #[test]
    fn outcome_messages() {
        assert!(BuildOutcome::user_interrupted().is_user_interrupted());
        assert!(!BuildOutcome::completed().is_user_interrupted());
        let failed = BuildOutcome::exit_code(2);
        assert!(!failed.success);
        assert!(failed.message.contains('2'));
    }
}
