use std::time::Duration;

use buildvisor::events::{BuildOutcome, SupervisorEvent};
use tokio::sync::mpsc::UnboundedReceiver;

/// Collect events until (and including) the `Finished` event.
///
/// Panics if the run does not finish within `limit`.
pub async fn collect_until_finished(
    rx: &mut UnboundedReceiver<SupervisorEvent>,
    limit: Duration,
) -> Vec<SupervisorEvent> {
    let mut events = Vec::new();
    let collect = async {
        while let Some(event) = rx.recv().await {
            let done = matches!(event, SupervisorEvent::Finished(_));
            events.push(event);
            if done {
                return;
            }
        }
        panic!("event channel closed before the run finished");
    };
    tokio::time::timeout(limit, collect)
        .await
        .expect("run did not finish in time");
    events
}

/// Wait for an output line equal to `line`, returning every event seen
/// so far (including the matching one).
pub async fn wait_for_output(
    rx: &mut UnboundedReceiver<SupervisorEvent>,
    line: &str,
    limit: Duration,
) -> Vec<SupervisorEvent> {
    let mut events = Vec::new();
    let wait = async {
        while let Some(event) = rx.recv().await {
            let hit = matches!(&event, SupervisorEvent::Output(l) if l == line);
            events.push(event);
            if hit {
                return;
            }
        }
        panic!("event channel closed before output line {line:?}");
    };
    tokio::time::timeout(limit, wait)
        .await
        .unwrap_or_else(|_| panic!("output line {line:?} did not appear in time"));
    events
}

/// All `Finished` outcomes in `events`.
pub fn outcomes(events: &[SupervisorEvent]) -> Vec<BuildOutcome> {
    events
        .iter()
        .filter_map(|e| match e {
            SupervisorEvent::Finished(outcome) => Some(outcome.clone()),
            _ => None,
        })
        .collect()
}

/// All output lines in `events`.
pub fn output_lines(events: &[SupervisorEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SupervisorEvent::Output(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

/// All lock notifications in `events`, in order.
pub fn lock_changes(events: &[SupervisorEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|e| match e {
            SupervisorEvent::LockChanged(locked) => Some(*locked),
            _ => None,
        })
        .collect()
}
