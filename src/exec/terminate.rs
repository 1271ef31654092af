// src/exec/terminate.rs

//! Platform-specific graceful termination requests.
//!
//! Forced termination goes through `tokio::process::Child::start_kill`,
//! which already works everywhere; only the graceful step needs platform
//! code.

use std::io;

/// Result of asking a process to shut down gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracefulRequest {
    /// The signal was delivered (or the process was already gone).
    Sent,
    /// The platform has no graceful termination signal for child processes.
    Unsupported,
}

/// Send `SIGTERM` to `pid`.
///
/// A process that has already exited (`ESRCH`) counts as delivered: the
/// caller only cares that the process is on its way out.
#[cfg(unix)]
pub fn request_graceful_termination(pid: u32) -> io::Result<GracefulRequest> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid pid {pid}")))?;

    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(GracefulRequest::Sent),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
pub fn request_graceful_termination(_pid: u32) -> io::Result<GracefulRequest> {
    Ok(GracefulRequest::Unsupported)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sigterm_stops_a_sleeping_process() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();

        assert_eq!(request_graceful_termination(pid).unwrap(), GracefulRequest::Sent);

        let status = tokio::time::timeout(std::time::Duration::from_secs(5), child.wait())
            .await
            .expect("process should exit after SIGTERM")
            .unwrap();
        assert!(!status.success());
    }
}
