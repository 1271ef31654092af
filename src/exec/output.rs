// src/exec/output.rs

//! One pipe shared by a child's stdout and stderr.
//!
//! Both standard streams of the child get the write end of the same OS pipe,
//! so lines arrive in exactly the order the child wrote them. The parent
//! reads the other end as a single line stream.

use std::io;
use std::process::Stdio;

/// Parent side of a merged output pipe.
#[derive(Debug)]
pub struct MergedOutput {
    reader: imp::Reader,
}

impl MergedOutput {
    /// Next line of output, or `None` once every writer has closed the pipe.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.reader.next_line().await
    }
}

/// Create the pipe: the reader for the parent, plus `(stdout, stderr)`
/// handles for the child's command.
///
/// The returned `Stdio` values must be dropped (together with the command
/// they were moved into) right after spawning, otherwise EOF never arrives.
/// Must be called from within a Tokio runtime.
pub fn merged_output() -> io::Result<(MergedOutput, Stdio, Stdio)> {
    let (reader, writer) = io::pipe()?;
    let stderr = Stdio::from(writer.try_clone()?);
    let stdout = Stdio::from(writer);
    let output = MergedOutput {
        reader: imp::Reader::new(reader)?,
    };
    Ok((output, stdout, stderr))
}

#[cfg(unix)]
mod imp {
    use std::io::{self, PipeReader};
    use std::os::fd::OwnedFd;

    use tokio::io::{AsyncBufReadExt, BufReader, Lines};
    use tokio::net::unix::pipe;

    /// Non-blocking reader registered with the Tokio reactor; dropping it
    /// closes the read end immediately.
    #[derive(Debug)]
    pub(super) struct Reader {
        lines: Lines<BufReader<pipe::Receiver>>,
    }

    impl Reader {
        pub(super) fn new(reader: PipeReader) -> io::Result<Self> {
            let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;
            Ok(Self {
                lines: BufReader::new(receiver).lines(),
            })
        }

        pub(super) async fn next_line(&mut self) -> io::Result<Option<String>> {
            self.lines.next_line().await
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io::{self, BufRead, BufReader, PipeReader};

    use tokio::sync::mpsc;

    /// Blocking reader on Tokio's blocking pool, forwarding lines over a
    /// channel.
    #[derive(Debug)]
    pub(super) struct Reader {
        rx: mpsc::UnboundedReceiver<io::Result<String>>,
    }

    impl Reader {
        pub(super) fn new(reader: PipeReader) -> io::Result<Self> {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::task::spawn_blocking(move || {
                for line in BufReader::new(reader).lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            });
            Ok(Self { rx })
        }

        pub(super) async fn next_line(&mut self) -> io::Result<Option<String>> {
            self.rx.recv().await.transpose()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stdout_and_stderr_share_one_ordered_stream() {
        let (mut output, stdout, stderr) = merged_output().unwrap();
        let mut child = tokio::process::Command::new("sh")
            .args(["-c", "echo a; echo b >&2; echo c; echo d >&2"])
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .unwrap();

        let mut lines = Vec::new();
        while let Some(line) = output.next_line().await.unwrap() {
            lines.push(line);
        }
        assert!(child.wait().await.unwrap().success());
        assert_eq!(lines, ["a", "b", "c", "d"]);
    }
}
