use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use buildvisor::exec::{ProbeOutput, ProbeRunner};

/// A scripted interpreter for pre-flight tests that:
/// - records every probe invocation (`program arg arg ...`)
/// - answers `--version` and `-m pip list` from configurable responses.
#[derive(Debug, Clone)]
pub struct FakeProbe {
    version: Arc<Mutex<io::Result<ProbeOutput>>>,
    listing: Arc<Mutex<io::Result<ProbeOutput>>>,
    calls: Arc<Mutex<VecDeque<String>>>,
}

impl FakeProbe {
    /// An interpreter that reports a version and has `packages` installed,
    /// listed in `pip list` format.
    pub fn with_packages(packages: &[&str]) -> Self {
        let mut listing = String::from("Package    Version\n---------- -------\n");
        for pkg in packages {
            listing.push_str(&format!("{pkg} 1.0.0\n"));
        }
        Self {
            version: Arc::new(Mutex::new(Ok(ok_output("Python 3.12.1\n")))),
            listing: Arc::new(Mutex::new(Ok(ok_output(&listing)))),
            calls: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// The interpreter cannot be started at all.
    pub fn missing_interpreter() -> Self {
        let probe = Self::with_packages(&[]);
        *probe.version.lock().unwrap() = Err(io::Error::new(
            io::ErrorKind::NotFound,
            "No such file or directory",
        ));
        probe
    }

    /// The interpreter starts but `--version` exits non-zero.
    pub fn broken_interpreter() -> Self {
        let probe = Self::with_packages(&[]);
        *probe.version.lock().unwrap() = Ok(ProbeOutput {
            success: false,
            stdout: String::new(),
            stderr: "fatal error".to_string(),
        });
        probe
    }

    /// `pip list` exits non-zero.
    pub fn broken_package_listing() -> Self {
        let probe = Self::with_packages(&[]);
        *probe.listing.lock().unwrap() = Ok(ProbeOutput {
            success: false,
            stdout: String::new(),
            stderr: "No module named pip".to_string(),
        });
        probe
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().cloned().collect()
    }
}

fn ok_output(stdout: &str) -> ProbeOutput {
    ProbeOutput {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn clone_result(result: &io::Result<ProbeOutput>) -> io::Result<ProbeOutput> {
    match result {
        Ok(out) => Ok(out.clone()),
        Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
    }
}

impl ProbeRunner for FakeProbe {
    fn run<'a>(
        &'a self,
        program: &'a str,
        args: &'a [&'a str],
    ) -> Pin<Box<dyn Future<Output = io::Result<ProbeOutput>> + Send + 'a>> {
        Box::pin(async move {
            let mut call = program.to_string();
            for arg in args {
                call.push(' ');
                call.push_str(arg);
            }
            self.calls.lock().unwrap().push_back(call);

            match args {
                ["--version"] => clone_result(&self.version.lock().unwrap()),
                ["-m", "pip", "list"] => clone_result(&self.listing.lock().unwrap()),
                other => Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("FakeProbe has no answer for {other:?}"),
                )),
            }
        })
    }
}
