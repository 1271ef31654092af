// src/config/model.rs

use serde::{Deserialize, Serialize};

use crate::types::{ConsoleMode, PackagingMode, ToolLogLevel};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [environment]
/// interpreter = "python3"
/// tool = "PyInstaller"
///
/// [build]
/// script = "app.py"
/// mode = "onefile"
/// hidden_imports = ["pkg.plugins"]
///
/// [supervisor]
/// grace_period_secs = 5
/// ```
///
/// Only `[build].script` is mandatory; everything else has a default.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub environment: EnvironmentSection,

    pub build: BuildSection,

    #[serde(default)]
    pub supervisor: SupervisorSection,
}

/// Validated configuration. Obtain one via `ConfigFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub environment: EnvironmentSection,
    pub build: BuildSection,
    pub supervisor: SupervisorSection,
}

impl ConfigFile {
    /// Internal constructor used after validation has passed.
    pub(crate) fn new_unchecked(
        environment: EnvironmentSection,
        build: BuildSection,
        supervisor: SupervisorSection,
    ) -> Self {
        Self {
            environment,
            build,
            supervisor,
        }
    }

    /// Starter configuration written by `buildvisor --init`.
    pub fn template() -> Self {
        let mut build = BuildSection::new("main.py");
        build.output_dir = Some("dist".to_string());
        build.work_dir = Some("build".to_string());
        build.extra_args =
            "# one or more extra arguments per line; text after '#' is ignored\n".to_string();

        Self::new_unchecked(
            EnvironmentSection::default(),
            build,
            SupervisorSection::default(),
        )
    }
}

/// `[environment]` section: how the build tool is invoked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentSection {
    /// Interpreter executable used to run the build tool (`<interpreter> -m <tool>`).
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Module name of the build tool; also the package name looked up in
    /// the interpreter's package listing.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Directory the build runs in. Relative paths are resolved against the
    /// config file's directory; when unset, that directory itself is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

fn default_interpreter() -> String {
    if cfg!(windows) {
        "python".to_string()
    } else {
        "python3".to_string()
    }
}

fn default_tool() -> String {
    "PyInstaller".to_string()
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            tool: default_tool(),
            working_dir: None,
        }
    }
}

/// `[build]` section: everything that ends up on the build tool's command line.
///
/// Relative paths are passed through verbatim, so they are interpreted
/// relative to the working directory, like the build tool itself does.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BuildSection {
    /// Target script, always the last (positional) argument.
    pub script: String,

    #[serde(default)]
    pub mode: PackagingMode,

    #[serde(default)]
    pub console: ConsoleMode,

    /// `--distpath`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,

    /// `--workpath`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,

    /// `--specpath`; must exist before the build starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Must exist before the build starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub clean: bool,

    /// Auto-confirm overwriting the output directory (`--noconfirm`).
    #[serde(default)]
    pub noconfirm: bool,

    #[serde(default)]
    pub log_level: ToolLogLevel,

    #[serde(default)]
    pub hidden_imports: Vec<String>,

    #[serde(default)]
    pub exclude_modules: Vec<String>,

    /// Freeform extra arguments, one or more per line. Blank lines and
    /// `#` comments are ignored.
    #[serde(default)]
    pub extra_args: String,
}

impl BuildSection {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupervisorSection {
    /// Seconds to wait after a graceful termination request before the
    /// build process is killed.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
}

fn default_grace_period_secs() -> u64 {
    5
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period_secs(),
        }
    }
}

impl SupervisorSection {
    pub fn grace_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.grace_period_secs)
    }
}
