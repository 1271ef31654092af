// src/command/spec.rs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::command::builder::build_arguments;
use crate::config::ConfigFile;
use crate::errors::PreflightError;
use crate::preflight::Preflight;

/// Paths and package names that must be checked before a build launches.
///
/// All relative paths are resolved against the command's working directory
/// by the pre-flight checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreflightTargets {
    /// Package that must show up in the interpreter's package listing.
    pub tool: String,
    pub script: PathBuf,
    pub icon: Option<PathBuf>,
    pub spec_dir: Option<PathBuf>,
}

/// Immutable description of one external build invocation.
///
/// A `CommandSpec` is not guaranteed to stay valid (files can disappear),
/// so it is re-validated by the supervisor before every execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    executable: String,
    arguments: Vec<String>,
    working_dir: PathBuf,
    targets: PreflightTargets,
    summary: Vec<String>,
}

impl CommandSpec {
    pub fn new(
        executable: impl Into<String>,
        arguments: impl IntoIterator<Item = impl Into<String>>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            working_dir: working_dir.into(),
            targets: PreflightTargets::default(),
            summary: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: PreflightTargets) -> Self {
        self.targets = targets;
        self
    }

    /// Human-readable configuration lines echoed before the build starts.
    pub fn with_summary(mut self, summary: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.summary = summary.into_iter().map(Into::into).collect();
        self
    }

    /// Assemble `<interpreter> -m <tool> <flags...> <script>` from a
    /// validated configuration.
    ///
    /// `base_dir` is the directory of the config file; a relative
    /// `[environment].working_dir` is resolved against it, and an unset one
    /// defaults to it.
    pub fn from_config(cfg: &ConfigFile, base_dir: &Path) -> Self {
        let env = &cfg.environment;
        let build = &cfg.build;

        let working_dir = match env.working_dir.as_deref() {
            Some(dir) if !dir.trim().is_empty() => base_dir.join(dir),
            _ => base_dir.to_path_buf(),
        };

        let mut arguments = vec!["-m".to_string(), env.tool.clone()];
        arguments.extend(build_arguments(build));

        let targets = PreflightTargets {
            tool: env.tool.clone(),
            script: PathBuf::from(&build.script),
            icon: non_blank(build.icon.as_deref()).map(PathBuf::from),
            spec_dir: non_blank(build.spec_dir.as_deref()).map(PathBuf::from),
        };

        let mut summary = vec![
            format!("interpreter: {}", env.interpreter),
            format!("tool: {}", env.tool),
            format!("script: {}", build.script),
            format!("mode: {}", build.mode),
            format!("console: {}", build.console),
        ];
        if let Some(name) = non_blank(build.name.as_deref()) {
            summary.push(format!("name: {name}"));
        }
        if let Some(dir) = non_blank(build.output_dir.as_deref()) {
            summary.push(format!("output directory: {dir}"));
        }
        if let Some(icon) = non_blank(build.icon.as_deref()) {
            summary.push(format!("icon: {icon}"));
        }
        if !build.hidden_imports.is_empty() {
            summary.push(format!("hidden imports: {}", build.hidden_imports.join(", ")));
        }
        if !build.exclude_modules.is_empty() {
            summary.push(format!("excluded modules: {}", build.exclude_modules.join(", ")));
        }

        Self::new(env.interpreter.clone(), arguments, working_dir)
            .with_targets(targets)
            .with_summary(summary)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn targets(&self) -> &PreflightTargets {
        &self.targets
    }

    pub fn summary(&self) -> &[String] {
        &self.summary
    }

    /// Resolve a possibly-relative path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// The full command line, with arguments containing whitespace quoted.
    /// For display only; the process is spawned from the argument vector.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .map(quote_for_display)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the pre-flight checks for this command.
    pub async fn validate(&self, preflight: &dyn Preflight) -> Result<(), PreflightError> {
        preflight.check(self).await
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn quote_for_display(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildSection, EnvironmentSection, SupervisorSection};

    fn config(build: BuildSection, working_dir: Option<&str>) -> ConfigFile {
        let environment = EnvironmentSection {
            interpreter: "python3".into(),
            tool: "PyInstaller".into(),
            working_dir: working_dir.map(str::to_string),
        };
        ConfigFile::new_unchecked(environment, build, SupervisorSection::default())
    }

    #[test]
    fn from_config_prefixes_module_invocation() {
        let spec = CommandSpec::from_config(
            &config(BuildSection::new("app.py"), None),
            Path::new("/proj"),
        );

        assert_eq!(spec.executable(), "python3");
        assert_eq!(
            spec.arguments(),
            ["-m", "PyInstaller", "--onedir", "--console", "app.py"]
        );
        assert_eq!(spec.working_dir(), Path::new("/proj"));
        assert_eq!(spec.targets().tool, "PyInstaller");
        assert_eq!(spec.targets().script, PathBuf::from("app.py"));
    }

    #[test]
    fn relative_working_dir_joins_base_dir() {
        let spec = CommandSpec::from_config(
            &config(BuildSection::new("app.py"), Some("sub")),
            Path::new("/proj"),
        );
        assert_eq!(spec.working_dir(), Path::new("/proj/sub"));
        assert_eq!(spec.resolve(Path::new("app.py")), PathBuf::from("/proj/sub/app.py"));
        assert_eq!(spec.resolve(Path::new("/abs/app.py")), PathBuf::from("/abs/app.py"));
    }

    #[test]
    fn blank_icon_is_not_a_target() {
        let mut build = BuildSection::new("app.py");
        build.icon = Some(" ".into());
        let spec = CommandSpec::from_config(&config(build, None), Path::new("/proj"));
        assert!(spec.targets().icon.is_none());
    }

    #[test]
    fn command_line_quotes_whitespace() {
        let spec = CommandSpec::new("python3", ["-m", "PyInstaller", "my app.py"], "/proj");
        assert_eq!(spec.command_line(), "python3 -m PyInstaller \"my app.py\"");
    }
}
