use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the build tool packages the application.
///
/// - `OneDir`: a folder containing the executable and its dependencies
///   (default behaviour).
/// - `OneFile`: a single self-extracting executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PackagingMode {
    #[default]
    OneDir,
    OneFile,
}

impl PackagingMode {
    /// The CLI flag selecting this mode.
    pub fn flag(self) -> &'static str {
        match self {
            PackagingMode::OneDir => "--onedir",
            PackagingMode::OneFile => "--onefile",
        }
    }
}

impl fmt::Display for PackagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingMode::OneDir => f.write_str("onedir"),
            PackagingMode::OneFile => f.write_str("onefile"),
        }
    }
}

/// Config files accept the same spellings as [`FromStr`].
impl TryFrom<String> for PackagingMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for PackagingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "onedir" => Ok(PackagingMode::OneDir),
            "onefile" => Ok(PackagingMode::OneFile),
            other => Err(format!(
                "invalid mode: {other} (expected \"onedir\" or \"onefile\")"
            )),
        }
    }
}

/// Whether the packaged application opens a console window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ConsoleMode {
    #[default]
    Console,
    Windowed,
}

impl ConsoleMode {
    pub fn flag(self) -> &'static str {
        match self {
            ConsoleMode::Console => "--console",
            ConsoleMode::Windowed => "--windowed",
        }
    }
}

impl fmt::Display for ConsoleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleMode::Console => f.write_str("console"),
            ConsoleMode::Windowed => f.write_str("windowed"),
        }
    }
}

/// Config files accept the same spellings as [`FromStr`].
impl TryFrom<String> for ConsoleMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for ConsoleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(ConsoleMode::Console),
            "windowed" | "noconsole" => Ok(ConsoleMode::Windowed),
            other => Err(format!(
                "invalid console mode: {other} (expected \"console\" or \"windowed\")"
            )),
        }
    }
}

/// Log level passed through to the wrapped build tool (`--log-level`).
///
/// Only emitted on the command line when it differs from the tool's own
/// default (`INFO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum ToolLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Deprecation,
    Error,
    Fatal,
}

impl ToolLogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolLogLevel::Trace => "TRACE",
            ToolLogLevel::Debug => "DEBUG",
            ToolLogLevel::Info => "INFO",
            ToolLogLevel::Warn => "WARN",
            ToolLogLevel::Deprecation => "DEPRECATION",
            ToolLogLevel::Error => "ERROR",
            ToolLogLevel::Fatal => "FATAL",
        }
    }

    pub fn is_default(self) -> bool {
        self == ToolLogLevel::default()
    }
}

impl fmt::Display for ToolLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Config files accept the same spellings as [`FromStr`].
impl TryFrom<String> for ToolLogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, <ToolLogLevel as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl FromStr for ToolLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(ToolLogLevel::Trace),
            "DEBUG" => Ok(ToolLogLevel::Debug),
            "INFO" => Ok(ToolLogLevel::Info),
            "WARN" | "WARNING" => Ok(ToolLogLevel::Warn),
            "DEPRECATION" => Ok(ToolLogLevel::Deprecation),
            "ERROR" => Ok(ToolLogLevel::Error),
            "FATAL" | "CRITICAL" => Ok(ToolLogLevel::Fatal),
            other => Err(format!("invalid tool log level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_defaults() {
        assert_eq!(PackagingMode::default(), PackagingMode::OneDir);
        assert_eq!(ConsoleMode::default(), ConsoleMode::Console);
        assert!(ToolLogLevel::Info.is_default());
        assert!(!ToolLogLevel::Debug.is_default());
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("OneFile".parse::<PackagingMode>(), Ok(PackagingMode::OneFile));
        assert_eq!("noconsole".parse::<ConsoleMode>(), Ok(ConsoleMode::Windowed));
        assert_eq!("warning".parse::<ToolLogLevel>(), Ok(ToolLogLevel::Warn));
        assert!("both".parse::<PackagingMode>().is_err());
    }

    #[derive(Debug, Deserialize, Serialize)]
    struct Section {
        mode: PackagingMode,
        console: ConsoleMode,
        log_level: ToolLogLevel,
    }

    #[test]
    fn toml_accepts_the_same_aliases_as_from_str() {
        let section: Section =
            toml::from_str("mode = \"OneFile\"\nconsole = \"noconsole\"\nlog_level = \"critical\"\n")
                .unwrap();
        assert_eq!(section.mode, PackagingMode::OneFile);
        assert_eq!(section.console, ConsoleMode::Windowed);
        assert_eq!(section.log_level, ToolLogLevel::Fatal);
    }

    #[test]
    fn toml_serializes_canonical_names() {
        let section = Section {
            mode: PackagingMode::OneFile,
            console: ConsoleMode::Windowed,
            log_level: ToolLogLevel::Warn,
        };
        let text = toml::to_string(&section).unwrap();
        assert!(text.contains("mode = \"onefile\""), "{text}");
        assert!(text.contains("console = \"windowed\""), "{text}");
        assert!(text.contains("log_level = \"WARN\""), "{text}");
    }

    #[test]
    fn toml_rejects_unknown_spellings() {
        let err = toml::from_str::<Section>("mode = \"both\"\nconsole = \"console\"\nlog_level = \"INFO\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("invalid mode"), "{err}");
    }
}
