// src/config/validate.rs

use crate::config::model::{BuildSection, ConfigFile, RawConfigFile};
use crate::errors::{BuildvisorError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BuildvisorError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.environment,
            raw.build,
            raw.supervisor,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_environment(cfg)?;
    validate_build(&cfg.build)?;
    validate_supervisor(cfg)?;
    Ok(())
}

fn validate_environment(cfg: &RawConfigFile) -> Result<()> {
    if cfg.environment.interpreter.trim().is_empty() {
        return Err(config_error("[environment].interpreter must not be empty"));
    }
    if cfg.environment.tool.trim().is_empty() {
        return Err(config_error("[environment].tool must not be empty"));
    }
    Ok(())
}

fn validate_build(build: &BuildSection) -> Result<()> {
    if build.script.trim().is_empty() {
        return Err(config_error("[build].script must name the target script"));
    }

    if let Some(name) = &build.name {
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(config_error(format!(
                "[build].name must be a plain file name (got '{name}')"
            )));
        }
    }

    check_module_list("hidden_imports", &build.hidden_imports)?;
    check_module_list("exclude_modules", &build.exclude_modules)?;
    Ok(())
}

/// Every entry becomes exactly one flag value, so it must be a single token.
fn check_module_list(field: &str, entries: &[String]) -> Result<()> {
    for (idx, entry) in entries.iter().enumerate() {
        if entry.trim().is_empty() {
            return Err(config_error(format!(
                "[build].{field}[{idx}] must not be empty"
            )));
        }
        if entry.split_whitespace().count() > 1 {
            return Err(config_error(format!(
                "[build].{field}[{idx}] must not contain whitespace (got '{entry}')"
            )));
        }
    }
    Ok(())
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.supervisor.grace_period_secs == 0 {
        return Err(config_error(
            "[supervisor].grace_period_secs must be >= 1 (got 0)",
        ));
    }
    Ok(())
}

fn config_error(msg: impl Into<String>) -> BuildvisorError {
    BuildvisorError::ConfigError(msg.into())
}
