#![allow(dead_code)]

use buildvisor::config::{
    BuildSection, ConfigFile, EnvironmentSection, RawConfigFile, SupervisorSection,
};
use buildvisor::types::{ConsoleMode, PackagingMode, ToolLogLevel};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(script: &str) -> Self {
        Self {
            config: RawConfigFile {
                environment: EnvironmentSection::default(),
                build: BuildSection::new(script),
                supervisor: SupervisorSection::default(),
            },
        }
    }

    pub fn interpreter(mut self, interpreter: &str) -> Self {
        self.config.environment.interpreter = interpreter.to_string();
        self
    }

    pub fn tool(mut self, tool: &str) -> Self {
        self.config.environment.tool = tool.to_string();
        self
    }

    pub fn working_dir(mut self, dir: &str) -> Self {
        self.config.environment.working_dir = Some(dir.to_string());
        self
    }

    pub fn build(mut self, f: impl FnOnce(BuildSectionBuilder) -> BuildSectionBuilder) -> Self {
        let section = std::mem::take(&mut self.config.build);
        self.config.build = f(BuildSectionBuilder { build: section }).build;
        self
    }

    pub fn grace_period_secs(mut self, secs: u64) -> Self {
        self.config.supervisor.grace_period_secs = secs;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn finish(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Builder for the `[build]` section, used through `ConfigFileBuilder::build`.
pub struct BuildSectionBuilder {
    build: BuildSection,
}

impl BuildSectionBuilder {
    pub fn mode(mut self, mode: PackagingMode) -> Self {
        self.build.mode = mode;
        self
    }

    pub fn console(mut self, console: ConsoleMode) -> Self {
        self.build.console = console;
        self
    }

    pub fn output_dir(mut self, dir: &str) -> Self {
        self.build.output_dir = Some(dir.to_string());
        self
    }

    pub fn spec_dir(mut self, dir: &str) -> Self {
        self.build.spec_dir = Some(dir.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.build.name = Some(name.to_string());
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.build.icon = Some(icon.to_string());
        self
    }

    pub fn clean(mut self, val: bool) -> Self {
        self.build.clean = val;
        self
    }

    pub fn noconfirm(mut self, val: bool) -> Self {
        self.build.noconfirm = val;
        self
    }

    pub fn log_level(mut self, level: ToolLogLevel) -> Self {
        self.build.log_level = level;
        self
    }

    pub fn hidden_import(mut self, module: &str) -> Self {
        self.build.hidden_imports.push(module.to_string());
        self
    }

    pub fn exclude_module(mut self, module: &str) -> Self {
        self.build.exclude_modules.push(module.to_string());
        self
    }

    pub fn extra_args(mut self, block: &str) -> Self {
        self.build.extra_args = block.to_string();
        self
    }
}
