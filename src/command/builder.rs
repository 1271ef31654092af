// src/command/builder.rs

//! Deterministic assembly of the build tool's argument list.
//!
//! The order is part of the wrapped tool's CLI contract: every flag comes
//! before the positional script argument, which is always the last token.

use crate::command::extra_args::tokenize_extra_args;
use crate::config::BuildSection;

/// Build the ordered argument list for `build`, excluding the interpreter
/// and `-m <tool>` prefix.
///
/// Order:
/// 1. packaging mode (`--onedir` by default, or `--onefile`)
/// 2. console visibility (`--console` or `--windowed`)
/// 3. `--distpath`, `--workpath`, `--specpath`
/// 4. `--name`, `--icon`
/// 5. `--clean`, `--noconfirm`
/// 6. `--log-level` when not the tool's default
/// 7. one `--hidden-import` per entry, then one `--exclude-module` per entry
/// 8. extra arguments
/// 9. the script path
pub fn build_arguments(build: &BuildSection) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    args.push(build.mode.flag().to_string());
    args.push(build.console.flag().to_string());

    push_opt(&mut args, "--distpath", build.output_dir.as_deref());
    push_opt(&mut args, "--workpath", build.work_dir.as_deref());
    push_opt(&mut args, "--specpath", build.spec_dir.as_deref());
    push_opt(&mut args, "--name", build.name.as_deref());
    push_opt(&mut args, "--icon", build.icon.as_deref());

    if build.clean {
        args.push("--clean".to_string());
    }
    if build.noconfirm {
        args.push("--noconfirm".to_string());
    }

    if !build.log_level.is_default() {
        args.push("--log-level".to_string());
        args.push(build.log_level.as_str().to_string());
    }

    for module in &build.hidden_imports {
        args.push("--hidden-import".to_string());
        args.push(module.clone());
    }
    for module in &build.exclude_modules {
        args.push("--exclude-module".to_string());
        args.push(module.clone());
    }

    args.extend(tokenize_extra_args(&build.extra_args));

    args.push(build.script.clone());
    args
}

/// Push `flag value` if `value` is set and non-blank.
fn push_opt(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConsoleMode, PackagingMode, ToolLogLevel};

    #[test]
    fn minimal_build_defaults_to_onedir_console() {
        let args = build_arguments(&BuildSection::new("app.py"));
        assert_eq!(args, vec!["--onedir", "--console", "app.py"]);
    }

    #[test]
    fn onefile_windowed_replaces_defaults() {
        let mut build = BuildSection::new("app.py");
        build.mode = PackagingMode::OneFile;
        build.console = ConsoleMode::Windowed;

        let args = build_arguments(&build);
        assert!(args.contains(&"--onefile".to_string()));
        assert!(args.contains(&"--windowed".to_string()));
        assert!(!args.contains(&"--onedir".to_string()));
        assert!(!args.contains(&"--console".to_string()));
    }

    #[test]
    fn full_build_follows_flag_order() {
        let mut build = BuildSection::new("src/app.py");
        build.output_dir = Some("dist".into());
        build.work_dir = Some("build".into());
        build.spec_dir = Some("specs".into());
        build.name = Some("MyApp".into());
        build.icon = Some("app.ico".into());
        build.clean = true;
        build.noconfirm = true;
        build.log_level = ToolLogLevel::Debug;
        build.hidden_imports = vec!["pkg.a".into(), "pkg.b".into()];
        build.exclude_modules = vec!["tkinter".into()];
        build.extra_args = "--noupx # smaller binaries off\n".into();

        let args = build_arguments(&build);
        assert_eq!(
            args,
            vec![
                "--onedir", "--console",
                "--distpath", "dist",
                "--workpath", "build",
                "--specpath", "specs",
                "--name", "MyApp",
                "--icon", "app.ico",
                "--clean", "--noconfirm",
                "--log-level", "DEBUG",
                "--hidden-import", "pkg.a",
                "--hidden-import", "pkg.b",
                "--exclude-module", "tkinter",
                "--noupx",
                "src/app.py",
            ]
        );
    }

    #[test]
    fn default_log_level_is_not_emitted() {
        let mut build = BuildSection::new("app.py");
        build.log_level = ToolLogLevel::Info;
        assert!(!build_arguments(&build).contains(&"--log-level".to_string()));
    }

    #[test]
    fn blank_optional_values_are_skipped() {
        let mut build = BuildSection::new("app.py");
        build.name = Some("   ".into());
        build.output_dir = Some(String::new());
        assert_eq!(build_arguments(&build), vec!["--onedir", "--console", "app.py"]);
    }
}
