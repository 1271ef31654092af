// tests/command_args_property.rs

use proptest::prelude::*;

use buildvisor::command::{CommandSpec, build_arguments, tokenize_extra_args};
use buildvisor::types::{ConsoleMode, PackagingMode};
use buildvisor_test_utils::builders::ConfigFileBuilder;

fn module_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}(\\.[a-z][a-z0-9_]{0,8}){0,2}"
}

fn extra_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "# [a-z ]{0,12}",
        "--[a-z]{2,8}( [a-z]{1,6})?( # [a-z ]{0,8})?",
    ]
}

proptest! {
    #[test]
    fn script_is_always_the_last_argument(
        script in "[a-z]{1,8}\\.py",
        onefile in any::<bool>(),
        windowed in any::<bool>(),
        hidden in proptest::collection::vec(module_name(), 0..4),
        excluded in proptest::collection::vec(module_name(), 0..4),
        extra in proptest::collection::vec(extra_line(), 0..6),
    ) {
        let mode = if onefile { PackagingMode::OneFile } else { PackagingMode::OneDir };
        let console = if windowed { ConsoleMode::Windowed } else { ConsoleMode::Console };
        let cfg = ConfigFileBuilder::new(&script)
            .build(|mut b| {
                b = b.mode(mode).console(console).extra_args(&extra.join("\n"));
                for m in &hidden {
                    b = b.hidden_import(m);
                }
                for m in &excluded {
                    b = b.exclude_module(m);
                }
                b
            })
            .finish();

        let args = build_arguments(&cfg.build);

        prop_assert_eq!(args.last(), Some(&script));
        prop_assert_eq!(args[0].as_str(), mode.flag());
        prop_assert_eq!(args[1].as_str(), console.flag());

        let mode_flags = args.iter().filter(|a| *a == "--onedir" || *a == "--onefile").count();
        prop_assert_eq!(mode_flags, 1);

        let hidden_flags = args.iter().filter(|a| *a == "--hidden-import").count();
        prop_assert_eq!(hidden_flags, hidden.len());
        let exclude_flags = args.iter().filter(|a| *a == "--exclude-module").count();
        prop_assert_eq!(exclude_flags, excluded.len());

        // Every flag value follows its flag directly.
        for (i, arg) in args.iter().enumerate() {
            if arg == "--hidden-import" || arg == "--exclude-module" {
                prop_assert!(i + 1 < args.len() - 1);
            }
        }
    }

    #[test]
    fn comment_and_blank_lines_contribute_no_tokens(
        lines in proptest::collection::vec(
            prop_oneof![Just(String::new()), "[ \t]{0,4}", "[ \t]{0,2}#[a-z #-]{0,12}"],
            0..8,
        )
    ) {
        prop_assert!(tokenize_extra_args(&lines.join("\n")).is_empty());
    }

    #[test]
    fn extra_tokens_never_contain_whitespace_or_comments(
        extra in proptest::collection::vec(extra_line(), 0..8),
    ) {
        for token in tokenize_extra_args(&extra.join("\n")) {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
            prop_assert!(!token.starts_with('#'));
        }
    }
}

#[test]
fn default_config_produces_the_minimal_command() {
    let cfg = ConfigFileBuilder::new("app.py").finish();
    let spec = CommandSpec::from_config(&cfg, "/proj".as_ref());

    assert_eq!(
        spec.arguments(),
        ["-m", "PyInstaller", "--onedir", "--console", "app.py"]
    );
    assert_eq!(spec.working_dir(), std::path::Path::new("/proj"));
}
