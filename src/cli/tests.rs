use super::*;
use crate::cli::settings::SettingHandler;
use std::fs;
use tempfile::TempDir;

mod test_helpers {
    use super::*;

    pub(super) fn parse_args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv)
            .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
    }

    pub(super) fn temp_store() -> (TempDir, ConfigOrchestrator) {
        let dir = TempDir::new().expect("temp dir");
        let store = ConfigOrchestrator::new(dir.path().join("config.toml"));
        (dir, store)
    }

    pub(super) fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }
}

use test_helpers::{parse_args, strings, temp_store};

#[test]
fn no_subcommand_defaults_to_run() {
    let args = parse_args(&["viewer-debug"]);
    assert!(args.command.is_none());
    assert!(args.log.is_none());
}

#[test]
fn run_flags_parse() {
    let argv = [
        "viewer-debug",
        "run",
        "--max-lines",
        "12",
        "--persist-time",
        "8.5",
        "--font",
        "monospace",
        "--texture-view",
    ];
    match parse_args(&argv).command {
        Some(Commands::Run(run)) => {
            assert_eq!(run.max_lines, Some(12));
            assert_eq!(run.persist_time, Some(8.5));
            assert_eq!(run.font, Some(FontSize::Monospace));
            assert!(run.texture_view);
            assert_eq!(run.textures, 40);
            assert_eq!(run.period_ms, 400);
        }
        _ => panic!("expected run subcommand for argv={argv:?}"),
    }
}

#[test]
fn default_run_args_match_clap_defaults() {
    let parsed = match parse_args(&["viewer-debug", "run"]).command {
        Some(Commands::Run(run)) => run,
        _ => panic!("expected run subcommand"),
    };
    assert_eq!(parsed, RunArgs::default_for_cli());
}

#[test]
fn log_flag_is_global() {
    let args = parse_args(&["viewer-debug", "show", "--log", "debug.log"]);
    assert_eq!(args.log, Some(PathBuf::from("debug.log")));
    assert!(matches!(args.command, Some(Commands::Show)));
}

#[test]
fn wrap_collects_trailing_words() {
    let argv = ["viewer-debug", "wrap", "--width", "80", "hello", "big", "world"];
    match parse_args(&argv).command {
        Some(Commands::Wrap { width, font, text }) => {
            assert_eq!(width, 80.0);
            assert_eq!(font, FontSize::Small);
            assert_eq!(text, strings(&["hello", "big", "world"]));
        }
        _ => panic!("expected wrap subcommand for argv={argv:?}"),
    }
}

#[test]
fn wrap_requires_text() {
    assert!(Args::try_parse_from(["viewer-debug", "wrap", "--width", "80"]).is_err());
}

#[test]
fn set_accepts_hyphenated_values() {
    let argv = ["viewer-debug", "set", "persist-time", "-1"];
    match parse_args(&argv).command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key, "persist-time");
            assert_eq!(value, strings(&["-1"]));
        }
        _ => panic!("expected set subcommand for argv={argv:?}"),
    }
}

#[test]
fn run_overrides_replace_file_values() {
    let mut config = Config {
        max_lines: Some(100),
        persist_time: Some(3.0),
        background: Some("navy".to_string()),
        ..Config::default()
    };
    let run = RunArgs {
        max_lines: Some(20),
        font: Some(FontSize::Large),
        texture_view: true,
        ..RunArgs::default_for_cli()
    };
    run.apply_to(&mut config);

    assert_eq!(config.max_lines, Some(20));
    assert_eq!(config.persist_time, Some(3.0));
    assert_eq!(config.font_size, Some(FontSize::Large));
    assert_eq!(config.texture_view, Some(true));
    assert_eq!(config.background.as_deref(), Some("navy"));
}

#[test]
fn absent_texture_view_flag_keeps_config_value() {
    let mut config = Config {
        texture_view: Some(true),
        ..Config::default()
    };
    RunArgs::default_for_cli().apply_to(&mut config);
    assert_eq!(config.texture_view, Some(true));
}

#[test]
fn wrap_rows_break_at_words() {
    // 10 cells of 8px each.
    let rows = wrap_rows("the quick brown fox", 80.0, FontSize::Small);
    assert_eq!(rows, strings(&["the quick ", "brown fox"]));
}

#[test]
fn set_then_show_reports_the_value() {
    let (_dir, store) = temp_store();
    let registry = SettingRegistry::new();

    let message = set_setting(&registry, &store, "max-lines", &strings(&["80"])).expect("set");
    assert_eq!(message, "✅ Set max-lines to: 80");

    let config = store.load_with_cache().expect("load");
    assert_eq!(config.max_lines, Some(80));
    let lines = show_lines(&registry, &config);
    assert_eq!(lines.len(), registry.keys_display_order().len());
    assert_eq!(lines[0], "  max-lines: 80");
}

#[test]
fn unset_restores_the_default() {
    let (_dir, store) = temp_store();
    let registry = SettingRegistry::new();
    set_setting(&registry, &store, "box-per-message", &strings(&["yes"])).expect("set");
    assert_eq!(store.load_with_cache().expect("load").box_per_message, Some(true));

    let message = unset_setting(&registry, &store, "box-per-message").expect("unset");
    assert!(message.contains("default: off"), "message: {message}");
    assert_eq!(store.load_with_cache().expect("load").box_per_message, None);
}

#[test]
fn unknown_key_is_rejected() {
    let (dir, store) = temp_store();
    let registry = SettingRegistry::new();
    let err = set_setting(&registry, &store, "default-model", &strings(&["x"])).unwrap_err();
    assert_eq!(err, SettingError::UnknownKey("default-model".to_string()));
    assert!(!dir.path().join("config.toml").exists());

    let err = unset_setting(&registry, &store, "nope").unwrap_err();
    assert_eq!(err, SettingError::UnknownKey("nope".to_string()));
}

#[test]
fn invalid_value_leaves_the_file_untouched() {
    let (dir, store) = temp_store();
    let registry = SettingRegistry::new();
    set_setting(&registry, &store, "background-opacity", &strings(&["0.5"])).expect("set");
    let path = dir.path().join("config.toml");
    let before = fs::read_to_string(&path).expect("read");

    let err = set_setting(&registry, &store, "background-opacity", &strings(&["1.5"])).unwrap_err();
    assert!(matches!(
        err,
        SettingError::InvalidValue {
            key: "background-opacity",
            ..
        }
    ));
    assert_eq!(fs::read_to_string(&path).expect("read"), before);
}

#[test]
fn missing_value_reports_an_example() {
    let (_dir, store) = temp_store();
    let registry = SettingRegistry::new();
    let err = set_setting(&registry, &store, "texture-view", &[]).unwrap_err();
    match err {
        SettingError::MissingArgs { example, .. } => {
            assert_eq!(example, "viewer-debug set texture-view on")
        }
        other => panic!("expected MissingArgs, got {other:?}"),
    }
}

#[test]
fn registry_lists_every_key_once_in_order() {
    let registry = SettingRegistry::new();
    assert_eq!(
        registry.keys_display_order(),
        &[
            "max-lines",
            "persist-time",
            "font-size",
            "background",
            "background-opacity",
            "box-per-message",
            "message-spacing",
            "texture-view",
        ]
    );
    for key in registry.keys_display_order() {
        let handler: &dyn SettingHandler = registry.get(key).expect("handler");
        assert_eq!(handler.key(), *key);
    }
}

#[test]
fn value_handlers_validate_input() {
    let registry = SettingRegistry::new();
    let mut config = Config::default();

    let max_lines = registry.get("max-lines").expect("handler");
    max_lines.set(&strings(&["2"]), &mut config).expect("set");
    assert_eq!(config.max_lines, Some(crate::console::MIN_MAX_LINES));

    let font = registry.get("font-size").expect("handler");
    font.set(&strings(&["LARGE"]), &mut config).expect("set");
    assert_eq!(config.font_size, Some(FontSize::Large));
    assert!(font.set(&strings(&["huge"]), &mut config).is_err());

    let background = registry.get("background").expect("handler");
    background.set(&strings(&["#102030"]), &mut config).expect("set");
    assert_eq!(config.background.as_deref(), Some("#102030"));
    assert!(background.set(&strings(&["not-a-colour"]), &mut config).is_err());

    let persist = registry.get("persist-time").expect("handler");
    assert!(persist.set(&strings(&["-1"]), &mut config).is_err());
    persist.set(&strings(&["0"]), &mut config).expect("set");
    assert_eq!(config.persist_time, Some(0.0));
}

#[test]
fn boolean_handlers_reject_garbage() {
    let registry = SettingRegistry::new();
    let mut config = Config::default();
    let spacing = registry.get("message-spacing").expect("handler");
    assert_eq!(
        spacing.set(&strings(&["maybe"]), &mut config),
        Err(SettingError::InvalidBoolean("maybe".to_string()))
    );
    spacing.set(&strings(&["off"]), &mut config).expect("set");
    assert_eq!(spacing.format(&config), "  message-spacing: off");
}
