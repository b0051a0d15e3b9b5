use super::*;
use crate::console::{DEFAULT_MAX_LINES, MIN_MAX_LINES};
use crate::core::color::Rgba;
use crate::core::metrics::FontSize;
use std::fs;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn sample_config() -> Config {
    Config {
        max_lines: Some(64),
        persist_time: Some(12.5),
        font_size: Some(FontSize::Monospace),
        background: Some("#102030".to_string()),
        background_opacity: Some(0.4),
        box_per_message: Some(true),
        message_spacing: Some(false),
        texture_view: Some(true),
    }
}

#[test]
fn save_and_load_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("config.toml");

    let config = sample_config();
    config.save_to_path(&path).expect("save");
    assert_eq!(Config::load_from_path(&path).expect("load"), config);
}

#[test]
fn saved_file_uses_kebab_case_keys() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    sample_config().save_to_path(&path).expect("save");

    let contents = fs::read_to_string(&path).expect("read");
    assert!(contents.contains("max-lines = 64"), "contents: {contents}");
    assert!(contents.contains("font-size = \"monospace\""), "contents: {contents}");
    assert!(contents.contains("box-per-message = true"), "contents: {contents}");
}

#[test]
fn missing_file_loads_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config::load_from_path(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(config, Config::default());
}

#[test]
fn malformed_file_reports_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "max-lines = \"lots\"").expect("write");

    match Config::load_from_path(&path) {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn console_settings_apply_defaults_and_floors() {
    let defaults = Config::default().console_settings();
    assert_eq!(defaults.max_lines, DEFAULT_MAX_LINES);
    assert_eq!(defaults.persist_time, 0.0);
    assert!(!defaults.disable_message_spacing);

    let config = Config {
        max_lines: Some(1),
        persist_time: Some(-4.0),
        message_spacing: Some(false),
        ..Config::default()
    };
    let settings = config.console_settings();
    assert_eq!(settings.max_lines, MIN_MAX_LINES);
    assert_eq!(settings.persist_time, 0.0);
    assert!(settings.disable_message_spacing);
}

#[test]
fn unparsable_background_falls_back_to_black() {
    let config = Config {
        background: Some("plaid".to_string()),
        background_opacity: Some(3.0),
        ..Config::default()
    };
    assert_eq!(config.background_color(), Rgba::BLACK);
    assert_eq!(config.background_opacity(), 1.0);
}

#[test]
fn theme_carries_console_background() {
    let config = Config {
        background: Some("#ff0000".to_string()),
        background_opacity: Some(0.5),
        ..Config::default()
    };
    let background = config.theme().console_background.get();
    assert_eq!(background.to_rgb8(), (255, 0, 0));
    assert!((background.a - 0.5).abs() < 1e-6);
}

#[test]
fn orchestrator_mutation_persists() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let store = ConfigOrchestrator::new(path.clone());

    store
        .mutate(|config| -> Result<(), ConfigError> {
            config.max_lines = Some(99);
            Ok(())
        })
        .expect("mutate");

    assert_eq!(Config::load_from_path(&path).expect("load").max_lines, Some(99));
    assert_eq!(store.load_with_cache().expect("cached").max_lines, Some(99));
}

#[test]
fn orchestrator_skips_save_when_mutation_fails() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let store = ConfigOrchestrator::new(path.clone());

    let result = store.mutate(|config| -> Result<(), ConfigError> {
        config.max_lines = Some(7);
        Err(ConfigError::NoConfigDir)
    });

    assert!(result.is_err());
    assert!(!path.exists());
    assert_eq!(store.load_with_cache().expect("load").max_lines, None);
}

#[test]
fn orchestrator_notices_external_edits() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    let store = ConfigOrchestrator::new(path.clone());

    Config {
        max_lines: Some(10),
        ..Config::default()
    }
    .save_to_path(&path)
    .expect("save");
    assert_eq!(store.load_with_cache().expect("load").max_lines, Some(10));

    // Some filesystems only record modification times to the second.
    thread::sleep(Duration::from_millis(1100));
    fs::write(&path, "max-lines = 20\n").expect("write");
    assert_eq!(store.load_with_cache().expect("reload").max_lines, Some(20));
}

#[test]
fn path_display_leaves_relative_paths_alone() {
    assert_eq!(path_display("config/viewer.toml"), "config/viewer.toml");
}
