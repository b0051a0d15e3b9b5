//! Helper functions for settings operations.

use crate::core::config::{Config, ConfigOrchestrator};

use super::error::SettingError;

/// Run `f` against the stored config and persist the result. Handler
/// errors come back unchanged and leave the file untouched; storage failures
/// become `SettingError::ConfigError`.
pub fn mutate_config<F>(store: &ConfigOrchestrator, f: F) -> Result<String, SettingError>
where
    F: FnOnce(&mut Config) -> Result<String, SettingError>,
{
    store.mutate(f).map_err(|err| match err.downcast::<SettingError>() {
        Ok(setting) => *setting,
        Err(other) => SettingError::ConfigError(other.to_string()),
    })
}

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no, 1/0 (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

pub fn success_set(key: &str, display: &str) -> String {
    format!("✅ Set {key} to: {display}")
}

pub fn success_unset(key: &str, default_display: &str) -> String {
    format!("✅ Unset {key} (will use default: {default_display})")
}
