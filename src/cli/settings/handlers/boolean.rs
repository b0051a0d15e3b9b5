//! Boolean setting handlers for on/off settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{format_bool, parse_bool, success_set, success_unset};
use crate::cli::settings::SettingHandler;
use crate::core::config::Config;

/// Data-driven handler for boolean (on/off) settings.
pub struct BooleanHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<bool>,
    set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: self.hint,
                example: self.example,
            });
        }

        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        (self.set_field)(config, Some(value));
        Ok(success_set(self.key, format_bool(value)))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        success_unset(self.key, self.default_display)
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

/// Create a handler for the `box-per-message` setting.
pub fn box_per_message_handler() -> BooleanHandler {
    BooleanHandler {
        key: "box-per-message",
        hint: "To draw a background box behind each message, specify on or off:",
        example: "viewer-debug set box-per-message on",
        default_display: "off",
        get: |c| c.box_per_message,
        set_field: |c, v| c.box_per_message = v,
    }
}

/// Create a handler for the `message-spacing` setting.
pub fn message_spacing_handler() -> BooleanHandler {
    BooleanHandler {
        key: "message-spacing",
        hint: "To set the gap between console messages, specify on or off:",
        example: "viewer-debug set message-spacing off",
        default_display: "on",
        get: |c| c.message_spacing,
        set_field: |c, v| c.message_spacing = v,
    }
}

/// Create a handler for the `texture-view` setting.
pub fn texture_view_handler() -> BooleanHandler {
    BooleanHandler {
        key: "texture-view",
        hint: "To show the texture view on startup, specify on or off:",
        example: "viewer-debug set texture-view on",
        default_display: "off",
        get: |c| c.texture_view,
        set_field: |c, v| c.texture_view = v,
    }
}
