//! Handlers for numeric, colour and enumerated settings.

use std::str::FromStr;

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, success_unset};
use crate::cli::settings::SettingHandler;
use crate::console::MIN_MAX_LINES;
use crate::core::color::Rgba;
use crate::core::config::Config;
use crate::core::metrics::FontSize;

/// Data-driven handler for a single-valued setting.
///
/// `apply` parses the input, stores it and returns the value as it should
/// be displayed, or `None` when the input is not acceptable.
pub struct ValueHandler {
    key: &'static str,
    hint: &'static str,
    example: &'static str,
    expected: &'static str,
    default_display: &'static str,
    get: fn(&Config) -> Option<String>,
    apply: fn(&mut Config, &str) -> Option<String>,
    clear: fn(&mut Config),
}

impl SettingHandler for ValueHandler {
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
        let display = (self.apply)(config, input.trim()).ok_or(SettingError::InvalidValue {
            key: self.key,
            input: input.clone(),
            expected: self.expected,
        })?;
        Ok(success_set(self.key, &display))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.clear)(config);
        success_unset(self.key, self.default_display)
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, value),
            None => format!("  {}: (unset, default: {})", self.key, self.default_display),
        }
    }
}

/// Matches `console::DEFAULT_MAX_LINES`.
const DEFAULT_MAX_LINES_DISPLAY: &str = "40";

fn parse_finite(input: &str) -> Option<f32> {
    f32::from_str(input).ok().filter(|v| v.is_finite())
}

/// `max-lines`; values below the minimum are raised to it.
pub fn max_lines_handler() -> ValueHandler {
    ValueHandler {
        key: "max-lines",
        hint: "To set how many messages the console keeps, give a number:",
        example: "viewer-debug set max-lines 80",
        expected: "a whole number",
        default_display: DEFAULT_MAX_LINES_DISPLAY,
        get: |c| c.max_lines.map(|v| v.to_string()),
        apply: |c, input| {
            let lines = usize::from_str(input).ok()?.max(MIN_MAX_LINES);
            c.max_lines = Some(lines);
            Some(lines.to_string())
        },
        clear: |c| c.max_lines = None,
    }
}

pub fn persist_time_handler() -> ValueHandler {
    ValueHandler {
        key: "persist-time",
        hint: "To set how long messages stay visible, give seconds (0 keeps them):",
        example: "viewer-debug set persist-time 10",
        expected: "a number of seconds, 0 or more",
        default_display: "0 (never fade)",
        get: |c| c.persist_time.map(|v| v.to_string()),
        apply: |c, input| {
            let seconds = parse_finite(input).filter(|v| *v >= 0.0)?;
            c.persist_time = Some(seconds);
            Some(seconds.to_string())
        },
        clear: |c| c.persist_time = None,
    }
}

pub fn font_size_handler() -> ValueHandler {
    ValueHandler {
        key: "font-size",
        hint: "To set the console font, specify monospace, small or large:",
        example: "viewer-debug set font-size large",
        expected: "monospace, small or large",
        default_display: "small",
        get: |c| c.font_size.map(|f| f.to_string()),
        apply: |c, input| {
            let font = FontSize::from_str(input).ok()?;
            c.font_size = Some(font);
            Some(font.to_string())
        },
        clear: |c| c.font_size = None,
    }
}

pub fn background_handler() -> ValueHandler {
    ValueHandler {
        key: "background",
        hint: "To set the console background colour, give a colour:",
        example: "viewer-debug set background #202040",
        expected: "#rrggbb, rgb(r,g,b) or a colour name",
        default_display: "black",
        get: |c| c.background.clone(),
        apply: |c, input| {
            Rgba::parse(input)?;
            c.background = Some(input.to_string());
            Some(input.to_string())
        },
        clear: |c| c.background = None,
    }
}

pub fn background_opacity_handler() -> ValueHandler {
    ValueHandler {
        key: "background-opacity",
        hint: "To set the console background opacity, give a number from 0 to 1:",
        example: "viewer-debug set background-opacity 0.5",
        expected: "a number from 0 to 1",
        default_display: "0.7",
        get: |c| c.background_opacity.map(|v| v.to_string()),
        apply: |c, input| {
            let opacity = parse_finite(input).filter(|v| (0.0..=1.0).contains(v))?;
            c.background_opacity = Some(opacity);
            Some(opacity.to_string())
        },
        clear: |c| c.background_opacity = None,
    }
}
