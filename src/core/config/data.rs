use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::console::{ConsoleSettings, DEFAULT_MAX_LINES, MIN_MAX_LINES};
use crate::core::color::Rgba;
use crate::core::metrics::FontSize;
use crate::ui::theme::{UiTheme, DEFAULT_BACKGROUND_OPACITY};

/// On-disk configuration. Every key is optional; unset keys fall back to
/// built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Paragraphs kept in the console.
    pub max_lines: Option<usize>,
    /// Seconds before console text fades out; 0 keeps it forever.
    pub persist_time: Option<f32>,
    pub font_size: Option<FontSize>,
    /// Console background colour (`#rrggbb`, `rgb(...)` or a name).
    pub background: Option<String>,
    pub background_opacity: Option<f32>,
    /// Draw a separate background box behind each message.
    pub box_per_message: Option<bool>,
    /// Leave a gap between messages.
    pub message_spacing: Option<bool>,
    /// Show the texture fetch view on startup.
    pub texture_view: Option<bool>,
}

impl Config {
    pub fn console_settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            max_lines: self
                .max_lines
                .unwrap_or(DEFAULT_MAX_LINES)
                .max(MIN_MAX_LINES),
            persist_time: self.persist_time.unwrap_or(0.0).max(0.0),
            font: self.font_size.unwrap_or_default(),
            box_per_message: self.box_per_message.unwrap_or(false),
            disable_message_spacing: !self.message_spacing.unwrap_or(true),
        }
    }

    /// Background colour; an unparsable value is reported and ignored.
    pub fn background_color(&self) -> Rgba {
        match self.background.as_deref() {
            None => Rgba::BLACK,
            Some(raw) => Rgba::parse(raw).unwrap_or_else(|| {
                warn!(value = raw, "ignoring unrecognised background colour");
                Rgba::BLACK
            }),
        }
    }

    pub fn background_opacity(&self) -> f32 {
        self.background_opacity
            .unwrap_or(DEFAULT_BACKGROUND_OPACITY)
            .clamp(0.0, 1.0)
    }

    pub fn shows_texture_view(&self) -> bool {
        self.texture_view.unwrap_or(false)
    }

    pub fn theme(&self) -> UiTheme {
        UiTheme::with_console_background(self.background_color(), self.background_opacity())
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/viewer-debug/config.toml` → `~/.config/viewer-debug/config.toml`
/// - Windows: paths are shown unchanged
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
