//! Text measurement.
//!
//! The console and the widgets never look at glyphs themselves; everything
//! they need to know about fonts goes through [`TextMeasure`]. Implementations
//! must return the same answer for the same input within one frame.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_width::UnicodeWidthChar;

/// Font selector understood by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Monospace,
    #[default]
    Small,
    Large,
}

impl FontSize {
    /// Map the legacy numeric size index: `-1` is monospace, `0` small,
    /// anything larger is large.
    pub fn from_index(index: i32) -> Self {
        match index {
            i if i < 0 => FontSize::Monospace,
            0 => FontSize::Small,
            _ => FontSize::Large,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            FontSize::Monospace => -1,
            FontSize::Small => 0,
            FontSize::Large => 1,
        }
    }

    /// Next font in the cycle used by the interactive overlay.
    pub fn next(self) -> Self {
        match self {
            FontSize::Monospace => FontSize::Small,
            FontSize::Small => FontSize::Large,
            FontSize::Large => FontSize::Monospace,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Monospace => "monospace",
            FontSize::Small => "small",
            FontSize::Large => "large",
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monospace" | "mono" | "-1" => Ok(FontSize::Monospace),
            "small" | "0" => Ok(FontSize::Small),
            "large" | "big" | "1" => Ok(FontSize::Large),
            other => Err(format!(
                "Unknown font size '{other}' (expected monospace, small or large)"
            )),
        }
    }
}

/// Pixel measurements for text runs.
pub trait TextMeasure: Send + Sync {
    /// Width in pixels of `text` rendered with `font`.
    fn width(&self, font: FontSize, text: &str) -> f32;

    /// Height in pixels of one line of `font`.
    fn line_height(&self, font: FontSize) -> f32;

    /// Width in pixels of a single character.
    fn char_width(&self, font: FontSize, ch: char) -> f32 {
        let mut buf = [0u8; 4];
        self.width(font, ch.encode_utf8(&mut buf))
    }
}

/// Metrics for a character-cell display: every glyph is a whole number of
/// terminal cells wide (per `unicode-width`), and every cell has a fixed
/// pixel size that depends on the font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f32,
    pub cell_height: f32,
}

impl CellMetrics {
    /// Nominal 8x16 cell, which is what the terminal surface maps pixels onto.
    pub const TERMINAL: CellMetrics = CellMetrics {
        cell_width: 8.0,
        cell_height: 16.0,
    };

    pub const fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
        }
    }

    fn scale(font: FontSize) -> f32 {
        match font {
            FontSize::Monospace | FontSize::Small => 1.0,
            FontSize::Large => 1.25,
        }
    }

    /// Number of cells `text` occupies.
    pub fn cells(text: &str) -> usize {
        text.chars()
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum()
    }
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self::TERMINAL
    }
}

impl TextMeasure for CellMetrics {
    fn width(&self, font: FontSize, text: &str) -> f32 {
        Self::cells(text) as f32 * self.cell_width * Self::scale(font)
    }

    fn line_height(&self, font: FontSize) -> f32 {
        self.cell_height * Self::scale(font)
    }

    fn char_width(&self, font: FontSize, ch: char) -> f32 {
        UnicodeWidthChar::width(ch).unwrap_or(0) as f32 * self.cell_width * Self::scale(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_index_mapping_matches_legacy_values() {
        assert_eq!(FontSize::from_index(-1), FontSize::Monospace);
        assert_eq!(FontSize::from_index(0), FontSize::Small);
        assert_eq!(FontSize::from_index(1), FontSize::Large);
        assert_eq!(FontSize::from_index(7), FontSize::Large);
        for font in [FontSize::Monospace, FontSize::Small, FontSize::Large] {
            assert_eq!(FontSize::from_index(font.index()), font);
        }
    }

    #[test]
    fn font_parses_names() {
        assert_eq!("Mono".parse::<FontSize>(), Ok(FontSize::Monospace));
        assert_eq!("large".parse::<FontSize>(), Ok(FontSize::Large));
        assert!("huge".parse::<FontSize>().is_err());
    }

    #[test]
    fn cell_metrics_count_wide_characters_twice() {
        let metrics = CellMetrics::new(10.0, 20.0);
        assert_eq!(metrics.width(FontSize::Small, "abc"), 30.0);
        assert_eq!(metrics.width(FontSize::Small, "日本"), 40.0);
        assert_eq!(metrics.char_width(FontSize::Small, '日'), 20.0);
        assert_eq!(metrics.line_height(FontSize::Small), 20.0);
    }

    #[test]
    fn large_font_is_wider_and_taller() {
        let metrics = CellMetrics::TERMINAL;
        assert!(metrics.width(FontSize::Large, "x") > metrics.width(FontSize::Small, "x"));
        assert!(metrics.line_height(FontSize::Large) > metrics.line_height(FontSize::Monospace));
    }
}
