//! Width-driven word wrapping for console paragraphs.
//!
//! The console measures text in pixels through a [`TextMeasure`], so the
//! wrapping here works on measured widths rather than column counts. The
//! result is a list of character ranges; the paragraph model slices those
//! ranges against its colour segments.
//!
//! Rules:
//! - `\n` always ends a line and is not part of any line.
//! - A clipped run backs up to the last word boundary. Whitespace stays at the
//!   end of the line it follows, so concatenating the lines gives back the
//!   original text minus the newlines.
//! - A word longer than the line is broken mid-word.
//! - Every line holds at least one character, even when that character is
//!   wider than the available width, so nothing is ever dropped.

use memchr::memchr;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use crate::core::metrics::{FontSize, TextMeasure};

/// Horizontal room reserved on small windows before wrapping.
pub const WRAP_MARGIN: f32 = 30.0;

/// Configuration for text wrapping behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapConfig {
    /// Maximum width for one line, in pixels
    pub width: f32,
    /// Font used for measuring
    pub font: FontSize,
}

impl WrapConfig {
    pub fn new(width: f32, font: FontSize) -> Self {
        Self { width, font }
    }

    /// Wrap budget for a console that is `screen_width` pixels wide.
    pub fn for_screen(screen_width: f32, font: FontSize) -> Self {
        Self::new((screen_width - WRAP_MARGIN).max(0.0), font)
    }
}

/// One wrapped row, expressed in characters of the source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrappedLine {
    /// Index of the first character of the row.
    pub start: usize,
    /// Number of characters on the row.
    pub len: usize,
    /// Measured pixel width of the row.
    pub width: f32,
    /// The row is followed by a `\n` in the source text.
    pub hard_break: bool,
}

/// Text wrapping engine
pub struct TextWrapper;

impl TextWrapper {
    /// Count how many leading characters of `text` fit in `max_width` pixels.
    ///
    /// Stops at the first `\n`. With `end_on_word_boundary`, a clipped run is
    /// shortened to the last word boundary when one exists; otherwise the run
    /// is cut mid-word. Whitespace at the clip point stays on this run even
    /// past `max_width`, so the next run starts on a word.
    pub fn max_drawable_chars(
        measure: &dyn TextMeasure,
        font: FontSize,
        text: &str,
        max_width: f32,
        end_on_word_boundary: bool,
    ) -> usize {
        let mut width = 0.0f32;
        let mut fitted = 0usize;
        let mut clipped = false;

        let mut chars = text.chars().peekable();
        while let Some(&ch) = chars.peek() {
            if ch == '\n' {
                break;
            }
            let w = measure.char_width(font, ch);
            if width + w > max_width {
                clipped = true;
                break;
            }
            width += w;
            fitted += 1;
            chars.next();
        }

        if !clipped || !end_on_word_boundary || fitted == 0 {
            return fitted;
        }

        let overhang = chars.take_while(|ch| is_breaking_space(*ch)).count();
        if overhang > 0 {
            return fitted + overhang;
        }

        match last_break_at_or_before(text, fitted) {
            Some(pos) if pos > 0 => pos,
            _ => fitted,
        }
    }

    /// Wrap `text` into rows no wider than `config.width`.
    pub fn wrap(measure: &dyn TextMeasure, text: &str, config: &WrapConfig) -> Vec<WrappedLine> {
        let mut lines = Vec::new();
        let mut rest = text;
        let mut char_base = 0usize;

        loop {
            let (hard_line, has_newline) = match memchr(b'\n', rest.as_bytes()) {
                Some(idx) => (&rest[..idx], true),
                None => (rest, false),
            };

            let line_chars = hard_line.chars().count();
            if line_chars == 0 && has_newline {
                lines.push(WrappedLine {
                    start: char_base,
                    len: 0,
                    width: 0.0,
                    hard_break: true,
                });
            }

            let mut offset_chars = 0usize;
            let mut offset_bytes = 0usize;
            while offset_chars < line_chars {
                let slice = &hard_line[offset_bytes..];
                let drawable =
                    Self::max_drawable_chars(measure, config.font, slice, config.width, true)
                        .max(1);
                let end_byte = slice
                    .char_indices()
                    .nth(drawable)
                    .map(|(idx, _)| idx)
                    .unwrap_or(slice.len());
                let piece = &slice[..end_byte];
                let last_piece = offset_chars + drawable >= line_chars;

                let mut width = measure.width(config.font, piece);
                if width > config.width {
                    width = measure.width(config.font, piece.trim_end_matches(is_breaking_space));
                }

                lines.push(WrappedLine {
                    start: char_base + offset_chars,
                    len: drawable,
                    width,
                    hard_break: last_piece && has_newline,
                });

                offset_chars += drawable;
                offset_bytes += end_byte;
            }

            if !has_newline {
                break;
            }
            char_base += line_chars + 1;
            rest = &rest[hard_line.len() + 1..];
        }

        lines
    }

    /// Wrap and return the text of each row. Handy for printing and tests.
    pub fn wrap_to_strings(measure: &dyn TextMeasure, text: &str, config: &WrapConfig) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        Self::wrap(measure, text, config)
            .into_iter()
            .map(|line| chars[line.start..line.start + line.len].iter().collect())
            .collect()
    }
}

/// Last character position `<= limit` where a line may start.
///
/// Word boundaries come from Unicode word segmentation. A boundary is usable
/// when whitespace precedes it or when it sits between wide (CJK) characters,
/// which break anywhere.
fn last_break_at_or_before(text: &str, limit: usize) -> Option<usize> {
    let mut best = None;
    let mut char_pos = 0usize;
    let mut last_byte = 0usize;
    let mut prev_char: Option<char> = None;

    for (byte_idx, segment) in text.split_word_bound_indices() {
        char_pos += text[last_byte..byte_idx].chars().count();
        if byte_idx > last_byte {
            prev_char = text[..byte_idx].chars().next_back();
        }
        last_byte = byte_idx;

        if char_pos > limit {
            break;
        }

        let Some(first) = segment.chars().next() else {
            continue;
        };
        if char_pos == 0 || first.is_whitespace() {
            continue;
        }
        let after_space = prev_char.is_some_and(char::is_whitespace);
        let between_wide = prev_char.is_some_and(is_wide) || is_wide(first);
        if after_space || between_wide {
            best = Some(char_pos);
        }
    }

    best
}

fn is_breaking_space(ch: char) -> bool {
    ch != '\n' && ch.is_whitespace()
}

fn is_wide(ch: char) -> bool {
    UnicodeWidthChar::width(ch).unwrap_or(0) > 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::CellMetrics;

    const METRICS: CellMetrics = CellMetrics::new(10.0, 16.0);

    fn wrap(text: &str, width: f32) -> Vec<String> {
        TextWrapper::wrap_to_strings(&METRICS, text, &WrapConfig::new(width, FontSize::Small))
    }

    #[test]
    fn test_basic_wrapping() {
        let lines = wrap("hello world this is a test", 100.0);
        assert_eq!(lines, vec!["hello ", "world this ", "is a test"]);
    }

    #[test]
    fn text_that_fits_stays_on_one_line() {
        assert_eq!(wrap("short", 100.0), vec!["short"]);
    }

    #[test]
    fn newline_forces_break_and_is_consumed() {
        let lines = TextWrapper::wrap(&METRICS, "ab\n\ncd", &WrapConfig::new(100.0, FontSize::Small));
        assert_eq!(lines.len(), 3);
        assert_eq!((lines[0].start, lines[0].len, lines[0].hard_break), (0, 2, true));
        assert_eq!((lines[1].start, lines[1].len, lines[1].hard_break), (3, 0, true));
        assert_eq!((lines[2].start, lines[2].len, lines[2].hard_break), (4, 2, false));
    }

    #[test]
    fn trailing_newline_adds_no_empty_row() {
        assert_eq!(wrap("abc\n", 100.0), vec!["abc"]);
    }

    #[test]
    fn long_word_is_broken_mid_word() {
        assert_eq!(wrap("abcdefghijkl", 50.0), vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn wide_characters_break_between_each_other() {
        let lines = wrap("日本語中文字体", 60.0);
        assert_eq!(lines, vec!["日本語", "中文字", "体"]);
    }

    #[test]
    fn zero_width_budget_still_makes_progress() {
        let lines = wrap("abc", 0.0);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn rows_never_exceed_budget_when_characters_fit() {
        let config = WrapConfig::new(70.0, FontSize::Small);
        let text = "the quick brown fox jumps over the lazy dog";
        for line in TextWrapper::wrap(&METRICS, text, &config) {
            assert!(line.width <= config.width, "row too wide: {line:?}");
        }
    }

    #[test]
    fn rows_concatenate_back_to_source() {
        let text = "one two\nthree  four five\n\nsix-seven eight nine ten";
        let joined: String = wrap(text, 40.0).concat();
        assert_eq!(joined, text.replace('\n', ""));
    }

    #[test]
    fn max_drawable_respects_word_boundary_flag() {
        let font = FontSize::Small;
        assert_eq!(TextWrapper::max_drawable_chars(&METRICS, font, "hello world", 80.0, true), 6);
        assert_eq!(TextWrapper::max_drawable_chars(&METRICS, font, "hello world", 80.0, false), 8);
        assert_eq!(TextWrapper::max_drawable_chars(&METRICS, font, "hello world", 50.0, true), 6);
        assert_eq!(TextWrapper::max_drawable_chars(&METRICS, font, "hello world", 50.0, false), 5);
        assert_eq!(TextWrapper::max_drawable_chars(&METRICS, font, "ab\ncd", 500.0, true), 2);
    }

    #[test]
    fn word_ending_at_budget_keeps_its_space() {
        assert_eq!(wrap("hello world", 50.0), vec!["hello ", "world"]);
    }

    #[test]
    fn clipped_space_run_stays_on_the_row() {
        let lines = TextWrapper::wrap(&METRICS, "ab   cd", &WrapConfig::new(30.0, FontSize::Small));
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].start, lines[0].len), (0, 5));
        assert_eq!((lines[1].start, lines[1].len), (5, 2));
        assert_eq!(lines[0].width, 20.0);
    }

    #[test]
    fn no_row_is_only_whitespace() {
        let text = "one  two   three    four five  six";
        for width in [30.0, 40.0, 50.0, 60.0, 70.0] {
            for row in wrap(text, width) {
                assert!(!row.trim().is_empty(), "blank row at {width}px: {row:?}");
            }
        }
    }

    #[test]
    fn clipped_space_stops_at_newline() {
        let lines = TextWrapper::wrap(&METRICS, "abc  \nde", &WrapConfig::new(30.0, FontSize::Small));
        assert_eq!((lines[0].len, lines[0].hard_break), (5, true));
        assert_eq!((lines[1].start, lines[1].len), (6, 2));
    }

    #[test]
    fn for_screen_subtracts_margin() {
        let config = WrapConfig::for_screen(130.0, FontSize::Large);
        assert_eq!(config.width, 100.0);
        assert_eq!(WrapConfig::for_screen(10.0, FontSize::Small).width, 0.0);
    }
}
