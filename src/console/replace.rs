//! Search and replace over paragraph text.
//!
//! Matches are found left to right without overlap and the scan resumes after
//! the inserted text, so a replacement that contains the search string is
//! never rescanned. Replaced spans take one uniform colour; everything else
//! keeps the colour it had.

use crate::console::paragraph::{push_merged, ColorSegment, Paragraph};
use crate::core::color::Rgba;

pub(crate) struct Replacement {
    search: Vec<char>,
    replace: String,
    replace_len: usize,
    case_insensitive: bool,
    color: Rgba,
}

impl Replacement {
    /// Returns `None` for an empty search string, which matches nothing.
    pub(crate) fn new(search: &str, replace: &str, case_insensitive: bool, color: Rgba) -> Option<Self> {
        if search.is_empty() {
            return None;
        }
        let search = if case_insensitive {
            search.chars().map(fold).collect()
        } else {
            search.chars().collect()
        };
        Some(Self {
            search,
            replace: replace.to_string(),
            replace_len: replace.chars().count(),
            case_insensitive,
            color,
        })
    }

    /// Rewrite `paragraph` in place. Returns whether anything matched.
    pub(crate) fn apply(&self, paragraph: &mut Paragraph) -> bool {
        let chars: Vec<char> = paragraph.text().chars().collect();
        if chars.len() < self.search.len() {
            return false;
        }
        let colors = expand_colors(paragraph.color_segments(), chars.len());

        let mut text = String::with_capacity(paragraph.text().len());
        let mut segments: Vec<ColorSegment> = Vec::new();
        let mut replaced = false;
        let mut i = 0;

        while i < chars.len() {
            if self.matches_at(&chars, i) {
                text.push_str(&self.replace);
                push_merged(&mut segments, ColorSegment::new(self.replace_len, self.color));
                i += self.search.len();
                replaced = true;
            } else {
                text.push(chars[i]);
                push_merged(&mut segments, ColorSegment::new(1, colors[i]));
                i += 1;
            }
        }

        if replaced {
            paragraph.set_content(text, segments);
        }
        replaced
    }

    fn matches_at(&self, chars: &[char], at: usize) -> bool {
        let Some(window) = chars.get(at..at + self.search.len()) else {
            return false;
        };
        if self.case_insensitive {
            window.iter().zip(&self.search).all(|(c, s)| fold(*c) == *s)
        } else {
            window == self.search.as_slice()
        }
    }
}

/// Single-character lower-case fold, so folded and original text stay the
/// same length.
fn fold(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

fn expand_colors(segments: &[ColorSegment], len: usize) -> Vec<Rgba> {
    let mut colors = Vec::with_capacity(len);
    for seg in segments {
        colors.extend(std::iter::repeat(seg.color).take(seg.len));
    }
    colors.resize(len, Rgba::WHITE);
    colors
}
