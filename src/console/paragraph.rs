//! Paragraphs, colour segments and the wrapped line model.

use std::time::Duration;

use crate::core::color::Rgba;
use crate::core::metrics::{FontSize, TextMeasure};
use crate::core::text_wrapping::{TextWrapper, WrapConfig};

/// A coloured run of the paragraph's source text, `len` characters long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSegment {
    pub len: usize,
    pub color: Rgba,
}

impl ColorSegment {
    pub fn new(len: usize, color: Rgba) -> Self {
        Self { len, color }
    }
}

/// A coloured run on one wrapped row.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    pub text: String,
    pub color: Rgba,
    /// Offset from the row's left edge, in pixels.
    pub x_position: f32,
}

/// One visual row of a wrapped paragraph.
pub type DisplayLine = Vec<LineSegment>;

/// One submitted console message.
#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    char_count: usize,
    segments: Vec<ColorSegment>,
    created_at: Duration,
    max_width: f32,
    lines: Vec<DisplayLine>,
    wrapped_for: Option<(f32, FontSize)>,
    dirty: bool,
}

impl Paragraph {
    /// Single-colour paragraph.
    pub fn new(text: impl Into<String>, color: Rgba, created_at: Duration) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        let segments = if char_count == 0 {
            Vec::new()
        } else {
            vec![ColorSegment::new(char_count, color)]
        };
        Self::from_parts(text, segments, created_at)
    }

    /// Paragraph assembled from several `(text, colour)` runs.
    pub fn from_runs<S: AsRef<str>>(runs: &[(S, Rgba)], created_at: Duration) -> Self {
        let mut text = String::new();
        let mut segments: Vec<ColorSegment> = Vec::new();
        for (run, color) in runs {
            let run = run.as_ref();
            let len = run.chars().count();
            if len == 0 {
                continue;
            }
            text.push_str(run);
            push_merged(&mut segments, ColorSegment::new(len, *color));
        }
        Self::from_parts(text, segments, created_at)
    }

    pub(crate) fn from_parts(text: String, segments: Vec<ColorSegment>, created_at: Duration) -> Self {
        let char_count = text.chars().count();
        debug_assert_eq!(
            segments.iter().map(|s| s.len).sum::<usize>(),
            char_count,
            "colour segments must partition the text"
        );
        Self {
            text,
            char_count,
            segments,
            created_at,
            max_width: -1.0,
            lines: Vec::new(),
            wrapped_for: None,
            dirty: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn color_segments(&self) -> &[ColorSegment] {
        &self.segments
    }

    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    /// Widest wrapped row in pixels, or a negative value before the first wrap.
    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    /// Age in seconds at clock reading `now`.
    pub fn age(&self, now: Duration) -> f32 {
        now.saturating_sub(self.created_at).as_secs_f32()
    }

    pub fn needs_reflow(&self, screen_width: f32, font: FontSize) -> bool {
        self.dirty || self.wrapped_for != Some((screen_width, font))
    }

    /// Replace the text and colouring; the next layout pass rewraps.
    pub(crate) fn set_content(&mut self, text: String, segments: Vec<ColorSegment>) {
        self.char_count = text.chars().count();
        self.text = text;
        self.segments = segments;
        self.dirty = true;
    }

    /// Recompute the wrapped rows for a console `screen_width` pixels wide.
    ///
    /// Does nothing when the cached wrap already matches and `force` is off.
    /// Returns whether a reflow happened.
    pub fn update_lines(
        &mut self,
        screen_width: f32,
        measure: &dyn TextMeasure,
        font: FontSize,
        force: bool,
    ) -> bool {
        if !force && !self.needs_reflow(screen_width, font) {
            return false;
        }

        self.lines.clear();
        self.max_width = 0.0;
        self.wrapped_for = Some((screen_width, font));
        self.dirty = false;

        if self.text.is_empty() || self.segments.is_empty() {
            return true;
        }

        let config = WrapConfig::for_screen(screen_width, font);
        let chars: Vec<char> = self.text.chars().collect();
        let mut cursor = SegmentCursor::new(&self.segments);

        for row in TextWrapper::wrap(measure, &self.text, &config) {
            self.max_width = self.max_width.max(row.width);

            let mut line = DisplayLine::new();
            let mut x_position = 0.0f32;
            let mut pos = row.start;
            let end = row.start + row.len;

            while pos < end {
                let Some((color, available)) = cursor.current() else {
                    break;
                };
                let take = available.min(end - pos);
                let text: String = chars[pos..pos + take].iter().collect();
                let width = measure.width(font, &text);
                line.push(LineSegment {
                    text,
                    color,
                    x_position,
                });
                x_position += width;
                pos += take;
                cursor.consume(take);
            }

            if row.hard_break {
                cursor.consume(1);
            }
            self.lines.push(line);
        }

        true
    }
}

/// Walks colour segments character by character.
struct SegmentCursor<'a> {
    segments: &'a [ColorSegment],
    index: usize,
    used: usize,
}

impl<'a> SegmentCursor<'a> {
    fn new(segments: &'a [ColorSegment]) -> Self {
        let mut cursor = Self {
            segments,
            index: 0,
            used: 0,
        };
        cursor.skip_empty();
        cursor
    }

    fn current(&self) -> Option<(Rgba, usize)> {
        self.segments
            .get(self.index)
            .map(|seg| (seg.color, seg.len - self.used))
    }

    fn consume(&mut self, mut count: usize) {
        while count > 0 {
            let Some(seg) = self.segments.get(self.index) else {
                return;
            };
            let left = seg.len - self.used;
            if count < left {
                self.used += count;
                return;
            }
            count -= left;
            self.index += 1;
            self.used = 0;
            self.skip_empty();
        }
    }

    fn skip_empty(&mut self) {
        while self.segments.get(self.index).is_some_and(|s| s.len == 0) {
            self.index += 1;
        }
    }
}

/// Push a segment, merging it into the previous one when colours match.
pub(crate) fn push_merged(segments: &mut Vec<ColorSegment>, segment: ColorSegment) {
    if segment.len == 0 {
        return;
    }
    match segments.last_mut() {
        Some(last) if last.color == segment.color => last.len += segment.len,
        _ => segments.push(segment),
    }
}

/// Owned copy of a paragraph handed out to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphSnapshot {
    pub text: String,
    pub color_segments: Vec<ColorSegment>,
    pub created_at: Duration,
    pub max_width: f32,
    pub lines: Vec<DisplayLine>,
}

impl From<&Paragraph> for ParagraphSnapshot {
    fn from(p: &Paragraph) -> Self {
        Self {
            text: p.text.clone(),
            color_segments: p.segments.clone(),
            created_at: p.created_at,
            max_width: p.max_width,
            lines: p.lines.clone(),
        }
    }
}

impl ParagraphSnapshot {
    /// Text of each row, segments joined.
    pub fn line_texts(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.iter().map(|seg| seg.text.as_str()).collect())
            .collect()
    }
}
