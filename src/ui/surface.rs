//! Drawing seam between widgets and whatever puts pixels on screen.
//!
//! Coordinates are pixels with the origin at the top-left and `y` growing
//! downwards. Widgets only ever call [`RenderSurface::fill_rect`] and
//! [`RenderSurface::draw_text`].

use crate::core::color::Rgba;

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink by the given margins, never below zero size.
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Horizontal anchor for [`RenderSurface::draw_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

pub trait RenderSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Draw one run of text. `x` is interpreted according to `align`; `y` is
    /// the top of the line.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Rgba, align: HAlign);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Rgba,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        color: Rgba,
        align: HAlign,
    },
}

/// Surface that keeps every call, for inspection.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text run, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Fill { .. } => None,
            })
            .collect()
    }

    pub fn fills(&self) -> Vec<(Rect, Rgba)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill { rect, color } => Some((*rect, *color)),
                DrawOp::Text { .. } => None,
            })
            .collect()
    }

    /// First text op whose run contains `needle`.
    pub fn find_text(&self, needle: &str) -> Option<&DrawOp> {
        self.ops
            .iter()
            .find(|op| matches!(op, DrawOp::Text { text, .. } if text.contains(needle)))
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.ops.push(DrawOp::Fill { rect, color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Rgba, align: HAlign) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            color,
            align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(39.9, 59.9));
        assert!(!r.contains(40.0, 30.0));
        assert!(!r.contains(15.0, 60.0));
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(4.0, 0.0, 8.0, 0.0);
        assert_eq!(r.x, 4.0);
        assert_eq!(r.width, 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn recording_surface_separates_text_and_fills() {
        let mut s = RecordingSurface::new();
        s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba::BLACK);
        s.draw_text("hi", 0.0, 0.0, Rgba::WHITE, HAlign::Left);
        assert_eq!(s.texts(), vec!["hi"]);
        assert_eq!(s.fills().len(), 1);
        assert!(s.find_text("h").is_some());
    }
}
