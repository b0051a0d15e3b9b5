//! [`RenderSurface`] backed by a ratatui [`Buffer`].
//!
//! Overlay pixels map onto terminal cells through [`CellMetrics`]. Fills are
//! blended into a per-cell backdrop so translucent panels stack the way they
//! would on a real framebuffer.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

use crate::core::color::Rgba;
use crate::core::metrics::CellMetrics;
use crate::ui::surface::{HAlign, Rect, RenderSurface};
use crate::utils::color::{terminal_color, ColorDepth};

pub struct BufferSurface<'a> {
    buf: &'a mut Buffer,
    area: CellRect,
    metrics: CellMetrics,
    depth: ColorDepth,
    backdrop: Vec<Rgba>,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buf: &'a mut Buffer, area: CellRect, metrics: CellMetrics, depth: ColorDepth) -> Self {
        let cells = usize::from(area.width) * usize::from(area.height);
        Self {
            buf,
            area,
            metrics,
            depth,
            backdrop: vec![Rgba::BLACK; cells],
        }
    }

    /// Overlay size in pixels.
    pub fn pixel_size(&self) -> (f32, f32) {
        (
            f32::from(self.area.width) * self.metrics.cell_width,
            f32::from(self.area.height) * self.metrics.cell_height,
        )
    }

    fn backdrop_index(&self, col: u16, row: u16) -> usize {
        usize::from(row) * usize::from(self.area.width) + usize::from(col)
    }

    /// Cell column/row range covering `[start, end)` pixels on one axis.
    fn cell_span(start: f32, end: f32, cell: f32, limit: u16) -> (u16, u16) {
        let first = (start / cell).floor().max(0.0);
        let last = (end / cell).ceil().max(0.0).min(f32::from(limit));
        (first.min(f32::from(limit)) as u16, last as u16)
    }
}

impl RenderSurface for BufferSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if rect.is_empty() || color.a <= 0.0 {
            return;
        }
        let (col0, col1) = Self::cell_span(rect.x, rect.right(), self.metrics.cell_width, self.area.width);
        let (row0, row1) = Self::cell_span(rect.y, rect.bottom(), self.metrics.cell_height, self.area.height);
        for row in row0..row1 {
            for col in col0..col1 {
                let idx = self.backdrop_index(col, row);
                let blended = color.over(self.backdrop[idx]);
                self.backdrop[idx] = blended;
                let bg = terminal_color(blended, Rgba::BLACK, self.depth);
                if let Some(cell) = self.buf.cell_mut((self.area.x + col, self.area.y + row)) {
                    cell.set_bg(bg);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Rgba, align: HAlign) {
        if text.is_empty() || color.a <= 0.0 {
            return;
        }
        let cells = CellMetrics::cells(text) as f32;
        let x = match align {
            HAlign::Left => x,
            HAlign::Center => x - cells * self.metrics.cell_width / 2.0,
            HAlign::Right => x - cells * self.metrics.cell_width,
        };
        let row = (y / self.metrics.cell_height).floor();
        if row < 0.0 || row >= f32::from(self.area.height) {
            return;
        }
        let row = row as u16;

        let mut col = (x / self.metrics.cell_width).floor() as i32;
        for ch in text.chars() {
            let width = UnicodeWidthChar::width(ch).unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if col + width > i32::from(self.area.width) {
                break;
            }
            if col >= 0 {
                let c = col as u16;
                let backdrop = self.backdrop[self.backdrop_index(c, row)];
                let fg = terminal_color(color, backdrop, self.depth);
                let mut utf8 = [0u8; 4];
                self.buf.set_stringn(
                    self.area.x + c,
                    self.area.y + row,
                    ch.encode_utf8(&mut utf8),
                    width as usize,
                    Style::default().fg(fg),
                );
            }
            col += width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn surface_test(f: impl FnOnce(&mut BufferSurface<'_>)) -> Buffer {
        let area = CellRect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        {
            let mut surface = BufferSurface::new(&mut buf, area, CellMetrics::TERMINAL, ColorDepth::Truecolor);
            f(&mut surface);
        }
        buf
    }

    #[test]
    fn text_lands_on_the_cell_under_its_pixel_origin() {
        let buf = surface_test(|s| s.draw_text("hi", 17.0, 20.0, Rgba::RED, HAlign::Left));
        assert_eq!(buf[(2, 1)].symbol(), "h");
        assert_eq!(buf[(3, 1)].symbol(), "i");
        assert_eq!(buf[(2, 1)].fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn right_aligned_text_ends_at_x() {
        let buf = surface_test(|s| s.draw_text("ab", 80.0, 0.0, Rgba::WHITE, HAlign::Right));
        assert_eq!(buf[(8, 0)].symbol(), "a");
        assert_eq!(buf[(9, 0)].symbol(), "b");
    }

    #[test]
    fn text_is_clipped_at_the_edges() {
        let buf = surface_test(|s| {
            s.draw_text("xyz", -8.0, 0.0, Rgba::WHITE, HAlign::Left);
            s.draw_text("offscreen", 0.0, 200.0, Rgba::WHITE, HAlign::Left);
        });
        assert_eq!(buf[(0, 0)].symbol(), "y");
        assert_eq!(buf[(1, 0)].symbol(), "z");
    }

    #[test]
    fn translucent_fills_stack() {
        let buf = surface_test(|s| {
            let rect = Rect::new(0.0, 0.0, 16.0, 16.0);
            s.fill_rect(rect, Rgba::WHITE.with_alpha(0.5));
            s.fill_rect(rect, Rgba::WHITE.with_alpha(0.5));
        });
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(191, 191, 191));
        assert_eq!(buf[(2, 0)].bg, Color::Reset);
    }

    #[test]
    fn text_colour_blends_over_panel() {
        let buf = surface_test(|s| {
            s.fill_rect(Rect::new(0.0, 0.0, 80.0, 16.0), Rgba::BLUE);
            s.draw_text("a", 0.0, 0.0, Rgba::RED.with_alpha(0.5), HAlign::Left);
        });
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(128, 0, 128));
    }
}
