//! Painting the console: background panel, then paragraphs newest at the
//! bottom with their current opacity.

use crate::console::buffer::ConsoleBuffer;
use crate::core::metrics::TextMeasure;
use crate::ui::surface::{HAlign, Rect, RenderSurface};

/// Gap between paragraphs.
pub const MESSAGE_SPACING: f32 = 4.0;
pub const CONSOLE_GUTTER_LEFT: f32 = 14.0;
pub const CONSOLE_GUTTER_RIGHT: f32 = 15.0;
/// Horizontal offset of text inside the background panel.
pub const TEXT_INSET: f32 = CONSOLE_GUTTER_LEFT - 8.0;
/// Extra height of a per-message box around its text.
const BOX_PADDING: f32 = 8.0;

/// Vertical placement of one paragraph inside the console rect.
struct Placement {
    index: usize,
    top: f32,
    height: f32,
}

impl ConsoleBuffer {
    /// Drain pending text, lay it out and paint it into `rect`.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface, measure: &dyn TextMeasure, rect: Rect) {
        self.drain_and_layout(measure);
        if self.committed().is_empty() || rect.is_empty() {
            return;
        }

        let line_height = measure.line_height(self.font_size());
        let spacing = if self.disable_message_spacing {
            0.0
        } else {
            MESSAGE_SPACING
        };

        // Newest first, walking up from the bottom edge until we run out of room.
        let mut placements = Vec::new();
        let mut bottom = rect.bottom();
        for (index, paragraph) in self.committed().iter().enumerate().rev() {
            let height = paragraph.lines().len() as f32 * line_height;
            let top = bottom - height;
            if top < rect.y {
                break;
            }
            placements.push(Placement { index, top, height });
            bottom = top - spacing;
        }
        let Some(oldest) = placements.last() else {
            return;
        };

        let background = self.background().get();
        let paragraphs = self.committed();

        if !self.box_per_message {
            let pad = if self.disable_message_spacing {
                BOX_PADDING
            } else {
                MESSAGE_SPACING
            };
            let widest = placements
                .iter()
                .map(|p| paragraphs[p.index].max_width())
                .fold(0.0f32, f32::max);
            let top = (oldest.top - pad / 2.0).max(rect.y);
            let panel = Rect::new(
                rect.x,
                top,
                (widest + CONSOLE_GUTTER_RIGHT).min(rect.width),
                rect.bottom() - top,
            );
            surface.fill_rect(panel, background);
        }

        let now = self.now();
        for placement in &placements {
            let paragraph = &paragraphs[placement.index];
            let Some(alpha) = self.opacity_for_age(paragraph.age(now)) else {
                continue;
            };

            if self.box_per_message {
                let top = (placement.top - BOX_PADDING / 2.0).max(rect.y);
                let bottom = (placement.top + placement.height + BOX_PADDING / 2.0).min(rect.bottom());
                let panel = Rect::new(
                    rect.x,
                    top,
                    (paragraph.max_width() + CONSOLE_GUTTER_RIGHT).min(rect.width),
                    bottom - top,
                );
                surface.fill_rect(panel, background.fade(alpha));
            }

            if alpha <= 0.0 {
                continue;
            }
            let mut y = placement.top;
            for line in paragraph.lines() {
                for segment in line {
                    surface.draw_text(
                        &segment.text,
                        rect.x + TEXT_INSET + segment.x_position,
                        y,
                        segment.color.fade(alpha),
                        HAlign::Left,
                    );
                }
                y += line_height;
            }
        }
    }
}
