use crate::console::{ConsoleBuffer, CONSOLE_GUTTER_RIGHT};
use crate::core::metrics::TextMeasure;
use crate::ui::surface::Rect;
use crate::ui::widget::{DrawContext, Widget};

/// Widget wrapper that paints a [`ConsoleBuffer`].
#[derive(Debug)]
pub struct ConsoleView {
    buffer: ConsoleBuffer,
}

impl ConsoleView {
    pub fn new(buffer: ConsoleBuffer) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &ConsoleBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ConsoleBuffer {
        &mut self.buffer
    }
}

impl Widget for ConsoleView {
    fn required_height(&self, measure: &dyn TextMeasure) -> f32 {
        measure.line_height(self.buffer.font_size()) + CONSOLE_GUTTER_RIGHT
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        self.buffer.draw(ctx.surface, ctx.measure, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleSettings;
    use crate::core::metrics::CellMetrics;
    use crate::ui::surface::RecordingSurface;
    use crate::ui::theme::{SharedBackground, UiTheme};

    #[test]
    fn drawing_drains_pending_lines() {
        let buffer = ConsoleBuffer::new(ConsoleSettings::default(), SharedBackground::default());
        let handle = buffer.handle();
        let mut view = ConsoleView::new(buffer);
        handle.add_line("from another thread", crate::core::color::Rgba::GREEN);

        let theme = UiTheme::dark_default();
        let mut surface = RecordingSurface::new();
        let mut ctx = DrawContext {
            surface: &mut surface,
            measure: &CellMetrics::TERMINAL,
            theme: &theme,
        };
        view.draw(&mut ctx, Rect::new(0.0, 0.0, 512.0, 200.0));

        assert_eq!(view.buffer().pending_len(), 0);
        assert!(surface.find_text("from another thread").is_some());
        assert_eq!(view.required_height(&CellMetrics::TERMINAL), 31.0);
    }
}
