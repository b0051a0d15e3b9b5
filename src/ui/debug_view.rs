//! The debug overlay: console, statistics and texture diagnostics in one
//! widget tree.

use tracing::{debug, warn};

use crate::console::{ConsoleBuffer, ConsoleHandle, ConsoleSettings};
use crate::core::metrics::TextMeasure;
use crate::ui::console_view::ConsoleView;
use crate::ui::container::ContainerView;
use crate::ui::stat_bar::{DisplayMode, StatBar, StatBarConfig};
use crate::ui::surface::{Rect, RenderSurface};
use crate::ui::texture_view::{TextureStatsSource, TextureView};
use crate::ui::theme::UiTheme;
use crate::ui::widget::{
    DrawContext, MouseEvent, MouseResponse, WidgetError, WidgetId, WidgetKind, WidgetTree,
};

/// Width of the statistics panel.
pub const STATS_WIDTH: f32 = 250.0;
/// Gap between the statistics panel and the window edge.
pub const STATS_MARGIN: f32 = 8.0;

/// What a stat bar is fed with every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFeed {
    Fps,
    FrameTime,
    ConsoleParagraphs,
}

impl StatFeed {
    fn sample(self, dt: f32, console_len: usize) -> f32 {
        match self {
            StatFeed::Fps => 1.0,
            StatFeed::FrameTime => dt * 1000.0,
            StatFeed::ConsoleParagraphs => console_len as f32,
        }
    }
}

/// The stat bars shown in the statistics panel by default.
pub fn default_stat_bars(max_lines: usize) -> Vec<(StatFeed, StatBarConfig)> {
    vec![
        (
            StatFeed::Fps,
            StatBarConfig::new("FPS", 0.0, 80.0)
                .spacing(10.0, 20.0)
                .precision(1)
                .per_sec(true)
                .mode(DisplayMode::Bar),
        ),
        (
            StatFeed::FrameTime,
            StatBarConfig::new("Frame time", 0.0, 100.0)
                .unit("ms")
                .spacing(10.0, 50.0)
                .precision(1),
        ),
        (
            StatFeed::ConsoleParagraphs,
            StatBarConfig::new("Console paragraphs", 0.0, max_lines as f32)
                .spacing(5.0, max_lines as f32)
                .display_mean(false)
                .no_resize(true),
        ),
    ]
}

pub struct DebugViewOptions {
    pub console: ConsoleSettings,
    pub stat_bars: Vec<(StatFeed, StatBarConfig)>,
    pub texture_source: Option<Box<dyn TextureStatsSource>>,
    pub show_texture_view: bool,
}

impl DebugViewOptions {
    pub fn new(console: ConsoleSettings) -> Self {
        Self {
            stat_bars: default_stat_bars(console.max_lines),
            console,
            texture_source: None,
            show_texture_view: false,
        }
    }

    pub fn with_texture_source(mut self, source: Box<dyn TextureStatsSource>, show: bool) -> Self {
        self.texture_source = Some(source);
        self.show_texture_view = show;
        self
    }
}

pub struct DebugView {
    tree: WidgetTree,
    theme: UiTheme,
    window: Rect,
    console: WidgetId,
    console_handle: ConsoleHandle,
    stats: WidgetId,
    stat_bars: Vec<(StatFeed, WidgetId)>,
    texture_view: Option<WidgetId>,
}

impl DebugView {
    pub fn new(theme: UiTheme, options: DebugViewOptions, window: Rect) -> Result<Self, WidgetError> {
        let mut tree = WidgetTree::new(WidgetKind::Container(ContainerView::overlay()), window);
        let root = tree.root();

        let buffer = ConsoleBuffer::new(options.console, theme.console_background.clone());
        let console_handle = buffer.handle();
        let console = tree.add_child(root, WidgetKind::Console(ConsoleView::new(buffer)))?;

        let stats = tree.add_child(root, WidgetKind::Container(ContainerView::new("Statistics")))?;
        let mut stat_bars = Vec::new();
        for (feed, config) in options.stat_bars {
            match StatBar::new(config) {
                Ok(bar) => stat_bars.push((feed, tree.add_child(stats, WidgetKind::StatBar(bar))?)),
                Err(err) => warn!(error = %err, "omitting stat bar"),
            }
        }

        let texture_view = match options.texture_source {
            Some(source) => {
                let id = tree.add_child(root, WidgetKind::TextureView(TextureView::new(source)))?;
                tree.set_visible(id, options.show_texture_view)?;
                Some(id)
            }
            None => {
                if options.show_texture_view {
                    warn!(
                        error = %WidgetError::MissingSource("texture statistics source"),
                        "omitting texture view"
                    );
                }
                None
            }
        };

        Ok(Self {
            tree,
            theme,
            window,
            console,
            console_handle,
            stats,
            stat_bars,
            texture_view,
        })
    }

    pub fn theme(&self) -> &UiTheme {
        &self.theme
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    /// Producer handle for other threads and tasks.
    pub fn console_handle(&self) -> ConsoleHandle {
        self.console_handle.clone()
    }

    pub fn console(&self) -> Option<&ConsoleBuffer> {
        match self.tree.get(self.console) {
            Some(WidgetKind::Console(view)) => Some(view.buffer()),
            _ => None,
        }
    }

    pub fn console_mut(&mut self) -> Option<&mut ConsoleBuffer> {
        match self.tree.get_mut(self.console) {
            Some(WidgetKind::Console(view)) => Some(view.buffer_mut()),
            _ => None,
        }
    }

    pub fn stats_id(&self) -> WidgetId {
        self.stats
    }

    pub fn stat_bar(&self, feed: StatFeed) -> Option<&StatBar> {
        let (_, id) = self.stat_bars.iter().find(|(f, _)| *f == feed)?;
        match self.tree.get(*id) {
            Some(WidgetKind::StatBar(bar)) => Some(bar),
            _ => None,
        }
    }

    pub fn texture_view_id(&self) -> Option<WidgetId> {
        self.texture_view
    }

    pub fn texture_view_visible(&self) -> bool {
        self.texture_view.is_some_and(|id| self.tree.is_visible(id))
    }

    /// Show or hide the texture view. Returns whether it is now visible.
    pub fn toggle_texture_view(&mut self) -> bool {
        let Some(id) = self.texture_view else {
            warn!(
                error = %WidgetError::MissingSource("texture statistics source"),
                "texture view unavailable"
            );
            return false;
        };
        let visible = !self.tree.is_visible(id);
        if let Err(err) = self.tree.set_visible(id, visible) {
            warn!(error = %err, "failed to toggle texture view");
            return false;
        }
        visible
    }

    /// Adopt a new window size and lay everything out again.
    pub fn resize(&mut self, window: Rect, measure: &dyn TextMeasure) {
        debug!(width = window.width, height = window.height, "debug view resized");
        self.window = window;
        if let Some(console) = self.console_mut() {
            let width = console.console_width();
            console.reshape(width, window.width);
        }
        self.layout(measure);
    }

    /// Recompute every widget rect from the window size.
    pub fn layout(&mut self, measure: &dyn TextMeasure) {
        if let Err(err) = self.try_layout(measure) {
            warn!(error = %err, "debug view layout failed");
        }
    }

    fn try_layout(&mut self, measure: &dyn TextMeasure) -> Result<(), WidgetError> {
        let window = self.window;
        let root = self.tree.root();
        self.tree.set_rect(root, window)?;

        let console_width = self
            .console()
            .map(|c| c.console_width())
            .unwrap_or(window.width)
            .min(window.width);
        self.tree.set_rect(
            self.console,
            Rect::new(window.x, window.y, console_width, window.height),
        )?;

        let stats_height = self.tree.required_height(self.stats, measure);
        let stats_width = STATS_WIDTH.min(window.width);
        self.tree.set_rect(
            self.stats,
            Rect::new(
                (window.right() - stats_width - STATS_MARGIN).max(window.x),
                window.y + STATS_MARGIN,
                stats_width,
                stats_height,
            ),
        )?;

        if let Some(id) = self.texture_view {
            let mut rect = TextureView::default_rect(window.x, window.height);
            rect.y += window.y;
            rect.width = rect.width.min(window.width);
            self.tree.set_rect(id, rect)?;
        }

        self.tree.layout(root, measure)
    }

    /// Feed the per-frame statistics. `dt` is the frame time in seconds.
    pub fn record_frame(&mut self, dt: f32) {
        let console_len = self.console().map_or(0, ConsoleBuffer::committed_len);
        for (feed, id) in &self.stat_bars {
            if let Some(WidgetKind::StatBar(bar)) = self.tree.get_mut(*id) {
                bar.record(feed.sample(dt, console_len), dt);
            }
        }
    }

    /// Rebuild the texture bars from the current statistics.
    pub fn refresh_textures(&mut self) -> Result<(), WidgetError> {
        let Some(id) = self.texture_view else {
            return Ok(());
        };
        if !self.tree.is_visible(id) {
            return Ok(());
        }
        let refresh = match self.tree.get_mut(id) {
            Some(WidgetKind::TextureView(view)) => view.refresh(),
            _ => return Err(WidgetError::UnknownWidget(id)),
        };
        let Some(refresh) = refresh else {
            return Ok(());
        };

        self.tree.clear_children(id)?;
        self.tree.add_child(id, WidgetKind::TexMemBar(refresh.mem_bar))?;
        for bar in refresh.bars {
            self.tree.add_child(id, WidgetKind::TextureBar(bar))?;
        }
        Ok(())
    }

    /// Refresh, lay out and paint every visible widget.
    pub fn draw(&mut self, surface: &mut dyn RenderSurface, measure: &dyn TextMeasure) {
        if let Err(err) = self.refresh_textures() {
            warn!(error = %err, "texture view refresh failed");
        }
        self.layout(measure);

        let mut ctx = DrawContext {
            surface,
            measure,
            theme: &self.theme,
        };
        let root = self.tree.root();
        if let Err(err) = self.tree.draw(root, &mut ctx) {
            warn!(error = %err, "debug view draw failed");
        }
    }

    /// Route a mouse press; relayouts when a widget changed size.
    pub fn handle_mouse_down(&mut self, event: &MouseEvent, measure: &dyn TextMeasure) -> MouseResponse {
        let response = self.tree.handle_mouse_down(event);
        if matches!(
            response,
            MouseResponse::ToggleChildren | MouseResponse::HandledRelayout
        ) {
            self.layout(measure);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::color::Rgba;
    use crate::core::metrics::CellMetrics;
    use crate::ui::container::HEADER_HEIGHT;
    use crate::ui::surface::RecordingSurface;
    use crate::ui::widget::Modifiers;
    use crate::utils::test_utils::{texture, TestTextureSource};

    const METRICS: CellMetrics = CellMetrics::TERMINAL;

    fn window() -> Rect {
        Rect::new(0.0, 0.0, 1024.0, 640.0)
    }

    fn view_with(options: DebugViewOptions) -> DebugView {
        let mut view = DebugView::new(UiTheme::dark_default(), options, window()).expect("view");
        view.layout(&METRICS);
        view
    }

    fn click(view: &mut DebugView, x: f32, y: f32) -> MouseResponse {
        view.handle_mouse_down(&MouseEvent::new(x, y, Modifiers::default()), &METRICS)
    }

    #[test]
    fn console_sits_bottom_left_and_stats_top_right() {
        let view = view_with(DebugViewOptions::new(ConsoleSettings::default()));
        let console = view.tree().rect(view.console).unwrap();
        assert_eq!(console.x, 0.0);
        assert_eq!(console.bottom(), 640.0);

        let stats = view.tree().rect(view.stats_id()).unwrap();
        assert_eq!(stats.right(), 1024.0 - STATS_MARGIN);
        assert_eq!(view.tree().children(view.stats_id()).len(), 3);
    }

    #[test]
    fn invalid_stat_bars_are_omitted() {
        let mut options = DebugViewOptions::new(ConsoleSettings::default());
        options
            .stat_bars
            .push((StatFeed::Fps, StatBarConfig::new("broken", 5.0, 5.0)));
        let view = view_with(options);
        assert_eq!(view.tree().children(view.stats_id()).len(), 3);
    }

    #[test]
    fn collapsing_statistics_shrinks_the_panel() {
        let mut view = view_with(DebugViewOptions::new(ConsoleSettings::default()));
        let stats = view.tree().rect(view.stats_id()).unwrap();
        assert!(stats.height > HEADER_HEIGHT);

        let response = click(&mut view, stats.x + 20.0, stats.y + 15.0);
        assert_eq!(response, MouseResponse::ToggleChildren);
        let collapsed = view.tree().rect(view.stats_id()).unwrap();
        assert_eq!(collapsed.height, HEADER_HEIGHT);
    }

    #[test]
    fn clicking_a_stat_bar_changes_its_height() {
        let mut view = view_with(DebugViewOptions::new(ConsoleSettings::default()));
        let before = view.tree().rect(view.stats_id()).unwrap().height;
        let (_, frame_id) = view.stat_bars[1];
        let frame = view.tree().rect(frame_id).unwrap();

        assert_eq!(click(&mut view, frame.x + 2.0, frame.y + 2.0), MouseResponse::HandledRelayout);
        let after = view.tree().rect(view.stats_id()).unwrap().height;
        assert!(after > before);

        let (_, lines_id) = view.stat_bars[2];
        let lines = view.tree().rect(lines_id).unwrap();
        assert_eq!(click(&mut view, lines.x + 2.0, lines.y + 2.0), MouseResponse::Ignored);
    }

    #[test]
    fn frames_feed_stat_bars() {
        let mut view = view_with(DebugViewOptions::new(ConsoleSettings::default()));
        view.console_handle().add_line("one", Rgba::WHITE);
        let mut surface = RecordingSurface::new();
        view.draw(&mut surface, &METRICS);
        view.record_frame(0.02);

        let fps = view.stat_bar(StatFeed::Fps).unwrap();
        assert!((fps.value() - 50.0).abs() < 1e-3);
        let frame = view.stat_bar(StatFeed::FrameTime).unwrap();
        assert!((frame.value() - 20.0).abs() < 1e-3);
        assert_eq!(view.stat_bar(StatFeed::ConsoleParagraphs).unwrap().value(), 1.0);
        assert!(surface.find_text("one").is_some());
    }

    #[test]
    fn texture_view_rebuilds_bars_when_visible() {
        let source = TestTextureSource::new(vec![texture(1, 10.0), texture(2, 20.0)]);
        let options = DebugViewOptions::new(ConsoleSettings::default())
            .with_texture_source(Box::new(source), false);
        let mut view = view_with(options);
        let id = view.texture_view_id().unwrap();

        view.refresh_textures().unwrap();
        assert!(view.tree().children(id).is_empty());

        assert!(view.toggle_texture_view());
        view.refresh_textures().unwrap();
        let children = view.tree().children(id).to_vec();
        assert_eq!(children.len(), 3);
        assert!(matches!(view.tree().get(children[0]), Some(WidgetKind::TexMemBar(_))));

        let mut surface = RecordingSurface::new();
        view.draw(&mut surface, &METRICS);
        assert!(surface.find_text("Mem (MB)").is_some());
    }

    #[test]
    fn missing_texture_source_leaves_view_out() {
        let mut options = DebugViewOptions::new(ConsoleSettings::default());
        options.show_texture_view = true;
        let mut view = view_with(options);
        assert!(view.texture_view_id().is_none());
        assert!(!view.toggle_texture_view());
    }
}
