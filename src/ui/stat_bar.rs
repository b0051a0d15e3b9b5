//! Labelled statistic display: plain text, a scaled bar, or a bar with a
//! history plot underneath.

use std::collections::VecDeque;

use crate::core::metrics::TextMeasure;
use crate::ui::surface::{HAlign, Rect};
use crate::ui::widget::{DrawContext, MouseEvent, MouseResponse, Widget, WidgetError};

/// Samples kept by a [`Stat`].
pub const STAT_HISTORY: usize = 32;

pub const TEXT_MODE_HEIGHT: f32 = 14.0;
pub const BAR_MODE_HEIGHT: f32 = 40.0;
pub const HISTORY_MODE_HEIGHT: f32 = 67.0;

const BAR_TOP: f32 = 16.0;
const BAR_HEIGHT: f32 = 8.0;
const TICK_HEIGHT: f32 = 3.0;
const HISTORY_TOP: f32 = BAR_MODE_HEIGHT;
const HISTORY_HEIGHT: f32 = HISTORY_MODE_HEIGHT - BAR_MODE_HEIGHT - 2.0;
const VALUE_COLUMN: f32 = 0.6;

/// Rolling window of samples with the frame time each one covers.
#[derive(Debug, Clone, Default)]
pub struct Stat {
    samples: VecDeque<(f32, f32)>,
}

impl Stat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample covering `dt` seconds.
    pub fn record(&mut self, value: f32, dt: f32) {
        if self.samples.len() == STAT_HISTORY {
            self.samples.pop_front();
        }
        self.samples.push_back((value, dt.max(0.0)));
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn current(&self) -> f32 {
        self.samples.back().map_or(0.0, |(v, _)| *v)
    }

    pub fn current_per_sec(&self) -> f32 {
        self.samples
            .back()
            .map_or(0.0, |(v, dt)| if *dt > 0.0 { v / dt } else { 0.0 })
    }

    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|(v, _)| v).sum::<f32>() / self.samples.len() as f32
    }

    /// Total of all samples over total time covered.
    pub fn mean_per_sec(&self) -> f32 {
        let time: f32 = self.samples.iter().map(|(_, dt)| dt).sum();
        if time <= 0.0 {
            return 0.0;
        }
        self.samples.iter().map(|(v, _)| v).sum::<f32>() / time
    }

    pub fn min(&self) -> f32 {
        self.samples
            .iter()
            .map(|(v, _)| *v)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    pub fn max(&self) -> f32 {
        self.samples
            .iter()
            .map(|(v, _)| *v)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Oldest-first values, or per-second rates when `per_sec`.
    pub fn history(&self, per_sec: bool) -> Vec<f32> {
        self.samples
            .iter()
            .map(|(v, dt)| match (per_sec, *dt > 0.0) {
                (false, _) => *v,
                (true, true) => v / dt,
                (true, false) => 0.0,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Text,
    Bar,
    BarWithHistory,
}

impl DisplayMode {
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Text => DisplayMode::Bar,
            DisplayMode::Bar => DisplayMode::BarWithHistory,
            DisplayMode::BarWithHistory => DisplayMode::Text,
        }
    }

    pub fn height(self) -> f32 {
        match self {
            DisplayMode::Text => TEXT_MODE_HEIGHT,
            DisplayMode::Bar => BAR_MODE_HEIGHT,
            DisplayMode::BarWithHistory => HISTORY_MODE_HEIGHT,
        }
    }
}

/// Scaling and presentation for a [`StatBar`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatBarConfig {
    pub label: String,
    pub unit: String,
    pub min: f32,
    pub max: f32,
    pub tick_spacing: f32,
    pub label_spacing: f32,
    pub precision: usize,
    pub per_sec: bool,
    pub display_mean: bool,
    pub no_resize: bool,
    pub mode: DisplayMode,
}

impl StatBarConfig {
    pub fn new(label: impl Into<String>, min: f32, max: f32) -> Self {
        let span = max - min;
        Self {
            label: label.into(),
            unit: String::new(),
            min,
            max,
            tick_spacing: span / 10.0,
            label_spacing: span / 2.0,
            precision: 0,
            per_sec: false,
            display_mean: true,
            no_resize: false,
            mode: DisplayMode::Text,
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn spacing(mut self, tick: f32, label: f32) -> Self {
        self.tick_spacing = tick;
        self.label_spacing = label;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn per_sec(mut self, per_sec: bool) -> Self {
        self.per_sec = per_sec;
        self
    }

    pub fn mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn no_resize(mut self, no_resize: bool) -> Self {
        self.no_resize = no_resize;
        self
    }

    pub fn display_mean(mut self, display_mean: bool) -> Self {
        self.display_mean = display_mean;
        self
    }
}

#[derive(Debug, Clone)]
pub struct StatBar {
    config: StatBarConfig,
    stat: Stat,
}

impl StatBar {
    pub fn new(config: StatBarConfig) -> Result<Self, WidgetError> {
        if !is_positive(config.max - config.min) {
            return Err(WidgetError::InvalidRange {
                label: config.label,
                min: config.min,
                max: config.max,
            });
        }
        if !is_positive(config.tick_spacing) || !is_positive(config.label_spacing) {
            return Err(WidgetError::InvalidSpacing { label: config.label });
        }
        Ok(Self {
            config,
            stat: Stat::new(),
        })
    }

    pub fn config(&self) -> &StatBarConfig {
        &self.config
    }

    pub fn mode(&self) -> DisplayMode {
        self.config.mode
    }

    pub fn stat(&self) -> &Stat {
        &self.stat
    }

    pub fn record(&mut self, value: f32, dt: f32) {
        self.stat.record(value, dt);
    }

    /// Current value, per second or absolute depending on the bar.
    pub fn value(&self) -> f32 {
        if self.config.per_sec {
            self.stat.current_per_sec()
        } else {
            self.stat.current()
        }
    }

    pub fn mean_value(&self) -> f32 {
        if self.config.per_sec {
            self.stat.mean_per_sec()
        } else {
            self.stat.mean()
        }
    }

    /// Value formatted with the bar's precision and unit.
    pub fn value_text(&self) -> String {
        let precision = self.config.precision;
        let value = self.value();
        if self.config.unit.is_empty() {
            format!("{value:.precision$}")
        } else {
            format!("{value:.precision$} {}", self.config.unit)
        }
    }

    /// Horizontal pixel offset of `value` on a bar `width` pixels wide.
    pub fn value_to_x(&self, value: f32, width: f32) -> f32 {
        let t = (value - self.config.min) / (self.config.max - self.config.min);
        t.clamp(0.0, 1.0) * width
    }

    fn draw_bar(&self, ctx: &mut DrawContext<'_>, rect: Rect) {
        let bar = Rect::new(rect.x, rect.y + BAR_TOP, rect.width, BAR_HEIGHT);
        ctx.surface.fill_rect(bar, ctx.theme.panel_background);

        let fill = self.value_to_x(self.value(), bar.width);
        if fill > 0.0 {
            ctx.surface
                .fill_rect(Rect::new(bar.x, bar.y, fill, bar.height), ctx.theme.bar_fill);
        }

        let ticks = ((self.config.max - self.config.min) / self.config.tick_spacing).floor() as usize;
        for i in 0..=ticks {
            let value = self.config.min + i as f32 * self.config.tick_spacing;
            let x = bar.x + self.value_to_x(value, bar.width);
            ctx.surface.fill_rect(
                Rect::new(x, bar.bottom(), 1.0, TICK_HEIGHT),
                ctx.theme.bar_ticks,
            );
        }

        let labels = ((self.config.max - self.config.min) / self.config.label_spacing).floor() as usize;
        let precision = self.config.precision;
        for i in 0..=labels {
            let value = self.config.min + i as f32 * self.config.label_spacing;
            let x = bar.x + self.value_to_x(value, bar.width);
            let align = if i == 0 {
                HAlign::Left
            } else if i == labels {
                HAlign::Right
            } else {
                HAlign::Center
            };
            ctx.surface.draw_text(
                &format!("{value:.precision$}"),
                x,
                bar.bottom() + TICK_HEIGHT,
                ctx.theme.value_text,
                align,
            );
        }

        if self.config.display_mean && !self.stat.is_empty() {
            let x = bar.x + self.value_to_x(self.mean_value(), bar.width);
            ctx.surface.fill_rect(
                Rect::new(x - 1.0, bar.y - 2.0, 2.0, bar.height + 4.0),
                ctx.theme.bar_mean,
            );
        }
    }

    fn draw_history(&self, ctx: &mut DrawContext<'_>, rect: Rect) {
        let area = Rect::new(rect.x, rect.y + HISTORY_TOP, rect.width, HISTORY_HEIGHT);
        ctx.surface.fill_rect(area, ctx.theme.panel_background);

        let history = self.stat.history(self.config.per_sec);
        if history.is_empty() {
            return;
        }
        let column = area.width / STAT_HISTORY as f32;
        let span = self.config.max - self.config.min;
        let first = STAT_HISTORY - history.len();
        for (i, value) in history.iter().enumerate() {
            let t = ((value - self.config.min) / span).clamp(0.0, 1.0);
            let height = (t * area.height).max(1.0);
            let x = area.x + (first + i) as f32 * column;
            ctx.surface.fill_rect(
                Rect::new(x, area.bottom() - height, column.max(1.0), height),
                ctx.theme.history,
            );
        }
    }
}

/// False for zero, negatives and NaN.
fn is_positive(value: f32) -> bool {
    value > 0.0
}

impl Widget for StatBar {
    fn required_height(&self, _measure: &dyn TextMeasure) -> f32 {
        self.config.mode.height()
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, rect: Rect) {
        ctx.surface
            .draw_text(&self.config.label, rect.x, rect.y, ctx.theme.label, HAlign::Left);
        ctx.surface.draw_text(
            &self.value_text(),
            rect.x + rect.width * VALUE_COLUMN,
            rect.y,
            ctx.theme.value_text,
            HAlign::Right,
        );

        match self.config.mode {
            DisplayMode::Text => {}
            DisplayMode::Bar => self.draw_bar(ctx, rect),
            DisplayMode::BarWithHistory => {
                self.draw_bar(ctx, rect);
                self.draw_history(ctx, rect);
            }
        }
    }

    fn handle_mouse_down(&mut self, _event: &MouseEvent, _rect: Rect) -> MouseResponse {
        if self.config.no_resize {
            return MouseResponse::Ignored;
        }
        self.config.mode = self.config.mode.next();
        MouseResponse::HandledRelayout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::CellMetrics;
    use crate::ui::surface::RecordingSurface;
    use crate::ui::theme::UiTheme;
    use crate::ui::widget::Modifiers;

    fn click() -> MouseEvent {
        MouseEvent::new(0.0, 0.0, Modifiers::default())
    }

    fn fps_bar() -> StatBar {
        StatBar::new(StatBarConfig::new("FPS", 0.0, 80.0).spacing(10.0, 40.0).precision(1))
            .expect("valid stat bar")
    }

    #[test]
    fn stat_keeps_only_recent_samples() {
        let mut stat = Stat::new();
        for i in 0..40 {
            stat.record(i as f32, 0.5);
        }
        assert_eq!(stat.len(), STAT_HISTORY);
        assert_eq!(stat.current(), 39.0);
        assert_eq!(stat.min(), 8.0);
        assert_eq!(stat.max(), 39.0);
        assert_eq!(stat.current_per_sec(), 78.0);
    }

    #[test]
    fn stat_mean_and_rate() {
        let mut stat = Stat::new();
        stat.record(2.0, 1.0);
        stat.record(4.0, 1.0);
        stat.record(6.0, 2.0);
        assert_eq!(stat.mean(), 4.0);
        assert_eq!(stat.mean_per_sec(), 3.0);
        assert_eq!(stat.history(true), vec![2.0, 4.0, 3.0]);
    }

    #[test]
    fn empty_stat_reports_zero() {
        let stat = Stat::new();
        assert_eq!(stat.current(), 0.0);
        assert_eq!(stat.mean_per_sec(), 0.0);
        assert_eq!(stat.min(), 0.0);
    }

    #[test]
    fn click_cycles_modes_and_heights() {
        let mut bar = fps_bar();
        let metrics = CellMetrics::TERMINAL;
        let rect = Rect::new(0.0, 0.0, 200.0, 14.0);
        assert_eq!(bar.required_height(&metrics), 14.0);

        assert_eq!(bar.handle_mouse_down(&click(), rect), MouseResponse::HandledRelayout);
        assert_eq!(bar.mode(), DisplayMode::Bar);
        assert_eq!(bar.required_height(&metrics), 40.0);

        bar.handle_mouse_down(&click(), rect);
        assert_eq!(bar.required_height(&metrics), 67.0);

        bar.handle_mouse_down(&click(), rect);
        assert_eq!(bar.mode(), DisplayMode::Text);
    }

    #[test]
    fn no_resize_ignores_clicks() {
        let mut bar = StatBar::new(StatBarConfig::new("Mem", 0.0, 10.0).no_resize(true))
            .expect("valid stat bar");
        let rect = Rect::new(0.0, 0.0, 200.0, 14.0);
        assert_eq!(bar.handle_mouse_down(&click(), rect), MouseResponse::Ignored);
        assert_eq!(bar.mode(), DisplayMode::Text);
    }

    #[test]
    fn per_sec_bar_divides_by_frame_time() {
        let mut bar = StatBar::new(StatBarConfig::new("KB/s", 0.0, 100.0).per_sec(true).unit("KB"))
            .expect("valid stat bar");
        bar.record(5.0, 0.1);
        assert!((bar.value() - 50.0).abs() < 1e-4);
        assert_eq!(bar.value_text(), "50 KB");
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(matches!(
            StatBar::new(StatBarConfig::new("bad", 10.0, 10.0)),
            Err(WidgetError::InvalidRange { .. })
        ));
        assert!(matches!(
            StatBar::new(StatBarConfig::new("bad", 0.0, 10.0).spacing(0.0, 5.0)),
            Err(WidgetError::InvalidSpacing { .. })
        ));
    }

    #[test]
    fn bar_mode_draws_fill_ticks_and_labels() {
        let mut bar = fps_bar();
        bar.handle_mouse_down(&click(), Rect::default());
        bar.record(40.0, 1.0 / 40.0);

        let theme = UiTheme::dark_default();
        let metrics = CellMetrics::TERMINAL;
        let mut surface = RecordingSurface::new();
        let mut ctx = DrawContext {
            surface: &mut surface,
            measure: &metrics,
            theme: &theme,
        };
        bar.draw(&mut ctx, Rect::new(0.0, 0.0, 160.0, 40.0));

        assert_eq!(surface.texts(), vec!["FPS", "40.0", "0.0", "40.0", "80.0"]);
        let fill = surface
            .fills()
            .into_iter()
            .find(|(_, color)| *color == theme.bar_fill)
            .expect("value fill");
        assert_eq!(fill.0.width, 80.0);
    }

    #[test]
    fn value_maps_onto_bar_width_and_clamps() {
        let bar = fps_bar();
        assert_eq!(bar.value_to_x(40.0, 200.0), 100.0);
        assert_eq!(bar.value_to_x(-5.0, 200.0), 0.0);
        assert_eq!(bar.value_to_x(500.0, 200.0), 200.0);
    }
}
