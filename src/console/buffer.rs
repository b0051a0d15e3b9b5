//! The console text buffer.
//!
//! New paragraphs land in a pending queue that any thread may push to through
//! a [`ConsoleHandle`]. The owning view calls
//! [`ConsoleBuffer::drain_and_layout`] once per frame: it swaps the pending
//! queue out under the lock, then ages, trims and wraps without holding it.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::console::paragraph::{Paragraph, ParagraphSnapshot};
use crate::console::replace::Replacement;
use crate::core::clock::{Clock, SystemClock};
use crate::core::color::Rgba;
use crate::core::metrics::{FontSize, TextMeasure};
use crate::ui::theme::SharedBackground;

/// Seconds over which a paragraph fades out before it expires.
pub const FADE_DURATION: f32 = 2.0;
/// Floor applied by [`ConsoleBuffer::set_max_lines`].
pub const MIN_MAX_LINES: usize = 5;
pub const DEFAULT_MAX_LINES: usize = 40;
/// Narrowest console, in pixels.
pub const MIN_CONSOLE_WIDTH: f32 = 50.0;
pub const DEFAULT_CONSOLE_WIDTH: f32 = 512.0;

/// Initial settings for a console.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSettings {
    /// Paragraphs kept in the committed queue.
    pub max_lines: usize,
    /// Seconds a paragraph stays visible; `0` keeps paragraphs forever.
    pub persist_time: f32,
    pub font: FontSize,
    pub box_per_message: bool,
    pub disable_message_spacing: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            persist_time: 0.0,
            font: FontSize::default(),
            box_per_message: false,
            disable_message_spacing: false,
        }
    }
}

type PendingQueue = Arc<Mutex<Vec<Paragraph>>>;

fn lock_pending(pending: &PendingQueue) -> MutexGuard<'_, Vec<Paragraph>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Cloneable producer side of a console.
#[derive(Clone)]
pub struct ConsoleHandle {
    pending: PendingQueue,
    clock: Arc<dyn Clock>,
}

impl ConsoleHandle {
    /// Queue a single-colour line.
    ///
    /// The timestamp is taken under the queue lock so it cannot predate a
    /// concurrent [`ConsoleBuffer::clear`].
    pub fn add_line(&self, text: impl Into<String>, color: Rgba) {
        let mut pending = lock_pending(&self.pending);
        pending.push(Paragraph::new(text, color, self.clock.elapsed()));
    }

    /// Queue a line made of several coloured runs.
    pub fn add_colored_line<S: AsRef<str>>(&self, runs: &[(S, Rgba)]) {
        let mut pending = lock_pending(&self.pending);
        pending.push(Paragraph::from_runs(runs, self.clock.elapsed()));
    }
}

impl fmt::Debug for ConsoleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleHandle")
            .field("pending", &lock_pending(&self.pending).len())
            .finish()
    }
}

/// Result of one [`ConsoleBuffer::drain_and_layout`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub drained: usize,
    pub expired: usize,
    pub trimmed: usize,
    pub reflowed: usize,
}

pub struct ConsoleBuffer {
    handle: ConsoleHandle,
    committed: VecDeque<Paragraph>,
    background: SharedBackground,
    max_lines: usize,
    persist_time: f32,
    fade_time: f32,
    font: FontSize,
    console_width: f32,
    force_reflow: bool,
    pub(crate) replacement_color: Rgba,
    pub(crate) box_per_message: bool,
    pub(crate) disable_message_spacing: bool,
}

impl ConsoleBuffer {
    pub fn new(settings: ConsoleSettings, background: SharedBackground) -> Self {
        Self::with_clock(settings, background, Arc::new(SystemClock::new()))
    }

    /// Build a console that reads time from `clock`.
    ///
    /// The constructor honours `settings.max_lines` as given (at least one);
    /// the floor of [`MIN_MAX_LINES`] only applies to later changes.
    pub fn with_clock(
        settings: ConsoleSettings,
        background: SharedBackground,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let persist_time = settings.persist_time.max(0.0);
        Self {
            handle: ConsoleHandle {
                pending: Arc::new(Mutex::new(Vec::new())),
                clock,
            },
            committed: VecDeque::new(),
            background,
            max_lines: settings.max_lines.max(1),
            persist_time,
            fade_time: fade_time_for(persist_time),
            font: settings.font,
            console_width: DEFAULT_CONSOLE_WIDTH,
            force_reflow: false,
            replacement_color: Rgba::WHITE,
            box_per_message: settings.box_per_message,
            disable_message_spacing: settings.disable_message_spacing,
        }
    }

    /// Producer handle sharing this console's pending queue.
    pub fn handle(&self) -> ConsoleHandle {
        self.handle.clone()
    }

    pub fn add_line(&self, text: impl Into<String>, color: Rgba) {
        self.handle.add_line(text, color);
    }

    pub fn add_colored_line<S: AsRef<str>>(&self, runs: &[(S, Rgba)]) {
        self.handle.add_colored_line(runs);
    }

    /// Merge pending paragraphs, drop expired and surplus ones, and rewrap
    /// whatever needs it.
    pub fn drain_and_layout(&mut self, measure: &dyn TextMeasure) -> LayoutReport {
        let drained = std::mem::take(&mut *lock_pending(&self.handle.pending));
        let mut report = LayoutReport {
            drained: drained.len(),
            ..LayoutReport::default()
        };
        self.committed.extend(drained);

        if self.persist_time > 0.0 {
            let now = self.now();
            while self
                .committed
                .front()
                .is_some_and(|p| p.age(now) >= self.persist_time)
            {
                self.committed.pop_front();
                report.expired += 1;
            }
        }

        while self.committed.len() > self.max_lines {
            self.committed.pop_front();
            report.trimmed += 1;
        }

        let force = std::mem::take(&mut self.force_reflow);
        for paragraph in &mut self.committed {
            if paragraph.update_lines(self.console_width, measure, self.font, force) {
                report.reflowed += 1;
            }
        }

        if report.expired > 0 || report.trimmed > 0 {
            debug!(
                expired = report.expired,
                trimmed = report.trimmed,
                remaining = self.committed.len(),
                "console evicted paragraphs"
            );
        }
        report
    }

    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines.max(MIN_MAX_LINES);
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Seconds a paragraph stays on screen; `0` disables expiry.
    pub fn set_line_persist_time(&mut self, seconds: f32) {
        self.persist_time = seconds.max(0.0);
        self.fade_time = fade_time_for(self.persist_time);
    }

    pub fn line_persist_time(&self) -> f32 {
        self.persist_time
    }

    pub fn fade_time(&self) -> f32 {
        self.fade_time
    }

    /// Opacity for a paragraph `age` seconds old, or `None` once it has
    /// expired.
    pub fn opacity_for_age(&self, age: f32) -> Option<f32> {
        if self.persist_time <= 0.0 {
            return Some(1.0);
        }
        if age >= self.persist_time {
            return None;
        }
        if age < self.fade_time {
            return Some(1.0);
        }
        Some(((self.persist_time - age) / (self.persist_time - self.fade_time)).clamp(0.0, 1.0))
    }

    /// Drop every paragraph, committed and pending, and restart the clock.
    pub fn clear(&mut self) {
        let mut pending = lock_pending(&self.handle.pending);
        self.handle.clock.reset();
        pending.clear();
        drop(pending);
        self.committed.clear();
    }

    /// Replace `search` with `replace` in every paragraph, committed and
    /// pending. Returns how many paragraphs changed.
    pub fn replace_all_text(&mut self, search: &str, replace: &str, case_insensitive: bool) -> usize {
        let Some(replacement) =
            Replacement::new(search, replace, case_insensitive, self.replacement_color)
        else {
            return 0;
        };

        let mut changed = self
            .committed
            .iter_mut()
            .map(|p| replacement.apply(p))
            .filter(|changed| *changed)
            .count();
        changed += lock_pending(&self.handle.pending)
            .iter_mut()
            .map(|p| replacement.apply(p))
            .filter(|changed| *changed)
            .count();

        debug!(changed, "console replaced text");
        changed
    }

    /// Colour given to replaced spans.
    pub fn set_replacement_color(&mut self, color: Rgba) {
        self.replacement_color = color;
    }

    /// Resize the console. The width is clamped to
    /// `[MIN_CONSOLE_WIDTH, window_width]`; paragraphs are rewrapped on the
    /// next layout pass when it changes. Returns whether the width changed.
    pub fn reshape(&mut self, width: f32, window_width: f32) -> bool {
        let new_width = width.min(window_width).max(MIN_CONSOLE_WIDTH);
        if new_width == self.console_width {
            return false;
        }
        self.console_width = new_width;
        self.force_reflow = true;
        true
    }

    pub fn console_width(&self) -> f32 {
        self.console_width
    }

    /// Switch fonts; every paragraph is rewrapped on the next layout pass.
    pub fn set_font_size(&mut self, font: FontSize) {
        self.font = font;
        self.force_reflow = true;
    }

    pub fn font_size(&self) -> FontSize {
        self.font
    }

    pub fn set_box_per_message(&mut self, enabled: bool) {
        self.box_per_message = enabled;
    }

    pub fn box_per_message(&self) -> bool {
        self.box_per_message
    }

    pub fn set_disable_message_spacing(&mut self, disabled: bool) {
        self.disable_message_spacing = disabled;
    }

    pub fn message_spacing_disabled(&self) -> bool {
        self.disable_message_spacing
    }

    pub fn background(&self) -> &SharedBackground {
        &self.background
    }

    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    pub fn pending_len(&self) -> usize {
        lock_pending(&self.handle.pending).len()
    }

    /// Copies of the committed paragraphs, oldest first.
    pub fn paragraphs(&self) -> Vec<ParagraphSnapshot> {
        self.committed.iter().map(ParagraphSnapshot::from).collect()
    }

    pub(crate) fn committed(&self) -> &VecDeque<Paragraph> {
        &self.committed
    }

    pub(crate) fn now(&self) -> Duration {
        self.handle.clock.elapsed()
    }
}

impl fmt::Debug for ConsoleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleBuffer")
            .field("committed", &self.committed.len())
            .field("max_lines", &self.max_lines)
            .field("persist_time", &self.persist_time)
            .field("font", &self.font)
            .field("console_width", &self.console_width)
            .finish()
    }
}

fn fade_time_for(persist_time: f32) -> f32 {
    (persist_time - FADE_DURATION).max(0.0)
}
