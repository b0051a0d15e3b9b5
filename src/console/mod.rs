//! Scrolling, fading text console.
//!
//! [`ConsoleBuffer`] owns every paragraph. Producers on other threads hold a
//! [`ConsoleHandle`] and only ever touch the pending queue.

pub mod buffer;
pub mod paragraph;
mod render;
mod replace;

pub use buffer::{
    ConsoleBuffer, ConsoleHandle, ConsoleSettings, LayoutReport, DEFAULT_MAX_LINES, FADE_DURATION,
    MIN_CONSOLE_WIDTH, MIN_MAX_LINES,
};
pub use paragraph::{ColorSegment, DisplayLine, LineSegment, Paragraph, ParagraphSnapshot};
pub use render::{CONSOLE_GUTTER_LEFT, CONSOLE_GUTTER_RIGHT, MESSAGE_SPACING, TEXT_INSET};
