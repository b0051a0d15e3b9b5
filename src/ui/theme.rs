use std::sync::{Arc, RwLock};

use crate::core::color::Rgba;

/// Console background colour shared by every console built from one theme.
///
/// The stored colour already has the opacity folded into its alpha channel.
#[derive(Debug, Clone)]
pub struct SharedBackground {
    inner: Arc<RwLock<Rgba>>,
}

impl SharedBackground {
    pub fn new(color: Rgba, opacity: f32) -> Self {
        let bg = Self {
            inner: Arc::new(RwLock::new(Rgba::TRANSPARENT)),
        };
        bg.set(color, opacity);
        bg
    }

    /// Replace the colour; `opacity` is clamped to `[0, 1]` and multiplied
    /// into the colour's own alpha.
    pub fn set(&self, color: Rgba, opacity: f32) {
        let value = color.with_alpha(color.a * opacity.clamp(0.0, 1.0));
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = value;
    }

    pub fn get(&self) -> Rgba {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SharedBackground {
    fn default() -> Self {
        Self::new(Rgba::BLACK, DEFAULT_BACKGROUND_OPACITY)
    }
}

pub const DEFAULT_BACKGROUND_OPACITY: f32 = 0.7;

/// Colours used by the overlay widgets.
#[derive(Debug, Clone)]
pub struct UiTheme {
    pub console_background: SharedBackground,
    pub panel_background: Rgba,
    pub label: Rgba,
    pub value_text: Rgba,
    pub bar_fill: Rgba,
    pub bar_mean: Rgba,
    pub bar_ticks: Rgba,
    pub history: Rgba,
    pub highlight: Rgba,
    pub warning: Rgba,
}

impl UiTheme {
    pub fn dark_default() -> Self {
        Self {
            console_background: SharedBackground::default(),
            panel_background: Rgba::new(0.0, 0.0, 0.0, 0.35),
            label: Rgba::WHITE,
            value_text: Rgba::new(0.85, 0.85, 0.85, 1.0),
            bar_fill: Rgba::new(0.6, 0.6, 0.6, 0.8),
            bar_mean: Rgba::RED,
            bar_ticks: Rgba::new(1.0, 1.0, 1.0, 0.4),
            history: Rgba::new(0.4, 0.8, 0.4, 0.9),
            highlight: Rgba::YELLOW,
            warning: Rgba::ORANGE,
        }
    }

    /// Theme whose console background comes from configuration.
    pub fn with_console_background(color: Rgba, opacity: f32) -> Self {
        Self {
            console_background: SharedBackground::new(color, opacity),
            ..Self::dark_default()
        }
    }
}

impl Default for UiTheme {
    fn default() -> Self {
        Self::dark_default()
    }
}
