//! Overlay widgets and the terminal front end.
//!
//! Widgets draw into a [`surface::RenderSurface`] in pixel coordinates and
//! live in the arena owned by [`widget::WidgetTree`]. Key submodules:
//! - [`debug_view`]: assembles the console, statistics and texture view.
//! - [`container`], [`stat_bar`], [`texture_view`]: the widget types.
//! - [`terminal_surface`]: maps pixels onto a ratatui buffer.
//! - [`app_loop`]: the interactive event loop.

pub mod app_loop;
pub mod console_view;
pub mod container;
pub mod debug_view;
pub mod stat_bar;
pub mod surface;
pub mod terminal_surface;
pub mod texture_view;
pub mod theme;
pub mod widget;
