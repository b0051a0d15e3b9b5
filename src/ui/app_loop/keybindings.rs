//! Key handling for the interactive overlay.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::console::ConsoleBuffer;
use crate::core::color::Rgba;
use crate::ui::debug_view::DebugView;

/// Pixels the console widens or narrows per key press.
pub const WIDTH_STEP: f32 = 64.0;
/// Persist times cycled through with `p`, in seconds.
pub const PERSIST_STEPS: [f32; 3] = [0.0, 10.0, 30.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Quit,
    ClearConsole,
    CycleFont,
    MoreLines,
    FewerLines,
    CyclePersistTime,
    ToggleTextureView,
    ToggleBoxPerMessage,
    ToggleMessageSpacing,
    HighlightRegions,
    Widen,
    Narrow,
}

pub fn action_for_key(key: &KeyEvent) -> Option<OverlayAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(OverlayAction::Quit);
    }
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => OverlayAction::Quit,
        KeyCode::Char('c') => OverlayAction::ClearConsole,
        KeyCode::Char('f') => OverlayAction::CycleFont,
        KeyCode::Char('+') | KeyCode::Char('=') => OverlayAction::MoreLines,
        KeyCode::Char('-') => OverlayAction::FewerLines,
        KeyCode::Char('p') => OverlayAction::CyclePersistTime,
        KeyCode::Char('t') => OverlayAction::ToggleTextureView,
        KeyCode::Char('b') => OverlayAction::ToggleBoxPerMessage,
        KeyCode::Char('s') => OverlayAction::ToggleMessageSpacing,
        KeyCode::Char('r') => OverlayAction::HighlightRegions,
        KeyCode::Right => OverlayAction::Widen,
        KeyCode::Left => OverlayAction::Narrow,
        _ => return None,
    };
    Some(action)
}

fn next_persist_time(current: f32) -> f32 {
    PERSIST_STEPS
        .iter()
        .copied()
        .find(|step| *step > current)
        .unwrap_or(PERSIST_STEPS[0])
}

/// Apply `action` to the overlay. Returns `false` when the loop should end.
pub fn apply_action(view: &mut DebugView, action: OverlayAction) -> bool {
    if action == OverlayAction::Quit {
        return false;
    }
    if action == OverlayAction::ToggleTextureView {
        view.toggle_texture_view();
        return true;
    }

    let window_width = view.window().width;
    let Some(console) = view.console_mut() else {
        return true;
    };
    apply_console_action(console, action, window_width);
    true
}

fn apply_console_action(console: &mut ConsoleBuffer, action: OverlayAction, window_width: f32) {
    match action {
        OverlayAction::ClearConsole => console.clear(),
        OverlayAction::CycleFont => console.set_font_size(console.font_size().next()),
        OverlayAction::MoreLines => console.set_max_lines(console.max_lines() + 5),
        OverlayAction::FewerLines => console.set_max_lines(console.max_lines().saturating_sub(5)),
        OverlayAction::CyclePersistTime => {
            console.set_line_persist_time(next_persist_time(console.line_persist_time()))
        }
        OverlayAction::ToggleBoxPerMessage => {
            console.set_box_per_message(!console.box_per_message())
        }
        OverlayAction::ToggleMessageSpacing => {
            console.set_disable_message_spacing(!console.message_spacing_disabled())
        }
        OverlayAction::HighlightRegions => {
            console.set_replacement_color(Rgba::YELLOW);
            console.replace_all_text("region", "REGION", true);
        }
        OverlayAction::Widen => {
            console.reshape(console.console_width() + WIDTH_STEP, window_width);
        }
        OverlayAction::Narrow => {
            console.reshape(console.console_width() - WIDTH_STEP, window_width);
        }
        OverlayAction::Quit | OverlayAction::ToggleTextureView => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleSettings, MIN_MAX_LINES};
    use crate::core::metrics::{CellMetrics, FontSize};
    use crate::ui::debug_view::DebugViewOptions;
    use crate::ui::surface::Rect;
    use crate::ui::theme::UiTheme;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view() -> DebugView {
        DebugView::new(
            UiTheme::dark_default(),
            DebugViewOptions::new(ConsoleSettings::default()),
            Rect::new(0.0, 0.0, 800.0, 400.0),
        )
        .expect("view")
    }

    #[test]
    fn quit_keys() {
        assert_eq!(action_for_key(&key(KeyCode::Char('q'))), Some(OverlayAction::Quit));
        assert_eq!(action_for_key(&key(KeyCode::Esc)), Some(OverlayAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for_key(&ctrl_c), Some(OverlayAction::Quit));
        assert_eq!(action_for_key(&key(KeyCode::Char('c'))), Some(OverlayAction::ClearConsole));
        assert_eq!(action_for_key(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut view = view();
        assert!(!apply_action(&mut view, OverlayAction::Quit));
        assert!(apply_action(&mut view, OverlayAction::CycleFont));
        assert_eq!(view.console().unwrap().font_size(), FontSize::Large);
    }

    #[test]
    fn fewer_lines_stops_at_the_minimum() {
        let mut view = view();
        for _ in 0..20 {
            apply_action(&mut view, OverlayAction::FewerLines);
        }
        assert_eq!(view.console().unwrap().max_lines(), MIN_MAX_LINES);
    }

    #[test]
    fn persist_time_cycles_and_wraps() {
        assert_eq!(next_persist_time(0.0), 10.0);
        assert_eq!(next_persist_time(10.0), 30.0);
        assert_eq!(next_persist_time(30.0), 0.0);
    }

    #[test]
    fn highlight_rewrites_console_text() {
        let mut view = view();
        view.console_handle().add_line("Region crossing complete", Rgba::WHITE);
        view.console_mut().unwrap().drain_and_layout(&CellMetrics::TERMINAL);
        apply_action(&mut view, OverlayAction::HighlightRegions);
        let texts: Vec<String> = view
            .console()
            .unwrap()
            .paragraphs()
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["REGION crossing complete".to_string()]);
    }

    #[test]
    fn narrowing_respects_the_minimum_width() {
        let mut view = view();
        for _ in 0..20 {
            apply_action(&mut view, OverlayAction::Narrow);
        }
        assert_eq!(
            view.console().unwrap().console_width(),
            crate::console::MIN_CONSOLE_WIDTH
        );
    }
}
