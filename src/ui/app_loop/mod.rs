//! The interactive overlay: a demo console feed and texture pipeline drawn
//! into the terminal, driven by keyboard and mouse.

pub mod keybindings;
pub mod lifecycle;

use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::{
    self, Event, KeyModifiers, MouseButton, MouseEvent as TermMouseEvent, MouseEventKind,
};
use ratatui::layout::Size;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::demo::{run_console_feed, DemoRng, DemoTextureSource};
use crate::core::metrics::CellMetrics;
use crate::ui::debug_view::{DebugView, DebugViewOptions};
use crate::ui::surface::Rect;
use crate::ui::terminal_surface::BufferSurface;
use crate::ui::widget::{Modifiers, MouseEvent};
use crate::utils::color::detect_color_depth;
use crate::utils::logging::init_tracing;

use keybindings::{action_for_key, apply_action};
use lifecycle::{restore_terminal, setup_terminal};

const MAX_FPS: u64 = 30;

pub struct RunOptions {
    pub config: Config,
    pub log: Option<PathBuf>,
    /// Interval between demo console lines.
    pub demo_period: Duration,
    /// Number of synthetic textures in the texture view.
    pub textures: usize,
}

/// Window rect, in overlay pixels, for a terminal of `size` cells.
pub fn window_for(size: Size, metrics: &CellMetrics) -> Rect {
    Rect::new(
        0.0,
        0.0,
        f32::from(size.width) * metrics.cell_width,
        f32::from(size.height) * metrics.cell_height,
    )
}

/// Translate a terminal mouse event into an overlay press at the centre of
/// the clicked cell. Only left-button presses are forwarded.
pub fn overlay_mouse_event(event: &TermMouseEvent, metrics: &CellMetrics) -> Option<MouseEvent> {
    if event.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    let x = (f32::from(event.column) + 0.5) * metrics.cell_width;
    let y = (f32::from(event.row) + 0.5) * metrics.cell_height;
    Some(MouseEvent::new(x, y, modifiers_from(event.modifiers)))
}

fn modifiers_from(modifiers: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        alt: modifiers.contains(KeyModifiers::ALT),
    }
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

fn build_view(options: &RunOptions) -> Result<DebugView, Box<dyn Error>> {
    let rng = DemoRng::from_entropy();
    let view_options = DebugViewOptions::new(options.config.console_settings()).with_texture_source(
        Box::new(DemoTextureSource::new(options.textures, rng)),
        options.config.shows_texture_view(),
    );
    let view = DebugView::new(
        options.config.theme(),
        view_options,
        Rect::new(0.0, 0.0, 0.0, 0.0),
    )?;
    Ok(view)
}

pub async fn run_overlay(options: RunOptions) -> Result<(), Box<dyn Error>> {
    let metrics = CellMetrics::TERMINAL;
    let depth = detect_color_depth();
    let mut view = build_view(&options)?;

    init_tracing(options.log.as_deref(), Some(view.console_handle()))?;
    info!(
        textures = options.textures,
        period_ms = options.demo_period.as_millis() as u64,
        "overlay starting"
    );

    let feed = tokio::spawn(run_console_feed(
        view.console_handle(),
        options.demo_period,
        DemoRng::from_entropy(),
    ));

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_frame = Instant::now();

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        let size = match terminal.size() {
            Ok(size) => size,
            Err(err) => break 'main_loop Err(err.into()),
        };
        let window = window_for(size, &metrics);
        if window != view.window() {
            view.resize(window, &metrics);
        }

        let now = Instant::now();
        view.record_frame(now.duration_since(last_frame).as_secs_f32());
        last_frame = now;

        if let Err(err) = terminal.draw(|frame| {
            let area = frame.area();
            let mut surface = BufferSurface::new(frame.buffer_mut(), area, metrics, depth);
            view.draw(&mut surface, &metrics);
        }) {
            break 'main_loop Err(err.into());
        }

        let deadline = tokio::time::sleep(frame_duration);
        tokio::pin!(deadline);
        let keep_running = loop {
            tokio::select! {
                _ = &mut deadline => break true,
                ev = event_rx.recv() => {
                    let Some(ev) = ev else { break false };
                    if !handle_event(&mut view, ev, &metrics) {
                        break false;
                    }
                }
            }
        };
        if !keep_running {
            break 'main_loop Ok(());
        }
    };

    feed.abort();
    event_reader_handle.abort();
    restore_terminal(&mut terminal)?;
    debug!("overlay stopped");
    result
}

/// Apply one terminal event. Returns `false` when the overlay should exit.
fn handle_event(view: &mut DebugView, ev: Event, metrics: &CellMetrics) -> bool {
    match ev {
        Event::Key(key) => match action_for_key(&key) {
            Some(action) => apply_action(view, action),
            None => true,
        },
        Event::Mouse(mouse) => {
            if let Some(press) = overlay_mouse_event(&mouse, metrics) {
                let response = view.handle_mouse_down(&press, metrics);
                debug!(x = press.x, y = press.y, ?response, "mouse press");
            }
            true
        }
        Event::Resize(width, height) => {
            view.resize(window_for(Size::new(width, height), metrics), metrics);
            true
        }
        _ => true,
    }
}
