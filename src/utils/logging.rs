//! Tracing setup and the layer that mirrors log events into the on-screen
//! console.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::console::ConsoleHandle;
use crate::core::color::Rgba;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Forwards tracing events at or above `max_level` to a console.
pub struct ConsoleLayer {
    handle: ConsoleHandle,
    max_level: Level,
}

impl ConsoleLayer {
    pub fn new(handle: ConsoleHandle) -> Self {
        Self {
            handle,
            max_level: Level::INFO,
        }
    }

    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

pub fn level_color(level: &Level) -> Rgba {
    match *level {
        Level::ERROR => Rgba::RED,
        Level::WARN => Rgba::ORANGE,
        Level::INFO => Rgba::WHITE,
        Level::DEBUG => Rgba::GREY,
        Level::TRACE => Rgba::GREY.with_alpha(0.7),
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: &str) {
        if name == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {name}={value}");
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push_field(field.name(), &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push_field(field.name(), value);
    }
}

impl<S> Layer<S> for ConsoleLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        if *level > self.max_level {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let stamp = chrono::Local::now().format("%H:%M:%S");
        let line = format!("{stamp} {level:>5} {}{}", visitor.message, visitor.fields);
        self.handle.add_line(line, level_color(level));
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber.
///
/// Events go to `log_file` when given; otherwise to stderr, unless a
/// `console` is attached (stderr would scribble over the terminal UI).
pub fn init_tracing(
    log_file: Option<&Path>,
    console: Option<ConsoleHandle>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    let stderr_layer = (log_file.is_none() && console.is_none())
        .then(|| fmt::layer().with_writer(std::io::stderr));
    let console_layer = console.map(ConsoleLayer::new);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stderr_layer)
        .with(console_layer)
        .try_init()?;
    Ok(())
}
