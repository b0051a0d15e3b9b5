//! viewer-debug is the diagnostic overlay of a virtual-world viewer, drawn
//! into a terminal.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`console`] owns the fading text console: a thread-safe pending queue,
//!   paragraph aging and eviction, word wrap and search/replace.
//! - [`core`] holds colour and text measurement primitives, the wrap engine,
//!   configuration, and the synthetic data that drives the demo overlay.
//! - [`ui`] provides the widget arena (containers, statistics bars, the
//!   texture fetch view) and the interactive terminal loop.
//! - [`cli`] parses arguments and routes `run`, `wrap` and the settings
//!   commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod cli;
pub mod console;
pub mod core;
pub mod ui;
pub mod utils;
