//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::cli::settings::helpers::mutate_config;
use crate::cli::settings::{SettingError, SettingRegistry};
use crate::core::config::{path_display, Config, ConfigOrchestrator};
use crate::core::metrics::{CellMetrics, FontSize};
use crate::core::text_wrapping::{TextWrapper, WrapConfig};
use crate::ui::app_loop::{run_overlay, RunOptions};
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "viewer-debug")]
#[command(about = "Debug console, statistics and texture overlay in the terminal")]
#[command(
    long_about = "viewer-debug draws a viewer's diagnostic overlay in the terminal: a fading \
text console fed by a synthetic message stream, statistics bars, and a texture fetch \
view driven by a simulated texture pipeline.\n\n\
Controls:\n\
  q / Esc / Ctrl+C  Quit\n\
  c                 Clear the console\n\
  f                 Cycle console font\n\
  + / -             Keep more / fewer console messages\n\
  p                 Cycle message persist time (forever, 10s, 30s)\n\
  b                 Toggle a box per message\n\
  s                 Toggle spacing between messages\n\
  r                 Highlight the word \"region\" in the console\n\
  Left / Right      Narrow / widen the console\n\
  t                 Toggle the texture view\n\
  Mouse             Click panel headers to collapse, stat bars to cycle their display;\n\
                    Shift/Ctrl/Alt-click the texture view to freeze, reorder or dump it"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write log output to the given file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive overlay (default)
    Run(RunArgs),
    /// Word-wrap text to a pixel width and print one row per line
    Wrap {
        /// Wrap width in pixels (a terminal cell is 8px wide)
        #[arg(short = 'w', long)]
        width: f32,
        /// Font to measure with: monospace, small or large
        #[arg(short = 'f', long, default_value = "small")]
        font: FontSize,
        /// Text to wrap
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        text: Vec<String>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show current configuration
    Show,
}

/// Per-run overrides for the interactive overlay.
#[derive(ClapArgs, Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    /// Messages kept in the console
    #[arg(long)]
    pub max_lines: Option<usize>,
    /// Seconds before messages fade out; 0 keeps them forever
    #[arg(long)]
    pub persist_time: Option<f32>,
    /// Console font: monospace, small or large
    #[arg(long)]
    pub font: Option<FontSize>,
    /// Show the texture view on startup
    #[arg(long)]
    pub texture_view: bool,
    /// Number of simulated textures
    #[arg(long, default_value_t = 40)]
    pub textures: usize,
    /// Milliseconds between demo console messages
    #[arg(long, default_value_t = 400)]
    pub period_ms: u64,
}

impl RunArgs {
    /// Defaults used when no subcommand is given; mirrors the clap defaults.
    fn default_for_cli() -> Self {
        Self {
            textures: 40,
            period_ms: 400,
            ..Self::default()
        }
    }

    /// Fold command-line overrides into `config` for this run only.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(max_lines) = self.max_lines {
            config.max_lines = Some(max_lines);
        }
        if let Some(persist_time) = self.persist_time {
            config.persist_time = Some(persist_time);
        }
        if let Some(font) = self.font {
            config.font_size = Some(font);
        }
        if self.texture_view {
            config.texture_view = Some(true);
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default_for_cli()));

    match command {
        Commands::Run(run) => {
            let mut config =
                ConfigOrchestrator::new(Config::get_config_path()?).load_with_cache()?;
            run.apply_to(&mut config);
            run_overlay(RunOptions {
                config,
                log: args.log,
                demo_period: Duration::from_millis(run.period_ms.max(1)),
                textures: run.textures,
            })
            .await
        }
        Commands::Wrap { width, font, text } => {
            init_tracing(args.log.as_deref(), None)?;
            for row in wrap_rows(&text.join(" "), width, font) {
                println!("{row}");
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            init_tracing(args.log.as_deref(), None)?;
            let store = ConfigOrchestrator::new(Config::get_config_path()?);
            report(set_setting(&SettingRegistry::new(), &store, &key, &value));
            Ok(())
        }
        Commands::Unset { key } => {
            init_tracing(args.log.as_deref(), None)?;
            let store = ConfigOrchestrator::new(Config::get_config_path()?);
            report(unset_setting(&SettingRegistry::new(), &store, &key));
            Ok(())
        }
        Commands::Show => {
            init_tracing(args.log.as_deref(), None)?;
            let store = ConfigOrchestrator::new(Config::get_config_path()?);
            let config = store.load_with_cache()?;
            println!("Configuration ({}):", path_display(store.path()));
            for line in show_lines(&SettingRegistry::new(), &config) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn report(result: Result<String, SettingError>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

/// Rows produced by wrapping `text` to `width` pixels on a terminal grid.
pub fn wrap_rows(text: &str, width: f32, font: FontSize) -> Vec<String> {
    TextWrapper::wrap_to_strings(&CellMetrics::TERMINAL, text, &WrapConfig::new(width, font))
}

pub fn set_setting(
    registry: &SettingRegistry,
    store: &ConfigOrchestrator,
    key: &str,
    value: &[String],
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    mutate_config(store, |config| handler.set(value, config))
}

pub fn unset_setting(
    registry: &SettingRegistry,
    store: &ConfigOrchestrator,
    key: &str,
) -> Result<String, SettingError> {
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
    mutate_config(store, |config| Ok(handler.unset(config)))
}

pub fn show_lines(registry: &SettingRegistry, config: &Config) -> Vec<String> {
    registry
        .keys_display_order()
        .iter()
        .filter_map(|key| registry.get(key))
        .map(|handler| handler.format(config))
        .collect()
}

#[cfg(test)]
mod tests;
