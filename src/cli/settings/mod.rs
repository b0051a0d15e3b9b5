//! Settings management for CLI set/unset/show commands.
//!
//! Each configuration key has a handler that knows how to parse, store,
//! clear and display it. Handlers operate on an in-memory [`Config`]; the
//! caller decides where it is loaded from and persisted to.

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::Config;

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the configuration value from the arguments following the key.
    ///
    /// # Returns
    /// A success message to display, or an error.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Unset (clear) the configuration value.
    fn unset(&self, config: &mut Config) -> String;

    /// Format the current value for display in `show` output.
    fn format(&self, config: &Config) -> String;
}
