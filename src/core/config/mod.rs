pub mod data;
pub mod io;
pub mod orchestrator;

pub use data::{path_display, Config};
pub use io::ConfigError;
pub use orchestrator::ConfigOrchestrator;

#[cfg(test)]
pub mod tests;
