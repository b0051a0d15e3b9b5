pub mod clock;
pub mod color;
pub mod config;
pub mod demo;
pub mod metrics;
pub mod text_wrapping;
