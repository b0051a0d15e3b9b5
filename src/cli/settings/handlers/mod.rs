//! Setting handlers for different configuration patterns.

pub mod boolean;
pub mod value;

pub use boolean::*;
pub use value::*;
