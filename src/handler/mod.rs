//! Property handlers: user-supplied transform pairs applied when values
//! move between columns and record attributes, and the process-wide
//! registry that owns them.

mod property_handler;
mod registry;

pub use property_handler::*;
pub use registry::*;
