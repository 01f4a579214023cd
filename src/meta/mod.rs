//! Record metadata: descriptors, the [Record] trait, and the process-wide
//! type & property cache.

mod attribute;
mod dynamic;
mod record_info;

pub use attribute::*;
pub use dynamic::*;
pub use record_info::*;
