//! The accessor emitter: builds compiled accessor plans once per
//! `(record type, shape)` and executes them per row/record.
//!
//! Four entry points cover the hot paths:
//!
//! - [RecordMapper] — row → record
//! - [DynamicProjection] — row → ordered dictionary
//! - [ParameterBinder] — record → command parameters
//! - [BatchParameterBinder] — record batch → command parameters
//!
//! plus the two small writers [OutputParameterWriter] (parameter →
//! attribute) and [ValueWriter] (value → attribute). Compiled plans are
//! cached process-wide and snapshot the handler registry at build time.

mod cache;
mod reader_fields;
mod record_to_params;
mod row_to_map;
mod row_to_record;
mod writers;

pub use reader_fields::{snapshot_schema, ReaderFieldDef};
pub use record_to_params::{BatchParameterBinder, ParameterBinder};
pub use row_to_map::DynamicProjection;
pub use row_to_record::RecordMapper;
pub use writers::{OutputParameterWriter, ValueWriter};
