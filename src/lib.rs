//! # Rowbind - Record/Row Mapping Core
//!
//! Rowbind is the reflective compilation core of an object-relational
//! mapper: given a user record type and a shape (a row schema, or input
//! and output field lists with a batch size), it builds **compiled
//! accessor plans** once per `(record type, shape)` and executes them per
//! row or record with no further introspection.
//!
//! ## Key Features
//!
//! - **Row → record projection**: matches source-typed columns to record
//!   attributes, chooses a correctly-typed reader accessor per column and
//!   decides per attribute whether a null guard and a conversion are
//!   required
//! - **Row → dictionary projection**: schemaless reads into an ordered
//!   map keyed by column name
//! - **Parameter emission**: single-record and batched command-parameter
//!   filling with disambiguated names, parameter type resolution and
//!   vendor quirks preserved
//! - **Property handlers**: user-supplied transform pairs registered per
//!   type or per attribute, snapshotted into plans at build time
//! - **Conversion policies**: a process-wide Strict/Automatic switch
//!   governing how aggressively plans insert cross-type conversions
//! - **Process-wide caches**: record metadata and compiled accessors are
//!   built once and shared
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowbind::compiler::RecordMapper;
//! use rowbind::meta::{AttributeDescriptor, Record, RecordDescriptor};
//!
//! // implement Record for your type, then:
//! let mapper = RecordMapper::<User>::compile(&reader, None)?;
//! while reader.next_row() {
//!     let user: User = mapper.map_row(&reader)?;
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Value union, conversion kernel, shared utilities
//! - [`compiler`] - The accessor emitter and its compiled plans
//! - [`db`] - Field descriptors, parameter model, cursor/command seams
//! - [`errors`] - Error types and result definitions
//! - [`handler`] - Property handlers and the process-wide registry
//! - [`meta`] - Record descriptors and the type & property cache

use std::sync::LazyLock;

use crate::common::{atomic, Atomic, ConversionPolicy};

pub mod common;
pub mod compiler;
pub mod db;
pub mod errors;
pub mod handler;
pub mod meta;

static CONVERSION_POLICY: LazyLock<Atomic<ConversionPolicy>> =
    LazyLock::new(|| atomic(ConversionPolicy::Strict));

/// Returns the process-wide conversion policy.
///
/// Plans sample the policy once when they are built; changing it later
/// affects only accessors compiled afterwards.
pub fn conversion_policy() -> ConversionPolicy {
    *CONVERSION_POLICY.read()
}

/// Sets the process-wide conversion policy.
///
/// Intended to be called once during application startup, before any
/// accessor is compiled.
pub fn set_conversion_policy(policy: ConversionPolicy) {
    *CONVERSION_POLICY.write() = policy;
}
