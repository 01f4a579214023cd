use std::sync::Arc;

use crate::common::Value;
use crate::errors::RowbindResult;
use crate::meta::AttributeInfo;

/// Contract for implementing property handlers.
///
/// # Purpose
/// A property handler is a pair of pure transforms applied when a value
/// is marshaled into or out of a record attribute: `get` turns an
/// incoming column value into the attribute value, `set` turns an
/// outgoing attribute value into the parameter value. Handlers let
/// applications encode custom representations (encryption, trimming,
/// enumeration mapping) without touching the mapping core.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; handlers are shared across
/// compiled accessor plans on arbitrary threads.
pub trait PropertyHandlerProvider: Send + Sync {
    /// Transforms an incoming column value into the attribute value.
    ///
    /// # Arguments
    /// * `value` - The raw column value as read from the cursor.
    /// * `attribute` - Metadata of the destination attribute.
    fn get(&self, value: Value, attribute: &AttributeInfo) -> RowbindResult<Value>;

    /// Transforms an outgoing attribute value into the parameter value.
    ///
    /// # Arguments
    /// * `value` - The raw attribute value as read from the record.
    /// * `attribute` - Metadata of the source attribute.
    fn set(&self, value: Value, attribute: &AttributeInfo) -> RowbindResult<Value>;
}

/// Wraps a property handler implementation.
///
/// # Purpose
/// Provides a type-erased, cloneable wrapper around any
/// [PropertyHandlerProvider] implementation. The registry stores and
/// compares these by reference identity; compiled plans snapshot the
/// `Arc` at emission time, so later re-registration does not affect
/// already-compiled accessors.
#[derive(Clone)]
pub struct PropertyHandler {
    inner: Arc<dyn PropertyHandlerProvider>,
}

impl PropertyHandler {
    /// Creates a new handler from an implementation.
    pub fn new<T: PropertyHandlerProvider + 'static>(inner: T) -> Self {
        PropertyHandler {
            inner: Arc::new(inner),
        }
    }

    /// Transforms an incoming column value into the attribute value.
    pub fn get(&self, value: Value, attribute: &AttributeInfo) -> RowbindResult<Value> {
        self.inner.get(value, attribute)
    }

    /// Transforms an outgoing attribute value into the parameter value.
    pub fn set(&self, value: Value, attribute: &AttributeInfo) -> RowbindResult<Value> {
        self.inner.set(value, attribute)
    }

    /// Reference identity comparison; two clones of the same registration
    /// are the same handler.
    pub fn same_handler(&self, other: &PropertyHandler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for PropertyHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PropertyHandler({:p})", Arc::as_ptr(&self.inner))
    }
}
