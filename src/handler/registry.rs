use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::sync::LazyLock;

use crate::db::DbField;
use crate::errors::{ErrorKind, RowbindError, RowbindResult};
use crate::handler::PropertyHandler;

/// Resolves a registration target to a canonical attribute name.
///
/// Attribute-level registrations are addressable either by the attribute's
/// canonical name or by a field descriptor whose unquoted name equals it.
/// The resolved name is matched case-sensitively against the attribute's
/// canonical name.
pub trait AttributeSelector {
    fn attribute_name(&self) -> &str;
}

impl AttributeSelector for str {
    fn attribute_name(&self) -> &str {
        self
    }
}

impl AttributeSelector for String {
    fn attribute_name(&self) -> &str {
        self
    }
}

impl AttributeSelector for DbField {
    fn attribute_name(&self) -> &str {
        self.name()
    }
}

/// Process-wide registry mapping record types and attributes to property
/// handlers.
///
/// # Purpose
/// Stores user-supplied [PropertyHandler]s at two levels: per record type,
/// and per `(record type, attribute name)`. Accessor emitters snapshot the
/// matching handler when a plan is built; mutating the registry afterwards
/// (including [PropertyHandlerRegistry::clear]) never retouches compiled
/// plans.
///
/// # Concurrency
/// Lookups are safe under arbitrary concurrency; registrations and
/// removals serialize per map shard. After `register` returns without
/// error, a `lookup` for the same key on any thread observes the handler.
pub struct PropertyHandlerRegistry {
    type_handlers: DashMap<TypeId, PropertyHandler>,
    attribute_handlers: DashMap<(TypeId, String), PropertyHandler>,
}

static GLOBAL_REGISTRY: LazyLock<PropertyHandlerRegistry> =
    LazyLock::new(PropertyHandlerRegistry::new);

impl PropertyHandlerRegistry {
    pub fn new() -> Self {
        PropertyHandlerRegistry {
            type_handlers: DashMap::new(),
            attribute_handlers: DashMap::new(),
        }
    }

    /// The process-wide registry instance consulted by the accessor
    /// emitters.
    pub fn global() -> &'static PropertyHandlerRegistry {
        &GLOBAL_REGISTRY
    }

    /// Registers a type-level handler for `T`.
    ///
    /// # Errors
    /// `ErrorKind::MappingExists` when `T` already carries a type-level
    /// handler and `force` is not set.
    pub fn register<T: 'static>(&self, handler: PropertyHandler, force: bool) -> RowbindResult<()> {
        match self.type_handlers.entry(TypeId::of::<T>()) {
            Entry::Occupied(mut entry) => {
                if !force {
                    log::error!("A handler already exists for type {}", type_name::<T>());
                    return Err(RowbindError::new(
                        &format!("A handler already exists for type {}", type_name::<T>()),
                        ErrorKind::MappingExists,
                    ));
                }
                entry.insert(handler);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Registers an attribute-level handler for `T` and the attribute the
    /// selector resolves to.
    ///
    /// # Errors
    /// `ErrorKind::MappingExists` when the exact `(type, attribute)` key
    /// already carries a handler and `force` is not set.
    pub fn register_attribute<T: 'static, S: AttributeSelector + ?Sized>(
        &self,
        selector: &S,
        handler: PropertyHandler,
        force: bool,
    ) -> RowbindResult<()> {
        let key = (TypeId::of::<T>(), selector.attribute_name().to_string());
        match self.attribute_handlers.entry(key) {
            Entry::Occupied(mut entry) => {
                if !force {
                    log::error!(
                        "A handler already exists for attribute {}.{}",
                        type_name::<T>(),
                        selector.attribute_name()
                    );
                    return Err(RowbindError::new(
                        &format!(
                            "A handler already exists for attribute {}.{}",
                            type_name::<T>(),
                            selector.attribute_name()
                        ),
                        ErrorKind::MappingExists,
                    ));
                }
                entry.insert(handler);
                Ok(())
            }
            Entry::Vacant(entry) => {
                entry.insert(handler);
                Ok(())
            }
        }
    }

    /// Looks up the type-level handler for `T`.
    pub fn lookup<T: 'static>(&self) -> Option<PropertyHandler> {
        self.type_handlers
            .get(&TypeId::of::<T>())
            .map(|entry| entry.clone())
    }

    /// Looks up the attribute-level handler for `T` and the canonical
    /// attribute name (case-sensitive).
    pub fn lookup_attribute<T: 'static>(&self, attribute_name: &str) -> Option<PropertyHandler> {
        self.attribute_handlers
            .get(&(TypeId::of::<T>(), attribute_name.to_string()))
            .map(|entry| entry.clone())
    }

    /// Removes the type-level handler for `T`; absent keys are a no-op.
    pub fn remove<T: 'static>(&self) {
        self.type_handlers.remove(&TypeId::of::<T>());
    }

    /// Removes an attribute-level handler; absent keys are a no-op.
    pub fn remove_attribute<T: 'static>(&self, attribute_name: &str) {
        self.attribute_handlers
            .remove(&(TypeId::of::<T>(), attribute_name.to_string()));
    }

    /// Drops every registration at both levels.
    pub fn clear(&self) {
        self.type_handlers.clear();
        self.attribute_handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.type_handlers.len() + self.attribute_handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_handlers.is_empty() && self.attribute_handlers.is_empty()
    }
}

impl Default for PropertyHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Backward-compatibility alias of the registry surface.
///
/// Forwards one-to-one to [PropertyHandlerRegistry::global]; retained for
/// callers of the pre-0.3 naming.
#[deprecated(since = "0.3.0", note = "use `PropertyHandlerRegistry::global()` instead")]
pub struct PropertyHandlerMapper;

#[allow(deprecated)]
impl PropertyHandlerMapper {
    pub fn add<T: 'static>(handler: PropertyHandler, force: bool) -> RowbindResult<()> {
        PropertyHandlerRegistry::global().register::<T>(handler, force)
    }

    pub fn add_attribute<T: 'static, S: AttributeSelector + ?Sized>(
        selector: &S,
        handler: PropertyHandler,
        force: bool,
    ) -> RowbindResult<()> {
        PropertyHandlerRegistry::global().register_attribute::<T, S>(selector, handler, force)
    }

    pub fn get<T: 'static>() -> Option<PropertyHandler> {
        PropertyHandlerRegistry::global().lookup::<T>()
    }

    pub fn get_attribute<T: 'static>(attribute_name: &str) -> Option<PropertyHandler> {
        PropertyHandlerRegistry::global().lookup_attribute::<T>(attribute_name)
    }

    pub fn remove<T: 'static>() {
        PropertyHandlerRegistry::global().remove::<T>();
    }

    pub fn remove_attribute<T: 'static>(attribute_name: &str) {
        PropertyHandlerRegistry::global().remove_attribute::<T>(attribute_name);
    }

    pub fn clear() {
        PropertyHandlerRegistry::global().clear();
    }
}
