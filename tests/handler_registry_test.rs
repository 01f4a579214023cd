use std::sync::Arc;
use std::thread;

use rowbind::common::{Value, ValueType};
use rowbind::db::DbField;
use rowbind::errors::{ErrorKind, RowbindResult};
use rowbind::handler::{PropertyHandler, PropertyHandlerProvider, PropertyHandlerRegistry};
use rowbind::meta::AttributeInfo;

struct Reversing;

impl PropertyHandlerProvider for Reversing {
    fn get(&self, value: Value, _attribute: &AttributeInfo) -> RowbindResult<Value> {
        match value {
            Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
            other => Ok(other),
        }
    }

    fn set(&self, value: Value, _attribute: &AttributeInfo) -> RowbindResult<Value> {
        match value {
            Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
            other => Ok(other),
        }
    }
}

// each test registers against its own marker type so the process-wide
// registry never sees conflicting registrations across tests
struct ForceTarget;
struct DuplicateTarget;
struct RemoveTarget;
struct ThreadTarget;
struct SelectorTarget;
struct FacadeTarget;

#[test]
fn force_replaces_an_existing_registration() {
    let registry = PropertyHandlerRegistry::global();
    let first = PropertyHandler::new(Reversing);
    let second = PropertyHandler::new(Reversing);

    registry.register::<ForceTarget>(first.clone(), false).unwrap();
    registry.register::<ForceTarget>(second.clone(), true).unwrap();

    let found = registry.lookup::<ForceTarget>().unwrap();
    assert!(found.same_handler(&second));
    assert!(!found.same_handler(&first));
}

#[test]
fn duplicate_registration_without_force_fails() {
    let registry = PropertyHandlerRegistry::global();
    registry
        .register::<DuplicateTarget>(PropertyHandler::new(Reversing), false)
        .unwrap();
    let result = registry.register::<DuplicateTarget>(PropertyHandler::new(Reversing), false);
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::MappingExists);
}

#[test]
fn remove_is_idempotent_and_lookup_returns_absent() {
    let registry = PropertyHandlerRegistry::global();
    registry
        .register::<RemoveTarget>(PropertyHandler::new(Reversing), false)
        .unwrap();
    registry.remove::<RemoveTarget>();
    assert!(registry.lookup::<RemoveTarget>().is_none());
    // a second remove is a no-op
    registry.remove::<RemoveTarget>();
    assert!(registry.lookup::<RemoveTarget>().is_none());
}

#[test]
fn registration_is_visible_across_threads() {
    let registry = PropertyHandlerRegistry::global();
    let handler = PropertyHandler::new(Reversing);
    registry.register::<ThreadTarget>(handler.clone(), true).unwrap();

    let handler = Arc::new(handler);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let expected = handler.clone();
            thread::spawn(move || {
                let observed = PropertyHandlerRegistry::global()
                    .lookup::<ThreadTarget>()
                    .expect("handler must be visible after register returns");
                assert!(observed.same_handler(&expected));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn attribute_registration_accepts_name_and_field_selectors() {
    let registry = PropertyHandlerRegistry::global();
    let by_name = PropertyHandler::new(Reversing);
    let by_field = PropertyHandler::new(Reversing);

    registry
        .register_attribute::<SelectorTarget, str>("code", by_name.clone(), true)
        .unwrap();
    let field = DbField::new("[label]", ValueType::String, false);
    registry
        .register_attribute::<SelectorTarget, DbField>(&field, by_field.clone(), true)
        .unwrap();

    assert!(registry
        .lookup_attribute::<SelectorTarget>("code")
        .unwrap()
        .same_handler(&by_name));
    assert!(registry
        .lookup_attribute::<SelectorTarget>("label")
        .unwrap()
        .same_handler(&by_field));
    // attribute names match case-sensitively
    assert!(registry.lookup_attribute::<SelectorTarget>("Code").is_none());
}

#[test]
#[allow(deprecated)]
fn deprecated_facade_forwards_to_the_registry() {
    use rowbind::handler::PropertyHandlerMapper;

    let handler = PropertyHandler::new(Reversing);
    PropertyHandlerMapper::add::<FacadeTarget>(handler.clone(), true).unwrap();

    // both surfaces observe the same registration
    assert!(PropertyHandlerMapper::get::<FacadeTarget>()
        .unwrap()
        .same_handler(&handler));
    assert!(PropertyHandlerRegistry::global()
        .lookup::<FacadeTarget>()
        .unwrap()
        .same_handler(&handler));

    PropertyHandlerMapper::add_attribute::<FacadeTarget, str>("name", handler.clone(), true).unwrap();
    assert!(PropertyHandlerMapper::get_attribute::<FacadeTarget>("name")
        .unwrap()
        .same_handler(&handler));

    PropertyHandlerMapper::remove_attribute::<FacadeTarget>("name");
    assert!(PropertyHandlerMapper::get_attribute::<FacadeTarget>("name").is_none());
    PropertyHandlerMapper::remove::<FacadeTarget>();
    assert!(PropertyHandlerMapper::get::<FacadeTarget>().is_none());
}
