use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock};

use crate::errors::{ErrorKind, RowbindError, RowbindResult};

/// Process-wide accessor cache keyed by `(record type, shape fingerprint)`.
///
/// Entries are immortal for the process: compiled accessors own no mutable
/// state and are never invalidated, not even by a handler registry
/// `clear()`.
static ACCESSOR_CACHE: LazyLock<DashMap<(TypeId, u64), Arc<dyn Any + Send + Sync>>> =
    LazyLock::new(DashMap::new);

/// Returns the cached accessor for the key, building and inserting it on
/// first demand.
///
/// The fast path is a lock-free read; on a miss the accessor is built
/// outside the shard lock and the insert re-checks under it, so concurrent
/// builders agree on a single entry.
pub(crate) fn get_or_build<A, F>(type_id: TypeId, fingerprint: u64, build: F) -> RowbindResult<Arc<A>>
where
    A: Send + Sync + 'static,
    F: FnOnce() -> RowbindResult<A>,
{
    let key = (type_id, fingerprint);
    if let Some(existing) = ACCESSOR_CACHE.get(&key) {
        if let Ok(accessor) = existing.value().clone().downcast::<A>() {
            return Ok(accessor);
        }
    }

    let built: Arc<A> = Arc::new(build()?);
    let entry = ACCESSOR_CACHE
        .entry(key)
        .or_insert_with(|| built.clone() as Arc<dyn Any + Send + Sync>);
    entry.value().clone().downcast::<A>().map_err(|_| {
        RowbindError::new(
            "Accessor cache entry has an unexpected type",
            ErrorKind::Internal,
        )
    })
}
