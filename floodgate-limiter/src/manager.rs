//! Entry store mapping client keys to counter records

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::counter::Counter;
use crate::storage::{BoxError, Storage};

/// An in-process record together with its physical expiration deadline
#[derive(Debug, Clone, Copy)]
struct Slot {
    counter: Counter,
    deadline: Instant,
}

/// Maps a client key to its counter record, hiding whether records live
/// in process memory or in an external store.
///
/// The memory backend keeps native records and evicts lazily: an entry
/// whose deadline passed is treated as absent and removed on access.
/// The external backend pays a JSON (de)serialization per operation and
/// delegates eviction to the store's own TTL handling.
pub(crate) struct Manager {
    backend: Backend,
}

enum Backend {
    Memory(DashMap<String, Slot>),
    External(Arc<dyn Storage>),
}

impl Debug for Manager {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.backend {
            Backend::Memory(_) => f.write_str("Manager(memory)"),
            Backend::External(_) => f.write_str("Manager(external)"),
        }
    }
}

impl Manager {
    /// Creates a manager over the default in-process store.
    pub(crate) fn in_memory() -> Self {
        Self { backend: Backend::Memory(DashMap::with_capacity(1024)) }
    }

    /// Creates a manager over an external store.
    pub(crate) fn external(storage: Arc<dyn Storage>) -> Self {
        Self { backend: Backend::External(storage) }
    }

    /// Returns the record for `key`; absence yields a zero-value record.
    pub(crate) fn get(&self, key: &str) -> Result<Counter, BoxError> {
        match &self.backend {
            Backend::Memory(map) => {
                if let Some(slot) = map.get(key) {
                    if slot.deadline <= Instant::now() {
                        drop(slot); // release the shard lock before removal
                        map.remove(key);
                        return Ok(Counter::default());
                    }
                    return Ok(slot.counter);
                }
                Ok(Counter::default())
            }
            Backend::External(storage) => match storage.get(key)? {
                Some(raw) => Ok(serde_json::from_slice(&raw)?),
                None => Ok(Counter::default()),
            },
        }
    }

    /// Upserts the record under `key` with the given expiration hint.
    pub(crate) fn set(&self, key: &str, counter: Counter, ttl: Duration) -> Result<(), BoxError> {
        match &self.backend {
            Backend::Memory(map) => {
                let slot = Slot { counter, deadline: Instant::now() + ttl };
                map.insert(key.to_owned(), slot);
                Ok(())
            }
            Backend::External(storage) => {
                let raw = serde_json::to_vec(&counter)?;
                storage.set(key, &raw, ttl)
            }
        }
    }

    /// Removes the record stored under `key`.
    pub(crate) fn delete(&self, key: &str) -> Result<(), BoxError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
            Backend::External(storage) => storage.delete(key),
        }
    }
}
