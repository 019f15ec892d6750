//! Pluggable backing store contract

use std::error::Error as StdError;
use std::time::Duration;

/// Boxed error returned by storage backends
pub type BoxError = Box<
    dyn StdError
    + Send
    + Sync
>;

/// An external key-value store for counter records.
///
/// Records are handed over as raw bytes; the limiter owns the
/// serialization format. The `ttl` passed to [`Storage::set`] is a
/// physical expiration hint - the store is responsible for evicting
/// entries whose TTL elapsed, and [`Storage::get`] must treat them as
/// absent.
///
/// Calls are made synchronously while the limiter holds its coarse
/// lock; a high-latency backend serializes all request accounting
/// through that lock.
pub trait Storage: Send + Sync {
    /// Returns the raw record stored under `key`, or `None` when absent
    /// or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BoxError>;

    /// Upserts the raw record under `key` with the given expiration hint.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), BoxError>;

    /// Removes the record stored under `key`.
    fn delete(&self, key: &str) -> Result<(), BoxError>;
}
