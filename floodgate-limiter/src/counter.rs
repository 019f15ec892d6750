//! Per-key counter records

use serde::{Deserialize, Serialize};

/// Accounting record tracked per client key.
///
/// A record is created lazily on the first request from a key and
/// mutated on every subsequent one. A `window_expires_at` of `0` means
/// the record has not opened a window yet.
///
/// Records round-trip through external stores as a JSON blob; both
/// fields are preserved exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Requests observed in the current window
    pub current_hits: u32,

    /// Absolute time (seconds since the UNIX epoch) at which the
    /// current window ends
    pub window_expires_at: u64,
}

impl Counter {
    /// Rolls the record into the window that contains `now`.
    ///
    /// A fresh record opens its first window at `now + window_secs`; an
    /// elapsed window resets the hit count and opens a new one. An
    /// active window is left untouched. The rollover is lazy - it only
    /// happens here, when a request arrives for the key.
    #[inline]
    pub fn roll(&mut self, now: u64, window_secs: u64) {
        if self.window_expires_at == 0 {
            self.window_expires_at = now + window_secs;
        } else if now >= self.window_expires_at {
            self.current_hits = 0;
            self.window_expires_at = now + window_secs;
        }
    }

    /// Seconds until the current window ends, as seen at `now`.
    #[inline]
    pub fn reset_secs(&self, now: u64) -> u64 {
        self.window_expires_at.saturating_sub(now)
    }
}
