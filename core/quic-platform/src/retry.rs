// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Rotating stateless-retry keys (`spec.md` §4.3, invariant I5: "a
//! partition's retry-key pair: `keys[0]` is valid for the current
//! 30-second window; `keys[1]` is valid only for the immediately
//! preceding window").

use core::sync::atomic::{AtomicU64, Ordering};
use ring::hkdf;
use zeroize::Zeroize;

/// Length of a retry-validation window, in milliseconds.
pub const WINDOW_MS: u64 = 30_000;

/// A derived retry key together with the window index it was derived
/// for.
#[derive(Clone)]
pub struct RetryKey {
    index: u64,
    bytes: [u8; 32],
}

impl RetryKey {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl Drop for RetryKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

fn derive(base_secret: &hkdf::Prk, index: u64) -> [u8; 32] {
    let info = index.to_le_bytes();
    let mut out = [0u8; 32];
    base_secret
        .expand(&[&info], hkdf::HKDF_SHA256)
        .expect("fixed-length expand")
        .fill(&mut out)
        .expect("fixed-length fill");
    out
}

fn window_index(now_ms: u64) -> u64 {
    now_ms / WINDOW_MS
}

/// The rotating `keys[0]`/`keys[1]` pair described by invariant I5,
/// guarded externally by the partition's `StatelessRetryKeysLock`
/// (interrupt-safe spinlock per §4.3's concurrency note). This type
/// itself does no locking; callers serialize access.
pub struct StatelessRetryKeys {
    base_secret: hkdf::Prk,
    current_index: AtomicU64,
    current: RetryKey,
    previous: Option<RetryKey>,
}

impl StatelessRetryKeys {
    /// Derives the initial key pair from a library-wide base secret,
    /// for the window containing `now_ms`.
    pub fn new(base_secret: hkdf::Prk, now_ms: u64) -> Self {
        let index = window_index(now_ms);
        let bytes = derive(&base_secret, index);
        Self {
            base_secret,
            current_index: AtomicU64::new(index),
            current: RetryKey { index, bytes },
            previous: None,
        }
    }

    /// Returns the key valid for `now_ms`'s window, rotating
    /// `keys[0]` into `keys[1]` and deriving a fresh `keys[0]` first
    /// if the current slot has gone stale. Requires `&mut self`: the
    /// caller must be holding the retry-keys lock.
    pub fn get_current(&mut self, now_ms: u64) -> &RetryKey {
        let index = window_index(now_ms);
        if index != self.current.index {
            let bytes = derive(&self.base_secret, index);
            let stale = core::mem::replace(&mut self.current, RetryKey { index, bytes });
            self.previous = Some(stale);
            self.current_index.store(index, Ordering::Relaxed);
        }
        &self.current
    }

    /// Returns whichever of `keys[0]`/`keys[1]` matches `ts_ms`'s
    /// window, or `None` if neither does (the token is rejected).
    /// Matches a window in `[i*30s, (i+2)*30s)` for a key originally
    /// issued at index `i`, per §8's retry-key acceptance scenario.
    pub fn get_for_timestamp(&self, ts_ms: u64) -> Option<&RetryKey> {
        let index = window_index(ts_ms);
        if index == self.current.index {
            Some(&self.current)
        } else if self.previous.as_ref().map(|k| k.index) == Some(index) {
            self.previous.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_secret() -> hkdf::Prk {
        hkdf::Salt::new(hkdf::HKDF_SHA256, b"test-base-secret-partition")
            .extract(b"")
    }

    #[test]
    fn current_key_rotates_previous_on_window_change() {
        let mut keys = StatelessRetryKeys::new(base_secret(), 0);
        let first_bytes = *keys.get_current(0).as_bytes();

        let second = keys.get_current(WINDOW_MS).clone();
        assert_ne!(*second.as_bytes(), first_bytes);
        assert_eq!(second.index(), 1);

        let prev = keys.get_for_timestamp(0).expect("previous window still valid");
        assert_eq!(*prev.as_bytes(), first_bytes);
    }

    #[test]
    fn timestamp_two_windows_stale_is_rejected() {
        let mut keys = StatelessRetryKeys::new(base_secret(), 0);
        keys.get_current(WINDOW_MS * 2);
        assert!(keys.get_for_timestamp(0).is_none());
    }

    #[test]
    fn same_window_timestamp_is_deterministic() {
        let base = base_secret();
        let mut a = StatelessRetryKeys::new(
            hkdf::Salt::new(hkdf::HKDF_SHA256, b"test-base-secret-partition").extract(b""),
            0,
        );
        let mut b = StatelessRetryKeys::new(base, 0);
        assert_eq!(a.get_current(10).as_bytes(), b.get_current(10).as_bytes());
    }
}
