// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Per-CPU partitions (`spec.md` §3: "per-processor arenas holding
//! fixed-size object pools, retry-key pair, and reset-token hash;
//! provides the allocation substrate for the other components").

use crate::counters::{Counters, Kind as CounterKind};
use crate::pool::{PoolSizes, Pools};
use crate::reset::{HashType, ResetTokenSlot};
use crate::retry::{RetryKey, StatelessRetryKeys, WINDOW_MS};
use parking_lot::Mutex;
use quic_core::stateless_reset::Token;
use ring::hkdf;

/// A single CPU's isolation unit. Created at library init, one per
/// participating CPU, and destroyed at library teardown (§3's
/// `Partition` lifecycle column).
///
/// Within a partition, execution is cooperative single-threaded
/// (§5.3's scheduling model): at most one worker drains this
/// partition's event queue at a time, so the pools and counters here
/// need no internal locking from that worker's perspective. The retry
/// keys and reset-token hash are the exception: they're touched from
/// datapath code that may run on a different partition serving a
/// retry or reset for a connection this partition doesn't own, so
/// both stay behind their own lock exactly as §4.3 requires.
pub struct Partition {
    index: u32,
    pub pools: Pools,
    pub counters: Counters,
    retry_keys: Mutex<StatelessRetryKeys>,
    reset_token: ResetTokenSlot,
}

impl Partition {
    pub fn new(
        index: u32,
        pool_sizes: &PoolSizes,
        retry_base_secret: hkdf::Prk,
        reset_key_material: &[u8],
        now_ms: u64,
    ) -> Self {
        Self {
            index,
            pools: Pools::new(pool_sizes),
            counters: Counters::default(),
            retry_keys: Mutex::new(StatelessRetryKeys::new(retry_base_secret, now_ms)),
            reset_token: ResetTokenSlot::new(reset_key_material),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn perf_counter_add(&self, kind: CounterKind, delta: i64) {
        self.counters.add(kind, delta);
    }

    /// Returns the retry key valid for `now_ms`, rotating the pair if
    /// the current window has elapsed. Takes the `StatelessRetryKeysLock`
    /// for the duration of the call, per §4.3/§4.4's concurrency note.
    pub fn get_current_retry_key(&self, now_ms: u64) -> RetryKey {
        self.retry_keys.lock().get_current(now_ms).clone()
    }

    /// Returns the retry key matching `ts_ms`'s window if either slot
    /// of the pair still covers it, or `None` if the token should be
    /// rejected as stale (§8: a token issued at window `i` validates
    /// for any timestamp in `[i*30s, (i+2)*30s)`).
    pub fn get_retry_key_for_timestamp(&self, ts_ms: u64) -> Option<RetryKey> {
        self.retry_keys.lock().get_for_timestamp(ts_ms).cloned()
    }

    /// Replaces the reset-token keyed hash under the passive
    /// `ResetTokenLock`.
    pub fn update_stateless_reset_key(&self, hash_type: HashType, key_material: &[u8]) {
        self.reset_token.update(hash_type, key_material);
    }

    /// Derives the stateless-reset token for `connection_id`, copying
    /// the current hash out from under the lock before computing it.
    pub fn reset_token_for(&self, connection_id: &[u8]) -> Token {
        self.reset_token.token_for(connection_id)
    }
}

impl core::fmt::Debug for Partition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Partition").field("index", &self.index).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_secret() -> hkdf::Prk {
        hkdf::Salt::new(hkdf::HKDF_SHA256, b"library-wide-retry-secret").extract(b"")
    }

    #[test]
    fn counters_are_partition_local() {
        let partition = Partition::new(0, &PoolSizes::default(), base_secret(), b"reset-key", 0);
        partition.perf_counter_add(CounterKind::ConnCreated, 1);
        assert_eq!(partition.counters.read(CounterKind::ConnCreated), 1);
    }

    #[test]
    fn retry_key_rotates_across_windows() {
        let partition = Partition::new(0, &PoolSizes::default(), base_secret(), b"reset-key", 0);
        let first = partition.get_current_retry_key(0);
        let second = partition.get_current_retry_key(WINDOW_MS);
        assert_ne!(first.as_bytes(), second.as_bytes());

        assert!(partition.get_retry_key_for_timestamp(0).is_some());
        assert!(partition.get_retry_key_for_timestamp(WINDOW_MS * 3).is_none());
    }

    #[test]
    fn reset_token_is_stable_until_key_update() {
        let partition = Partition::new(0, &PoolSizes::default(), base_secret(), b"reset-key", 0);
        let a = partition.reset_token_for(b"conn-a");
        let b = partition.reset_token_for(b"conn-a");
        assert_eq!(a, b);

        partition.update_stateless_reset_key(HashType::HmacSha256, b"new-reset-key");
        let c = partition.reset_token_for(b"conn-a");
        assert_ne!(a, c);
    }
}
