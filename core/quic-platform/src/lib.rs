// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Per-CPU partitioned allocation, retry-key rotation and
//! stateless-reset hashing.
//!
//! This crate holds the one piece of process-wide mutable state this
//! workspace needs: the set of partitions and the base secret their
//! retry keys are derived from. It is modeled as a single
//! [`Partitions`] value constructed once at startup and threaded
//! explicitly through the rest of the system, rather than a hidden
//! `lazy_static`/global singleton.

pub mod counters;
pub mod partition;
pub mod pool;
pub mod reset;
pub mod retry;

pub use counters::{Counters, Kind as CounterKind};
pub use partition::Partition;
pub use pool::{Pool, PoolSizes, Pools};
pub use reset::{HashType, ResetTokenHash, ResetTokenSlot};
pub use retry::{RetryKey, StatelessRetryKeys, WINDOW_MS};

use ring::hkdf;

/// The library-wide set of partitions plus the shared base secret
/// their retry keys derive from (`spec.md` §9's `Library` value).
/// There is exactly one of these per running instance; nothing in
/// this crate reaches for a process-wide singleton to get at it.
pub struct Partitions {
    partitions: Vec<Partition>,
}

impl Partitions {
    /// Creates one partition per entry in `pool_sizes`, each deriving
    /// its initial retry key from the same `retry_base_secret` and its
    /// reset-token hash from the same `reset_key_material`.
    pub fn new(
        count: u32,
        pool_sizes: &PoolSizes,
        retry_base_secret: &[u8],
        reset_key_material: &[u8],
        now_ms: u64,
    ) -> Self {
        let salt = hkdf::Salt::new(hkdf::HKDF_SHA256, b"quic partition retry base");
        let partitions = (0..count)
            .map(|index| {
                let base_secret = salt.extract(retry_base_secret);
                Partition::new(index, pool_sizes, base_secret, reset_key_material, now_ms)
            })
            .collect();
        Self { partitions }
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Partition> {
        self.partitions.get(index)
    }

    /// Routes a connection to its home partition by the same
    /// soft-affinity scheme the scheduling model describes (§5.3): a
    /// stable hash of the connection identifier, reduced modulo the
    /// partition count.
    pub fn home_for(&self, connection_id: &[u8]) -> &Partition {
        let mut hash: u64 = 0xcbf29ce484222325;
        for &b in connection_id {
            hash ^= b as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        let index = (hash as usize) % self.partitions.len();
        &self.partitions[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_are_independently_counted() {
        let partitions = Partitions::new(2, &PoolSizes::default(), b"base", b"reset", 0);
        assert_eq!(partitions.len(), 2);

        partitions.get(0).unwrap().perf_counter_add(CounterKind::ConnCreated, 1);
        assert_eq!(partitions.get(0).unwrap().counters.read(CounterKind::ConnCreated), 1);
        assert_eq!(partitions.get(1).unwrap().counters.read(CounterKind::ConnCreated), 0);
    }

    #[test]
    fn home_for_is_stable() {
        let partitions = Partitions::new(4, &PoolSizes::default(), b"base", b"reset", 0);
        let a = partitions.home_for(b"conn-1").index();
        let b = partitions.home_for(b"conn-1").index();
        assert_eq!(a, b);
    }
}
