// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Per-partition fixed-size object pools (`spec.md` §4.3: "Pool
//! `alloc`/`free` for each fixed-size object class... the common path
//! is uncontended; an overflow path may fall back to the heap").
//!
//! The concrete object types this spec's pools back (connections,
//! streams, packet spaces, send requests, operations) live in the
//! out-of-scope API-surface layer, so each pool here deals in raw
//! fixed-size byte slots; a caller that owns the concrete struct casts
//! a slot to/from its type. This keeps `quic-platform` free of a
//! dependency on types this spec explicitly treats as external
//! collaborators.

use crossbeam_queue::ArrayQueue;

/// A lock-free pool of `slot_size`-byte buffers. `alloc` never blocks:
/// it pops a free slot if one exists, otherwise falls back to the heap.
/// `free` returns a slot to the pool, dropping it instead if the pool
/// is already at capacity (e.g. after a burst of allocations which has
/// since subsided).
pub struct Pool {
    slot_size: usize,
    free: ArrayQueue<Box<[u8]>>,
}

impl Pool {
    pub fn new(slot_size: usize, capacity: usize) -> Self {
        let free = ArrayQueue::new(capacity.max(1));
        for _ in 0..capacity {
            let _ = free.push(vec![0u8; slot_size].into_boxed_slice());
        }
        Self { slot_size, free }
    }

    #[inline]
    pub fn alloc(&self) -> Box<[u8]> {
        self.free.pop().unwrap_or_else(|| vec![0u8; self.slot_size].into_boxed_slice())
    }

    #[inline]
    pub fn free(&self, mut slot: Box<[u8]>) {
        debug_assert_eq!(slot.len(), self.slot_size);
        slot.fill(0);
        let _ = self.free.push(slot);
    }

    /// Number of slots currently idle in the pool (advisory only; racy
    /// under concurrent alloc/free, same as the perf counters).
    #[inline]
    pub fn idle_count(&self) -> usize {
        self.free.len()
    }
}

/// The named pools a partition holds, one per fixed-size object class
/// listed in `spec.md` §3's `Partition` entity.
pub struct Pools {
    pub connection: Pool,
    pub transport_param: Pool,
    pub packet_space: Pool,
    pub stream: Pool,
    pub send_request: Pool,
    pub operation: Pool,
}

/// Default slot sizes and pool depths; callers with a concrete, larger
/// struct can reconstruct `Pools` with sizes suited to their types.
pub struct PoolSizes {
    pub connection: (usize, usize),
    pub transport_param: (usize, usize),
    pub packet_space: (usize, usize),
    pub stream: (usize, usize),
    pub send_request: (usize, usize),
    pub operation: (usize, usize),
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            connection: (1024, 64),
            transport_param: (256, 64),
            packet_space: (512, 128),
            stream: (512, 256),
            send_request: (128, 256),
            operation: (128, 256),
        }
    }
}

impl Pools {
    pub fn new(sizes: &PoolSizes) -> Self {
        Self {
            connection: Pool::new(sizes.connection.0, sizes.connection.1),
            transport_param: Pool::new(sizes.transport_param.0, sizes.transport_param.1),
            packet_space: Pool::new(sizes.packet_space.0, sizes.packet_space.1),
            stream: Pool::new(sizes.stream.0, sizes.stream.1),
            send_request: Pool::new(sizes.send_request.0, sizes.send_request.1),
            operation: Pool::new(sizes.operation.0, sizes.operation.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_reuses_freed_slots() {
        let pool = Pool::new(32, 2);
        assert_eq!(pool.idle_count(), 2);

        let a = pool.alloc();
        assert_eq!(pool.idle_count(), 1);
        pool.free(a);
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn alloc_overflows_to_heap_when_empty() {
        let pool = Pool::new(16, 0);
        let a = pool.alloc();
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn freed_slots_are_zeroed() {
        let pool = Pool::new(4, 1);
        let mut slot = pool.alloc();
        slot.copy_from_slice(&[1, 2, 3, 4]);
        pool.free(slot);
        let slot = pool.alloc();
        assert_eq!(&*slot, &[0, 0, 0, 0]);
    }
}
