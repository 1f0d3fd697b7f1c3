// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Per-partition performance counters (`spec.md` §4.3:
//! `perf_counter_add`). Each partition owns its own slot so incrementing
//! a counter from the connection's home partition never contends with
//! another partition doing the same.

use core::sync::atomic::{AtomicI64, Ordering};

/// Counter identities, one slot per partition each. Mirrors the shape
/// of a typical QUIC implementation's performance-counter table:
/// lifecycle counts, packet-loss/drop counts, and datapath byte/call
/// counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
#[non_exhaustive]
pub enum Kind {
    ConnCreated,
    ConnHandshakeFail,
    ConnActive,
    ConnConnected,
    ConnProtocolErrors,
    StrmActive,
    PktsSuspectedLost,
    PktsDropped,
    PktsDecryptionFail,
    AppSendBytes,
    AppRecvBytes,
}

const COUNT: usize = 11;

/// A fixed bank of atomic 64-bit counters, one partition's worth.
///
/// Reads are advisory (may observe a torn snapshot across multiple
/// counters, never within one), matching the concurrency note in
/// `spec.md` §5 ("reads may be torn but are treated as advisory").
pub struct Counters([AtomicI64; COUNT]);

impl Default for Counters {
    fn default() -> Self {
        Self(core::array::from_fn(|_| AtomicI64::new(0)))
    }
}

impl Counters {
    #[inline]
    pub fn add(&self, kind: Kind, delta: i64) {
        self.0[kind as usize].fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment(&self, kind: Kind) {
        self.add(kind, 1);
    }

    #[inline]
    pub fn decrement(&self, kind: Kind) {
        self.add(kind, -1);
    }

    #[inline]
    pub fn read(&self, kind: Kind) -> i64 {
        self.0[kind as usize].load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_read_round_trips() {
        let counters = Counters::default();
        counters.increment(Kind::ConnCreated);
        counters.increment(Kind::ConnCreated);
        counters.decrement(Kind::ConnActive);
        assert_eq!(counters.read(Kind::ConnCreated), 2);
        assert_eq!(counters.read(Kind::ConnActive), -1);
        assert_eq!(counters.read(Kind::StrmActive), 0);
    }
}
