// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! TLS driver output state (`spec.md` §3's `ProcessState` entity):
//! "contiguous output byte buffer + allocated/used lengths, absolute
//! write offset, `BufferOffsetHandshake`, `BufferOffset1Rtt`, current
//! ReadKey/WriteKey epoch, ReadKeys[4]/WriteKeys[4], negotiated ALPN,
//! alert code".
//!
//! 0-RTT is out of scope here (the same scoping decision
//! `quic_core::crypto::CryptoSuite` already made), so there are three
//! key slots per direction, not four: `Initial`, `Handshake`, `OneRtt`.

use bytes::BytesMut;
use core::any::Any;

/// The three key-install epochs this driver tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum Epoch {
    Initial = 0,
    Handshake = 1,
    OneRtt = 2,
}

pub const EPOCH_COUNT: usize = 3;

/// Mirrors `QUIC_TLS_EARLY_DATA_STATE`. 0-RTT resumption policy itself
/// stays out of scope (no `Config` here ever configures a resumption
/// store), so in practice this settles to `Unsupported` once the
/// handshake completes; the variants stay real rather than collapsing
/// to a single bool since a caller that does wire up resumption later
/// gets `Accepted` for free from `TlsDriver::process_data` checking
/// `rustls`'s own `zero_rtt_keys()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EarlyDataState {
    #[default]
    Unknown,
    Unsupported,
    Rejected,
    Accepted,
}

/// An installed packet-protection key, opaque to the driver itself.
/// The driver's job ends at reporting that a key for this epoch
/// exists; turning it into bytes on the wire is PacketCrypto's job
/// (`quic-crypto`), or, for Handshake/1-RTT keys negotiated by the TLS
/// backend, whatever native key object that backend produced. Callers
/// that know the concrete backend downcast via [`InstalledKey::downcast_ref`].
pub struct InstalledKey(Box<dyn Any + Send>);

impl InstalledKey {
    pub fn new<T: Any + Send>(key: T) -> Self {
        Self(Box::new(key))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl core::fmt::Debug for InstalledKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("InstalledKey(..)")
    }
}

/// The TLS driver's output: a monotonically growing byte buffer plus
/// the bookkeeping `process_data`/`process_data_complete` update as
/// the handshake advances.
#[derive(Default)]
pub struct ProcessState {
    pub handshake_complete: bool,
    pub early_data_state: EarlyDataState,

    /// Current epoch new reads should be decrypted under.
    pub read_key_epoch: Option<Epoch>,
    /// Highest epoch available for writing.
    pub write_key_epoch: Option<Epoch>,

    /// In case of failure, the TLS alert code (`spec.md` §4.4: "any
    /// alert → ERROR(alert_code)").
    pub alert_code: Option<u8>,

    /// Output bytes accumulated so far, to be sent on the wire.
    pub buffer: BytesMut,
    /// Total bytes ever written to `buffer` across the driver's
    /// lifetime, including bytes already drained by the caller.
    pub buffer_total_length: u64,

    /// Absolute offset of the start of Handshake-epoch data; 0 means
    /// unset. Invariant I2: immutable once set, and
    /// `<= buffer_offset_1rtt` when both are set.
    pub buffer_offset_handshake: u64,
    /// Absolute offset of the start of 1-RTT data; 0 means unset.
    pub buffer_offset_1rtt: u64,

    /// The final negotiated ALPN, length-prefix included.
    pub negotiated_alpn: Option<BytesMut>,

    /// The peer's raw transport-parameters extension payload (type
    /// `0xffa5`), set exactly once per handshake. `None` until the
    /// backend has parsed the peer's `EncryptedExtensions`/`ClientHello`
    /// far enough to expose it.
    pub peer_transport_params: Option<BytesMut>,

    read_keys: [Option<InstalledKey>; EPOCH_COUNT],
    write_keys: [Option<InstalledKey>; EPOCH_COUNT],
}

impl ProcessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install_read_key(&mut self, epoch: Epoch, key: InstalledKey) {
        self.read_keys[epoch as usize] = Some(key);
        self.read_key_epoch = Some(epoch);
    }

    pub fn install_write_key(&mut self, epoch: Epoch, key: InstalledKey) {
        self.write_keys[epoch as usize] = Some(key);
        self.write_key_epoch = Some(epoch);
    }

    pub fn read_key(&self, epoch: Epoch) -> Option<&InstalledKey> {
        self.read_keys[epoch as usize].as_ref()
    }

    pub fn write_key(&self, epoch: Epoch) -> Option<&InstalledKey> {
        self.write_keys[epoch as usize].as_ref()
    }

    /// Appends `data` to the output buffer and advances
    /// `buffer_total_length`. Returns the absolute offset the
    /// appended bytes start at.
    pub fn append(&mut self, data: &[u8]) -> u64 {
        let offset = self.buffer_total_length;
        self.buffer.extend_from_slice(data);
        self.buffer_total_length += data.len() as u64;
        offset
    }

    /// Records the peer's transport-parameters payload the first time
    /// it becomes available; later calls in the same handshake are
    /// no-ops, since the peer only sends this extension once.
    pub fn set_peer_transport_params(&mut self, params: &[u8]) {
        if self.peer_transport_params.is_none() {
            self.peer_transport_params = Some(BytesMut::from(params));
        }
    }

    /// Records the start of Handshake-epoch output, enforcing
    /// invariant I2 (set exactly once).
    pub fn mark_handshake_offset(&mut self) {
        if self.buffer_offset_handshake == 0 {
            self.buffer_offset_handshake = self.buffer_total_length.max(1);
        }
    }

    /// Records the start of 1-RTT-epoch output, enforcing invariant
    /// I2 (set exactly once, and never before `buffer_offset_handshake`).
    pub fn mark_one_rtt_offset(&mut self) {
        if self.buffer_offset_1rtt == 0 {
            debug_assert!(
                self.buffer_offset_handshake == 0
                    || self.buffer_offset_handshake <= self.buffer_total_length.max(1)
            );
            self.buffer_offset_1rtt = self.buffer_total_length.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_tracks_absolute_offsets() {
        let mut state = ProcessState::new();
        let first = state.append(b"hello");
        let second = state.append(b"world");
        assert_eq!(first, 0);
        assert_eq!(second, 5);
        assert_eq!(state.buffer_total_length, 10);
    }

    #[test]
    fn handshake_offset_is_set_once() {
        let mut state = ProcessState::new();
        state.append(b"abc");
        state.mark_handshake_offset();
        let first = state.buffer_offset_handshake;
        state.append(b"def");
        state.mark_handshake_offset();
        assert_eq!(state.buffer_offset_handshake, first);
    }

    #[test]
    fn peer_transport_params_is_set_once() {
        let mut state = ProcessState::new();
        state.set_peer_transport_params(&[1, 2, 3]);
        state.set_peer_transport_params(&[9, 9]);
        assert_eq!(state.peer_transport_params.as_deref(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn install_read_key_updates_current_epoch() {
        let mut state = ProcessState::new();
        state.install_read_key(Epoch::Initial, InstalledKey::new(42u32));
        assert_eq!(state.read_key_epoch, Some(Epoch::Initial));
        assert_eq!(state.read_key(Epoch::Initial).unwrap().downcast_ref::<u32>(), Some(&42));
    }
}
