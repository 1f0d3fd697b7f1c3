// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! `RdmaConnection`: one RDMA transport endpoint, from registration
//! through steady-state data flow (`spec.md` §4.5).
//!
//! Dispatch is centralized through a handful of `on_*` methods rather
//! than per-event callback pointers (`spec.md` §9's "Dynamic dispatch
//! via callback pointers" note): every NDSPI completion the caller
//! observes is translated into exactly one of these calls, and each
//! one drives the state machine and ring buffers together instead of
//! leaving that wiring to the caller.

use crate::{
    error::Error,
    ring_buffer::{RecvRingBuffer, RemoteRingBuffer, SendRingBuffer, MAX_IMMEDIATE_RING_BUFFER_SIZE},
    state::State,
    token::{MemoryWindowToken, OffsetBufferToken},
    traits::{CompletionQueue, Connector, MemoryRegion, MemoryWindow, QueuePair},
};
use bitflags::bitflags;
use std::collections::VecDeque;

bitflags! {
    /// Create-time configuration flags (`spec.md` §4.5's configuration
    /// list).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ConfigFlags: u32 {
        /// Enables CIBIR-id routing over a shared endpoint.
        const SHARE_ENDPOINT = 0x0000_0001;
        /// Shared completion queue across connections.
        const SHARE_CQ = 0x0000_0002;
        /// Fall back to pre-registered MR tokens in private data
        /// instead of per-connection memory windows.
        const NO_MEMORY_WINDOW = 0x0000_0004;
    }
}

bitflags! {
    /// Runtime connection flags, derived from [`ConfigFlags`] and the
    /// configured ring sizes at creation time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ConnectionFlags: u32 {
        /// Ring buffer size exceeds `MAX_IMMEDIATE_RING_BUFFER_SIZE`;
        /// offsets no longer fit in the immediate data's low 16 bits.
        const OFFSET_BUFFER_USED = 0x0000_0001;
        const SHARED_ENDPOINT = 0x0000_0002;
        const SHARED_CQ = 0x0000_0004;
        const MEMORY_WINDOW_USED = 0x0000_0008;
    }
}

impl ConnectionFlags {
    fn derive(config: &Config) -> Self {
        let mut flags = Self::empty();
        if config.flags.contains(ConfigFlags::SHARE_ENDPOINT) {
            flags |= Self::SHARED_ENDPOINT;
        }
        if config.flags.contains(ConfigFlags::SHARE_CQ) {
            flags |= Self::SHARED_CQ;
        }
        if !config.flags.contains(ConfigFlags::NO_MEMORY_WINDOW) {
            flags |= Self::MEMORY_WINDOW_USED;
        }
        if config.send_ring_size > MAX_IMMEDIATE_RING_BUFFER_SIZE
            || config.recv_ring_size > MAX_IMMEDIATE_RING_BUFFER_SIZE
        {
            flags |= Self::OFFSET_BUFFER_USED;
        }
        flags
    }
}

/// Connection demultiplexing fields, used only when `SHARE_ENDPOINT`
/// is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cibir {
    pub id: [u8; 5],
    pub id_length: u8,
    pub offset_src: u8,
    pub offset_dst: u8,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub send_ring_size: u32,
    pub recv_ring_size: u32,
    pub flags: ConfigFlags,
    pub processor_group: u16,
    pub affinity: u32,
    pub cibir: Option<Cibir>,
    pub post_receive_count: u32,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        use crate::ring_buffer::MIN_RING_BUFFER_SIZE;
        if self.send_ring_size < MIN_RING_BUFFER_SIZE || self.recv_ring_size < MIN_RING_BUFFER_SIZE {
            return Err(Error::InvalidParameter);
        }
        if self.flags.contains(ConfigFlags::SHARE_ENDPOINT) && self.cibir.is_none() {
            return Err(Error::InvalidParameter);
        }
        Ok(())
    }
}

/// A send that couldn't be reserved immediately and is waiting for the
/// peer's advertised head to advance (`spec.md` §4.5: "if reservation
/// fails, the send is queued; `RdmaSocketPendingSend` drains the
/// queue when the remote head advances").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingSend {
    len: u32,
}

/// The local SGE offset and remote address a caller should post a
/// `RDMA_WRITE_WITH_IMMEDIATE` against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendReservation {
    pub local_offset: u32,
    pub remote_offset: u32,
    pub len: u32,
    pub immediate: u32,
}

/// A payload that has landed in the local receive ring, ready to be
/// read out of registered memory at `base + offset` and handed to the
/// application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub offset: u32,
    pub length: u32,
}

/// How to advertise a new `RecvRingBuffer.head` to the peer
/// (`spec.md` §4.5 "Buffer release").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadAdvertisement {
    /// Offset-buffer mode: write `head` into the local offset buffer,
    /// then send a zero-immediate notification so the peer performs a
    /// one-sided read.
    WriteOffsetBufferThenNotify { head: u32 },
    /// Non-offset mode: an immediate-only message whose low 16 bits
    /// carry the new head.
    ImmediateOnly { head: u32 },
}

/// One RDMA transport endpoint (`spec.md` §3's `RdmaConnection`
/// entity). Owns its ring-buffer bookkeeping and state machine;
/// delegates the actual verbs calls to the capability traits so this
/// type stays testable without real hardware.
pub struct RdmaConnection {
    config: Config,
    flags: ConnectionFlags,
    state: State,
    send_ring: SendRingBuffer,
    recv_ring: RecvRingBuffer,
    remote_ring: Option<RemoteRingBuffer>,
    pending_sends: VecDeque<PendingSend>,
    memory_region: Option<Box<dyn MemoryRegion>>,
    recv_memory_window: Option<Box<dyn MemoryWindow>>,
    offset_memory_window: Option<Box<dyn MemoryWindow>>,
    connector: Box<dyn Connector>,
    queue_pair: Box<dyn QueuePair>,
    send_cq: Box<dyn CompletionQueue>,
    recv_cq: Box<dyn CompletionQueue>,
}

impl RdmaConnection {
    pub fn new(
        config: Config,
        connector: Box<dyn Connector>,
        queue_pair: Box<dyn QueuePair>,
        send_cq: Box<dyn CompletionQueue>,
        recv_cq: Box<dyn CompletionQueue>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let flags = ConnectionFlags::derive(&config);
        let send_ring = SendRingBuffer::new(config.send_ring_size);
        let recv_ring = RecvRingBuffer::new(config.recv_ring_size);

        Ok(Self {
            config,
            flags,
            state: State::Uninitialized,
            send_ring,
            recv_ring,
            remote_ring: None,
            pending_sends: VecDeque::new(),
            memory_region: None,
            recv_memory_window: None,
            offset_memory_window: None,
            connector,
            queue_pair,
            send_cq,
            recv_cq,
        })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn flags(&self) -> ConnectionFlags {
        self.flags
    }

    /// Registers the memory region backing the send/recv/offset
    /// buffers. Must happen before any connect/accept call.
    pub fn register_memory(&mut self, region: Box<dyn MemoryRegion>) -> Result<(), Error> {
        self.memory_region = Some(region);
        self.state.register_ring_buffers().map_err(|_| Error::InvalidState)
    }

    // ---- client path ----

    pub fn begin_connect(&mut self, private_data: &[u8]) -> Result<(), Error> {
        self.connector.connect(private_data)?;
        self.state.start_connect().map_err(|_| Error::InvalidState)
    }

    pub fn on_connect_completion(&mut self) -> Result<(), Error> {
        self.state.complete_connect().map_err(|_| Error::InvalidState)?;
        self.state.confirm_connected().map_err(|_| Error::InvalidState)
    }

    // ---- server path ----

    pub fn begin_listen(&mut self) -> Result<(), Error> {
        self.state.wait_for_conn_request().map_err(|_| Error::InvalidState)
    }

    pub fn on_connection_request(&mut self) -> Result<(), Error> {
        self.state.satisfy_conn_request().map_err(|_| Error::InvalidState)
    }

    pub fn accept(&mut self, private_data: &[u8]) -> Result<(), Error> {
        self.connector.accept(private_data)?;
        self.state.accept_connected().map_err(|_| Error::InvalidState)
    }

    // ---- token exchange ----

    /// Binds this side's memory windows and returns the token to send
    /// to the peer, for memory-window mode. No-op call site for
    /// no-memory-window mode, which carries the same fields in the
    /// connect/accept private data instead.
    pub fn bind_memory_windows_and_build_token(
        &mut self,
        mut recv_window: Box<dyn MemoryWindow>,
        offset_window: Option<Box<dyn MemoryWindow>>,
        local_recv_address: u64,
    ) -> Result<MemoryWindowToken, Error> {
        let region = self.memory_region.as_deref().ok_or(Error::InvalidState)?;
        let recv_token = recv_window.bind(region, 0, self.recv_ring.capacity(), true)?;

        let offset_buffer = match (offset_window, self.flags.contains(ConnectionFlags::OFFSET_BUFFER_USED)) {
            (Some(mut window), true) => {
                let token = window.bind(region, 0, 8, false)?;
                self.offset_memory_window = Some(window);
                Some(OffsetBufferToken { remote_offset_addr: local_recv_address, remote_offset_token: token })
            }
            _ => None,
        };

        self.recv_memory_window = Some(recv_window);
        self.state.start_token_exchange().map_err(|_| Error::InvalidState)?;

        Ok(MemoryWindowToken {
            remote_address: local_recv_address,
            capacity: self.recv_ring.capacity(),
            remote_token: recv_token,
            offset_buffer,
        })
    }

    /// Installs the peer's token as this side's view of their receive
    /// window, completing memory-window mode's exchange.
    pub fn apply_peer_token(&mut self, token: MemoryWindowToken) -> Result<(), Error> {
        self.remote_ring = Some(RemoteRingBuffer::new(token.capacity, token.remote_address, token.remote_token));
        self.state.complete_token_exchange().map_err(|_| Error::InvalidState)?;
        self.state.enter_ready().map_err(|_| Error::InvalidState)
    }

    /// No-memory-window mode: the peer's tokens arrived in the
    /// connect/accept private data, so there's no runtime round trip;
    /// install them and go straight to `Ready`.
    pub fn apply_peer_private_data(
        &mut self,
        remote_recv_ring_address: u64,
        recv_ring_capacity: u32,
        recv_ring_remote_token: u32,
    ) -> Result<(), Error> {
        self.remote_ring =
            Some(RemoteRingBuffer::new(recv_ring_capacity, remote_recv_ring_address, recv_ring_remote_token));
        self.state.skip_token_exchange().map_err(|_| Error::InvalidState)
    }

    // ---- steady-state send ----

    /// `RdmaSend` (`spec.md` §4.5). Returns the reservation the caller
    /// should post a `WRITE_WITH_IMMEDIATE` for, or queues the send
    /// and returns `BufferTooSmall` if there's no room or another send
    /// is already waiting (ordering: writes are strictly FIFO per
    /// connection).
    pub fn send(&mut self, len: u32) -> Result<SendReservation, Error> {
        if !self.state.accepts_data() {
            return Err(Error::InvalidState);
        }
        if !self.pending_sends.is_empty() {
            self.pending_sends.push_back(PendingSend { len });
            return Err(Error::BufferTooSmall);
        }

        match self.reserve_send(len) {
            Ok(reservation) => Ok(reservation),
            Err(Error::BufferTooSmall) => {
                self.pending_sends.push_back(PendingSend { len });
                Err(Error::BufferTooSmall)
            }
            Err(other) => Err(other),
        }
    }

    fn reserve_send(&mut self, len: u32) -> Result<SendReservation, Error> {
        let remote = self.remote_ring.as_mut().ok_or(Error::InvalidState)?;
        let remote_reservation = remote.reserve(len)?;
        let local_reservation = self.send_ring.reserve(len)?;

        let immediate = if self.flags.contains(ConnectionFlags::OFFSET_BUFFER_USED) {
            len & 0xFFFF
        } else {
            ((remote_reservation.offset & 0xFFFF) << 16) | (len & 0xFFFF)
        };

        Ok(SendReservation {
            local_offset: local_reservation.offset,
            remote_offset: remote_reservation.offset,
            len,
            immediate,
        })
    }

    /// Called from the send-CQE handler once a write has been
    /// observed retired (`spec.md` §4.5: "a write is considered
    /// retired only on its send CQE").
    pub fn on_send_completion(&mut self, len: u32) -> Result<(), Error> {
        self.send_ring.release(len)
    }

    /// Drains as many queued sends as now fit, in original FIFO order,
    /// after the peer advertises an advanced head.
    pub fn advance_remote_head(&mut self, len: u32) -> Result<Vec<SendReservation>, Error> {
        self.remote_ring.as_mut().ok_or(Error::InvalidState)?.advance_head(len)?;

        let mut drained = Vec::new();
        while let Some(pending) = self.pending_sends.front().copied() {
            match self.reserve_send(pending.len) {
                Ok(reservation) => {
                    self.pending_sends.pop_front();
                    drained.push(reservation);
                }
                Err(Error::BufferTooSmall) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(drained)
    }

    // ---- steady-state receive ----

    /// Accounts for one inbound write. `offset_buffer_value` is the
    /// value the caller already read from `OffsetBuffer[4..8]`, if
    /// offset-buffer mode is in effect; it's ignored otherwise.
    pub fn on_recv_completion(&mut self, immediate: u32, offset_buffer_value: Option<u32>) -> Result<Delivery, Error> {
        if !self.state.accepts_data() {
            return Err(Error::InvalidState);
        }

        let (recv_offset, length) = if self.flags.contains(ConnectionFlags::OFFSET_BUFFER_USED) {
            let offset = offset_buffer_value.ok_or(Error::InvalidParameter)?;
            (offset, immediate & 0xFFFF)
        } else {
            ((immediate >> 16) & 0xFFFF, immediate & 0xFFFF)
        };

        self.recv_ring.record_write(recv_offset, length);
        Ok(Delivery { offset: recv_offset, length })
    }

    /// The application has finished with a delivered packet; advances
    /// the local head and reports how to advertise it to the peer.
    pub fn release_received(&mut self, length: u32) -> Result<HeadAdvertisement, Error> {
        self.recv_ring.release(length)?;
        self.recv_ring.drain_completed_prefix();

        Ok(if self.flags.contains(ConnectionFlags::OFFSET_BUFFER_USED) {
            HeadAdvertisement::WriteOffsetBufferThenNotify { head: self.recv_ring.head() }
        } else {
            HeadAdvertisement::ImmediateOnly { head: self.recv_ring.head() }
        })
    }

    // ---- teardown ----

    pub fn begin_disconnect(&mut self) -> Result<(), Error> {
        self.connector.disconnect()
    }

    pub fn on_disconnect_notification(&mut self) -> Result<(), Error> {
        self.state.receive_disconnect().map_err(|_| Error::InvalidState)?;
        self.state.start_closing().map_err(|_| Error::InvalidState)
    }

    /// Releases the memory region and windows and drops the adapter
    /// reference, in reverse dependency order.
    pub fn finish_close(&mut self) -> Result<(), Error> {
        self.state.finish_closing().map_err(|_| Error::InvalidState)?;
        self.offset_memory_window = None;
        self.recv_memory_window = None;
        self.memory_region = None;
        Ok(())
    }

    /// Invariant I6: valid from any state.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.state.reset().map_err(|_| Error::InvalidState)?;
        self.pending_sends.clear();
        self.remote_ring = None;
        Ok(())
    }
}

impl core::fmt::Debug for RdmaConnection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RdmaConnection")
            .field("state", &self.state)
            .field("flags", &self.flags)
            .field("pending_sends", &self.pending_sends.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Completion;

    struct NullConnector;
    impl Connector for NullConnector {
        fn connect(&mut self, _private_data: &[u8]) -> Result<(), Error> {
            Ok(())
        }
        fn accept(&mut self, _private_data: &[u8]) -> Result<(), Error> {
            Ok(())
        }
        fn disconnect(&mut self) -> Result<(), Error> {
            Ok(())
        }
        fn peer_private_data(&self) -> Option<&[u8]> {
            None
        }
    }

    struct NullQueuePair;
    impl QueuePair for NullQueuePair {
        fn write_with_immediate(&mut self, _: u32, _: u32, _: u64, _: u32, _: u32) -> Result<(), Error> {
            Ok(())
        }
        fn send_with_immediate(&mut self, _: &[u8], _: u32) -> Result<(), Error> {
            Ok(())
        }
        fn post_receive(&mut self, _: u32, _: u32) -> Result<(), Error> {
            Ok(())
        }
        fn read(&mut self, _: u32, _: u32, _: u64, _: u32) -> Result<(), Error> {
            Ok(())
        }
    }

    struct NullCompletionQueue;
    impl CompletionQueue for NullCompletionQueue {
        fn poll(&mut self) -> Option<Completion> {
            None
        }
        fn notify(&mut self) {}
    }

    struct NullMemoryRegion;
    impl MemoryRegion for NullMemoryRegion {
        fn local_token(&self) -> u32 {
            1
        }
    }

    struct NullMemoryWindow;
    impl MemoryWindow for NullMemoryWindow {
        fn bind(&mut self, _: &dyn MemoryRegion, _: u32, _: u32, _: bool) -> Result<u32, Error> {
            Ok(2)
        }
    }

    fn new_ready_connection(ring_size: u32, remote_capacity: u32) -> RdmaConnection {
        let config = Config {
            send_ring_size: ring_size,
            recv_ring_size: ring_size,
            flags: ConfigFlags::NO_MEMORY_WINDOW,
            processor_group: 0,
            affinity: 0,
            cibir: None,
            post_receive_count: 4,
        };
        let mut conn = RdmaConnection::new(
            config,
            Box::new(NullConnector),
            Box::new(NullQueuePair),
            Box::new(NullCompletionQueue),
            Box::new(NullCompletionQueue),
        )
        .unwrap();

        conn.register_memory(Box::new(NullMemoryRegion)).unwrap();
        conn.begin_connect(&[]).unwrap();
        conn.on_connect_completion().unwrap();
        conn.apply_peer_private_data(0xbeef, remote_capacity, 7).unwrap();
        assert!(conn.state().is_ready());
        conn
    }

    #[test]
    fn offset_mode_token_exchange_delivers_payload_at_base_zero() {
        // Scenario 5: 128 KiB rings force offset-buffer mode.
        let mut conn = new_ready_connection(128 * 1024, 128 * 1024);
        assert!(conn.flags().contains(ConnectionFlags::OFFSET_BUFFER_USED));

        let reservation = conn.send(4096).unwrap();
        assert_eq!(reservation.remote_offset, 0);
        assert_eq!(reservation.immediate, 4096);

        let delivery = conn.on_recv_completion(reservation.immediate, Some(0)).unwrap();
        assert_eq!(delivery.offset, 0);
        assert_eq!(delivery.length, 4096);
    }

    #[test]
    fn back_pressure_queues_sends_and_drains_fifo_on_head_advance() {
        // Scenario 6: 64 KiB remote ring, 20x4 KiB sends back to back.
        let mut conn = new_ready_connection(64 * 1024, 64 * 1024);
        assert!(!conn.flags().contains(ConnectionFlags::OFFSET_BUFFER_USED));

        let mut queued = 0;
        let mut sent = 0;
        for _ in 0..20 {
            match conn.send(4096) {
                Ok(_) => sent += 1,
                Err(Error::BufferTooSmall) => queued += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(queued > 0, "back-pressure should have queued at least one send");

        // retire every in-flight send so the remote ring has room again,
        // then advance the peer's advertised head by 16 KiB.
        for _ in 0..sent {
            conn.on_send_completion(4096).unwrap();
        }
        let drained = conn.advance_remote_head(16 * 1024).unwrap();
        assert_eq!(drained.len(), 4);
    }

    #[test]
    fn reset_is_valid_from_ready_and_clears_pending_sends() {
        let mut conn = new_ready_connection(64 * 1024, 64 * 1024);
        for _ in 0..20 {
            let _ = conn.send(4096);
        }
        conn.reset().unwrap();
        assert!(conn.state().is_closed());
    }
}
