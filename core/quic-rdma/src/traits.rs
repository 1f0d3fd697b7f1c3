// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! NDSPI capability traits (`spec.md` §9: "represent each interface
//! [Connector, QueuePair, CompletionQueue, MemoryRegion, MemoryWindow]
//! as a capability trait/interface with the exact set of methods
//! used. One implementation struct per concrete NDSPI object type").
//!
//! These traits are the connection's view of the underlying verbs
//! provider; nothing in this crate calls into a real NDSPI adapter.
//! Production callers implement them against whatever RDMA verbs
//! library they link; tests implement them against an in-memory
//! loopback to exercise the state machine and ring-buffer arithmetic
//! without real hardware.

/// A posted work request's outcome, surfaced from a completion queue
/// poll. Mirrors the handful of fields the connection and ring
/// buffers actually read off a CQE.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub op: CompletionOp,
    pub status: CompletionStatus,
    /// Bytes transferred, or the immediate-data payload for a
    /// `WriteWithImmediate`/`SendWithImmediate` completion.
    pub immediate_or_length: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionOp {
    Send,
    Receive,
    Write,
    Read,
    Bind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompletionStatus {
    Success,
    Cancelled,
    Failure,
}

/// `IND2CompletionQueue`: the poll surface both the send and receive
/// sides drain.
pub trait CompletionQueue {
    /// Drains at most one completion, if any is ready. Never blocks;
    /// `spec.md` §5's suspension-point note holds for every NDSPI verb
    /// here, not only `TlsDriver`.
    fn poll(&mut self) -> Option<Completion>;

    /// Re-arms the queue for event-driven notification after a poll
    /// returned `None`.
    fn notify(&mut self);
}

/// `IND2QueuePair`: the paired send/receive queues of one RDMA
/// endpoint.
pub trait QueuePair {
    /// Posts a one-sided write carrying `immediate` as its 32-bit
    /// immediate data, from `local_offset` in the registered send
    /// buffer to `remote_offset` in the peer's registered region.
    fn write_with_immediate(
        &mut self,
        local_offset: u32,
        len: u32,
        remote_address: u64,
        remote_token: u32,
        immediate: u32,
    ) -> Result<(), crate::error::Error>;

    /// Posts a two-sided send carrying `immediate`, used only during
    /// token exchange.
    fn send_with_immediate(&mut self, payload: &[u8], immediate: u32) -> Result<(), crate::error::Error>;

    /// Posts a receive buffer, used both for steady-state receives and
    /// for token-exchange messages.
    fn post_receive(&mut self, local_offset: u32, len: u32) -> Result<(), crate::error::Error>;

    /// One-sided read, used only to poll a peer's offset buffer in
    /// offset-buffer mode when event-driven notification isn't used.
    fn read(
        &mut self,
        local_offset: u32,
        len: u32,
        remote_address: u64,
        remote_token: u32,
    ) -> Result<(), crate::error::Error>;
}

/// `IND2MemoryRegion`: one registered virtual-address range.
pub trait MemoryRegion {
    fn local_token(&self) -> u32;
}

/// `IND2MemoryWindow`: a cheaper-to-rebind sub-range of a
/// [`MemoryRegion`] with its own remote access token.
pub trait MemoryWindow {
    /// Binds this window over `[offset, offset + len)` of `region`,
    /// returning the token the peer must present to address it.
    fn bind(
        &mut self,
        region: &dyn MemoryRegion,
        offset: u32,
        len: u32,
        writable: bool,
    ) -> Result<u32, crate::error::Error>;
}

/// `IND2Connector`: the connection-establishment verb set. Carries
/// the optional private-data blob used by the no-memory-window mode.
pub trait Connector {
    fn connect(&mut self, private_data: &[u8]) -> Result<(), crate::error::Error>;
    fn accept(&mut self, private_data: &[u8]) -> Result<(), crate::error::Error>;
    fn disconnect(&mut self) -> Result<(), crate::error::Error>;

    /// The peer's private-data blob, once a connect/accept completion
    /// has surfaced it.
    fn peer_private_data(&self) -> Option<&[u8]>;
}
