// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Transient and API-misuse errors local to the RDMA datapath
//! (`spec.md` §7 band 1: "`Pending` and `BufferTooSmall` never close a
//! connection; the caller retries after a notification"). Anything
//! that does close a connection is represented as
//! `quic_core::transport::Error` instead; this type never appears on
//! that path.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A ring reservation couldn't find contiguous room; the caller
    /// queues the send and retries once the peer's advertised head
    /// advances.
    #[error("ring buffer has no room for this reservation")]
    BufferTooSmall,

    #[error("pool or arena exhausted")]
    OutOfMemory,

    #[error("invalid parameter")]
    InvalidParameter,

    /// The connection isn't in a state that accepts this operation
    /// (e.g. sending before `Ready`).
    #[error("operation invalid in the connection's current state")]
    InvalidState,

    /// An outstanding overlapped request surfaced as a cancelled
    /// completion during rundown; the caller should ignore it.
    #[error("operation was cancelled")]
    Cancelled,

    /// The underlying NDSPI adapter itself is gone (device removal,
    /// driver crash). Process-fatal: unlike every other variant here,
    /// no retry or reservation-queue path recovers from this; it's
    /// expected to propagate via `?` up to wherever the caller decides
    /// to tear the whole connection down.
    #[error("the RDMA adapter is no longer available")]
    AdapterLost,
}
