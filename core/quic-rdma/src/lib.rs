// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! The RDMA one-sided-write datapath: ring-buffer reservation
//! arithmetic, the `RdmaConnection` state machine, token exchange,
//! and the NDSPI capability traits the connection drives.
//!
//! This crate never speaks NDSPI itself; real verbs providers
//! implement [`traits::Connector`], [`traits::QueuePair`],
//! [`traits::CompletionQueue`], [`traits::MemoryRegion`] and
//! [`traits::MemoryWindow`] against whatever RDMA library they link.

pub mod connection;
pub mod error;
pub mod ring_buffer;
pub mod state;
pub mod token;
pub mod traits;

pub use connection::{
    Cibir, Config, ConfigFlags, ConnectionFlags, Delivery, HeadAdvertisement, RdmaConnection, SendReservation,
};
pub use error::Error;
pub use ring_buffer::{
    RecvRingBuffer, RemoteRingBuffer, Reservation, SendRingBuffer, MAX_IMMEDIATE_RING_BUFFER_SIZE,
    MIN_FREE_BUFFER_THRESHOLD, MIN_RING_BUFFER_SIZE,
};
pub use state::State;
pub use token::{
    MemoryWindowToken, OffsetBufferToken, PrivateData, ACCEPT_PRIVATE_DATA_LEN, CONNECT_PRIVATE_DATA_LEN,
    MEMORY_WINDOW_TOKEN_LEN, MEMORY_WINDOW_TOKEN_WITH_OFFSET_LEN,
};
