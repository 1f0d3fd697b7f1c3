// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Core protocol types for the QUIC handshake/record layer and its
//! RDMA-based zero-copy datapath.
//!
//! This crate intentionally stays free of any concrete cryptography
//! provider or RDMA verbs binding; it defines the traits and wire
//! constants that [`quic-crypto`], [`quic-tls`], [`quic-platform`] and
//! [`quic-rdma`] implement and drive.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod crypto;
pub mod endpoint;
pub mod state;
pub mod stateless_reset;
pub mod transport;

#[doc(hidden)]
#[macro_export]
macro_rules! __tracing_noop__ {
    ($($arg:tt)*) => {};
}
