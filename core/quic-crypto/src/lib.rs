// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! A `ring`-backed implementation of `quic-core`'s crypto traits.
//!
//! This crate deliberately carries no QUIC Retry or 0-RTT support —
//! only Initial, Handshake and 1-RTT packet protection, which is all
//! `quic-tls` and `quic-rdma` ever construct.

extern crate alloc;

mod iv;

#[macro_use]
pub mod header_key;
#[macro_use]
mod negotiated;

pub mod cipher_suite;
pub mod handshake;
pub mod initial;
pub mod one_rtt;

pub use ring::hkdf::{self, Prk};

/// The pair of traffic secrets TLS hands back after each key schedule
/// transition; which one becomes the sealer vs. opener depends on
/// [`quic_core::endpoint::Type`].
#[derive(Clone)]
pub struct SecretPair {
    pub client: Prk,
    pub server: Prk,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Suite;

impl quic_core::crypto::CryptoSuite for Suite {
    type HandshakeKey = handshake::HandshakeKey;
    type HandshakeHeaderKey = handshake::HandshakeHeaderKey;
    type InitialKey = initial::InitialKey;
    type InitialHeaderKey = initial::InitialHeaderKey;
    type OneRttKey = one_rtt::OneRttKey;
    type OneRttHeaderKey = one_rtt::OneRttHeaderKey;
}
