// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Traits a cipher-suite provider implements and the TLS driver and
//! partition layer consume.
//!
//! This module only deals in Initial, Handshake and 1-RTT keys — 0-RTT
//! and QUIC Retry-packet integrity protection are out of scope, see
//! the crate-level notes in `quic-crypto`.

pub mod handshake;
pub mod header_crypto;
pub mod initial;
pub mod key;
pub mod label;
pub mod one_rtt;
pub mod packet_protection;

pub use handshake::{HandshakeHeaderKey, HandshakeKey};
pub use header_crypto::{apply_header_protection, remove_header_protection, HeaderKey, HeaderProtectionMask};
pub use initial::{InitialHeaderKey, InitialKey};
pub use key::Key;
pub use one_rtt::{OneRttHeaderKey, OneRttKey};
pub use packet_protection::Error;

/// Everything a connection needs from a cipher-suite implementation
/// across the three encryption levels it drives packets through.
///
/// `quic-crypto::Suite` is the concrete implementation; `quic-tls`'s
/// `TlsDriver` is the only other place that is allowed to construct
/// the handshake and 1-RTT sides of this trait, since they come out of
/// the TLS key schedule rather than a fixed salt.
pub trait CryptoSuite {
    type HandshakeKey: HandshakeKey;
    type HandshakeHeaderKey: HandshakeHeaderKey;
    type InitialKey: InitialKey;
    type InitialHeaderKey: InitialHeaderKey;
    type OneRttKey: OneRttKey;
    type OneRttHeaderKey: OneRttHeaderKey;
}
