// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Handshake packet protection (RFC 9001 section 5.5): keys derived
//! from the TLS handshake secrets once the key schedule has moved past
//! the Initial secret. `quic-tls`'s `TlsDriver` constructs these as it
//! drives the handshake forward; this crate only states the contract.

use crate::crypto::{header_crypto::HeaderKey, key::Key};

/// A packet-protection key for the Handshake encryption level.
pub trait HandshakeKey: Key {}

/// The header-protection half of a [`HandshakeKey`].
pub trait HandshakeHeaderKey: HeaderKey {}
