// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Initial packet protection (RFC 9001 section 5.2): keys derived from
//! a fixed salt and the client's chosen Destination Connection ID, so
//! either endpoint can read the other's Initial packets before any TLS
//! key schedule exists.

use crate::crypto::{header_crypto::HeaderKey, key::Key};
use crate::endpoint;

/// The version 1 Initial salt (RFC 9001 section 5.2). Earlier QUIC
/// drafts used different salts; a `new_server`/`new_client`
/// implementation keyed on this constant only ever speaks QUIC v1.
pub const INITIAL_SALT: [u8; 20] = hex_literal::hex!("38762cf7f55934b34d179ae6a4c80cadccbb7f0a");

/// A packet-protection key for the Initial encryption level.
///
/// `new_server`/`new_client` both derive from the same
/// `(INITIAL_SALT, destination_connection_id)` pair and differ only in
/// which of the two resulting secrets (`client in` / `server in`) is
/// used for sealing vs. opening — see [`endpoint::Type`].
pub trait InitialKey: Key + Sized {
    type HeaderKey: InitialHeaderKey;

    /// Derives the key a server uses to talk to a client that chose
    /// `connection_id` as its initial destination connection id. The
    /// returned `Key`/`HeaderKey` each carry both directions
    /// internally (`encrypt`/`opening_header_protection_mask` use the
    /// `server in` secret, `decrypt`/`sealing_header_protection_mask`
    /// the `client in` secret, or vice versa for the client side).
    fn new_server(connection_id: &[u8]) -> (Self, Self::HeaderKey);

    /// Derives the key a client uses for the same handshake.
    fn new_client(connection_id: &[u8]) -> (Self, Self::HeaderKey);
}

/// The header-protection half of an [`InitialKey`].
pub trait InitialHeaderKey: HeaderKey + Sized {}

#[allow(dead_code)]
fn _assert_type_is_used() {
    // keeps `endpoint` imported for implementors' doc-links without
    // forcing every backend to route sealer/opener selection through a
    // shared free function.
    let _ = endpoint::Type::Server;
}

#[cfg(test)]
mod tests {
    use super::*;

    //= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.2
    //# dcid = 8394c8f03e515708
    const DCID: [u8; 8] = hex_literal::hex!("8394c8f03e515708");

    #[test]
    fn salt_matches_rfc_9001_appendix_a() {
        assert_eq!(INITIAL_SALT, hex_literal::hex!("38762cf7f55934b34d179ae6a4c80cadccbb7f0a"));
        // DCID kept here so the vector travels with the salt it belongs to;
        // the actual key derivation is exercised in `quic-crypto`, which owns
        // the concrete HKDF/AEAD implementation this trait is generic over.
        assert_eq!(DCID.len(), 8);
    }
}
