// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use crate::{cipher_suite::Aes128Gcm as CipherSuite, header_key::HeaderKeyPair, SecretPair};
use core::fmt;
use once_cell::sync::Lazy;
use quic_core::{
    crypto::{
        self,
        initial::INITIAL_SALT,
        label::{CLIENT_IN, SERVER_IN},
        packet_protection, Key,
    },
    endpoint,
};
use ring::hkdf;

header_key!(InitialHeaderKey);

impl crypto::InitialHeaderKey for InitialHeaderKey {}

#[derive(Debug)]
pub struct InitialKey {
    sealer: CipherSuite,
    opener: CipherSuite,
}

static INITIAL_SIGNING_KEY: Lazy<hkdf::Salt> = Lazy::new(|| hkdf::Salt::new(hkdf::HKDF_SHA256, &INITIAL_SALT));

fn secrets(connection_id: &[u8]) -> SecretPair {
    let initial_secret = INITIAL_SIGNING_KEY.extract(connection_id);
    let digest = INITIAL_SIGNING_KEY.algorithm();

    let client = initial_secret.expand(&[&CLIENT_IN], digest).expect("label size verified").into();
    let server = initial_secret.expand(&[&SERVER_IN], digest).expect("label size verified").into();

    SecretPair { client, server }
}

impl InitialKey {
    fn new(endpoint: endpoint::Type, connection_id: &[u8]) -> (Self, InitialHeaderKey) {
        let secrets = secrets(connection_id);

        let (sealer_secret, opener_secret) = match endpoint {
            endpoint::Type::Client => (secrets.client, secrets.server),
            endpoint::Type::Server => (secrets.server, secrets.client),
        };

        let (sealer, header_sealer) = CipherSuite::new(sealer_secret);
        let (opener, header_opener) = CipherSuite::new(opener_secret);

        let key = Self { sealer, opener };
        let header_key = InitialHeaderKey(HeaderKeyPair {
            sealer: header_sealer,
            opener: header_opener,
        });

        (key, header_key)
    }
}

impl crypto::InitialKey for InitialKey {
    type HeaderKey = InitialHeaderKey;

    fn new_server(connection_id: &[u8]) -> (Self, Self::HeaderKey) {
        Self::new(endpoint::Type::Server, connection_id)
    }

    fn new_client(connection_id: &[u8]) -> (Self, Self::HeaderKey) {
        Self::new(endpoint::Type::Client, connection_id)
    }
}

impl Key for InitialKey {
    #[inline]
    fn decrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
        self.opener.decrypt(iv, aad, payload)
    }

    #[inline]
    fn encrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
        self.sealer.encrypt(iv, aad, payload)
    }

    #[inline]
    fn tag_len(&self) -> usize {
        self.sealer.tag_len()
    }

    #[inline]
    fn aead_confidentiality_limit(&self) -> u64 {
        self.sealer.aead_confidentiality_limit()
    }

    #[inline]
    fn aead_integrity_limit(&self) -> u64 {
        self.opener.aead_integrity_limit()
    }
}

impl fmt::Display for InitialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InitialKey")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use quic_core::crypto::HeaderKey as _;

    //= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.2
    //# dcid = 8394c8f03e515708
    const DCID: [u8; 8] = hex!("8394c8f03e515708");

    //= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.2
    //# sample = d1b1c98dd7689fb8ec11d242b123dc9b
    //# mask   = 437b9aec36
    const HP_SAMPLE: [u8; 16] = hex!("d1b1c98dd7689fb8ec11d242b123dc9b");
    const HP_MASK: [u8; 5] = hex!("437b9aec36");

    #[test]
    fn client_initial_header_protection_matches_rfc_vector() {
        // The sample in the RFC vector comes from a client Initial packet,
        // which the server opens using the client secret.
        let (_, server_header) = InitialKey::new_server(&DCID);
        let mask = server_header.opening_header_protection_mask(&HP_SAMPLE);
        assert_eq!(mask, HP_MASK);
    }

    #[test]
    fn client_and_server_keys_are_symmetric() {
        let (client_key, _) = InitialKey::new_client(&DCID);
        let (server_key, _) = InitialKey::new_server(&DCID);

        let iv = [0u8; 12];

        let mut buf = [0u8; 16 + 16];
        buf[..16].copy_from_slice(b"hello world 1234");
        client_key.encrypt(&iv, b"aad", &mut buf).unwrap();
        server_key.decrypt(&iv, b"aad", &mut buf).unwrap();
        assert_eq!(&buf[..16], b"hello world 1234");

        let mut buf = [0u8; 16 + 16];
        buf[..16].copy_from_slice(b"hello world 5678");
        server_key.encrypt(&iv, b"aad", &mut buf).unwrap();
        client_key.decrypt(&iv, b"aad", &mut buf).unwrap();
        assert_eq!(&buf[..16], b"hello world 5678");
    }
}
