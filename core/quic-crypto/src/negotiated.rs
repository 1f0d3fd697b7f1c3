// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    cipher_suite::{Aes128Gcm, Aes256Gcm, Chacha20Poly1305},
    header_key::HeaderKeyPair,
    SecretPair,
};
use core::fmt;
use quic_core::{
    crypto::{packet_protection, Key},
    endpoint,
};
use ring::aead;

/// The cipher suite actually agreed on during the TLS handshake.
/// Handshake and 1-RTT keys are only ever constructed after
/// negotiation, unlike Initial keys, so they dispatch dynamically
/// through this enum rather than being monomorphic.
#[allow(clippy::large_enum_variant)]
pub enum NegotiatedCipherSuite {
    Aes128Gcm(Aes128Gcm),
    Aes256Gcm(Aes256Gcm),
    Chacha20Poly1305(Chacha20Poly1305),
}

macro_rules! dispatch {
    ($self:ident, |$cipher:ident| $expr:expr) => {
        match $self {
            Self::Aes128Gcm($cipher) => $expr,
            Self::Aes256Gcm($cipher) => $expr,
            Self::Chacha20Poly1305($cipher) => $expr,
        }
    };
}

impl From<Aes128Gcm> for NegotiatedCipherSuite {
    fn from(cipher: Aes128Gcm) -> Self {
        Self::Aes128Gcm(cipher)
    }
}

impl From<Aes256Gcm> for NegotiatedCipherSuite {
    fn from(cipher: Aes256Gcm) -> Self {
        Self::Aes256Gcm(cipher)
    }
}

impl From<Chacha20Poly1305> for NegotiatedCipherSuite {
    fn from(cipher: Chacha20Poly1305) -> Self {
        Self::Chacha20Poly1305(cipher)
    }
}

#[derive(Debug)]
pub struct KeyPair {
    pub(crate) sealer: NegotiatedCipherSuite,
    pub(crate) opener: NegotiatedCipherSuite,
}

impl KeyPair {
    pub fn new(endpoint: endpoint::Type, algorithm: &aead::Algorithm, secrets: SecretPair) -> Option<(Self, HeaderKeyPair)> {
        let (sealer_secret, opener_secret) = match endpoint {
            endpoint::Type::Client => (secrets.client, secrets.server),
            endpoint::Type::Server => (secrets.server, secrets.client),
        };

        let (sealer, header_sealer) = new_cipher_suite(algorithm, sealer_secret)?;
        let (opener, header_opener) = new_cipher_suite(algorithm, opener_secret)?;

        let key = Self { sealer, opener };
        let header_key = HeaderKeyPair {
            sealer: header_sealer,
            opener: header_opener,
        };

        Some((key, header_key))
    }

    #[inline]
    pub fn update(&self) -> Self {
        Self {
            sealer: dispatch!(&self.sealer, |cipher| cipher.update().into()),
            opener: dispatch!(&self.opener, |cipher| cipher.update().into()),
        }
    }
}

fn new_cipher_suite(
    algorithm: &aead::Algorithm,
    secret: ring::hkdf::Prk,
) -> Option<(NegotiatedCipherSuite, crate::header_key::HeaderKey)> {
    Some(match algorithm {
        _ if *algorithm == aead::AES_128_GCM => {
            let (cipher, header) = Aes128Gcm::new(secret);
            (cipher.into(), header)
        }
        _ if *algorithm == aead::AES_256_GCM => {
            let (cipher, header) = Aes256Gcm::new(secret);
            (cipher.into(), header)
        }
        _ if *algorithm == aead::CHACHA20_POLY1305 => {
            let (cipher, header) = Chacha20Poly1305::new(secret);
            (cipher.into(), header)
        }
        _ => return None,
    })
}

impl Key for NegotiatedCipherSuite {
    #[inline]
    fn decrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
        dispatch!(self, |cipher| cipher.decrypt(iv, aad, payload))
    }

    #[inline]
    fn encrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
        dispatch!(self, |cipher| cipher.encrypt(iv, aad, payload))
    }

    #[inline]
    fn tag_len(&self) -> usize {
        dispatch!(self, |cipher| cipher.tag_len())
    }

    #[inline]
    fn aead_confidentiality_limit(&self) -> u64 {
        dispatch!(self, |cipher| cipher.aead_confidentiality_limit())
    }

    #[inline]
    fn aead_integrity_limit(&self) -> u64 {
        dispatch!(self, |cipher| cipher.aead_integrity_limit())
    }
}

impl Key for KeyPair {
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

impl fmt::Debug for NegotiatedCipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        dispatch!(self, |cipher| cipher.fmt(f))
    }
}

macro_rules! negotiated_crypto {
    ($name:ident, $header_key:ident) => {
        #[derive(Debug)]
        pub struct $name(crate::negotiated::KeyPair);

        impl $name {
            pub fn new_server(
                algorithm: &ring::aead::Algorithm,
                secrets: crate::SecretPair,
            ) -> Option<(Self, $header_key)> {
                Self::new(quic_core::endpoint::Type::Server, algorithm, secrets)
            }

            pub fn new_client(
                algorithm: &ring::aead::Algorithm,
                secrets: crate::SecretPair,
            ) -> Option<(Self, $header_key)> {
                Self::new(quic_core::endpoint::Type::Client, algorithm, secrets)
            }

            pub fn new(
                endpoint: quic_core::endpoint::Type,
                algorithm: &ring::aead::Algorithm,
                secrets: crate::SecretPair,
            ) -> Option<(Self, $header_key)> {
                let (key, header_key) = crate::negotiated::KeyPair::new(endpoint, algorithm, secrets)?;
                Some((Self(key), $header_key::from(header_key)))
            }

            #[inline]
            #[must_use]
            pub fn update(&self) -> Self {
                Self(self.0.update())
            }
        }

        impl quic_core::crypto::Key for $name {
            #[inline]
            fn decrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), quic_core::crypto::Error> {
                self.0.decrypt(iv, aad, payload)
            }

            #[inline]
            fn encrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), quic_core::crypto::Error> {
                self.0.encrypt(iv, aad, payload)
            }

            #[inline]
            fn tag_len(&self) -> usize {
                self.0.tag_len()
            }

            #[inline]
            fn aead_confidentiality_limit(&self) -> u64 {
                self.0.aead_confidentiality_limit()
            }

            #[inline]
            fn aead_integrity_limit(&self) -> u64 {
                self.0.aead_integrity_limit()
            }
        }
    };
}
