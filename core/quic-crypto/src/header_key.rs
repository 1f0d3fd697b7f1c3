// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use quic_core::crypto::{header_crypto::HeaderProtectionMask, packet_protection, HeaderKey as _};
use ring::{aead::quic as quic_aead, hkdf};

pub struct HeaderKey(quic_aead::HeaderProtectionKey);

impl HeaderKey {
    pub fn new(secret: &hkdf::Prk, label: &[u8], alg: &'static quic_aead::Algorithm) -> Self {
        let len = alg.key_len();
        let mut bytes = zeroize::Zeroizing::new([0u8; 32]);

        secret
            .expand(&[label], alg)
            .expect("label size verified")
            .fill(&mut bytes[..len])
            .expect("fill size verified");

        let key = quic_aead::HeaderProtectionKey::new(alg, &bytes[..len])
            .expect("header secret length already checked");
        Self(key)
    }

    #[inline]
    fn mask(&self, sample: &[u8]) -> Result<HeaderProtectionMask, packet_protection::Error> {
        self.0
            .new_mask(sample)
            .map_err(|_| packet_protection::Error::SAMPLE_UNDERRUN)
    }
}

impl quic_core::crypto::HeaderKey for HeaderKey {
    #[inline]
    fn opening_header_protection_mask(&self, sample: &[u8]) -> HeaderProtectionMask {
        self.mask(sample).expect("sample length already checked")
    }

    #[inline]
    fn sealing_header_protection_mask(&self, sample: &[u8]) -> HeaderProtectionMask {
        self.mask(sample).expect("sample length already checked")
    }

    #[inline]
    fn sample_len(&self) -> usize {
        self.0.algorithm().sample_len()
    }
}

impl fmt::Debug for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HeaderKey").finish()
    }
}

#[derive(Debug)]
pub struct HeaderKeyPair {
    pub(crate) sealer: HeaderKey,
    pub(crate) opener: HeaderKey,
}

impl quic_core::crypto::HeaderKey for HeaderKeyPair {
    #[inline]
    fn opening_header_protection_mask(&self, sample: &[u8]) -> HeaderProtectionMask {
        self.opener.opening_header_protection_mask(sample)
    }

    #[inline]
    fn sealing_header_protection_mask(&self, sample: &[u8]) -> HeaderProtectionMask {
        self.sealer.sealing_header_protection_mask(sample)
    }

    #[inline]
    fn sample_len(&self) -> usize {
        self.sealer.sample_len()
    }
}

macro_rules! header_key {
    ($name:ident) => {
        #[derive(Debug)]
        pub struct $name(crate::header_key::HeaderKeyPair);

        impl quic_core::crypto::HeaderKey for $name {
            #[inline]
            fn opening_header_protection_mask(
                &self,
                sample: &[u8],
            ) -> quic_core::crypto::header_crypto::HeaderProtectionMask {
                self.0.opening_header_protection_mask(sample)
            }

            #[inline]
            fn sealing_header_protection_mask(
                &self,
                sample: &[u8],
            ) -> quic_core::crypto::header_crypto::HeaderProtectionMask {
                self.0.sealing_header_protection_mask(sample)
            }

            #[inline]
            fn sample_len(&self) -> usize {
                self.0.sample_len()
            }
        }

        impl From<crate::header_key::HeaderKeyPair> for $name {
            fn from(key: crate::header_key::HeaderKeyPair) -> Self {
                Self(key)
            }
        }
    };
}
