// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use crate::{header_key::HeaderKey, iv::Iv};
use core::fmt;
use quic_core::crypto::{label, packet_protection, Key};
use ring::{
    aead,
    aead::quic as quic_aead,
    hkdf::{self, Prk},
};
use zeroize::Zeroizing;

macro_rules! impl_cipher_suite {
    (
        $name:ident,
        $lower:ident,
        $digest:expr,
        $cipher:expr,
        $cipher_key_len:expr,
        $header_protection:expr,
        $key_label:expr,
        $iv_label:expr,
        $hp_label:expr,
        $key_update_label:expr,
        $confidentiality_limit:expr,
        $integrity_limit:expr
    ) => {
        mod $lower {
            use super::*;

            pub const KEY_LEN: usize = $cipher_key_len;
            pub const TAG_LEN: usize = 16;

            #[allow(non_camel_case_types)]
            pub struct $name {
                secret: Prk,
                iv: Iv,
                key: aead::LessSafeKey,
            }

            impl $name {
                pub fn new(secret: Prk) -> (Self, HeaderKey) {
                    let iv = Iv::new(&secret, &$iv_label);
                    let key = Self::new_key(&secret);
                    let header_key = HeaderKey::new(&secret, &$hp_label, &$header_protection);

                    (Self { secret, iv, key }, header_key)
                }

                /// Derives the next generation's cipher following
                /// RFC 9001 section 6's key update procedure.
                #[inline]
                pub fn update(&self) -> Self {
                    let secret: Prk = self
                        .secret
                        .expand(&[&$key_update_label], $digest)
                        .expect("label size verified")
                        .into();

                    let iv = Iv::new(&secret, &$iv_label);
                    let key = Self::new_key(&secret);

                    Self { secret, iv, key }
                }

                fn new_key(secret: &Prk) -> aead::LessSafeKey {
                    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
                    secret
                        .expand(&[&$key_label], &$cipher)
                        .expect("label size verified")
                        .fill(bytes.as_mut())
                        .expect("fill size verified");

                    let unbound = aead::UnboundKey::new(&$cipher, bytes.as_ref()).expect("key size verified");
                    aead::LessSafeKey::new(unbound)
                }
            }

            impl Key for $name {
                #[inline]
                fn decrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
                    let nonce = aead::Nonce::assume_unique_for_key(*iv);
                    self.key
                        .open_in_place(nonce, aead::Aad::from(aad), payload)
                        .map_err(|_| packet_protection::Error::DECRYPT_ERROR)?;
                    Ok(())
                }

                #[inline]
                fn encrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error> {
                    let plaintext_len = payload
                        .len()
                        .checked_sub(TAG_LEN)
                        .ok_or(packet_protection::Error::INTERNAL_ERROR)?;
                    let (plaintext, tag_out) = payload.split_at_mut(plaintext_len);

                    let nonce = aead::Nonce::assume_unique_for_key(*iv);
                    let tag = self
                        .key
                        .seal_in_place_separate_tag(nonce, aead::Aad::from(aad), plaintext)
                        .map_err(|_| packet_protection::Error::INTERNAL_ERROR)?;
                    tag_out.copy_from_slice(tag.as_ref());

                    Ok(())
                }

                #[inline]
                fn tag_len(&self) -> usize {
                    TAG_LEN
                }

                #[inline]
                fn aead_confidentiality_limit(&self) -> u64 {
                    $confidentiality_limit
                }

                #[inline]
                fn aead_integrity_limit(&self) -> u64 {
                    $integrity_limit
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.debug_struct(stringify!($name)).finish()
                }
            }

            #[cfg(test)]
            mod tests {
                use super::*;

                #[test]
                fn labels_match_cipher() {
                    let mut out = alloc::vec![];
                    label::compute_label($cipher.key_len(), b"quic key", &mut out);
                    assert_eq!(out, $key_label, "key label mismatch");

                    let mut out = alloc::vec![];
                    label::compute_label(crate::iv::NONCE_LEN, b"quic iv", &mut out);
                    assert_eq!(out, $iv_label, "iv label mismatch");

                    let mut out = alloc::vec![];
                    label::compute_label($header_protection.key_len(), b"quic hp", &mut out);
                    assert_eq!(out, $hp_label, "hp label mismatch");
                }
            }
        }

        pub use $lower::$name;
    };
}

//= https://www.rfc-editor.org/rfc/rfc9001#section-6.6
//# For AEAD_AES_128_GCM and AEAD_AES_256_GCM, the confidentiality limit
//# is 2^23 encrypted packets; see Appendix B.1.
impl_cipher_suite!(
    Aes128Gcm,
    aes128_gcm,
    hkdf::HKDF_SHA256,
    aead::AES_128_GCM,
    128 / 8,
    quic_aead::AES_128,
    label::QUIC_KEY_16,
    label::QUIC_IV_12,
    label::QUIC_HP_16,
    label::QUIC_KU_32,
    u64::pow(2, 23),
    u64::pow(2, 52)
);

impl_cipher_suite!(
    Aes256Gcm,
    aes256_gcm,
    hkdf::HKDF_SHA384,
    aead::AES_256_GCM,
    256 / 8,
    quic_aead::AES_256,
    label::QUIC_KEY_32,
    label::QUIC_IV_12,
    label::QUIC_HP_32,
    label::QUIC_KU_48,
    u64::pow(2, 23),
    u64::pow(2, 52)
);

//= https://www.rfc-editor.org/rfc/rfc9001#section-6.6
//# For AEAD_CHACHA20_POLY1305, the confidentiality limit is greater
//# than the number of possible packets (2^62) and so can be disregarded.
impl_cipher_suite!(
    Chacha20Poly1305,
    chacha20_poly1305,
    hkdf::HKDF_SHA256,
    aead::CHACHA20_POLY1305,
    256 / 8,
    quic_aead::CHACHA20,
    label::QUIC_KEY_32,
    label::QUIC_IV_12,
    label::QUIC_HP_32,
    label::QUIC_KU_32,
    u64::pow(2, 62),
    u64::pow(2, 36)
);
