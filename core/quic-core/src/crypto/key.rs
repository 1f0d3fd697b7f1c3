// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::packet_protection;

/// A directional AEAD packet-protection key (design section 4.1,
/// `PacketCrypto`).
///
/// The IV passed to `encrypt`/`decrypt` is always the fully-formed
/// 12-byte nonce (`packet_key.iv XOR left_pad(packet_number, 12)`) —
/// callers compute it, not implementations of this trait, so the same
/// key type can be shared between a from-scratch software AEAD and one
/// backed by offloaded hardware without either needing to know how a
/// packet number is framed.
pub trait Key: Send {
    /// Decrypts `payload` (ciphertext followed by the AEAD tag) in
    /// place, authenticating `aad` (the packet header). A tag mismatch
    /// or any other AEAD failure is reported as
    /// [`packet_protection::Error::DECRYPT_ERROR`] and is fatal only to
    /// this packet.
    fn decrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error>;

    /// Encrypts `payload` in place. `payload` must have `tag_len()`
    /// bytes of trailing space reserved for the authentication tag.
    fn encrypt(&self, iv: &[u8; 12], aad: &[u8], payload: &mut [u8]) -> Result<(), packet_protection::Error>;

    /// Length, in bytes, of the authentication tag this key appends.
    fn tag_len(&self) -> usize;

    /// Maximum number of packets this key may encrypt before a key
    /// update becomes mandatory (RFC 9001 section 6.6).
    fn aead_confidentiality_limit(&self) -> u64;

    /// Maximum number of decryption failures tolerated under this key
    /// before the connection must be closed.
    fn aead_integrity_limit(&self) -> u64;
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;

    /// A `Key` that performs no cryptography at all; useful for driving
    /// the rest of the stack (ring buffers, the TLS driver state
    /// machine) without pulling in a real AEAD implementation.
    #[derive(Debug, Default)]
    pub struct NoOpKey {
        pub fail_on_decrypt: bool,
    }

    impl Key for NoOpKey {
        fn decrypt(&self, _iv: &[u8; 12], _aad: &[u8], _payload: &mut [u8]) -> Result<(), packet_protection::Error> {
            if self.fail_on_decrypt {
                return Err(packet_protection::Error::DECRYPT_ERROR);
            }
            Ok(())
        }

        fn encrypt(&self, _iv: &[u8; 12], _aad: &[u8], _payload: &mut [u8]) -> Result<(), packet_protection::Error> {
            Ok(())
        }

        fn tag_len(&self) -> usize {
            0
        }

        fn aead_confidentiality_limit(&self) -> u64 {
            u64::pow(2, 23)
        }

        fn aead_integrity_limit(&self) -> u64 {
            u64::pow(2, 52)
        }
    }
}
