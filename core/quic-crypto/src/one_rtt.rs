// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use quic_core::crypto;

header_key!(OneRttHeaderKey);
negotiated_crypto!(OneRttKey, OneRttHeaderKey);

impl crypto::OneRttKey for OneRttKey {
    #[inline]
    #[must_use]
    fn derive_next_key(&self) -> Self {
        Self(self.0.update())
    }

    #[inline]
    fn key_phase(&self) -> crypto::one_rtt::KeyPhase {
        // the phase bit itself is owned by the packet-number space
        // tracker, not the key; this key only knows how to derive the
        // next generation.
        crypto::one_rtt::KeyPhase::ZERO
    }
}

impl crypto::OneRttHeaderKey for OneRttHeaderKey {}

#[cfg(test)]
mod tests {
    use crate::cipher_suite::Chacha20Poly1305;
    use hex_literal::hex;
    use quic_core::crypto::Key;
    use ring::hkdf;

    //= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.5
    //# secret
    //#     = 9ac312a7f877468ebe69422748ad00a1
    //#       5443f18203a07d6060f688f30f21632b
    //# ku  = HKDF-Expand-Label(secret, "quic ku", "", 32)
    //#     = 1223504755036d556342ee9361d25342
    //#       1a826c9ecdf3c7148684b36b714881f9
    const SECRET: [u8; 32] = hex!("9ac312a7f877468ebe69422748ad00a15443f18203a07d6060f688f30f21632b");
    const KU_SECRET: [u8; 32] = hex!("1223504755036d556342ee9361d253421a826c9ecdf3c7148684b36b714881f9");
    const INVALID_SECRET: [u8; 32] = hex!("0000000000000000000000000000000000000000000000000000000000000000");

    fn ciphers(secret: &[u8], next_secret: &[u8]) -> (Chacha20Poly1305, Chacha20Poly1305) {
        let key = hkdf::Prk::new_less_safe(hkdf::HKDF_SHA256, secret);
        let cipher = Chacha20Poly1305::new(key);
        let next_cipher = cipher.0.update();

        let next_key = hkdf::Prk::new_less_safe(hkdf::HKDF_SHA256, next_secret);
        let expected_next_cipher = Chacha20Poly1305::new(next_key);

        (next_cipher, expected_next_cipher.0)
    }

    #[test]
    fn key_update_matches_rfc_vector() {
        let (next_cipher, expected_next_cipher) = ciphers(&SECRET, &KU_SECRET);

        let iv = [0u8; 12];
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        next_cipher.encrypt(&iv, &[], &mut a).unwrap();
        expected_next_cipher.encrypt(&iv, &[], &mut b).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn key_update_rejects_wrong_secret() {
        let (next_cipher, expected_next_cipher) = ciphers(&INVALID_SECRET, &KU_SECRET);

        let iv = [0u8; 12];
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        next_cipher.encrypt(&iv, &[], &mut a).unwrap();
        expected_next_cipher.encrypt(&iv, &[], &mut b).unwrap();

        assert_ne!(a, b);
    }
}
