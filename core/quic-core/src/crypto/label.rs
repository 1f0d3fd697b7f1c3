// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! HKDF-Expand-Label inputs used throughout the QUIC v1 key schedule
//! (RFC 9001 appendix A.1). Each constant is the fully-formed
//! `HkdfLabel` structure for a fixed output length, so callers pass it
//! straight to an HKDF `expand` call rather than re-serializing a
//! `(length, label)` pair on every key derivation.

use hex_literal::hex;

//= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.1
//# client in:  00200f746c73313320636c69656e7420696e00
pub const CLIENT_IN: [u8; 19] = hex!("00200f746c73313320636c69656e7420696e00");

//= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.1
//# server in:  00200f746c7331332073657276657220696e00
pub const SERVER_IN: [u8; 19] = hex!("00200f746c7331332073657276657220696e00");

//= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.1
//# quic key:  00100e746c7331332071756963206b657900
pub const QUIC_KEY_16: [u8; 18] = hex!("00100e746c7331332071756963206b657900");

//= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.1
//# quic iv:  000c0d746c733133207175696320697600
pub const QUIC_IV_12: [u8; 17] = hex!("000c0d746c733133207175696320697600");

//= https://www.rfc-editor.org/rfc/rfc9001#appendix-A.1
//# quic hp:  00100d746c733133207175696320687000
pub const QUIC_HP_16: [u8; 17] = hex!("00100d746c733133207175696320687000");

//= https://www.rfc-editor.org/rfc/rfc9001#section-6.1
//# This uses the KDF function provided by TLS with a label of "quic ku".
pub const QUIC_KU_16: [u8; 17] = hex!("00100d746c7331332071756963206b7500");

// 32-byte labels, used by the 256-bit cipher suites
pub const QUIC_KEY_32: [u8; 18] = hex!("00200e746c7331332071756963206b657900");
pub const QUIC_HP_32: [u8; 17] = hex!("00200d746c733133207175696320687000");
pub const QUIC_KU_32: [u8; 17] = hex!("00200d746c7331332071756963206b7500");

// 48-byte label, used by the SHA-384 traffic secret key update
pub const QUIC_KU_48: [u8; 17] = hex!("00300d746c7331332071756963206b7500");

/// Computes an `HkdfLabel` for a given output length and ASCII label.
///
/// Used by tests to cross-check the precomputed constants above, and
/// by cipher suites that need a label this module doesn't special-case
/// (e.g. a future cipher with a different key length).
pub fn compute_label<T: Extend<u8>>(len: usize, label: &[u8], out: &mut T) {
    const TLS_LABEL: &[u8] = b"tls13 ";
    let label_len = TLS_LABEL.len() + label.len();
    debug_assert!(label_len <= u8::MAX as usize, "label is too long");

    out.extend((len as u16).to_be_bytes().iter().copied());
    out.extend(Some(label_len as u8));
    out.extend(TLS_LABEL.iter().copied());
    out.extend(label.iter().copied());
    out.extend(Some(0));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute_vec_label(len: usize, label: &[u8]) -> alloc::vec::Vec<u8> {
        let mut out = alloc::vec![];
        compute_label(len, label, &mut out);
        out
    }

    #[test]
    fn initial_test() {
        assert_eq!(compute_vec_label(32, b"client in"), CLIENT_IN);
        assert_eq!(compute_vec_label(32, b"server in"), SERVER_IN);
    }

    #[test]
    fn len_16_test() {
        assert_eq!(compute_vec_label(16, b"quic key"), QUIC_KEY_16);
        assert_eq!(compute_vec_label(12, b"quic iv"), QUIC_IV_12);
        assert_eq!(compute_vec_label(16, b"quic hp"), QUIC_HP_16);
        assert_eq!(compute_vec_label(16, b"quic ku"), QUIC_KU_16);
    }

    #[test]
    fn len_32_test() {
        assert_eq!(compute_vec_label(32, b"quic key"), QUIC_KEY_32);
        assert_eq!(compute_vec_label(32, b"quic hp"), QUIC_HP_32);
        assert_eq!(compute_vec_label(32, b"quic ku"), QUIC_KU_32);
    }

    #[test]
    fn len_48_test() {
        assert_eq!(compute_vec_label(48, b"quic ku"), QUIC_KU_48);
    }
}
