// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//= https://www.rfc-editor.org/rfc/rfc9001#section-5.1
//# The current encryption level secret and the label "quic key" are
//# input to the KDF to produce the AEAD key;
pub const QUIC_KEY_LABEL: [u8; 8] = *b"quic key";

//= https://www.rfc-editor.org/rfc/rfc9001#section-5.1
//# the label "quic iv" is used
//# to derive the Initialization Vector (IV); see Section 5.3.
pub const QUIC_IV_LABEL: [u8; 7] = *b"quic iv";

//= https://www.rfc-editor.org/rfc/rfc9001#section-5.1
//# The header protection key uses the "quic hp" label; see Section 5.4.
pub const QUIC_HP_LABEL: [u8; 7] = *b"quic hp";

use core::fmt;

/// The single error type every packet-level crypto failure surfaces
/// as (design section 4.1: "all failures surface as a single `Crypto`
/// error"). Packets that fail to decrypt under this error are dropped
/// and counted; the connection itself is never torn down because of
/// one bad packet.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Error {
    pub reason: &'static str,
}

impl Error {
    pub const DECODE_ERROR: Self = Self {
        reason: "DECODE_ERROR",
    };
    pub const DECRYPT_ERROR: Self = Self {
        reason: "DECRYPT_ERROR",
    };
    pub const INTERNAL_ERROR: Self = Self {
        reason: "INTERNAL_ERROR",
    };
    pub const NOT_SUPPORTED: Self = Self {
        reason: "NOT_SUPPORTED",
    };
    pub const SAMPLE_UNDERRUN: Self = Self {
        reason: "SAMPLE_UNDERRUN",
    };
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("crypto::Error").field("reason", &self.reason).finish()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
