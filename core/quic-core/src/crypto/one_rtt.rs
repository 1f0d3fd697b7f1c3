// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! 1-RTT packet protection and key update (RFC 9001 section 6 / RFC
//! 9000 section 6).

use crate::crypto::{header_crypto::HeaderKey, key::Key};

/// A 1-RTT packet-protection key.
///
/// Key update derives a new `OneRttKey` from the current one via the
/// `"quic ku"` label applied to the traffic secret (not the packet
/// key); the header-protection key is explicitly excluded from update
/// and stays fixed for the life of the connection (RFC 9001 section
/// 6.1, design section 4.2).
pub trait OneRttKey: Key {
    /// Derives the next generation's key from this one. Implementations
    /// must not mutate `self`; the caller is responsible for holding
    /// both the current and next generation during the one-RTT
    /// overlap period the QUIC key update handshake requires.
    fn derive_next_key(&self) -> Self
    where
        Self: Sized;

    /// An opaque value identifying which key phase this key belongs to,
    /// used to detect whether an incoming short-header packet's phase
    /// bit matches the key currently installed.
    fn key_phase(&self) -> KeyPhase;
}

/// A single bit, interpreted modulo 2 across key updates (RFC 9000
/// section 17.3.1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPhase(bool);

impl KeyPhase {
    pub const ZERO: Self = Self(false);
    pub const ONE: Self = Self(true);

    pub fn next(self) -> Self {
        Self(!self.0)
    }

    pub fn as_bool(self) -> bool {
        self.0
    }
}

impl From<bool> for KeyPhase {
    fn from(bit: bool) -> Self {
        Self(bit)
    }
}

/// The header-protection half of a [`OneRttKey`]; never rotated.
pub trait OneRttHeaderKey: HeaderKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_phase_flips() {
        assert_eq!(KeyPhase::ZERO.next(), KeyPhase::ONE);
        assert_eq!(KeyPhase::ONE.next(), KeyPhase::ZERO);
    }
}
