// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Stateless reset tokens.
//!
//! Per RFC 9000 section 10.3, a stateless reset token is a 128-bit value
//! that lets a peer recognize a datagram sent by an endpoint that has
//! lost all state for a connection. `quic-platform`'s `Partition` is
//! responsible for turning a connection identifier into one of these via
//! a partition-local keyed hash (see [`Partition::reset_token_for`]).

use quic_codec::{decoder_value, Encoder, EncoderValue};

pub const STATELESS_RESET_TOKEN_LEN: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token([u8; STATELESS_RESET_TOKEN_LEN]);

impl Token {
    pub const ZEROED: Self = Self([0; STATELESS_RESET_TOKEN_LEN]);

    pub fn new(bytes: [u8; STATELESS_RESET_TOKEN_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; STATELESS_RESET_TOKEN_LEN]> for Token {
    fn from(bytes: [u8; STATELESS_RESET_TOKEN_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Token {
    type Error = core::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes = bytes.try_into()?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Token {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

decoder_value!(
    impl<'a> Token {
        fn decode(buffer: Buffer) -> Result<Self> {
            let (value, buffer) = buffer.decode_slice(STATELESS_RESET_TOKEN_LEN)?;
            let value: &[u8] = value.into_less_safe_slice();
            let token = Token::try_from(value).expect("slice len already verified");

            Ok((token, buffer))
        }
    }
);

impl EncoderValue for Token {
    fn encoding_size(&self) -> usize {
        STATELESS_RESET_TOKEN_LEN
    }

    fn encode<E: Encoder>(&self, encoder: &mut E) {
        self.as_ref().encode(encoder)
    }
}
