// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Token exchange payloads (`spec.md` §4.5 "Token exchange" and §6's
//! `RDMA_DATAPATH_PRIVATE_DATA` layout). All fields are little-endian;
//! `quic-codec` itself decodes its built-in integer types as network
//! (big) endian, so these wire values are spelled out as explicit
//! byte-slice reads/writes over `quic-codec`'s buffer primitives
//! rather than composed from `u32`/`u64`'s stock `EncoderValue`/
//! `DecoderValue` impls.

use quic_codec::{DecoderBuffer, DecoderError, Encoder, EncoderValue};

/// Size of the `SendWithImmediate` payload in memory-window mode when
/// no offset buffer is in play: `remote_address:u64 || capacity:u32 ||
/// remote_token:u32`.
pub const MEMORY_WINDOW_TOKEN_LEN: usize = 16;

/// Size of the same payload when an offset buffer follows:
/// `remote_offset_addr:u64 || remote_offset_token:u32` appended.
pub const MEMORY_WINDOW_TOKEN_WITH_OFFSET_LEN: usize = 28;

/// The `SendWithImmediate` payload exchanged once a connect completes
/// in memory-window mode (`spec.md` §4.5 mode 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryWindowToken {
    pub remote_address: u64,
    pub capacity: u32,
    pub remote_token: u32,
    pub offset_buffer: Option<OffsetBufferToken>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetBufferToken {
    pub remote_offset_addr: u64,
    pub remote_offset_token: u32,
}

impl MemoryWindowToken {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecoderError> {
        if bytes.len() != MEMORY_WINDOW_TOKEN_LEN && bytes.len() != MEMORY_WINDOW_TOKEN_WITH_OFFSET_LEN {
            return Err(DecoderError::UnexpectedBytes(bytes.len()));
        }

        let buffer = DecoderBuffer::new(bytes);
        let (head, buffer) = buffer.decode_slice(MEMORY_WINDOW_TOKEN_LEN)?;
        let head = head.into_less_safe_slice();

        let remote_address = u64::from_le_bytes(head[0..8].try_into().unwrap());
        let capacity = u32::from_le_bytes(head[8..12].try_into().unwrap());
        let remote_token = u32::from_le_bytes(head[12..16].try_into().unwrap());

        let offset_buffer = if buffer.is_empty() {
            None
        } else {
            let (tail, _) = buffer.decode_slice(12)?;
            let tail = tail.into_less_safe_slice();
            Some(OffsetBufferToken {
                remote_offset_addr: u64::from_le_bytes(tail[0..8].try_into().unwrap()),
                remote_offset_token: u32::from_le_bytes(tail[8..12].try_into().unwrap()),
            })
        };

        Ok(Self { remote_address, capacity, remote_token, offset_buffer })
    }
}

impl EncoderValue for MemoryWindowToken {
    fn encoding_size(&self) -> usize {
        if self.offset_buffer.is_some() {
            MEMORY_WINDOW_TOKEN_WITH_OFFSET_LEN
        } else {
            MEMORY_WINDOW_TOKEN_LEN
        }
    }

    fn encode<E: Encoder>(&self, encoder: &mut E) {
        encoder.write_slice(&self.remote_address.to_le_bytes());
        encoder.write_slice(&self.capacity.to_le_bytes());
        encoder.write_slice(&self.remote_token.to_le_bytes());
        if let Some(offset) = self.offset_buffer {
            encoder.write_slice(&offset.remote_offset_addr.to_le_bytes());
            encoder.write_slice(&offset.remote_offset_token.to_le_bytes());
        }
    }
}

/// Sizes the no-memory-window mode's private-data blob must be exactly
/// (`spec.md` §6: "an implementation must reject any other size").
pub const CONNECT_PRIVATE_DATA_LEN: usize = 56;
pub const ACCEPT_PRIVATE_DATA_LEN: usize = 196;

/// `RDMA_DATAPATH_PRIVATE_DATA` (`spec.md` §6). Carried in the
/// `IND2Connector` private-data blob instead of a runtime exchange
/// when `NO_MEMORY_WINDOW` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrivateData {
    pub remote_recv_ring_address: u64,
    pub recv_ring_capacity: u32,
    pub recv_ring_remote_token: u32,
    pub remote_offset_buffer_address: u64,
    pub remote_offset_buffer_token: u32,
}

impl PrivateData {
    const ENCODED_FIELDS_LEN: usize = 8 + 4 + 4 + 8 + 4;

    fn decode_fields(bytes: &[u8]) -> Result<Self, DecoderError> {
        let buffer = DecoderBuffer::new(bytes);
        let (fields, _) = buffer.decode_slice(Self::ENCODED_FIELDS_LEN)?;
        let fields = fields.into_less_safe_slice();

        Ok(Self {
            remote_recv_ring_address: u64::from_le_bytes(fields[0..8].try_into().unwrap()),
            recv_ring_capacity: u32::from_le_bytes(fields[8..12].try_into().unwrap()),
            recv_ring_remote_token: u32::from_le_bytes(fields[12..16].try_into().unwrap()),
            remote_offset_buffer_address: u64::from_le_bytes(fields[16..24].try_into().unwrap()),
            remote_offset_buffer_token: u32::from_le_bytes(fields[24..28].try_into().unwrap()),
        })
    }

    fn encode_fields<E: Encoder>(&self, encoder: &mut E) {
        encoder.write_slice(&self.remote_recv_ring_address.to_le_bytes());
        encoder.write_slice(&self.recv_ring_capacity.to_le_bytes());
        encoder.write_slice(&self.recv_ring_remote_token.to_le_bytes());
        encoder.write_slice(&self.remote_offset_buffer_address.to_le_bytes());
        encoder.write_slice(&self.remote_offset_buffer_token.to_le_bytes());
    }

    /// Decodes the 56-byte client-to-server Connect request blob. The
    /// trailing bytes beyond the encoded fields are reserved padding.
    pub fn decode_connect(bytes: &[u8]) -> Result<Self, DecoderError> {
        if bytes.len() != CONNECT_PRIVATE_DATA_LEN {
            return Err(DecoderError::UnexpectedBytes(bytes.len()));
        }
        Self::decode_fields(bytes)
    }

    /// Decodes the 196-byte server-to-client Accept response blob
    /// (the larger blob carries the server's own MR tokens plus
    /// reserved padding beyond what this struct models).
    pub fn decode_accept(bytes: &[u8]) -> Result<Self, DecoderError> {
        if bytes.len() != ACCEPT_PRIVATE_DATA_LEN {
            return Err(DecoderError::UnexpectedBytes(bytes.len()));
        }
        Self::decode_fields(bytes)
    }

    pub fn encode_connect<E: Encoder>(&self, encoder: &mut E) {
        self.encode_fields(encoder);
        encoder.write_repeated(CONNECT_PRIVATE_DATA_LEN - Self::ENCODED_FIELDS_LEN, 0);
    }

    pub fn encode_accept<E: Encoder>(&self, encoder: &mut E) {
        self.encode_fields(encoder);
        encoder.write_repeated(ACCEPT_PRIVATE_DATA_LEN - Self::ENCODED_FIELDS_LEN, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quic_codec::EncoderBuffer;

    #[test]
    fn memory_window_token_round_trips_without_offset() {
        let token = MemoryWindowToken {
            remote_address: 0x1122_3344_5566_7788,
            capacity: 65536,
            remote_token: 42,
            offset_buffer: None,
        };
        let mut bytes = [0u8; MEMORY_WINDOW_TOKEN_LEN];
        token.encode(&mut EncoderBuffer::new(&mut bytes));
        assert_eq!(MemoryWindowToken::decode(&bytes).unwrap(), token);
    }

    #[test]
    fn memory_window_token_round_trips_with_offset() {
        let token = MemoryWindowToken {
            remote_address: 7,
            capacity: 131072,
            remote_token: 9,
            offset_buffer: Some(OffsetBufferToken { remote_offset_addr: 88, remote_offset_token: 3 }),
        };
        let mut bytes = [0u8; MEMORY_WINDOW_TOKEN_WITH_OFFSET_LEN];
        token.encode(&mut EncoderBuffer::new(&mut bytes));
        assert_eq!(MemoryWindowToken::decode(&bytes).unwrap(), token);
    }

    #[test]
    fn private_data_rejects_wrong_size() {
        let bytes = [0u8; 55];
        assert!(PrivateData::decode_connect(&bytes).is_err());
    }

    #[test]
    fn private_data_connect_round_trips() {
        let data = PrivateData {
            remote_recv_ring_address: 0xabad_1dea,
            recv_ring_capacity: 65536,
            recv_ring_remote_token: 11,
            remote_offset_buffer_address: 0,
            remote_offset_buffer_token: 0,
        };
        let mut bytes = [0u8; CONNECT_PRIVATE_DATA_LEN];
        data.encode_connect(&mut EncoderBuffer::new(&mut bytes));
        assert_eq!(PrivateData::decode_connect(&bytes).unwrap(), data);
    }

    #[test]
    fn private_data_accept_round_trips() {
        let data = PrivateData {
            remote_recv_ring_address: 5,
            recv_ring_capacity: 262144,
            recv_ring_remote_token: 99,
            remote_offset_buffer_address: 0x10,
            remote_offset_buffer_token: 0x20,
        };
        let mut bytes = [0u8; ACCEPT_PRIVATE_DATA_LEN];
        data.encode_accept(&mut EncoderBuffer::new(&mut bytes));
        assert_eq!(PrivateData::decode_accept(&bytes).unwrap(), data);
    }
}
