// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! TLS handshake-message framing (`spec.md` §4.4: "the helper
//! `complete_messages_length(buf, len)` walks TLS messages
//! (`tls_type[1] || length[3] || body`) and returns the total length
//! of the prefix that is complete; callers truncate `input_len_inout`
//! to that value before submitting").
//!
//! The driver must never hand a partial handshake message to the
//! record layer: `process_data` truncates its input to whatever this
//! returns.

/// A TLS handshake message header: one type byte followed by a
/// 24-bit big-endian length.
const HEADER_LEN: usize = 4;

/// Returns the length of the longest prefix of `buf` that consists of
/// zero or more complete `tls_type[1] || length[3] || body` messages.
/// Any trailing partial message is excluded.
pub fn complete_messages_length(buf: &[u8]) -> usize {
    let mut offset = 0;

    while offset + HEADER_LEN <= buf.len() {
        let mut len_bytes = [0u8; 4];
        len_bytes[1..].copy_from_slice(&buf[offset + 1..offset + HEADER_LEN]);
        let body_len = u32::from_be_bytes(len_bytes) as usize;

        let message_len = HEADER_LEN + body_len;
        if offset + message_len > buf.len() {
            break;
        }

        offset += message_len;
    }

    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_complete() {
        assert_eq!(complete_messages_length(&[]), 0);
    }

    #[test]
    fn single_complete_message() {
        let msg = [0x01, 0x00, 0x00, 0x02, 0xaa, 0xbb];
        assert_eq!(complete_messages_length(&msg), msg.len());
    }

    #[test]
    fn trailing_partial_message_is_excluded() {
        let mut buf = vec![0x01, 0x00, 0x00, 0x02, 0xaa, 0xbb];
        let first_len = buf.len();
        buf.extend_from_slice(&[0x02, 0x00, 0x00, 0x04, 0xcc]);
        assert_eq!(complete_messages_length(&buf), first_len);
    }

    #[test]
    fn partial_header_is_excluded() {
        let buf = [0x01, 0x00, 0x00];
        assert_eq!(complete_messages_length(&buf), 0);
    }

    #[test]
    fn two_complete_messages() {
        let buf = [0x01, 0x00, 0x00, 0x01, 0xaa, 0x02, 0x00, 0x00, 0x01, 0xbb];
        assert_eq!(complete_messages_length(&buf), buf.len());
    }
}
