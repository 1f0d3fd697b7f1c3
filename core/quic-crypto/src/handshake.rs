// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use quic_core::crypto;

header_key!(HandshakeHeaderKey);
negotiated_crypto!(HandshakeKey, HandshakeHeaderKey);

impl crypto::HandshakeKey for HandshakeKey {}

impl crypto::HandshakeHeaderKey for HandshakeHeaderKey {}
