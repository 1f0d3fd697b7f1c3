// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! The two roles a connection endpoint may take on.

/// Which side of the handshake an endpoint is playing.
///
/// Initial secrets are derived differently for client and server (the
/// client writes with the `client in` secret, the server with `server
/// in`), so most key-schedule and TLS driver entry points are
/// parameterized by this type rather than a bare `bool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Server,
    Client,
}

impl Type {
    #[inline]
    pub fn is_server(self) -> bool {
        matches!(self, Type::Server)
    }

    #[inline]
    pub fn is_client(self) -> bool {
        matches!(self, Type::Client)
    }
}
