// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Failures this crate's own plumbing can raise, distinct from
/// `quic_core::transport::Error` (the connection-fatal space a
/// completed alert maps into). These are resource/config failures at
/// `initialize` time (`spec.md` §4.4: "`initialize(config) -> Driver |
/// Fail{Resource|Config}`").
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to build TLS configuration: {0}")]
    Config(#[from] rustls::Error),

    #[error("invalid ALPN entry: must be 1..=255 bytes")]
    InvalidAlpn,

    #[error("server name required for client role")]
    MissingServerName,

    #[error("resource allocation failed")]
    Resource,
}
