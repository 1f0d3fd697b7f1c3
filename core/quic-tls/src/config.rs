// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Driver configuration (`spec.md` §4.4: "`config` enumerates:
//! `is_server`, credential handle, ALPN list (1..N entries, each
//! 1..255 bytes), local transport-parameter blob (owned; freed by
//! driver), peer-TP receive callback, process-complete callback,
//! optional server name for client role").

use crate::error::Error;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use std::sync::Arc;

/// Extension type a QUIC transport-parameters TLS extension is
/// carried under (`spec.md` §6, msquic's
/// `TLS_EXTENSION_TYPE_QUIC_TRANSPORT_PARAMETERS`).
pub const TRANSPORT_PARAMETERS_EXTENSION_TYPE: u16 = 0xffa5;

/// The credential material a driver is initialized with. Kept as a
/// prebuilt `rustls` config rather than raw cert/key bytes so callers
/// that already own a `rustls::ServerConfig`/`ClientConfig` (e.g. one
/// configured with a custom certificate verifier) can pass it through
/// directly.
pub enum Credentials {
    Server(Arc<rustls::ServerConfig>),
    Client(Arc<rustls::ClientConfig>),
}

impl Credentials {
    /// Builds server credentials from a PEM certificate chain and
    /// private key, with ALPN protocols preconfigured. QUIC always
    /// uses TLS 1.3, so this always produces a TLS-1.3-only config.
    pub fn server_from_pem(
        cert_chain: Vec<CertificateDer<'static>>,
        private_key: PrivateKeyDer<'static>,
        alpn_protocols: Vec<Vec<u8>>,
    ) -> Result<Self, Error> {
        let mut config = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(cert_chain, private_key)?;
        config.alpn_protocols = alpn_protocols;
        Ok(Self::Server(Arc::new(config)))
    }

    /// Builds client credentials trusting `roots`, with ALPN
    /// protocols preconfigured. Loading the platform's native root
    /// store (or a pinned CA bundle) is the caller's responsibility;
    /// this crate doesn't reach for a platform-certificate-discovery
    /// dependency of its own.
    pub fn client(roots: rustls::RootCertStore, alpn_protocols: Vec<Vec<u8>>) -> Result<Self, Error> {
        let mut config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        config.alpn_protocols = alpn_protocols;
        Ok(Self::Client(Arc::new(config)))
    }
}

/// One handshake's worth of configuration, consumed by
/// `TlsDriver::initialize`.
pub struct Config {
    pub credentials: Credentials,
    /// The caller-owned transport-parameter blob to send; the driver
    /// copies it into its first flight and does not retain it past
    /// `initialize`.
    pub local_transport_parameters: Vec<u8>,
    /// Server name for client-role handshakes; ignored for servers.
    pub server_name: Option<ServerName<'static>>,
}

impl Config {
    pub fn is_server(&self) -> bool {
        matches!(self.credentials, Credentials::Server(_))
    }
}
