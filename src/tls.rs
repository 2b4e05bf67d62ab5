//! TLS configuration and handshake management for NNTPS connections
//!
//! Built on rustls with the ring crypto provider. Certificates are loaded
//! once at startup and the connector is shared by every connection, so a
//! 50-connection run pays the certificate parsing cost a single time.
//! Certificate sources, in order: custom CA file, system store, Mozilla CA
//! bundle fallback.

use crate::connection_error::ConnectionError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, Error as RustlsError, RootCertStore, SignatureScheme};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::{client::TlsStream, TlsConnector};
use tracing::{debug, warn};

/// TLS options shared by all SSL profiles
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Verify server certificates (recommended: true)
    pub verify_cert: bool,
    /// Path to a custom CA certificate file (optional)
    pub cert_path: Option<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_cert: true,
            cert_path: None,
        }
    }
}

/// Certificate verifier that accepts everything (INSECURE)
///
/// Used when `verify_cert = false`, for providers with self-signed
/// certificates. Disables all certificate validation.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, RustlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, RustlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

/// Shared TLS connector with cached configuration
pub struct TlsManager {
    connector: Arc<TlsConnector>,
}

impl std::fmt::Debug for TlsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsManager")
            .field("connector", &"<TlsConnector>")
            .finish()
    }
}

impl Clone for TlsManager {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
        }
    }
}

impl TlsManager {
    /// Build the connector, loading certificates once
    pub fn new(config: &TlsConfig) -> Result<Self, anyhow::Error> {
        let (root_store, sources) = Self::load_certificates(config)?;
        debug!("TLS: certificate sources: {}", sources.join(", "));

        let client_config = Self::build_client_config(root_store, config)?;
        Ok(Self {
            connector: Arc::new(TlsConnector::from(Arc::new(client_config))),
        })
    }

    /// Perform the TLS handshake over an established TCP stream
    ///
    /// Runs before the greeting line is read; any handshake or certificate
    /// failure is connection-fatal.
    pub async fn handshake(
        &self,
        stream: TcpStream,
        hostname: &str,
    ) -> Result<TlsStream<TcpStream>, ConnectionError> {
        let domain = rustls_pki_types::ServerName::try_from(hostname)
            .map_err(|e| ConnectionError::TlsHandshake {
                server: hostname.to_string(),
                source: Box::new(e),
            })?
            .to_owned();

        self.connector
            .connect(domain, stream)
            .await
            .map_err(|e| ConnectionError::TlsHandshake {
                server: hostname.to_string(),
                source: Box::new(e),
            })
    }

    /// Load certificates with the fallback chain: custom file, system store,
    /// Mozilla CA bundle
    fn load_certificates(
        config: &TlsConfig,
    ) -> Result<(RootCertStore, Vec<String>), anyhow::Error> {
        use anyhow::Context;

        let mut root_store = RootCertStore::empty();
        let mut sources = Vec::new();

        if let Some(cert_path) = &config.cert_path {
            let cert_data = std::fs::read(cert_path)
                .with_context(|| format!("Failed to read TLS certificate from {}", cert_path))?;
            let certs = rustls_pemfile::certs(&mut cert_data.as_slice())
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to parse TLS certificate")?;
            for cert in certs {
                root_store
                    .add(cert)
                    .context("Failed to add custom certificate to store")?;
            }
            sources.push("custom certificate".to_string());
        }

        let native = rustls_native_certs::load_native_certs();
        let mut added = 0usize;
        for cert in native.certs {
            if root_store.add(cert).is_ok() {
                added += 1;
            }
        }
        for error in native.errors {
            warn!("TLS: certificate loading error: {}", error);
        }
        if added > 0 {
            debug!("TLS: loaded {} certificates from system store", added);
            sources.push("system certificates".to_string());
        }

        if root_store.is_empty() {
            debug!("TLS: no system certificates available, using Mozilla CA bundle fallback");
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            sources.push("Mozilla CA bundle".to_string());
        }

        Ok((root_store, sources))
    }

    fn build_client_config(
        root_store: RootCertStore,
        config: &TlsConfig,
    ) -> Result<ClientConfig, anyhow::Error> {
        use anyhow::Context;

        let client_config = if config.verify_cert {
            ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .context("Failed to create TLS config with ring provider")?
                .with_root_certificates(root_store)
                .with_no_client_auth()
        } else {
            warn!("TLS: certificate verification DISABLED");
            ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .context("Failed to create TLS config with ring provider")?
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier))
                .with_no_client_auth()
        };

        Ok(client_config)
    }
}
