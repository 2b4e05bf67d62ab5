//! Connection error types for the article checker
//!
//! All of these are connection-fatal: the affected session disconnects and
//! is never retried; the pool continues with one fewer worker.

use std::fmt;

/// Errors that end an NNTP session
#[derive(Debug)]
#[non_exhaustive]
pub enum ConnectionError {
    /// TCP connection failed
    TcpConnect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    /// TLS handshake or certificate failure
    TlsHandshake {
        server: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Unexpected response code during greeting or authentication
    UnexpectedResponse {
        server: String,
        phase: &'static str,
        response: String,
    },

    /// I/O error during an established session
    Io(std::io::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TcpConnect { host, port, source } => {
                write!(f, "Failed to connect to {}:{}: {}", host, port, source)
            }
            Self::TlsHandshake { server, source } => {
                write!(f, "TLS handshake failed for '{}': {}", server, source)
            }
            Self::UnexpectedResponse {
                server,
                phase,
                response,
            } => {
                write!(
                    f,
                    "Unexpected {} response from '{}': {}",
                    phase, server, response
                )
            }
            Self::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TcpConnect { source, .. } => Some(source),
            Self::TlsHandshake { source, .. } => Some(source.as_ref()),
            Self::Io(e) => Some(e),
            Self::UnexpectedResponse { .. } => None,
        }
    }
}

impl ConnectionError {
    /// Check if this is a transport-level failure (connect or I/O)
    #[must_use]
    pub const fn is_transport_error(&self) -> bool {
        matches!(self, Self::TcpConnect { .. } | Self::Io(_))
    }

    /// Check if this is a TLS failure
    #[must_use]
    pub const fn is_tls_error(&self) -> bool {
        matches!(self, Self::TlsHandshake { .. })
    }

    /// Check if this is a protocol-level failure (greeting/auth)
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(self, Self::UnexpectedResponse { .. })
    }

    /// Get the appropriate log level for this error
    ///
    /// Auth/greeting and TLS failures need attention; transport failures
    /// might be transient.
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        match self {
            Self::UnexpectedResponse { .. } | Self::TlsHandshake { .. } => tracing::Level::ERROR,
            Self::TcpConnect { .. } | Self::Io(_) => tracing::Level::WARN,
        }
    }
}

impl From<std::io::Error> for ConnectionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
