//! TCP connection establishment with socket tuning
//!
//! STAT traffic is a few dozen bytes per round trip, so latency matters and
//! throughput does not: Nagle is disabled and keepalive enabled, nothing
//! more.

use crate::connection_error::ConnectionError;
use socket2::SockRef;
use tokio::net::TcpStream;
use tracing::debug;

/// Connect to `host:port` and tune the socket for command traffic
pub async fn connect_tcp(host: &str, port: u16) -> Result<TcpStream, ConnectionError> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|source| ConnectionError::TcpConnect {
            host: host.to_string(),
            port,
            source,
        })?;

    let sock = SockRef::from(&stream);
    sock.set_nodelay(true)
        .map_err(ConnectionError::Io)?;
    sock.set_keepalive(true)
        .map_err(ConnectionError::Io)?;

    debug!("Connected to {}:{}", host, port);
    Ok(stream)
}
