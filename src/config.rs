//! Server configuration: provider profiles and the `-S` spec grammar
//!
//! A provider is described either by individual CLI flags or by a compact
//! spec string: `(<user>:<pass>@@@)?<host>:<port>:<connections>:(no)?ssl`

use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Immutable descriptor of one NNTP provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerProfile {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Number of concurrent connections to open against this provider
    pub connections: u32,
    pub use_ssl: bool,
}

impl ServerProfile {
    /// Default plain-text NNTP port
    pub const DEFAULT_PORT: u16 = 119;
    /// Default NNTPS port
    pub const DEFAULT_SSL_PORT: u16 = 563;

    #[must_use]
    pub fn uses_auth(&self) -> bool {
        self.username.is_some()
    }

    /// `host:port` form for connect and log messages
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn server_spec_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:([^:]+):([^@]+)@@@)?([\w.\-]+):(\d+):(\d+):(no)?ssl$")
            .expect("server spec regex is valid")
    })
}

/// Parse a `-S` server spec string into a profile
///
/// Grammar: `(<user>:<pass>@@@)?<host>:<port>:<connections>:(no)?ssl`
pub fn parse_server_spec(spec: &str) -> Result<ServerProfile> {
    let caps = server_spec_regex().captures(spec).ok_or_else(|| {
        anyhow!(
            "syntax error in server spec '{}', expected format: \
             (<user>:<pass>@@@)?<host>:<port>:<connections>:(no)?ssl",
            spec
        )
    })?;

    let port: u16 = caps[4]
        .parse()
        .map_err(|_| anyhow!("port out of range in server spec '{}'", spec))?;
    let connections: u32 = caps[5]
        .parse()
        .map_err(|_| anyhow!("invalid connection count in server spec '{}'", spec))?;

    Ok(ServerProfile {
        host: caps[3].to_string(),
        port,
        username: caps.get(1).map(|m| m.as_str().to_string()),
        password: caps.get(2).map(|m| m.as_str().to_string()),
        connections,
        use_ssl: caps.get(6).is_none(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_spec_with_auth() {
        let profile =
            parse_server_spec("alice:s3cret@@@news.example.com:563:50:ssl").unwrap();
        assert_eq!(profile.host, "news.example.com");
        assert_eq!(profile.port, 563);
        assert_eq!(profile.username.as_deref(), Some("alice"));
        assert_eq!(profile.password.as_deref(), Some("s3cret"));
        assert_eq!(profile.connections, 50);
        assert!(profile.use_ssl);
        assert!(profile.uses_auth());
    }

    #[test]
    fn test_parse_spec_without_auth() {
        let profile = parse_server_spec("news.example.com:119:4:nossl").unwrap();
        assert_eq!(profile.host, "news.example.com");
        assert_eq!(profile.port, 119);
        assert!(profile.username.is_none());
        assert!(profile.password.is_none());
        assert_eq!(profile.connections, 4);
        assert!(!profile.use_ssl);
        assert!(!profile.uses_auth());
    }

    #[test]
    fn test_parse_spec_case_insensitive_ssl() {
        assert!(parse_server_spec("host.com:563:1:SSL").unwrap().use_ssl);
        assert!(!parse_server_spec("host.com:119:1:NoSSL").unwrap().use_ssl);
    }

    #[test]
    fn test_parse_spec_rejects_malformed() {
        assert!(parse_server_spec("").is_err());
        assert!(parse_server_spec("news.example.com").is_err());
        assert!(parse_server_spec("news.example.com:119:4").is_err());
        assert!(parse_server_spec("news.example.com:119:4:tls").is_err());
        assert!(parse_server_spec("user@@@news.example.com:119:4:ssl").is_err());
        assert!(parse_server_spec("news.example.com:99999:4:ssl").is_err());
    }

    #[test]
    fn test_addr_formatting() {
        let profile = parse_server_spec("news.example.com:563:2:ssl").unwrap();
        assert_eq!(profile.addr(), "news.example.com:563");
    }
}
