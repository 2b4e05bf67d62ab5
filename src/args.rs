//! Command-line argument parsing
//!
//! Providers are given either as compact `-S` spec strings (repeatable) or
//! as individual flags describing one single server; both can be mixed.

use crate::checker::CheckerOptions;
use crate::config::{self, ServerProfile};
use crate::tls::TlsConfig;
use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nzbcheck",
    version,
    about = "Check that every article of an NZB is still retrievable from your Usenet providers"
)]
pub struct Args {
    /// nzb file to check
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Provider spec: (<user>:<pass>@@@)?<host>:<port>:<connections>:(no)?ssl
    #[arg(short = 'S', long = "server")]
    pub servers: Vec<String>,

    /// NNTP server hostname (single-server alternative to -S)
    #[arg(long)]
    pub host: Option<String>,

    /// NNTP server port (default 119, or 563 with --ssl)
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Use SSL/TLS
    #[arg(short = 's', long)]
    pub ssl: bool,

    /// NNTP username
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// NNTP password
    #[arg(short = 'p', long)]
    pub pass: Option<String>,

    /// Number of connections for the single server
    #[arg(short = 'n', long, default_value_t = 1)]
    pub connections: u32,

    /// Display the progress bar
    #[arg(long)]
    pub progress: bool,

    /// Quiet mode (no stdout output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Display debug information
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Skip TLS certificate verification (INSECURE)
    #[arg(long = "tls-no-verify")]
    pub tls_no_verify: bool,

    /// Custom CA certificate file for TLS
    #[arg(long = "tls-cert")]
    pub tls_cert: Option<String>,
}

impl Args {
    /// Assemble the provider list from `-S` specs and the single-server flags
    pub fn build_profiles(&self) -> Result<Vec<ServerProfile>> {
        let mut profiles = Vec::with_capacity(self.servers.len() + 1);
        for spec in &self.servers {
            profiles.push(config::parse_server_spec(spec)?);
        }

        if let Some(host) = &self.host {
            let port = self.port.unwrap_or(if self.ssl {
                ServerProfile::DEFAULT_SSL_PORT
            } else {
                ServerProfile::DEFAULT_PORT
            });
            profiles.push(ServerProfile {
                host: host.clone(),
                port,
                username: self.user.clone(),
                password: self.pass.clone(),
                connections: self.connections,
                use_ssl: self.ssl,
            });
        }

        if profiles.is_empty() {
            bail!(
                "at least one Usenet provider is required, \
                 via -S or --host (with -P, -u, -p, -n, -s)"
            );
        }
        Ok(profiles)
    }

    #[must_use]
    pub fn tls_config(&self) -> TlsConfig {
        TlsConfig {
            verify_cert: !self.tls_no_verify,
            cert_path: self.tls_cert.clone(),
        }
    }

    #[must_use]
    pub fn checker_options(&self) -> CheckerOptions {
        CheckerOptions {
            show_progress: self.progress && !self.quiet,
            quiet: self.quiet,
            ..CheckerOptions::default()
        }
    }
}
