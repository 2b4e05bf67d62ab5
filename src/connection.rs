//! Per-connection NNTP session state machine
//!
//! One task per connection: connect (plain TCP or TLS), read the greeting,
//! authenticate if the profile has credentials, then loop pulling one
//! message-id at a time from the shared queue and issuing `STAT` until the
//! queue drains or the session dies. Outcomes flow to the aggregator as
//! typed events; each connection reports exactly one `Disconnected`,
//! whichever way the session ends.

use crate::config::ServerProfile;
use crate::connection_error::ConnectionError;
use crate::network;
use crate::protocol::{self, Response, StatOutcome};
use crate::queue::WorkQueue;
use crate::stream::ConnectionStream;
use crate::tls::TlsManager;
use crate::types::MessageId;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Protocol phase of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConnected,
    Connected,
    AuthUser,
    AuthPass,
    Idle,
    CheckingArticle,
}

/// Events a connection reports to the aggregator
#[derive(Debug)]
pub enum CheckEvent {
    /// One STAT completed (counted whether the article exists or not)
    ArticleChecked,
    /// The article is not retrievable from this provider
    ArticleMissing { id: MessageId, server: String },
    /// The session ended; sent exactly once per connection
    Disconnected { connection_id: usize },
}

/// One NNTP session against one provider
pub struct Connection {
    id: usize,
    profile: Arc<ServerProfile>,
    queue: Arc<WorkQueue>,
    events: mpsc::UnboundedSender<CheckEvent>,
    tls: TlsManager,
    state: SessionState,
}

impl Connection {
    pub fn new(
        id: usize,
        profile: Arc<ServerProfile>,
        queue: Arc<WorkQueue>,
        events: mpsc::UnboundedSender<CheckEvent>,
        tls: TlsManager,
    ) -> Self {
        Self {
            id,
            profile,
            queue,
            events,
            tls,
            state: SessionState::NotConnected,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion
    ///
    /// Always emits exactly one `Disconnected` event, clean exit or not.
    pub async fn run(mut self) {
        if let Err(e) = self.run_session().await {
            match e.log_level() {
                tracing::Level::ERROR => {
                    error!(connection = self.id, server = %self.profile.addr(), "{}", e);
                }
                _ => {
                    warn!(connection = self.id, server = %self.profile.addr(), "{}", e);
                }
            }
        }
        let _ = self.events.send(CheckEvent::Disconnected {
            connection_id: self.id,
        });
    }

    async fn run_session(&mut self) -> Result<(), ConnectionError> {
        let stream = self.connect().await?;
        let mut reader = BufReader::new(stream);
        let server = self.profile.addr();

        let greeting = read_response(&mut reader, &server, "greeting").await?;
        if !greeting.is_greeting() {
            return Err(ConnectionError::UnexpectedResponse {
                server,
                phase: "greeting",
                response: format!("{} {}", greeting.code, greeting.text),
            });
        }
        debug!(connection = self.id, "Greeting from {}: {} {}", server, greeting.code, greeting.text);

        if self.profile.uses_auth() {
            self.authenticate(&mut reader).await?;
        }
        self.state = SessionState::Idle;

        loop {
            let Some(id) = self.queue.take() else {
                // Queue drained: say goodbye, best effort
                let _ = reader.get_mut().write_all(protocol::QUIT).await;
                debug!(connection = self.id, "No more articles, closing session to {}", server);
                return Ok(());
            };
            self.state = SessionState::CheckingArticle;

            reader
                .get_mut()
                .write_all(protocol::stat_command(&id).as_bytes())
                .await?;
            let reply = read_response(&mut reader, &server, "STAT").await?;

            match protocol::classify_stat(reply.code) {
                StatOutcome::Exists => {
                    let _ = self.events.send(CheckEvent::ArticleChecked);
                }
                StatOutcome::Missing => {
                    let _ = self.events.send(CheckEvent::ArticleChecked);
                    let _ = self.events.send(CheckEvent::ArticleMissing {
                        id,
                        server: server.clone(),
                    });
                }
                StatOutcome::Unrecognized(code) => {
                    // A single odd reply must not abort the session; count
                    // the article as missing and keep going.
                    warn!(
                        connection = self.id,
                        "Unrecognized STAT response {} from {} for {}, counting as missing",
                        code, server, id
                    );
                    let _ = self.events.send(CheckEvent::ArticleChecked);
                    let _ = self.events.send(CheckEvent::ArticleMissing {
                        id,
                        server: server.clone(),
                    });
                }
            }
            self.state = SessionState::Idle;
        }
    }

    async fn connect(&mut self) -> Result<ConnectionStream, ConnectionError> {
        let tcp = network::connect_tcp(&self.profile.host, self.profile.port).await?;
        let stream = if self.profile.use_ssl {
            let tls = self.tls.handshake(tcp, &self.profile.host).await?;
            ConnectionStream::tls(tls)
        } else {
            ConnectionStream::plain(tcp)
        };
        self.state = SessionState::Connected;
        Ok(stream)
    }

    /// AUTHINFO USER/PASS exchange (RFC 4643 §2.3)
    async fn authenticate(
        &mut self,
        reader: &mut BufReader<ConnectionStream>,
    ) -> Result<(), ConnectionError> {
        let server = self.profile.addr();
        let username = self.profile.username.as_deref().unwrap_or_default();
        let password = self.profile.password.as_deref().unwrap_or_default();

        self.state = SessionState::AuthUser;
        reader
            .get_mut()
            .write_all(protocol::authinfo_user(username).as_bytes())
            .await?;
        let reply = read_response(reader, &server, "AUTHINFO USER").await?;
        match reply.code {
            // Some providers accept the username alone
            protocol::AUTH_ACCEPTED => return Ok(()),
            protocol::PASSWORD_REQUIRED => {}
            _ => {
                return Err(ConnectionError::UnexpectedResponse {
                    server,
                    phase: "AUTHINFO USER",
                    response: format!("{} {}", reply.code, reply.text),
                });
            }
        }

        self.state = SessionState::AuthPass;
        reader
            .get_mut()
            .write_all(protocol::authinfo_pass(password).as_bytes())
            .await?;
        let reply = read_response(reader, &server, "AUTHINFO PASS").await?;
        if reply.code != protocol::AUTH_ACCEPTED {
            return Err(ConnectionError::UnexpectedResponse {
                server,
                phase: "AUTHINFO PASS",
                response: format!("{} {}", reply.code, reply.text),
            });
        }
        debug!(connection = self.id, "Authenticated to {}", server);
        Ok(())
    }
}

/// Read and parse one response line
async fn read_response<S>(
    reader: &mut BufReader<S>,
    server: &str,
    phase: &'static str,
) -> Result<Response, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(ConnectionError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "server closed the connection",
        )));
    }
    Response::parse(&line).ok_or_else(|| ConnectionError::UnexpectedResponse {
        server: server.to_string(),
        phase,
        response: line.trim_end().to_string(),
    })
}
