//! In-process scripted NNTP server for integration tests
//!
//! Speaks just enough of the protocol for the checker: greeting,
//! AUTHINFO USER/PASS, STAT and QUIT. Behavior is scripted per server, so
//! tests can shape greetings, auth outcomes and per-article STAT replies.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use nzbcheck::{MessageId, ServerProfile};

/// Scripted behavior of one mock server
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Greeting line (default: `200 mock server ready`)
    pub greeting: Option<String>,
    /// Answer 481 to every AUTHINFO PASS
    pub reject_password: bool,
    /// Answer 481 to the first AUTHINFO PASS only, 281 afterwards
    pub fail_first_auth_only: bool,
    /// Bracketed ids answered 430
    pub missing: HashSet<String>,
    /// Bracketed id -> arbitrary response code (overrides `missing`)
    pub stat_overrides: HashMap<String, u16>,
}

pub struct MockNntpServer {
    pub addr: SocketAddr,
    sessions: Arc<AtomicUsize>,
}

impl MockNntpServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let behavior = Arc::new(behavior);
        let sessions = Arc::new(AtomicUsize::new(0));
        let first_auth_failed = Arc::new(AtomicBool::new(false));

        let session_counter = Arc::clone(&sessions);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                session_counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(handle_session(
                    stream,
                    Arc::clone(&behavior),
                    Arc::clone(&first_auth_failed),
                ));
            }
        });

        Self { addr, sessions }
    }

    /// How many sessions were ever accepted
    pub fn session_count(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Profile pointing at this server; `with_auth` adds test credentials
    pub fn profile(&self, connections: u32, with_auth: bool) -> ServerProfile {
        ServerProfile {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            username: with_auth.then(|| "bob".to_string()),
            password: with_auth.then(|| "s3cret".to_string()),
            connections,
            use_ssl: false,
        }
    }
}

async fn handle_session(
    stream: TcpStream,
    behavior: Arc<MockBehavior>,
    first_auth_failed: Arc<AtomicBool>,
) {
    let mut reader = BufReader::new(stream);
    let greeting = behavior
        .greeting
        .clone()
        .unwrap_or_else(|| "200 mock server ready".to_string());
    if write_line(&mut reader, &greeting).await.is_err() {
        return;
    }

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let cmd = line.trim_end();

        let reply = if cmd.starts_with("AUTHINFO USER ") {
            "381 Password required".to_string()
        } else if cmd.starts_with("AUTHINFO PASS") {
            let reject = behavior.reject_password
                || (behavior.fail_first_auth_only
                    && !first_auth_failed.swap(true, Ordering::SeqCst));
            if reject {
                "481 Authentication rejected".to_string()
            } else {
                "281 Authentication accepted".to_string()
            }
        } else if let Some(id) = cmd.strip_prefix("STAT ") {
            if let Some(code) = behavior.stat_overrides.get(id) {
                format!("{} scripted reply", code)
            } else if behavior.missing.contains(id) {
                format!("430 no such article {}", id)
            } else {
                format!("223 0 {} article exists", id)
            }
        } else if cmd == "QUIT" {
            let _ = write_line(&mut reader, "205 bye").await;
            return;
        } else {
            "500 command not recognized".to_string()
        };

        if write_line(&mut reader, &reply).await.is_err() {
            return;
        }
    }
}

async fn write_line(reader: &mut BufReader<TcpStream>, line: &str) -> std::io::Result<()> {
    reader
        .get_mut()
        .write_all(format!("{}\r\n", line).as_bytes())
        .await
}

/// `n` message-ids named `<part0@test>` .. `<part{n-1}@test>`
pub fn ids(n: usize) -> Vec<MessageId> {
    (0..n)
        .map(|i| MessageId::from_unbracketed(&format!("part{}@test", i)))
        .collect()
}
