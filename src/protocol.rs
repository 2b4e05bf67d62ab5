//! NNTP wire protocol: command encoding and response-line parsing
//!
//! The checker speaks a small subset of RFC 3977 / RFC 4643: the greeting,
//! `AUTHINFO USER`/`AUTHINFO PASS`, `STAT <message-id>` and `QUIT`.
//! Responses are single ASCII lines of the form `<3-digit code><SP><text>`.

use crate::types::MessageId;

// Status codes consumed by the checker (RFC 3977 §3.2.1, RFC 4643 §2.3)

/// Server ready, posting allowed (RFC 3977 §5.1.1)
pub const POSTING_ALLOWED: u16 = 200;
/// Server ready, no posting (RFC 3977 §5.1.1)
pub const NO_POSTING: u16 = 201;
/// Article exists (RFC 3977 §6.2.4)
pub const ARTICLE_EXISTS: u16 = 223;
/// Authentication accepted (RFC 4643 §2.3)
pub const AUTH_ACCEPTED: u16 = 281;
/// Password required (RFC 4643 §2.3)
pub const PASSWORD_REQUIRED: u16 = 381;
/// No article with that message-id (RFC 3977 §6.2.1)
pub const NO_SUCH_ARTICLE_ID: u16 = 430;

/// `QUIT` command, ready to write
pub const QUIT: &[u8] = b"QUIT\r\n";

/// Format an `AUTHINFO USER` command line
pub fn authinfo_user(username: &str) -> String {
    format!("AUTHINFO USER {}\r\n", username)
}

/// Format an `AUTHINFO PASS` command line
pub fn authinfo_pass(password: &str) -> String {
    format!("AUTHINFO PASS {}\r\n", password)
}

/// Format a `STAT` command line for a message-id
pub fn stat_command(id: &MessageId) -> String {
    format!("STAT {}\r\n", id.as_str())
}

/// A parsed single-line NNTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: u16,
    pub text: String,
}

impl Response {
    /// Parse a response line into `(code, text)`
    ///
    /// Returns `None` unless the line starts with exactly three ASCII
    /// digits. Trailing CR/LF is stripped from the text.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let bytes = line.as_bytes();
        if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return None;
        }
        let code = u16::from(bytes[0] - b'0') * 100
            + u16::from(bytes[1] - b'0') * 10
            + u16::from(bytes[2] - b'0');
        let text = line[3..].trim_start().to_string();
        Some(Self { code, text })
    }

    /// True for a 2xx greeting (200 posting allowed, 201 read-only, ...)
    #[must_use]
    pub fn is_greeting(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Classification of a `STAT` reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatOutcome {
    /// 223: the article is retrievable
    Exists,
    /// 430 (or any other 4xx): the article is gone
    Missing,
    /// Anything else; treated as missing, never fatal to the session
    Unrecognized(u16),
}

/// Classify a `STAT` response code
pub fn classify_stat(code: u16) -> StatOutcome {
    match code {
        ARTICLE_EXISTS => StatOutcome::Exists,
        400..=499 => StatOutcome::Missing,
        other => StatOutcome::Unrecognized(other),
    }
}
