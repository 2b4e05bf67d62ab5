//! Type-safe wrappers for NNTP protocol primitives

use std::fmt;

/// A validated NNTP message-id (RFC 5536 §3.1.3)
///
/// Stored with the surrounding angle brackets, since that is the form
/// `STAT` expects on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Create a `MessageId` from an already-bracketed string
    pub fn new(s: String) -> Result<Self, InvalidMessageId> {
        if s.len() < 3 || !s.starts_with('<') || !s.ends_with('>') {
            return Err(InvalidMessageId(s));
        }
        Ok(Self(s))
    }

    /// Create a `MessageId` from the bare id, adding the angle brackets
    ///
    /// NZB `<segment>` elements carry the id without brackets.
    pub fn from_unbracketed(s: &str) -> Self {
        Self(format!("<{}>", s))
    }

    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    #[inline]
    pub fn without_brackets(&self) -> &str {
        &self.0[1..self.0.len() - 1]
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The string was not a bracketed message-id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMessageId(pub String);

impl fmt::Display for InvalidMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid message-id (must be <...>): {:?}", self.0)
    }
}

impl std::error::Error for InvalidMessageId {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_message_id() {
        let id = MessageId::new("<part1of3@example.com>".to_string()).unwrap();
        assert_eq!(id.as_str(), "<part1of3@example.com>");
        assert_eq!(id.without_brackets(), "part1of3@example.com");
    }

    #[test]
    fn test_rejects_unbracketed() {
        assert!(MessageId::new("part1of3@example.com".to_string()).is_err());
        assert!(MessageId::new("<unterminated".to_string()).is_err());
        assert!(MessageId::new("<>".to_string()).is_err());
    }

    #[test]
    fn test_from_unbracketed_wraps() {
        let id = MessageId::from_unbracketed("abc@def");
        assert_eq!(id.as_str(), "<abc@def>");
    }

    #[test]
    fn test_display_includes_brackets() {
        let id = MessageId::from_unbracketed("abc@def");
        assert_eq!(id.to_string(), "<abc@def>");
    }
}
