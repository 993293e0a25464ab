//! The parsed response model.
//!
//! [`Response`] is pure data: the [`crate::parser::Parser`] builds one per
//! accepted top-level grammar production, and [`crate::client::Client`]
//! routes it without knowing anything about the bytes it came from.

use std::collections::HashMap;
use std::fmt;

use crate::state::Tag;

/// Discriminates the payload carried by a [`Response`].
///
/// `tag = None` means untagged. `Continue` is always untagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Ok,
    No,
    Bad,
    Preauth,
    Bye,
    Capability,
    List,
    Lsub,
    Status,
    Search,
    Flags,
    Exists,
    Recent,
    Expunge,
    Fetch,
    Continue,
    Unknown,
}

impl ResponseKind {
    /// `true` iff this is one of the five RFC 3501 §7.1 status kinds.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            ResponseKind::Ok | ResponseKind::No | ResponseKind::Bad | ResponseKind::Preauth | ResponseKind::Bye
        )
    }
}

/// A response code carried inside `[...]` in a status response's text, e.g.
/// `* OK [UIDVALIDITY 3857529045] UIDs valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Alert,
    BadCharset(Vec<String>),
    Capability(Vec<String>),
    Parse,
    PermanentFlags(Vec<String>),
    ReadOnly,
    ReadWrite,
    TryCreate,
    UidNext(u32),
    UidValidity(u32),
    Unseen(u32),
    /// Any code not in the fixed RFC 3501 set, preserved verbatim.
    Other { name: String, raw_args: String },
}

/// One of the four STATUS mailbox counters from RFC 3501 §6.3.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusAttribute {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
}

/// One FETCH attribute value. Attribute names (`UID`, `FLAGS`, `BODY[...]`,
/// ...) are kept as the raw string the server sent, since the fixed
/// FETCH-attribute grammar is explicitly out of this crate's scope beyond
/// what §8's test scenarios exercise.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchValue {
    Number(u64),
    String(Vec<u8>),
    Flags(Vec<String>),
    List(Vec<FetchValue>),
    Nil,
}

/// The payload of a [`Response`], shaped by its [`ResponseKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// OK / NO / BAD / PREAUTH / BYE.
    Status { code: Option<Code>, message: String },
    Capability(Vec<String>),
    List {
        flags: Vec<String>,
        delimiter: Option<char>,
        path: String,
    },
    MailboxStatus {
        mailbox: String,
        counts: HashMap<StatusAttribute, u32>,
    },
    Search(Vec<u32>),
    Flags(Vec<String>),
    /// EXISTS, RECENT (message count) or EXPUNGE (sequence number).
    Number(u32),
    Fetch {
        seq: u32,
        attributes: HashMap<String, FetchValue>,
    },
    Continue(String),
    None,
}

/// One parsed IMAP response line.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub tag: Option<Tag>,
    /// `true` iff `kind` is OK/PREAUTH, `false` for NO/BAD/BYE, `None` for pure data responses.
    pub status: Option<bool>,
    pub kind: ResponseKind,
    pub payload: Payload,
}

impl Response {
    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    pub fn is_untagged(&self) -> bool {
        self.tag.is_none()
    }

    pub fn is_continuation(&self) -> bool {
        matches!(self.kind, ResponseKind::Continue)
    }

    /// A tagged status response: the completion of a command.
    pub fn is_result(&self) -> bool {
        self.is_tagged() && self.kind.is_status()
    }

    pub fn is_kind(&self, kind: ResponseKind) -> bool {
        self.kind == kind
    }

    /// Convenience: the message text for status responses, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.payload {
            Payload::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Convenience: the response code for status responses, if any.
    pub fn code(&self) -> Option<&Code> {
        match &self.payload {
            Payload::Status { code, .. } => code.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseKind::Ok => "OK",
            ResponseKind::No => "NO",
            ResponseKind::Bad => "BAD",
            ResponseKind::Preauth => "PREAUTH",
            ResponseKind::Bye => "BYE",
            ResponseKind::Capability => "CAPABILITY",
            ResponseKind::List => "LIST",
            ResponseKind::Lsub => "LSUB",
            ResponseKind::Status => "STATUS",
            ResponseKind::Search => "SEARCH",
            ResponseKind::Flags => "FLAGS",
            ResponseKind::Exists => "EXISTS",
            ResponseKind::Recent => "RECENT",
            ResponseKind::Expunge => "EXPUNGE",
            ResponseKind::Fetch => "FETCH",
            ResponseKind::Continue => "CONTINUE",
            ResponseKind::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_on_tagged_status() {
        let r = Response {
            tag: Some(Tag::from_raw("A0001".to_string())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "done".into(),
            },
        };
        assert!(r.is_tagged());
        assert!(!r.is_untagged());
        assert!(r.is_result());
        assert!(!r.is_continuation());
        assert!(r.is_kind(ResponseKind::Ok));
    }

    #[test]
    fn predicates_on_continuation() {
        let r = Response {
            tag: None,
            status: None,
            kind: ResponseKind::Continue,
            payload: Payload::Continue("go ahead".into()),
        };
        assert!(r.is_untagged());
        assert!(r.is_continuation());
        assert!(!r.is_result());
    }
}
