//! Outbound framing atoms.
//!
//! A command renders into a list of [`ConnectionData`] pieces before any
//! bytes hit the wire. Keeping literal payloads as distinguishable
//! entries (rather than flattening everything into one buffer) lets the
//! connection suspend mid-command when a synchronizing literal needs a
//! `+` continuation from the server.

/// Whether a literal must wait for a `+` continuation before its octets are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralSync {
    /// `{n}` — wait for the server's `+` before sending the octets.
    Synchronizing,
    /// `{n+}` — RFC 2088 LITERAL+, send immediately.
    NonSynchronizing,
}

/// One atom of outbound framing: either plain bytes or a literal payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionData {
    NonLiteral(Vec<u8>),
    Literal(Vec<u8>, LiteralSync),
}

impl ConnectionData {
    /// Raw, already-framed bytes (no literal header is added).
    pub fn non_literal(bytes: impl Into<Vec<u8>>) -> Self {
        ConnectionData::NonLiteral(bytes.into())
    }

    /// A literal that must wait for `+` before the octets are sent.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        ConnectionData::Literal(bytes.into(), LiteralSync::Synchronizing)
    }

    /// A literal that is sent immediately, as RFC 2088 LITERAL+ allows.
    pub fn literal_non_sync(bytes: impl Into<Vec<u8>>) -> Self {
        ConnectionData::Literal(bytes.into(), LiteralSync::NonSynchronizing)
    }

    /// A quoted ASCII string, escaping `"` and `\`.
    ///
    /// Fails if `s` contains a bare CR or LF: quoted strings cannot span
    /// lines and a caller that needs binary-safe or multi-line content
    /// should use [`ConnectionData::literal`] instead.
    pub fn quoted(s: &str) -> crate::error::Result<Self> {
        if s.contains('\r') || s.contains('\n') {
            return Err(crate::error::Error::local(
                "quoted string may not contain CR or LF",
            ));
        }
        let mut out = Vec::with_capacity(s.len() + 2);
        out.push(b'"');
        for b in s.bytes() {
            if b == b'"' || b == b'\\' {
                out.push(b'\\');
            }
            out.push(b);
        }
        out.push(b'"');
        Ok(ConnectionData::NonLiteral(out))
    }

    /// A literal built by encoding a string with the given byte encoder
    /// (e.g. UTF-8, or some other charset encoder supplied by the caller).
    pub fn literal_encoded(s: &str, encode: impl FnOnce(&str) -> Vec<u8>) -> Self {
        ConnectionData::Literal(encode(s), LiteralSync::Synchronizing)
    }

    /// ASCII decimal rendering of an integer. No leading zeros for nonzero values.
    pub fn integer(n: i64) -> Self {
        ConnectionData::NonLiteral(n.to_string().into_bytes())
    }

    pub fn crlf() -> Self {
        ConnectionData::NonLiteral(b"\r\n".to_vec())
    }

    pub fn sp() -> Self {
        ConnectionData::NonLiteral(b" ".to_vec())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ConnectionData::Literal(..))
    }

    /// The literal header as it should appear on the wire: `{n}` or `{n+}`.
    ///
    /// The on-wire form is keyed entirely off the negotiated capability,
    /// not off what a command declared: once `support_literal_plus` is
    /// true, even a command-declared [`LiteralSync::Synchronizing`]
    /// literal is upgraded to the `{n+}` form (the connection never has
    /// to wait for `+` when the server already promised not to require
    /// it). Without the negotiated capability, every literal falls back
    /// to the synchronizing `{n}` form regardless of what the command
    /// requested.
    pub fn literal_header(len: usize, support_literal_plus: bool) -> Vec<u8> {
        if support_literal_plus {
            format!("{{{}+}}\r\n", len).into_bytes()
        } else {
            format!("{{{}}}\r\n", len).into_bytes()
        }
    }
}

/// Concatenates runs of [`ConnectionData::NonLiteral`] entries into a single
/// entry, preserving order; [`ConnectionData::Literal`] entries remain as
/// barriers. Idempotent: `compress(compress(x)) == compress(x)`.
pub fn compress(list: Vec<ConnectionData>) -> Vec<ConnectionData> {
    let mut out: Vec<ConnectionData> = Vec::with_capacity(list.len());
    for item in list {
        match item {
            ConnectionData::NonLiteral(bytes) => {
                if let Some(ConnectionData::NonLiteral(last)) = out.last_mut() {
                    last.extend_from_slice(&bytes);
                } else {
                    out.push(ConnectionData::NonLiteral(bytes));
                }
            }
            lit @ ConnectionData::Literal(..) => out.push(lit),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_merges_adjacent_non_literal() {
        let list = vec![
            ConnectionData::non_literal(b"A001".to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"LOGIN".to_vec()),
        ];
        let compressed = compress(list);
        assert_eq!(compressed.len(), 1);
        assert_eq!(
            compressed[0],
            ConnectionData::non_literal(b"A001 LOGIN".to_vec())
        );
    }

    #[test]
    fn compress_preserves_literal_barriers() {
        let list = vec![
            ConnectionData::non_literal(b"A001 APPEND INBOX ".to_vec()),
            ConnectionData::literal(b"hello".to_vec()),
            ConnectionData::crlf(),
        ];
        let compressed = compress(list);
        assert_eq!(compressed.len(), 3);
        assert!(compressed[1].is_literal());
    }

    #[test]
    fn compress_is_idempotent() {
        let list = vec![
            ConnectionData::non_literal(b"a".to_vec()),
            ConnectionData::non_literal(b"b".to_vec()),
            ConnectionData::literal(b"lit".to_vec()),
            ConnectionData::non_literal(b"c".to_vec()),
        ];
        let once = compress(list);
        let twice = compress(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn compress_preserves_byte_output() {
        let list = vec![
            ConnectionData::non_literal(b"a".to_vec()),
            ConnectionData::non_literal(b"b".to_vec()),
            ConnectionData::literal(b"lit".to_vec()),
            ConnectionData::non_literal(b"c".to_vec()),
            ConnectionData::non_literal(b"d".to_vec()),
        ];
        let before: Vec<u8> = list
            .iter()
            .filter_map(|d| match d {
                ConnectionData::NonLiteral(b) => Some(b.clone()),
                ConnectionData::Literal(..) => None,
            })
            .flatten()
            .collect();
        let compressed = compress(list);
        let after: Vec<u8> = compressed
            .iter()
            .filter_map(|d| match d {
                ConnectionData::NonLiteral(b) => Some(b.clone()),
                ConnectionData::Literal(..) => None,
            })
            .flatten()
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn quoted_escapes_quotes_and_backslashes() {
        let cd = ConnectionData::quoted(r#"a"b\c"#).unwrap();
        match cd {
            ConnectionData::NonLiteral(bytes) => {
                assert_eq!(bytes, br#""a\"b\\c""#.to_vec());
            }
            _ => panic!("expected NonLiteral"),
        }
    }

    #[test]
    fn quoted_rejects_embedded_crlf() {
        assert!(ConnectionData::quoted("a\r\nb").is_err());
    }

    #[test]
    fn integer_has_no_leading_zeros() {
        match ConnectionData::integer(42) {
            ConnectionData::NonLiteral(bytes) => assert_eq!(bytes, b"42".to_vec()),
            _ => panic!(),
        }
    }
}
