//! The response parser.
//!
//! A cooperative pull parser driven by [`crate::tokenizer::Tokenizer`]:
//! it buffers tokens until a complete CRLF-terminated line is available,
//! then matches that line against the RFC 3501 §7 grammar in one pass.
//! Buffering a full line before parsing means a malformed line is always
//! dropped as a unit -- there is no separate "resync" step, the next call
//! simply starts on the next line's tokens.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::response::{Code, FetchValue, Payload, Response, ResponseKind, StatusAttribute};
use crate::state::Tag;
use crate::tokenizer::{Token, Tokenizer};

/// Consumes fed bytes and yields one [`Response`] per accepted grammar line.
#[derive(Default)]
pub struct Parser {
    tokenizer: Tokenizer,
    pending: Vec<Token>,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            tokenizer: Tokenizer::new(),
            pending: Vec::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.tokenizer.feed(bytes);
    }

    /// Returns the next complete response, or `Ok(None)` if there isn't
    /// a full line buffered yet. A parse error consumes the offending
    /// line (it was already fully buffered) and is returned to the caller
    /// to report; the next call starts clean on the following line.
    pub fn next_response(&mut self) -> Result<Option<Response>> {
        loop {
            match self.tokenizer.next_token()? {
                Some(tok) => {
                    let is_crlf = matches!(tok, Token::Crlf);
                    self.pending.push(tok);
                    if is_crlf {
                        let line = std::mem::take(&mut self.pending);
                        return parse_line(&line).map(Some);
                    }
                }
                None => return Ok(None),
            }
        }
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_sp(&mut self) -> Result<()> {
        match self.advance() {
            Some(Token::Sp) => Ok(()),
            other => Err(unexpected("SP", other)),
        }
    }

    fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos..]
    }
}

fn unexpected(expected: &str, found: Option<&Token>) -> Error {
    Error::Parser {
        offset: 0,
        expected: expected.into(),
        found: found.map(|t| format!("{t:?}")).unwrap_or_else(|| "end of line".into()),
    }
}

fn atom_word<'a>(tok: Option<&'a Token>) -> Option<&'a str> {
    match tok {
        Some(Token::Atom(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for t in tokens {
        match t {
            Token::Sp => out.push(' '),
            Token::Atom(s) => out.push_str(s),
            Token::Number(n) => out.push_str(&n.to_string()),
            Token::Nil => out.push_str("NIL"),
            Token::QuotedString(s) => {
                out.push('"');
                out.push_str(s);
                out.push('"');
            }
            Token::ListOpen => out.push('('),
            Token::ListClose => out.push(')'),
            Token::BracketOpen => out.push('['),
            Token::BracketClose => out.push(']'),
            Token::Plus => out.push('+'),
            Token::Star => out.push('*'),
            Token::Literal(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
            Token::Crlf => {}
        }
    }
    out.trim().to_string()
}

fn parse_line(line: &[Token]) -> Result<Response> {
    // `next_response` only calls us once a CRLF has been seen; drop it.
    let line = match line.last() {
        Some(Token::Crlf) => &line[..line.len() - 1],
        _ => line,
    };
    let mut cur = Cursor::new(line);
    match cur.peek() {
        Some(Token::Plus) => parse_continue(&mut cur),
        Some(Token::Star) => parse_untagged(&mut cur),
        Some(Token::Atom(_)) => parse_tagged(&mut cur),
        other => Err(unexpected("'+', '*' or a tag", other)),
    }
}

fn parse_continue(cur: &mut Cursor<'_>) -> Result<Response> {
    cur.advance(); // '+'
    // text may be absent ("+\r\n"); SP is optional in practice though RFC requires it.
    if matches!(cur.peek(), Some(Token::Sp)) {
        cur.advance();
    }
    let text = render_tokens(cur.rest());
    Ok(Response {
        tag: None,
        status: None,
        kind: ResponseKind::Continue,
        payload: Payload::Continue(text),
    })
}

fn parse_tagged(cur: &mut Cursor<'_>) -> Result<Response> {
    let tag = match cur.advance() {
        Some(Token::Atom(s)) => Tag::from_raw(s.clone()),
        other => return Err(unexpected("tag", other)),
    };
    cur.expect_sp()?;
    let word = atom_word(cur.peek()).map(str::to_ascii_uppercase);
    let kind = match word.as_deref() {
        Some("OK") => ResponseKind::Ok,
        Some("NO") => ResponseKind::No,
        Some("BAD") => ResponseKind::Bad,
        _ => return Err(unexpected("OK, NO or BAD", cur.peek())),
    };
    cur.advance();
    let (code, message) = parse_status_rest(cur)?;
    Ok(Response {
        tag: Some(tag),
        status: Some(kind == ResponseKind::Ok),
        kind,
        payload: Payload::Status { code, message },
    })
}

fn parse_untagged(cur: &mut Cursor<'_>) -> Result<Response> {
    cur.advance(); // '*'
    cur.expect_sp()?;

    let leading_number = match cur.peek() {
        Some(Token::Number(n)) => Some(*n),
        _ => None,
    };
    if let Some(n) = leading_number {
        cur.advance();
        cur.expect_sp()?;
        let word = atom_word(cur.peek()).map(str::to_ascii_uppercase);
        return match word.as_deref() {
            Some("EXISTS") => {
                cur.advance();
                Ok(numeric_response(ResponseKind::Exists, n))
            }
            Some("RECENT") => {
                cur.advance();
                Ok(numeric_response(ResponseKind::Recent, n))
            }
            Some("EXPUNGE") => {
                cur.advance();
                Ok(numeric_response(ResponseKind::Expunge, n))
            }
            Some("FETCH") => {
                cur.advance();
                cur.expect_sp()?;
                parse_fetch(cur, n)
            }
            _ => Err(unexpected("EXISTS, RECENT, EXPUNGE or FETCH", cur.peek())),
        };
    }

    let word = atom_word(cur.peek()).map(str::to_ascii_uppercase);
    match word.as_deref() {
        Some("OK") => untagged_status(cur, ResponseKind::Ok),
        Some("NO") => untagged_status(cur, ResponseKind::No),
        Some("BAD") => untagged_status(cur, ResponseKind::Bad),
        Some("PREAUTH") => untagged_status(cur, ResponseKind::Preauth),
        Some("BYE") => untagged_status(cur, ResponseKind::Bye),
        Some("CAPABILITY") => {
            cur.advance();
            let caps = parse_space_separated_atoms(cur.rest());
            Ok(Response {
                tag: None,
                status: None,
                kind: ResponseKind::Capability,
                payload: Payload::Capability(caps),
            })
        }
        Some("FLAGS") => {
            cur.advance();
            cur.expect_sp()?;
            let flags = parse_paren_atom_list(cur)?;
            Ok(Response {
                tag: None,
                status: None,
                kind: ResponseKind::Flags,
                payload: Payload::Flags(flags),
            })
        }
        Some("SEARCH") => {
            cur.advance();
            let rest = cur.rest();
            let ids = if rest.is_empty() {
                Vec::new()
            } else {
                cur.expect_sp()?;
                parse_space_separated_numbers(cur.rest())?
            };
            Ok(Response {
                tag: None,
                status: None,
                kind: ResponseKind::Search,
                payload: Payload::Search(ids),
            })
        }
        Some(w @ "LIST") | Some(w @ "LSUB") => {
            cur.advance();
            cur.expect_sp()?;
            parse_list_data(cur, w == "LIST")
        }
        Some("STATUS") => {
            cur.advance();
            cur.expect_sp()?;
            parse_status_data(cur)
        }
        _ => Ok(Response {
            tag: None,
            status: None,
            kind: ResponseKind::Unknown,
            payload: Payload::None,
        }),
    }
}

fn numeric_response(kind: ResponseKind, n: u64) -> Response {
    Response {
        tag: None,
        status: None,
        kind,
        payload: Payload::Number(n as u32),
    }
}

fn untagged_status(cur: &mut Cursor<'_>, kind: ResponseKind) -> Result<Response> {
    cur.advance();
    let (code, message) = parse_status_rest(cur)?;
    Ok(Response {
        tag: None,
        status: Some(matches!(kind, ResponseKind::Ok | ResponseKind::Preauth)),
        kind,
        payload: Payload::Status { code, message },
    })
}

/// `[ SP ] [ "[" resp-text-code "]" SP ] text`
fn parse_status_rest(cur: &mut Cursor<'_>) -> Result<(Option<Code>, String)> {
    if matches!(cur.peek(), Some(Token::Sp)) {
        cur.advance();
    }
    let code = if matches!(cur.peek(), Some(Token::BracketOpen)) {
        cur.advance();
        let code = parse_code(cur)?;
        match cur.advance() {
            Some(Token::BracketClose) => {}
            other => return Err(unexpected("]", other)),
        }
        if matches!(cur.peek(), Some(Token::Sp)) {
            cur.advance();
        }
        Some(code)
    } else {
        None
    };
    let message = render_tokens(cur.rest());
    Ok((code, message))
}

fn parse_code(cur: &mut Cursor<'_>) -> Result<Code> {
    let name = match cur.advance() {
        Some(Token::Atom(s)) => s.to_ascii_uppercase(),
        other => return Err(unexpected("response code", other)),
    };
    match name.as_str() {
        "ALERT" => Ok(Code::Alert),
        "PARSE" => Ok(Code::Parse),
        "READ-ONLY" => Ok(Code::ReadOnly),
        "READ-WRITE" => Ok(Code::ReadWrite),
        "TRYCREATE" => Ok(Code::TryCreate),
        "BADCHARSET" => {
            let list = if matches!(cur.peek(), Some(Token::Sp)) {
                cur.advance();
                parse_paren_atom_list(cur)?
            } else {
                Vec::new()
            };
            Ok(Code::BadCharset(list))
        }
        "PERMANENTFLAGS" => {
            cur.expect_sp()?;
            Ok(Code::PermanentFlags(parse_paren_atom_list(cur)?))
        }
        "CAPABILITY" => {
            let atoms = parse_atoms_until_bracket_close(cur);
            Ok(Code::Capability(atoms))
        }
        "UIDNEXT" => Ok(Code::UidNext(parse_code_number(cur)?)),
        "UIDVALIDITY" => Ok(Code::UidValidity(parse_code_number(cur)?)),
        "UNSEEN" => Ok(Code::Unseen(parse_code_number(cur)?)),
        _ => {
            let raw = parse_atoms_until_bracket_close(cur).join(" ");
            Ok(Code::Other { name, raw_args: raw })
        }
    }
}

fn parse_code_number(cur: &mut Cursor<'_>) -> Result<u32> {
    cur.expect_sp()?;
    match cur.advance() {
        Some(Token::Number(n)) => u32::try_from(*n).map_err(|_| Error::Parser {
            offset: 0,
            expected: "u32".into(),
            found: n.to_string(),
        }),
        other => Err(unexpected("number", other)),
    }
}

/// Consumes atoms/numbers until (not including) the closing `]`, honoring an optional leading SP.
fn parse_atoms_until_bracket_close(cur: &mut Cursor<'_>) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        match cur.peek() {
            Some(Token::Sp) => {
                cur.advance();
            }
            Some(Token::Atom(s)) => {
                out.push(s.clone());
                cur.advance();
            }
            Some(Token::Number(n)) => {
                out.push(n.to_string());
                cur.advance();
            }
            _ => break,
        }
    }
    out
}

/// `"(" *(atom SP) ")"`
fn parse_paren_atom_list(cur: &mut Cursor<'_>) -> Result<Vec<String>> {
    match cur.advance() {
        Some(Token::ListOpen) => {}
        other => return Err(unexpected("(", other)),
    }
    let mut out = Vec::new();
    loop {
        match cur.peek() {
            Some(Token::ListClose) => {
                cur.advance();
                break;
            }
            Some(Token::Sp) => {
                cur.advance();
            }
            Some(Token::Atom(s)) => {
                out.push(s.clone());
                cur.advance();
            }
            other => return Err(unexpected("flag atom or )", other)),
        }
    }
    Ok(out)
}

fn parse_space_separated_atoms(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Atom(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn parse_space_separated_numbers(tokens: &[Token]) -> Result<Vec<u32>> {
    let mut out = Vec::new();
    for t in tokens {
        if let Token::Number(n) = t {
            out.push(u32::try_from(*n).map_err(|_| Error::Parser {
                offset: 0,
                expected: "u32".into(),
                found: n.to_string(),
            })?);
        }
    }
    Ok(out)
}

fn mailbox_name(cur: &mut Cursor<'_>) -> Result<String> {
    match cur.advance() {
        Some(Token::Atom(s)) => Ok(s.clone()),
        Some(Token::QuotedString(s)) => Ok(s.clone()),
        Some(Token::Literal(bytes)) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(unexpected("mailbox name", other)),
    }
}

/// `"(" [flag *(SP flag)] ")" SP (DQUOTE delim DQUOTE / nil) SP mailbox`
fn parse_list_data(cur: &mut Cursor<'_>, is_list: bool) -> Result<Response> {
    let flags = parse_paren_atom_list(cur)?;
    cur.expect_sp()?;
    let delimiter = match cur.advance() {
        Some(Token::QuotedString(s)) => s.chars().next(),
        Some(Token::Nil) => None,
        other => return Err(unexpected("mailbox delimiter", other)),
    };
    cur.expect_sp()?;
    let path = mailbox_name(cur)?;
    Ok(Response {
        tag: None,
        status: None,
        kind: if is_list { ResponseKind::List } else { ResponseKind::Lsub },
        payload: Payload::List { flags, delimiter, path },
    })
}

/// `mailbox SP "(" [status-att SP number *(SP status-att SP number)] ")"`
fn parse_status_data(cur: &mut Cursor<'_>) -> Result<Response> {
    let mailbox = mailbox_name(cur)?;
    cur.expect_sp()?;
    match cur.advance() {
        Some(Token::ListOpen) => {}
        other => return Err(unexpected("(", other)),
    }
    let mut counts = HashMap::new();
    loop {
        match cur.peek() {
            Some(Token::ListClose) => {
                cur.advance();
                break;
            }
            Some(Token::Sp) => {
                cur.advance();
            }
            Some(Token::Atom(name)) => {
                let attr = match name.to_ascii_uppercase().as_str() {
                    "MESSAGES" => StatusAttribute::Messages,
                    "RECENT" => StatusAttribute::Recent,
                    "UIDNEXT" => StatusAttribute::UidNext,
                    "UIDVALIDITY" => StatusAttribute::UidValidity,
                    "UNSEEN" => StatusAttribute::Unseen,
                    other => {
                        return Err(Error::Parser {
                            offset: 0,
                            expected: "known STATUS attribute".into(),
                            found: other.to_string(),
                        })
                    }
                };
                cur.advance();
                cur.expect_sp()?;
                let n = match cur.advance() {
                    Some(Token::Number(n)) => u32::try_from(*n).map_err(|_| Error::Parser {
                        offset: 0,
                        expected: "u32".into(),
                        found: n.to_string(),
                    })?,
                    other => return Err(unexpected("number", other)),
                };
                counts.insert(attr, n);
            }
            other => return Err(unexpected("status attribute or )", other)),
        }
    }
    Ok(Response {
        tag: None,
        status: None,
        kind: ResponseKind::Status,
        payload: Payload::MailboxStatus { mailbox, counts },
    })
}

/// `"(" (attribute-name SP value) *(SP attribute-name SP value) ")"`
fn parse_fetch(cur: &mut Cursor<'_>, seq: u64) -> Result<Response> {
    match cur.advance() {
        Some(Token::ListOpen) => {}
        other => return Err(unexpected("(", other)),
    }
    let mut attributes = HashMap::new();
    loop {
        match cur.peek() {
            Some(Token::ListClose) => {
                cur.advance();
                break;
            }
            Some(Token::Sp) => {
                cur.advance();
            }
            Some(Token::Atom(_)) => {
                let name = parse_fetch_attribute_name(cur)?;
                cur.expect_sp()?;
                let value = parse_fetch_value(cur, &name)?;
                attributes.insert(name, value);
            }
            other => return Err(unexpected("FETCH attribute or )", other)),
        }
    }
    Ok(Response {
        tag: None,
        status: None,
        kind: ResponseKind::Fetch,
        payload: Payload::Fetch {
            seq: u32::try_from(seq).map_err(|_| Error::Parser {
                offset: 0,
                expected: "u32 sequence number".into(),
                found: seq.to_string(),
            })?,
            attributes,
        },
    })
}

/// Reads an attribute name atom, folding in a following bracketed section
/// specifier verbatim (e.g. `BODY[HEADER.FIELDS (FROM)]`) since the full
/// section-specifier grammar isn't modeled here.
fn parse_fetch_attribute_name(cur: &mut Cursor<'_>) -> Result<String> {
    let mut name = match cur.advance() {
        Some(Token::Atom(s)) => s.to_ascii_uppercase(),
        other => return Err(unexpected("attribute name", other)),
    };
    if matches!(cur.peek(), Some(Token::BracketOpen)) {
        cur.advance();
        let mut depth = 1usize;
        let mut inner = Vec::new();
        loop {
            match cur.advance() {
                Some(Token::BracketOpen) => {
                    depth += 1;
                    inner.push(Token::BracketOpen);
                }
                Some(Token::BracketClose) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    inner.push(Token::BracketClose);
                }
                Some(other) => inner.push(other.clone()),
                None => return Err(unexpected("]", None)),
            }
        }
        name.push('[');
        name.push_str(&render_tokens(&inner));
        name.push(']');
    }
    Ok(name)
}

fn parse_fetch_value(cur: &mut Cursor<'_>, attr_name: &str) -> Result<FetchValue> {
    match cur.peek() {
        Some(Token::Number(_)) => match cur.advance() {
            Some(Token::Number(n)) => Ok(FetchValue::Number(*n)),
            _ => unreachable!(),
        },
        Some(Token::QuotedString(_)) => match cur.advance() {
            Some(Token::QuotedString(s)) => Ok(FetchValue::String(s.clone().into_bytes())),
            _ => unreachable!(),
        },
        Some(Token::Literal(_)) => match cur.advance() {
            Some(Token::Literal(bytes)) => Ok(FetchValue::String(bytes.clone())),
            _ => unreachable!(),
        },
        Some(Token::Nil) => {
            cur.advance();
            Ok(FetchValue::Nil)
        }
        Some(Token::ListOpen) if attr_name == "FLAGS" => Ok(FetchValue::Flags(parse_paren_atom_list(cur)?)),
        Some(Token::ListOpen) => {
            cur.advance();
            let mut items = Vec::new();
            loop {
                match cur.peek() {
                    Some(Token::ListClose) => {
                        cur.advance();
                        break;
                    }
                    Some(Token::Sp) => {
                        cur.advance();
                    }
                    Some(_) => items.push(parse_fetch_value(cur, attr_name)?),
                    None => return Err(unexpected(")", None)),
                }
            }
            Ok(FetchValue::List(items))
        }
        other => Err(unexpected("FETCH attribute value", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &[u8]) -> Response {
        let mut p = Parser::new();
        p.feed(input);
        p.next_response().unwrap().unwrap()
    }

    #[test]
    fn parses_continuation() {
        let r = parse_one(b"+ go ahead\r\n");
        assert!(r.is_continuation());
        assert_eq!(
            r.payload,
            Payload::Continue("go ahead".into())
        );
    }

    #[test]
    fn parses_untagged_capability() {
        let r = parse_one(b"* CAPABILITY IMAP4rev1 LITERAL+\r\n");
        assert_eq!(r.kind, ResponseKind::Capability);
        assert_eq!(
            r.payload,
            Payload::Capability(vec!["IMAP4rev1".into(), "LITERAL+".into()])
        );
    }

    #[test]
    fn parses_greeting_with_capability_code() {
        let r = parse_one(b"* OK [CAPABILITY IMAP4rev1 LITERAL+] ready\r\n");
        assert_eq!(r.kind, ResponseKind::Ok);
        assert_eq!(r.message(), Some("ready"));
        assert_eq!(
            r.code(),
            Some(&Code::Capability(vec!["IMAP4rev1".into(), "LITERAL+".into()]))
        );
    }

    #[test]
    fn parses_tagged_ok() {
        let r = parse_one(b"A00001 OK done\r\n");
        assert!(r.is_result());
        assert_eq!(r.tag.unwrap().as_str(), "A00001");
    }

    #[test]
    fn parses_tagged_no_with_trycreate() {
        let r = parse_one(b"A00005 NO [TRYCREATE] mailbox doesn't exist\r\n");
        assert_eq!(r.kind, ResponseKind::No);
        assert_eq!(r.code(), Some(&Code::TryCreate));
        assert_eq!(r.message(), Some("mailbox doesn't exist"));
    }

    #[test]
    fn parses_select_sequence() {
        let mut p = Parser::new();
        p.feed(b"* 172 EXISTS\r\n* 1 RECENT\r\n* OK [UIDVALIDITY 3857529045] UIDs valid\r\n* OK [UIDNEXT 4392] Next\r\nA00003 OK [READ-WRITE] SELECT completed\r\n");
        let exists = p.next_response().unwrap().unwrap();
        assert_eq!(exists.payload, Payload::Number(172));
        assert_eq!(exists.kind, ResponseKind::Exists);

        let recent = p.next_response().unwrap().unwrap();
        assert_eq!(recent.payload, Payload::Number(1));
        assert_eq!(recent.kind, ResponseKind::Recent);

        let uidvalidity = p.next_response().unwrap().unwrap();
        assert_eq!(uidvalidity.code(), Some(&Code::UidValidity(3857529045)));

        let uidnext = p.next_response().unwrap().unwrap();
        assert_eq!(uidnext.code(), Some(&Code::UidNext(4392)));

        let done = p.next_response().unwrap().unwrap();
        assert!(done.is_result());
        assert_eq!(done.code(), Some(&Code::ReadWrite));
    }

    #[test]
    fn parses_empty_search_as_empty_list() {
        let r = parse_one(b"* SEARCH\r\n");
        assert_eq!(r.payload, Payload::Search(Vec::new()));
    }

    #[test]
    fn parses_independent_expunge_events() {
        let mut p = Parser::new();
        p.feed(b"* 3 EXPUNGE\r\n* 3 EXPUNGE\r\n");
        let a = p.next_response().unwrap().unwrap();
        let b = p.next_response().unwrap().unwrap();
        assert_eq!(a.payload, Payload::Number(3));
        assert_eq!(b.payload, Payload::Number(3));
    }

    #[test]
    fn preserves_unknown_status_code_as_opaque() {
        let r = parse_one(b"* OK [NONSTANDARD foo bar] hi\r\n");
        match r.code() {
            Some(Code::Other { name, raw_args }) => {
                assert_eq!(name, "NONSTANDARD");
                assert_eq!(raw_args, "foo bar");
            }
            other => panic!("unexpected code: {other:?}"),
        }
    }

    #[test]
    fn parses_list_response() {
        let r = parse_one(b"* LIST (\\Noselect \\HasChildren) \"/\" \"Foo\"\r\n");
        assert_eq!(
            r.payload,
            Payload::List {
                flags: vec!["\\Noselect".into(), "\\HasChildren".into()],
                delimiter: Some('/'),
                path: "Foo".into(),
            }
        );
    }

    #[test]
    fn resumes_across_partial_feeds() {
        let mut p = Parser::new();
        p.feed(b"A0000");
        assert_eq!(p.next_response().unwrap(), None);
        p.feed(b"1 OK done\r\n");
        let r = p.next_response().unwrap().unwrap();
        assert!(r.is_result());
    }

    #[test]
    fn fetch_with_flags_and_literal_body() {
        let r = parse_one(b"* 12 FETCH (FLAGS (\\Seen) BODY[TEXT] {5}\r\nhello)\r\n");
        match r.payload {
            Payload::Fetch { seq, attributes } => {
                assert_eq!(seq, 12);
                assert_eq!(attributes.get("FLAGS"), Some(&FetchValue::Flags(vec!["\\Seen".into()])));
                assert_eq!(attributes.get("BODY[TEXT]"), Some(&FetchValue::String(b"hello".to_vec())));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
