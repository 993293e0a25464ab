//! `STATUS` -- query mailbox counters without selecting it.

use std::collections::HashMap;

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error, Result};
use crate::response::{Payload, Response, ResponseKind, StatusAttribute};
use crate::state::{ClientState, Tag};

fn attribute_word(attr: StatusAttribute) -> &'static [u8] {
    match attr {
        StatusAttribute::Messages => b"MESSAGES",
        StatusAttribute::Recent => b"RECENT",
        StatusAttribute::UidNext => b"UIDNEXT",
        StatusAttribute::UidValidity => b"UIDVALIDITY",
        StatusAttribute::Unseen => b"UNSEEN",
    }
}

pub struct StatusCommand {
    core: CommandCore<HashMap<StatusAttribute, u32>>,
    mailbox: ConnectionData,
    attributes: Vec<StatusAttribute>,
    target_mailbox: String,
}

impl StatusCommand {
    pub fn new(mailbox: &str, attributes: Vec<StatusAttribute>) -> Result<Self> {
        Ok(StatusCommand {
            core: CommandCore::new(),
            mailbox: ConnectionData::quoted(mailbox)?,
            attributes,
            target_mailbox: mailbox.to_string(),
        })
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&HashMap<StatusAttribute, u32>>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for StatusCommand {
    fn tag(&self) -> Option<&Tag> {
        self.core.tag()
    }

    fn set_tag(&mut self, tag: Tag) {
        self.core.set_tag(tag);
    }

    fn state(&self) -> CommandState {
        self.core.state()
    }

    fn mark_in_flight(&mut self) {
        self.core.set_state(CommandState::InFlight);
    }

    fn name(&self) -> &'static str {
        "STATUS"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        let mut out = vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"STATUS".to_vec()),
            ConnectionData::sp(),
            self.mailbox.clone(),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"(".to_vec()),
        ];
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                out.push(ConnectionData::sp());
            }
            out.push(ConnectionData::non_literal(attribute_word(*attr).to_vec()));
        }
        out.push(ConnectionData::non_literal(b")".to_vec()));
        out.push(ConnectionData::crlf());
        out
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if let (ResponseKind::Status, Payload::MailboxStatus { mailbox, counts }) = (&response.kind, &response.payload) {
            if mailbox.eq_ignore_ascii_case(&self.target_mailbox) {
                self.core.set_result(counts.clone());
                return true;
            }
        }
        false
    }

    fn handle_tagged(&mut self, response: &Response) {
        if matches!(response.kind, ResponseKind::No | ResponseKind::Bad) {
            let kind = if response.kind == ResponseKind::No {
                CommandErrorKind::ServerNo
            } else {
                CommandErrorKind::ServerBad
            };
            self.core
                .set_error(Error::command(kind, response.code().cloned(), response.message().unwrap_or_default()));
        }
    }

    fn complete(&mut self) {
        self.core.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_status_data_by_mailbox_name() {
        let mut cmd = StatusCommand::new("INBOX", vec![StatusAttribute::Messages, StatusAttribute::UidNext]).unwrap();
        cmd.set_tag(Tag::from_raw("A00008".into()));
        let mut counts = HashMap::new();
        counts.insert(StatusAttribute::Messages, 231);
        counts.insert(StatusAttribute::UidNext, 44292);
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Status,
            payload: Payload::MailboxStatus {
                mailbox: "INBOX".into(),
                counts: counts.clone(),
            },
        }));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00008".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "STATUS completed".into(),
            },
        });
        cmd.complete();
        assert_eq!(cmd.core.result().unwrap(), &counts);
    }
}
