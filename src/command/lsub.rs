//! `LSUB` -- enumerate subscribed mailboxes. Same grammar as `LIST`.

use crate::command::list::ListEntry;
use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error, Result};
use crate::response::{Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct LsubCommand {
    core: CommandCore<Vec<ListEntry>>,
    reference: ConnectionData,
    pattern: ConnectionData,
    entries: Vec<ListEntry>,
}

impl LsubCommand {
    pub fn new(reference: &str, pattern: &str) -> Result<Self> {
        Ok(LsubCommand {
            core: CommandCore::new(),
            reference: ConnectionData::quoted(reference)?,
            pattern: ConnectionData::quoted(pattern)?,
            entries: Vec::new(),
        })
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&Vec<ListEntry>>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for LsubCommand {
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
        "LSUB"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"LSUB".to_vec()),
            ConnectionData::sp(),
            self.reference.clone(),
            ConnectionData::sp(),
            self.pattern.clone(),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if let (ResponseKind::Lsub, Payload::List { flags, delimiter, path }) = (&response.kind, &response.payload) {
            self.entries.push(ListEntry {
                flags: flags.clone(),
                delimiter: *delimiter,
                path: path.clone(),
            });
            true
        } else {
            false
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => self.core.set_result(std::mem::take(&mut self.entries)),
            ResponseKind::No | ResponseKind::Bad => {
                let kind = if response.kind == ResponseKind::No {
                    CommandErrorKind::ServerNo
                } else {
                    CommandErrorKind::ServerBad
                };
                self.core
                    .set_error(Error::command(kind, response.code().cloned(), response.message().unwrap_or_default()));
            }
            _ => {}
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
    fn only_accepts_lsub_kind_responses() {
        let mut cmd = LsubCommand::new("", "*").unwrap();
        cmd.set_tag(Tag::from_raw("A00007".into()));
        assert!(!cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::List,
            payload: Payload::List {
                flags: vec![],
                delimiter: Some('/'),
                path: "INBOX".into(),
            },
        }));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Lsub,
            payload: Payload::List {
                flags: vec![],
                delimiter: Some('/'),
                path: "INBOX".into(),
            },
        }));
    }
}
