//! `EXPUNGE` -- permanently remove messages flagged `\Deleted`.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error};
use crate::response::{Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct ExpungeCommand {
    core: CommandCore<Vec<u32>>,
    expunged: Vec<u32>,
}

impl ExpungeCommand {
    pub fn new() -> Self {
        ExpungeCommand {
            core: CommandCore::new(),
            expunged: Vec::new(),
        }
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&Vec<u32>>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Default for ExpungeCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ExpungeCommand {
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
        "EXPUNGE"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"EXPUNGE".to_vec()),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if let (ResponseKind::Expunge, Payload::Number(seq)) = (&response.kind, &response.payload) {
            self.expunged.push(*seq);
            true
        } else {
            false
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => self.core.set_result(std::mem::take(&mut self.expunged)),
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
    fn collects_independent_expunge_events() {
        let mut cmd = ExpungeCommand::new();
        cmd.set_tag(Tag::from_raw("A00010".into()));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Expunge,
            payload: Payload::Number(3),
        }));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Expunge,
            payload: Payload::Number(3),
        }));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00010".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "EXPUNGE completed".into(),
            },
        });
        cmd.complete();
        assert_eq!(cmd.core.result().unwrap(), &vec![3, 3]);
    }
}
