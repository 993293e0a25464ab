//! `CAPABILITY` -- refresh the server's advertised capability list.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error};
use crate::response::{Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct CapabilityCommand {
    core: CommandCore<Vec<String>>,
    seen: Vec<String>,
}

impl CapabilityCommand {
    pub fn new() -> Self {
        CapabilityCommand {
            core: CommandCore::new(),
            seen: Vec::new(),
        }
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&Vec<String>>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Default for CapabilityCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for CapabilityCommand {
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
        "CAPABILITY"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::NotAuthenticated | ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"CAPABILITY".to_vec()),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if let Payload::Capability(list) = &response.payload {
            self.seen = list.clone();
            true
        } else {
            false
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => self.core.set_result(std::mem::take(&mut self.seen)),
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
    use crate::state::TagAllocator;

    #[test]
    fn reports_capabilities_on_ok() {
        let mut cmd = CapabilityCommand::new();
        let mut alloc = TagAllocator::new();
        cmd.set_tag(alloc.allocate().unwrap());
        assert!(cmd.can_execute_in(ClientState::NotAuthenticated));

        let rendered = cmd.render(false);
        assert_eq!(rendered[0], ConnectionData::non_literal(b"A00001".to_vec()));

        let untagged = Response {
            tag: None,
            status: None,
            kind: ResponseKind::Capability,
            payload: Payload::Capability(vec!["IMAP4rev1".into(), "LITERAL+".into()]),
        };
        assert!(cmd.handle_untagged(&untagged));

        let tagged = Response {
            tag: Some(Tag::from_raw("A00001".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "done".into(),
            },
        };
        cmd.handle_tagged(&tagged);
        cmd.complete();
        assert_eq!(cmd.core.result().unwrap(), &vec!["IMAP4rev1".to_string(), "LITERAL+".to_string()]);
    }
}
