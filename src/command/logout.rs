//! `LOGOUT` -- request session termination.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error};
use crate::response::{Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct LogoutCommand {
    core: CommandCore<()>,
    saw_bye: bool,
}

impl LogoutCommand {
    pub fn new() -> Self {
        LogoutCommand {
            core: CommandCore::new(),
            saw_bye: false,
        }
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&()>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Default for LogoutCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for LogoutCommand {
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
        "LOGOUT"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::NotAuthenticated | ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"LOGOUT".to_vec()),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if response.kind == ResponseKind::Bye {
            self.saw_bye = true;
            true
        } else {
            false
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => self.core.set_result(()),
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

    fn state_after(&self, current: ClientState) -> ClientState {
        if self.saw_bye || self.core.error().is_none() {
            ClientState::Logout
        } else {
            current
        }
    }

    fn complete(&mut self) {
        self.core.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Payload;

    #[test]
    fn transitions_to_logout_after_bye_and_ok() {
        let mut cmd = LogoutCommand::new();
        cmd.set_tag(Tag::from_raw("A00005".into()));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Bye,
            payload: Payload::Status {
                code: None,
                message: "logging out".into(),
            },
        }));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00005".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "done".into(),
            },
        });
        assert_eq!(cmd.state_after(ClientState::Authenticated), ClientState::Logout);
    }
}
