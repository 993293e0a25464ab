//! `LOGIN` -- plaintext username/password authentication.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error, Result};
use crate::response::{Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct LoginCommand {
    core: CommandCore<()>,
    user: ConnectionData,
    pass: ConnectionData,
}

impl LoginCommand {
    /// Validates the credentials can be framed as IMAP quoted strings
    /// (no embedded CR/LF) before the command ever reaches the queue.
    pub fn new(username: &str, password: &str) -> Result<Self> {
        Ok(LoginCommand {
            core: CommandCore::new(),
            user: ConnectionData::quoted(username)?,
            pass: ConnectionData::quoted(password)?,
        })
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&()>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for LoginCommand {
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
        "LOGIN"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::NotAuthenticated)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"LOGIN".to_vec()),
            ConnectionData::sp(),
            self.user.clone(),
            ConnectionData::sp(),
            self.pass.clone(),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, _response: &Response) -> bool {
        false
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
        if self.core.error().is_none() {
            ClientState::Authenticated
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
    fn rejects_credentials_with_embedded_crlf_before_enqueue() {
        assert!(LoginCommand::new("user\r\n", "pw").is_err());
    }

    #[test]
    fn moves_to_authenticated_only_on_ok() {
        let mut cmd = LoginCommand::new("fred", "s3cret").unwrap();
        cmd.set_tag(Tag::from_raw("A00002".into()));
        let rendered = cmd.render(false);
        assert_eq!(rendered[4], ConnectionData::quoted("fred").unwrap());

        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00002".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "logged in".into(),
            },
        });
        assert_eq!(cmd.state_after(ClientState::NotAuthenticated), ClientState::Authenticated);
    }

    #[test]
    fn stays_not_authenticated_on_no() {
        let mut cmd = LoginCommand::new("fred", "wrong").unwrap();
        cmd.set_tag(Tag::from_raw("A00002".into()));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00002".into())),
            status: Some(false),
            kind: ResponseKind::No,
            payload: Payload::Status {
                code: None,
                message: "invalid credentials".into(),
            },
        });
        assert_eq!(cmd.state_after(ClientState::NotAuthenticated), ClientState::NotAuthenticated);
    }
}
