//! `SELECT` -- open a mailbox for read-write access.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error, Result};
use crate::response::{Code, Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxAccess {
    ReadWrite,
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectResult {
    pub exists: u32,
    pub recent: u32,
    pub flags: Vec<String>,
    pub permanent_flags: Vec<String>,
    pub uid_validity: Option<u32>,
    pub uid_next: Option<u32>,
    pub access: Option<MailboxAccess>,
}

pub struct SelectCommand {
    core: CommandCore<SelectResult>,
    mailbox: ConnectionData,
    accum: SelectResult,
}

impl SelectCommand {
    pub fn new(mailbox: &str) -> Result<Self> {
        Ok(SelectCommand {
            core: CommandCore::new(),
            mailbox: ConnectionData::quoted(mailbox)?,
            accum: SelectResult::default(),
        })
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&SelectResult>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for SelectCommand {
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
        "SELECT"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"SELECT".to_vec()),
            ConnectionData::sp(),
            self.mailbox.clone(),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        match (&response.kind, &response.payload) {
            (ResponseKind::Exists, Payload::Number(n)) => {
                self.accum.exists = *n;
                true
            }
            (ResponseKind::Recent, Payload::Number(n)) => {
                self.accum.recent = *n;
                true
            }
            (ResponseKind::Flags, Payload::Flags(flags)) => {
                self.accum.flags = flags.clone();
                true
            }
            (ResponseKind::Ok, Payload::Status { code: Some(code), .. }) => match code {
                Code::PermanentFlags(flags) => {
                    self.accum.permanent_flags = flags.clone();
                    true
                }
                Code::UidValidity(v) => {
                    self.accum.uid_validity = Some(*v);
                    true
                }
                Code::UidNext(v) => {
                    self.accum.uid_next = Some(*v);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => {
                self.accum.access = Some(match response.code() {
                    Some(Code::ReadOnly) => MailboxAccess::ReadOnly,
                    _ => MailboxAccess::ReadWrite,
                });
                self.core.set_result(std::mem::take(&mut self.accum));
            }
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
            ClientState::Selected
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

    #[test]
    fn accumulates_mailbox_attributes_and_resolves_access() {
        let mut cmd = SelectCommand::new("INBOX").unwrap();
        cmd.set_tag(Tag::from_raw("A00003".into()));

        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Exists,
            payload: Payload::Number(172),
        }));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Recent,
            payload: Payload::Number(1),
        }));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: Some(Code::UidValidity(3857529045)),
                message: "UIDs valid".into(),
            },
        }));

        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00003".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: Some(Code::ReadWrite),
                message: "SELECT completed".into(),
            },
        });
        assert_eq!(cmd.state_after(ClientState::Authenticated), ClientState::Selected);
        cmd.complete();
        let result = cmd.core.result().unwrap();
        assert_eq!(result.exists, 172);
        assert_eq!(result.recent, 1);
        assert_eq!(result.uid_validity, Some(3857529045));
        assert_eq!(result.access, Some(MailboxAccess::ReadWrite));
    }
}
