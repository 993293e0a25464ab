//! `EXAMINE` -- open a mailbox read-only, identical grammar to `SELECT`.

use crate::command::select::{MailboxAccess, SelectResult};
use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error, Result};
use crate::response::{Code, Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

pub struct ExamineCommand {
    core: CommandCore<SelectResult>,
    mailbox: ConnectionData,
    accum: SelectResult,
}

impl ExamineCommand {
    pub fn new(mailbox: &str) -> Result<Self> {
        Ok(ExamineCommand {
            core: CommandCore::new(),
            mailbox: ConnectionData::quoted(mailbox)?,
            accum: SelectResult::default(),
        })
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&SelectResult>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for ExamineCommand {
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
        "EXAMINE"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Authenticated | ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"EXAMINE".to_vec()),
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
                    Some(Code::ReadWrite) => MailboxAccess::ReadWrite,
                    _ => MailboxAccess::ReadOnly,
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
    fn defaults_to_read_only_without_an_explicit_code() {
        let mut cmd = ExamineCommand::new("INBOX").unwrap();
        cmd.set_tag(Tag::from_raw("A00003".into()));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00003".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "EXAMINE completed".into(),
            },
        });
        cmd.complete();
        assert_eq!(cmd.core.result().unwrap().access, Some(MailboxAccess::ReadOnly));
    }
}
