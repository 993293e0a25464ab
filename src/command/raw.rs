//! The raw escape hatch: any command not given its own typed wrapper
//! (`APPEND`, `CREATE`, `COPY`, `UID ...`, extensions, ...) can still be
//! sent by handing this command a command word and a pre-built argument
//! list, including literals.

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error};
use crate::response::{Response, ResponseKind};
use crate::state::{ClientState, Tag};

#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    pub untagged: Vec<Response>,
    pub tagged: Response,
}

type Eligibility = Box<dyn Fn(ClientState) -> bool + Send>;

pub struct RawCommand {
    core: CommandCore<RawResult>,
    word: String,
    args: Vec<ConnectionData>,
    eligible: Eligibility,
    untagged: Vec<Response>,
}

impl RawCommand {
    /// `word` is the command verb (e.g. `"APPEND"`); `args` is rendered
    /// after `tag SP word SP`, so it should not repeat either.
    pub fn new(word: impl Into<String>, args: Vec<ConnectionData>) -> Self {
        RawCommand {
            core: CommandCore::new(),
            word: word.into(),
            args,
            eligible: Box::new(|state| matches!(state, ClientState::Authenticated | ClientState::Selected)),
            untagged: Vec::new(),
        }
    }

    /// Overrides the default "authenticated or selected" eligibility.
    pub fn with_eligibility(mut self, eligible: impl Fn(ClientState) -> bool + Send + 'static) -> Self {
        self.eligible = Box::new(eligible);
        self
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&RawResult>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for RawCommand {
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
        "RAW"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        (self.eligible)(state)
    }

    fn render(&self, support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        let mut out = vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(self.word.as_bytes().to_vec()),
        ];
        if !self.args.is_empty() {
            out.push(ConnectionData::sp());
            for arg in &self.args {
                let _ = support_literal_plus; // literal form is resolved by Connection, not here
                out.push(arg.clone());
            }
        }
        out.push(ConnectionData::crlf());
        out
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        self.untagged.push(response.clone());
        true
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::No | ResponseKind::Bad => {
                let kind = if response.kind == ResponseKind::No {
                    CommandErrorKind::ServerNo
                } else {
                    CommandErrorKind::ServerBad
                };
                self.core
                    .set_error(Error::command(kind, response.code().cloned(), response.message().unwrap_or_default()));
            }
            _ => {
                self.core.set_result(RawResult {
                    untagged: std::mem::take(&mut self.untagged),
                    tagged: response.clone(),
                });
            }
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
    fn renders_word_and_args_with_tag() {
        let cmd = RawCommand::new("APPEND", vec![ConnectionData::quoted("INBOX").unwrap(), ConnectionData::sp(), ConnectionData::literal(b"From: a\r\n\r\nhi".to_vec())]);
        let mut with_tag = cmd;
        with_tag.set_tag(Tag::from_raw("A00004".into()));
        let rendered = with_tag.render(false);
        assert_eq!(rendered[0], ConnectionData::non_literal(b"A00004".to_vec()));
        assert_eq!(rendered[2], ConnectionData::non_literal(b"APPEND".to_vec()));
        assert!(rendered.iter().any(|d| d.is_literal()));
    }

    #[test]
    fn custom_eligibility_overrides_default() {
        let cmd = RawCommand::new("NOOP", vec![]).with_eligibility(|state| state != ClientState::Disconnected);
        assert!(cmd.can_execute_in(ClientState::NotAuthenticated));
        assert!(!cmd.can_execute_in(ClientState::Disconnected));
    }

    #[test]
    fn tagged_no_is_recorded_as_error_not_result() {
        let mut cmd = RawCommand::new("APPEND", vec![]);
        cmd.set_tag(Tag::from_raw("A00004".into()));
        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00004".into())),
            status: Some(false),
            kind: ResponseKind::No,
            payload: Payload::Status {
                code: Some(crate::response::Code::TryCreate),
                message: "mailbox doesn't exist".into(),
            },
        });
        cmd.complete();
        assert!(cmd.core.result().is_none());
        assert!(cmd.core.error().is_some());
    }
}
