//! `FETCH` -- retrieve message data items for a sequence set.
//!
//! The sequence-set and data-item list are accepted as pre-rendered
//! atoms rather than being modeled grammatically: the full FETCH
//! attribute grammar (section specifiers, partial ranges, macros) is out
//! of scope beyond what this crate's test scenarios exercise, so callers
//! hand in whatever the server is supposed to see.

use std::collections::HashMap;

use crate::command::{Command, CommandCore, CommandState};
use crate::connection_data::ConnectionData;
use crate::error::{CommandErrorKind, Error};
use crate::response::{FetchValue, Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag};

#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub seq: u32,
    pub attributes: HashMap<String, FetchValue>,
}

pub struct FetchCommand {
    core: CommandCore<Vec<FetchResult>>,
    sequence_set: String,
    items: String,
    results: Vec<FetchResult>,
}

impl FetchCommand {
    /// `sequence_set` e.g. `"1:5"` or `"1,3,5"`; `items` e.g. `"FULL"` or
    /// `"(FLAGS UID)"`, rendered verbatim.
    pub fn new(sequence_set: impl Into<String>, items: impl Into<String>) -> Self {
        FetchCommand {
            core: CommandCore::new(),
            sequence_set: sequence_set.into(),
            items: items.into(),
            results: Vec::new(),
        }
    }

    pub fn on_complete(&mut self, cb: impl FnOnce(Option<&Vec<FetchResult>>, Option<&Error>) + Send + 'static) {
        self.core.add_completion(cb);
    }
}

impl Command for FetchCommand {
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
        "FETCH"
    }

    fn can_execute_in(&self, state: ClientState) -> bool {
        matches!(state, ClientState::Selected)
    }

    fn render(&self, _support_literal_plus: bool) -> Vec<ConnectionData> {
        let tag = self.core.tag().expect("tag assigned before render");
        vec![
            ConnectionData::non_literal(tag.as_str().as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(b"FETCH".to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(self.sequence_set.as_bytes().to_vec()),
            ConnectionData::sp(),
            ConnectionData::non_literal(self.items.as_bytes().to_vec()),
            ConnectionData::crlf(),
        ]
    }

    fn handle_untagged(&mut self, response: &Response) -> bool {
        if let (ResponseKind::Fetch, Payload::Fetch { seq, attributes }) = (&response.kind, &response.payload) {
            self.results.push(FetchResult {
                seq: *seq,
                attributes: attributes.clone(),
            });
            true
        } else {
            false
        }
    }

    fn handle_tagged(&mut self, response: &Response) {
        match response.kind {
            ResponseKind::Ok => self.core.set_result(std::mem::take(&mut self.results)),
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
    fn accumulates_fetch_results_by_sequence_number() {
        let mut cmd = FetchCommand::new("1:2", "(FLAGS UID)");
        cmd.set_tag(Tag::from_raw("A00009".into()));

        let mut attrs = HashMap::new();
        attrs.insert("UID".to_string(), FetchValue::Number(101));
        attrs.insert("FLAGS".to_string(), FetchValue::Flags(vec!["\\Seen".into()]));
        assert!(cmd.handle_untagged(&Response {
            tag: None,
            status: None,
            kind: ResponseKind::Fetch,
            payload: Payload::Fetch { seq: 1, attributes: attrs },
        }));

        cmd.handle_tagged(&Response {
            tag: Some(Tag::from_raw("A00009".into())),
            status: Some(true),
            kind: ResponseKind::Ok,
            payload: Payload::Status {
                code: None,
                message: "FETCH completed".into(),
            },
        });
        cmd.complete();
        let results = cmd.core.result().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].seq, 1);
        assert_eq!(results[0].attributes.get("UID"), Some(&FetchValue::Number(101)));
    }
}
