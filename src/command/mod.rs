//! The command contract and the standard command roster.
//!
//! Each command type owns a [`CommandCore`] for the bookkeeping every
//! command needs (tag, lifecycle state, result/error, completion list)
//! and implements [`Command`] for the behavior that's actually specific
//! to it. There is no base class: shared state is composed in, not
//! inherited.

pub mod capability;
pub mod examine;
pub mod expunge;
pub mod fetch;
pub mod list;
pub mod login;
pub mod logout;
pub mod lsub;
pub mod raw;
pub mod select;
pub mod status;

pub use capability::CapabilityCommand;
pub use examine::ExamineCommand;
pub use expunge::ExpungeCommand;
pub use fetch::{FetchCommand, FetchResult};
pub use list::{ListCommand, ListEntry};
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use lsub::LsubCommand;
pub use raw::{RawCommand, RawResult};
pub use select::{MailboxAccess, SelectCommand, SelectResult};
pub use status::StatusCommand;

use crate::connection_data::ConnectionData;
use crate::error::Error;
use crate::response::Response;
use crate::state::{ClientState, Tag};

/// Lifecycle of a single command. A command moves through these exactly
/// once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    InFlight,
    Complete,
}

/// Shared bookkeeping embedded into every concrete command: tag
/// assignment, lifecycle state, the accumulated result/error, and the
/// completion callback list. `complete()` is idempotent -- only the
/// first call fires the registered callbacks.
pub struct CommandCore<R> {
    tag: Option<Tag>,
    state: CommandState,
    result: Option<R>,
    error: Option<Error>,
    completions: Vec<Box<dyn FnOnce(Option<&R>, Option<&Error>) + Send>>,
    fired: bool,
}

impl<R> Default for CommandCore<R> {
    fn default() -> Self {
        CommandCore {
            tag: None,
            state: CommandState::Pending,
            result: None,
            error: None,
            completions: Vec::new(),
            fired: false,
        }
    }
}

impl<R> CommandCore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = Some(tag);
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn set_state(&mut self, state: CommandState) {
        self.state = state;
    }

    pub fn result(&self) -> Option<&R> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn set_result(&mut self, result: R) {
        self.result = Some(result);
    }

    pub fn set_error(&mut self, error: Error) {
        self.error = Some(error);
    }

    pub fn add_completion(&mut self, cb: impl FnOnce(Option<&R>, Option<&Error>) + Send + 'static) {
        self.completions.push(Box::new(cb));
    }

    /// Fires every registered completion, in registration order, exactly
    /// once. Later calls are no-ops.
    pub fn complete(&mut self) {
        if self.fired {
            return;
        }
        self.fired = true;
        self.state = CommandState::Complete;
        for cb in self.completions.drain(..) {
            cb(self.result.as_ref(), self.error.as_ref());
        }
    }
}

/// The behavior every standard command, and the raw escape hatch,
/// implements. Object-safe so `Client` can hold a heterogeneous queue of
/// `Box<dyn Command>`.
pub trait Command: Send {
    fn tag(&self) -> Option<&Tag>;
    fn set_tag(&mut self, tag: Tag);
    fn state(&self) -> CommandState;
    fn mark_in_flight(&mut self);

    /// Uppercase ASCII command word, for logging.
    fn name(&self) -> &'static str;

    fn can_execute_in(&self, state: ClientState) -> bool;

    /// Renders this command's wire bytes. Must begin with `tag SP name`
    /// and end with CRLF; `set_tag` is guaranteed to have been called
    /// first. `support_literal_plus` lets the command choose the
    /// non-synchronizing literal form when the connection has it.
    fn render(&self, support_literal_plus: bool) -> Vec<ConnectionData>;

    /// Offers an untagged response to this command. Returns `true` if it
    /// was consumed (and should not be treated as an unrelated event).
    fn handle_untagged(&mut self, response: &Response) -> bool;

    /// The matching tagged response. Must record an error for NO/BAD and
    /// otherwise finalize the result from whatever untagged data was
    /// accumulated.
    fn handle_tagged(&mut self, response: &Response);

    /// The client state to move to after this command completes.
    /// Default: unchanged. Called after `handle_tagged`, so it may
    /// inspect whatever that call recorded.
    fn state_after(&self, current: ClientState) -> ClientState {
        current
    }

    /// Fires completion callbacks; idempotent.
    fn complete(&mut self);
}
