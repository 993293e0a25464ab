//! The session scheduler.
//!
//! `Client` owns one [`Connection`], one command queue, and the protocol
//! state. It never spawns a task: callers drive it by calling
//! [`Client::run_once`] in a loop (their own, or one built on
//! `tokio::select!` alongside other work), the same cooperative,
//! single-command-in-flight model the connection itself uses.

use std::collections::VecDeque;
use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace, warn};

use crate::command::Command;
use crate::connection::Connection;
use crate::events::{Event, EventBus, Subscriber};
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::response::{Code, Payload, Response, ResponseKind};
use crate::state::{ClientState, Tag, TagAllocator};

pub struct Client<S> {
    connection: Connection<S>,
    events: EventBus,
    state: ClientState,
    tags: TagAllocator,
    queue: VecDeque<Box<dyn Command>>,
    in_flight: Option<Box<dyn Command>>,
    parser: Parser,
    literal_plus: bool,
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(read_buffer_size: usize, support_literal_plus: bool) -> Self {
        let events = EventBus::new();
        Client {
            connection: Connection::new(events.clone(), read_buffer_size, support_literal_plus),
            events,
            state: ClientState::Disconnected,
            tags: TagAllocator::new(),
            queue: VecDeque::new(),
            in_flight: None,
            parser: Parser::new(),
            literal_plus: support_literal_plus,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Registers an observer for every [`Event`] this client and its
    /// connection emit.
    pub fn on_event(&mut self, subscriber: Subscriber) {
        self.events.subscribe(subscriber);
    }

    /// Opens the transport via `dial` and moves to `Connecting`. The
    /// greeting itself arrives through `run_once` like any other
    /// response and drives the `Connecting -> NotAuthenticated` (or
    /// `Authenticated`, or `Logout`) transition.
    pub async fn connect<F, Fut>(&mut self, dial: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        self.transition_state(ClientState::Connecting);
        self.connection.open(dial).await
    }

    /// Adopts an already-open stream (STARTTLS upgrades, or in-memory
    /// test transports) without dialing.
    pub fn adopt(&mut self, stream: S) {
        self.connection.adopt(stream);
        self.transition_state(ClientState::Connecting);
    }

    /// Queues a command. If nothing is in flight and the command is
    /// eligible in the current state, it is rendered and sent
    /// immediately; otherwise it waits, in order, for its turn.
    pub async fn enqueue(&mut self, mut command: Box<dyn Command>) -> Result<Tag> {
        let tag = self.tags.allocate()?;
        command.set_tag(tag.clone());
        debug!(tag = %tag, name = command.name(), "enqueue");
        self.queue.push_back(command);
        self.events.emit(Event::Enqueue(tag.clone()));
        self.dispatch_next().await?;
        Ok(tag)
    }

    /// Reads one chunk from the transport, parses every complete
    /// response it contains, and routes each in order. Callers loop on
    /// this; a closed connection or fatal protocol error surfaces as
    /// `Err` and ends the session.
    pub async fn run_once(&mut self) -> Result<()> {
        self.events.emit(Event::WillParse);
        let chunk = self.connection.read_chunk().await?;
        self.parser.feed(&chunk);
        loop {
            match self.parser.next_response() {
                Ok(Some(response)) => self.route_response(response).await?,
                Ok(None) => break,
                Err(Error::Parser { offset, expected, found }) => {
                    warn!(offset, expected = %expected, found = %found, "dropped malformed response line");
                    self.events.emit(Event::ParserError { offset, expected, found });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn route_response(&mut self, response: Response) -> Result<()> {
        trace!(kind = %response.kind, tagged = response.is_tagged(), "routing response");
        self.events.emit(Event::Response(response.clone()));

        if response.is_continuation() {
            self.connection.resume_write().await?;
            return Ok(());
        }

        self.apply_state_effects(&response);

        if response.is_untagged() {
            if let Some(cmd) = self.in_flight.as_mut() {
                cmd.handle_untagged(&response);
            }
            return Ok(());
        }

        let matches_in_flight = self
            .in_flight
            .as_ref()
            .map(|cmd| cmd.tag() == response.tag.as_ref())
            .unwrap_or(false);

        if !matches_in_flight {
            return Err(Error::protocol(format!(
                "tagged response for unknown tag {:?}",
                response.tag
            )));
        }

        let mut cmd = self.in_flight.take().expect("checked above");
        cmd.handle_tagged(&response);
        let next_state = cmd.state_after(self.state);
        self.transition_state(next_state);
        let tag = cmd.tag().cloned().expect("in-flight command always has a tag");
        cmd.complete();
        self.events.emit(Event::Dequeue(tag));
        self.dispatch_next().await
    }

    /// Applies the protocol-state side effects every response may carry,
    /// independent of whether a command consumes it: capability
    /// negotiation and the greeting/BYE-driven state transitions.
    fn apply_state_effects(&mut self, response: &Response) {
        if let Some(list) = capability_words(response) {
            if list.iter().any(|c| c.eq_ignore_ascii_case("LITERAL+")) {
                self.literal_plus = true;
                self.connection.set_literal_plus_supported(true);
            }
        }

        match (self.state, response.kind) {
            (ClientState::Connecting, ResponseKind::Ok) => {
                self.transition_state(ClientState::NotAuthenticated);
            }
            (ClientState::Connecting, ResponseKind::Preauth) => {
                self.transition_state(ClientState::Authenticated);
            }
            (_, ResponseKind::Bye) => {
                self.transition_state(ClientState::Logout);
            }
            _ => {}
        }
    }

    async fn dispatch_next(&mut self) -> Result<()> {
        if self.in_flight.is_some() {
            return Ok(());
        }
        let Some(front) = self.queue.front() else {
            return Ok(());
        };
        if !front.can_execute_in(self.state) {
            trace!(state = %self.state, "head-of-line command not eligible yet, holding");
            return Ok(());
        }

        let mut cmd = self.queue.pop_front().expect("front checked above");
        cmd.mark_in_flight();
        let tag = cmd.tag().cloned().expect("tag assigned at enqueue");
        let data = cmd.render(self.literal_plus);
        self.events.emit(Event::WillSend(tag.clone()));
        self.connection.write(data).await?;
        self.events.emit(Event::SendCommand(tag));
        self.in_flight = Some(cmd);
        Ok(())
    }

    fn transition_state(&mut self, new_state: ClientState) {
        if new_state == self.state {
            return;
        }
        debug!(from = %self.state, to = %new_state, "state transition");
        let from = self.state;
        self.state = new_state;
        self.events.emit(Event::StateChange { from, to: new_state });
    }
}

fn capability_words(response: &Response) -> Option<&Vec<String>> {
    match &response.payload {
        Payload::Capability(list) => Some(list),
        Payload::Status { code: Some(Code::Capability(list)), .. } => Some(list),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CapabilityCommand;
    use tokio::io::duplex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn greeting_ok_moves_to_not_authenticated() {
        let (client_io, mut server) = duplex(4096);
        let mut client: Client<tokio::io::DuplexStream> = Client::new(4096, false);
        client.adopt(client_io);

        server.write_all(b"* OK IMAP4rev1 ready\r\n").await.unwrap();
        client.run_once().await.unwrap();
        assert_eq!(client.state(), ClientState::NotAuthenticated);
    }

    #[tokio::test]
    async fn capability_command_completes_and_negotiates_literal_plus() {
        let (client_io, mut server) = duplex(4096);
        let mut client: Client<tokio::io::DuplexStream> = Client::new(4096, false);
        client.adopt(client_io);
        server.write_all(b"* OK ready\r\n").await.unwrap();
        client.run_once().await.unwrap();

        let mut cmd = Box::new(CapabilityCommand::new());
        let observed = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let o = observed.clone();
        cmd.on_complete(move |result, _err| {
            if let Some(list) = result {
                *o.lock().unwrap() = list.clone();
            }
        });
        let tag = client.enqueue(cmd).await.unwrap();

        let mut sent = [0u8; 64];
        let n = server.read(&mut sent).await.unwrap();
        assert_eq!(&sent[..n], format!("{} CAPABILITY\r\n", tag).as_bytes());

        server
            .write_all(b"* CAPABILITY IMAP4rev1 LITERAL+\r\n")
            .await
            .unwrap();
        server
            .write_all(format!("{} OK done\r\n", tag).as_bytes())
            .await
            .unwrap();
        client.run_once().await.unwrap();

        assert_eq!(*observed.lock().unwrap(), vec!["IMAP4rev1".to_string(), "LITERAL+".to_string()]);
        assert!(client.literal_plus);
    }

    #[tokio::test]
    async fn unsolicited_bye_moves_to_logout() {
        let (client_io, mut server) = duplex(4096);
        let mut client: Client<tokio::io::DuplexStream> = Client::new(4096, false);
        client.adopt(client_io);
        server.write_all(b"* OK ready\r\n").await.unwrap();
        client.run_once().await.unwrap();

        server.write_all(b"* BYE idle timeout\r\n").await.unwrap();
        client.run_once().await.unwrap();
        assert_eq!(client.state(), ClientState::Logout);
    }
}
