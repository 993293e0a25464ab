//! The typed event bus.
//!
//! Replaces a delegate/observer protocol with one enum and a subscriber
//! list: `Client` (and, for stream-level events, `Connection`) hand every
//! interesting occurrence to each registered subscriber in order. There is
//! no "optional method" ambiguity -- a subscriber either matches on the
//! variants it cares about or ignores the rest.

use std::sync::{Arc, Mutex};

use crate::response::Response;
use crate::state::{ClientState, Tag};

/// One occurrence worth observing from outside the client.
#[derive(Debug, Clone)]
pub enum Event {
    /// The connection's transport is open.
    Open,
    /// The connection's transport has closed.
    Close,
    /// Raw bytes about to be written to the transport.
    Send(Vec<u8>),
    /// Raw bytes read from the transport, before tokenizing.
    Receive(Vec<u8>),
    /// A response was parsed and routed.
    Response(Response),
    /// The parser rejected a line; the session continues.
    ParserError { offset: usize, expected: String, found: String },
    /// The transport failed; the connection is now closed.
    StreamError(String),
    /// The client's protocol state changed.
    StateChange { from: ClientState, to: ClientState },
    /// A command was appended to the queue.
    Enqueue(Tag),
    /// A command left the queue (completed or aborted).
    Dequeue(Tag),
    /// A command is about to be rendered and sent.
    SendCommand(Tag),
    /// Emitted just before `Connection::write` is called for a command.
    WillSend(Tag),
    /// Emitted just before a freshly read chunk is handed to the parser.
    WillParse,
}

/// A callback registered with `on_event`. `Arc` so the same subscriber can
/// be shared between a `Client` and the `Connection` it owns.
pub type Subscriber = Arc<dyn Fn(&Event) + Send + Sync>;

/// An ordered list of subscribers, fired in registration order.
///
/// The subscriber list lives behind `Arc<Mutex<_>>` rather than directly
/// in the struct: `Client` clones its `EventBus` into the `Connection` it
/// owns so that stream-level events (`Open`, `Close`, `Send`, `Receive`,
/// `StreamError`) reach the same subscribers as client-level ones. A
/// plain `Vec` would make that clone a snapshot -- subscribers registered
/// on one clone after the split would never be seen by the other. Sharing
/// the backing list means every clone of an `EventBus` is just another
/// handle onto the same subscribers.
#[derive(Default, Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.lock().unwrap().push(subscriber);
    }

    pub fn emit(&self, event: Event) {
        for subscriber in self.subscribers.lock().unwrap().iter() {
            subscriber(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.lock().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fires_subscribers_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let o1 = order.clone();
        bus.subscribe(Arc::new(move |_event: &Event| o1.lock().unwrap().push(1)));
        let o2 = order.clone();
        bus.subscribe(Arc::new(move |_event: &Event| o2.lock().unwrap().push(2)));
        bus.emit(Event::Open);
        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn counts_events_seen() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        let c = count.clone();
        bus.subscribe(Arc::new(move |_event: &Event| {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        bus.emit(Event::Open);
        bus.emit(Event::Close);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
