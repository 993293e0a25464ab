//! An IMAP4rev1 client protocol engine: connection framing with literal
//! flow control, an incremental tokenizer/parser for server responses, a
//! single-threaded cooperative command scheduler, and a typed event bus
//! for observing everything in between.
//!
//! This crate does not open sockets on its own behalf beyond what
//! [`transport`] offers as a convenience; [`client::Client::connect`]
//! takes a dialing closure so it can run equally well over a real TLS
//! socket or an in-memory pipe in tests.

pub mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod connection_data;
pub mod error;
pub mod events;
pub mod parser;
pub mod response;
pub mod state;
pub mod tokenizer;
pub mod transport;

pub use client::Client;
pub use config::{ConnectionConfig, TlsMode};
pub use error::{Error, Result};
pub use events::{Event, EventBus, Subscriber};
pub use response::{Code, FetchValue, Payload, Response, ResponseKind, StatusAttribute};
pub use state::{ClientState, Tag, TagAllocator};
