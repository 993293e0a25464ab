//! The byte-stream connection.
//!
//! Owns one async stream end-to-end: writes rendered [`ConnectionData`]
//! respecting literal flow control, and hands raw chunks upward for the
//! parser to tokenize. `Connection` never dials a socket itself -- `open`
//! takes a dialing closure (typically one of [`crate::transport`]'s
//! connect functions) so the protocol core stays transport-agnostic and
//! testable over plain in-memory streams.

use std::collections::VecDeque;
use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::connection_data::{compress, ConnectionData, LiteralSync};
use crate::error::{Error, Result};
use crate::events::{Event, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    Closed,
    Opening,
    Open,
}

/// Whether a `write` call finished, or suspended mid-list waiting for a
/// `+` continuation on a synchronizing literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Complete,
    AwaitingContinue,
}

pub struct Connection<S> {
    state: ConnState,
    stream: Option<S>,
    events: EventBus,
    read_buffer_size: usize,
    support_literal_plus: bool,
    /// Remaining atoms of a write suspended at a synchronizing literal.
    pending: Option<VecDeque<ConnectionData>>,
    /// The literal body waiting to be sent once `resume_write` is called.
    awaiting_literal: Option<Vec<u8>>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(events: EventBus, read_buffer_size: usize, support_literal_plus: bool) -> Self {
        Connection {
            state: ConnState::Closed,
            stream: None,
            events,
            read_buffer_size,
            support_literal_plus,
            pending: None,
            awaiting_literal: None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ConnState::Open)
    }

    /// Negotiated after CAPABILITY confirms the server advertises LITERAL+.
    pub fn set_literal_plus_supported(&mut self, enabled: bool) {
        self.support_literal_plus = enabled;
    }

    /// Runs `dial` to obtain a stream. On success, transitions to `Open`
    /// and emits [`Event::Open`]; on failure, stays/returns to `Closed`
    /// and emits [`Event::StreamError`].
    pub async fn open<F, Fut>(&mut self, dial: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = io::Result<S>>,
    {
        self.state = ConnState::Opening;
        match dial().await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = ConnState::Open;
                self.events.emit(Event::Open);
                Ok(())
            }
            Err(e) => {
                self.state = ConnState::Closed;
                self.events.emit(Event::StreamError(e.to_string()));
                Err(Error::Stream(e))
            }
        }
    }

    /// Adopts an already-open stream directly (used by tests with
    /// in-memory duplex pipes, and by STARTTLS upgrades).
    pub fn adopt(&mut self, stream: S) {
        self.stream = Some(stream);
        self.state = ConnState::Open;
        self.events.emit(Event::Open);
    }

    pub fn close(&mut self) {
        self.stream = None;
        self.pending = None;
        self.awaiting_literal = None;
        self.state = ConnState::Closed;
        self.events.emit(Event::Close);
    }

    /// Writes a rendered command. Compresses adjacent non-literal atoms
    /// first. Returns `AwaitingContinue` if it suspended at a
    /// synchronizing literal; the caller must call `resume_write` once
    /// the server's `+` arrives.
    pub async fn write(&mut self, data: Vec<ConnectionData>) -> Result<WriteOutcome> {
        let mut queue: VecDeque<ConnectionData> = compress(data).into();
        self.drive_write(&mut queue).await
    }

    /// Resumes a write suspended on a synchronizing literal, after the
    /// client has observed the matching `+` continuation.
    pub async fn resume_write(&mut self) -> Result<WriteOutcome> {
        let mut queue = self
            .pending
            .take()
            .ok_or_else(|| Error::protocol("continuation received but no write is suspended"))?;
        self.drive_write(&mut queue).await
    }

    async fn drive_write(&mut self, queue: &mut VecDeque<ConnectionData>) -> Result<WriteOutcome> {
        if let Some(bytes) = self.awaiting_literal.take() {
            self.write_raw(&bytes).await?;
            self.events.emit(Event::Send(bytes));
        }

        while let Some(item) = queue.pop_front() {
            match item {
                ConnectionData::NonLiteral(bytes) => {
                    self.write_raw(&bytes).await?;
                    self.events.emit(Event::Send(bytes));
                }
                ConnectionData::Literal(bytes, sync) => {
                    let header = ConnectionData::literal_header(bytes.len(), self.support_literal_plus);
                    self.write_raw(&header).await?;
                    self.events.emit(Event::Send(header));

                    if sync == LiteralSync::Synchronizing && !self.support_literal_plus {
                        self.awaiting_literal = Some(bytes);
                        self.flush().await?;
                        self.pending = Some(std::mem::take(queue));
                        return Ok(WriteOutcome::AwaitingContinue);
                    }
                    self.write_raw(&bytes).await?;
                    self.events.emit(Event::Send(bytes));
                }
            }
        }
        self.flush().await?;
        Ok(WriteOutcome::Complete)
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| Error::protocol("connection not open"))?;
        if let Err(e) = stream.write_all(bytes).await {
            self.events.emit(Event::StreamError(e.to_string()));
            self.close();
            return Err(Error::Stream(e));
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| Error::protocol("connection not open"))?;
        stream.flush().await.map_err(Error::Stream)
    }

    /// Reads one chunk of up to `read_buffer_size` bytes. Returns
    /// `Err(Error::Stream(..))` on I/O failure or an unexpected EOF,
    /// leaving the connection closed.
    pub async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.read_buffer_size];
        let stream = self.stream.as_mut().ok_or_else(|| Error::protocol("connection not open"))?;
        let n = match stream.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                self.events.emit(Event::StreamError(e.to_string()));
                self.close();
                return Err(Error::Stream(e));
            }
        };
        if n == 0 {
            let e = io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by peer");
            self.events.emit(Event::StreamError(e.to_string()));
            self.close();
            return Err(Error::Stream(e));
        }
        buf.truncate(n);
        self.events.emit(Event::Receive(buf.clone()));
        Ok(buf)
    }
}
