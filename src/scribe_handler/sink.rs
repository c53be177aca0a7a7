//! Remote sinks and the dialers that open them.
//!
//! [`RemoteSink`] is the one capability the delivery loop needs from the
//! network: a blocking `send` that returns once the collector acknowledged
//! the entry or the attempt failed. [`Dial`] opens a fresh sink. The scribe
//! implementations speak the framed codec in [`protocol`](super::protocol)
//! over any [`SocketTransport`].

use std::{io, time::Duration};

use crate::log_record::LogEntry;

use super::{
    config::ScribeHandlerConfig,
    error::SinkError,
    protocol::{ResultCode, decode_reply, frame_payload, read_frame, serialise_request, write_frame},
    transport::{ActiveConnection, SocketTransport, connect_transport},
};

/// A live connection able to deliver entries.
///
/// A sink is owned by exactly one delivery loop and is discarded after the
/// first failed `send`.
pub trait RemoteSink: Send {
    /// Deliver `entry`, blocking until it is acknowledged or fails.
    fn send(&mut self, entry: &LogEntry) -> Result<(), SinkError>;
}

impl<S: RemoteSink + ?Sized> RemoteSink for Box<S> {
    fn send(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        (**self).send(entry)
    }
}

/// Opens connections to the collector.
pub trait Dial: Send + Sync {
    /// Make a single connection attempt.
    fn dial(&self) -> io::Result<Box<dyn RemoteSink>>;

    /// Human readable description of the remote end for diagnostics.
    fn describe(&self) -> String;
}

/// Scribe `Log` RPC over a socket.
pub struct ScribeSink {
    conn: ActiveConnection,
    max_frame_size: usize,
}

impl ScribeSink {
    pub fn new(conn: ActiveConnection, max_frame_size: usize) -> Self {
        Self {
            conn,
            max_frame_size,
        }
    }
}

impl RemoteSink for ScribeSink {
    fn send(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        let payload = serialise_request(&[entry])?;
        let frame = frame_payload(&payload, self.max_frame_size).ok_or(SinkError::FrameTooLarge {
            size: payload.len(),
            limit: self.max_frame_size,
        })?;
        write_frame(&mut self.conn, &frame)?;
        let reply = read_frame(&mut self.conn, self.max_frame_size)?;
        match decode_reply(&reply)? {
            ResultCode::Ok => Ok(()),
            ResultCode::TryLater => Err(SinkError::TryLater),
        }
    }
}

/// Dialer producing [`ScribeSink`]s for a configured transport.
#[derive(Clone, Debug)]
pub struct ScribeDialer {
    transport: SocketTransport,
    connect_timeout: Duration,
    io_timeout: Duration,
    max_frame_size: usize,
}

impl ScribeDialer {
    pub fn new(transport: SocketTransport) -> Self {
        let defaults = ScribeHandlerConfig::default();
        Self {
            transport,
            connect_timeout: defaults.connect_timeout,
            io_timeout: defaults.io_timeout,
            max_frame_size: defaults.max_frame_size,
        }
    }

    /// Build a dialer from the handler configuration.
    pub fn from_config(config: &ScribeHandlerConfig) -> Self {
        Self {
            transport: config.transport.clone(),
            connect_timeout: config.connect_timeout,
            io_timeout: config.io_timeout,
            max_frame_size: config.max_frame_size,
        }
    }

    pub fn transport(&self) -> &SocketTransport {
        &self.transport
    }
}

impl Dial for ScribeDialer {
    fn dial(&self) -> io::Result<Box<dyn RemoteSink>> {
        let mut conn = connect_transport(&self.transport, self.connect_timeout)?;
        conn.set_io_timeout(self.io_timeout)?;
        Ok(Box::new(ScribeSink::new(conn, self.max_frame_size)))
    }

    fn describe(&self) -> String {
        self.transport.to_string()
    }
}
