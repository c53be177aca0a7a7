//! Scribe log-shipping handler implementation.
//!
//! This module defines `FemtoScribeHandler`, a handler that formats
//! [`FemtoLogRecord`](crate::log_record::FemtoLogRecord) values into
//! `(category, payload)` entries and ships them to a remote scribe collector.
//! Producers hand entries to a [`Shipper`], which queues them without
//! blocking. A single supervised delivery thread drains the queue, dials the
//! collector through a [`Connector`] when it has no connection, and drops
//! the connection after any failed send. Delivery is best-effort: entries
//! are attempted once and discarded on failure.

mod config;
mod connector;
mod error;
mod handler;
pub mod protocol;
mod shipper;
mod sink;
mod stats;
mod supervisor;
mod transport;
mod worker;


pub use config::{
    DEFAULT_CATEGORY, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_RETRY_DELAY,
    RetryPolicy, ScribeHandlerConfig, ShipperConfig,
};
pub use connector::Connector;
pub use error::{ShipError, SinkError};
pub use handler::FemtoScribeHandler;
pub use shipper::Shipper;
pub use sink::{Dial, RemoteSink, ScribeDialer, ScribeSink};
pub use stats::StatsSnapshot;
pub use transport::{SocketTransport, TcpTransport, TlsOptions, UnixTransport};
