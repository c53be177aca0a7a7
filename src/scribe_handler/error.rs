//! Internal failure taxonomy of the delivery loop.
//!
//! None of these reach application callers; they are logged on the
//! diagnostic channel and counted in [`StatsSnapshot`](super::StatsSnapshot).

use std::io;

use thiserror::Error;

/// Failure reported by a [`RemoteSink`](super::RemoteSink).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("encoded request of {size} bytes exceeds frame limit of {limit}")]
    FrameTooLarge { size: usize, limit: usize },
    #[error("collector asked to try later")]
    TryLater,
}

/// Failure of one delivery attempt.
#[derive(Debug, Error)]
pub enum ShipError {
    /// Every dial attempt failed.
    #[error("could not connect after {attempts} attempt(s): {source}")]
    ConnectFailed {
        attempts: u32,
        #[source]
        source: io::Error,
    },
    /// The RPC failed on an established connection.
    #[error("send failed: {0}")]
    SendFailed(#[from] SinkError),
}
