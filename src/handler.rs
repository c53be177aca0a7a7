//! Handler trait and the errors callers observe.

use std::any::Any;

use thiserror::Error;

use crate::log_record::FemtoLogRecord;

/// Errors surfaced to code that submits records to a handler.
///
/// These are the only failures a caller sees. Network trouble is contained
/// inside the handler and reported on the diagnostic channel instead.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The bounded queue is at capacity; the record was dropped.
    #[error("handler queue full; record dropped")]
    QueueFull,
    /// The handler no longer accepts records.
    #[error("handler closed")]
    Closed,
}

/// Trait implemented by all log handlers.
///
/// Handlers are `Send + Sync` so a single instance can be shared by every
/// thread that logs. Implementations hand records to their own consumer
/// thread and must never block the caller.
pub trait FemtoHandlerTrait: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError>;

    /// Wait until records accepted so far have been processed.
    ///
    /// Returns `false` when the handler is closed or the wait timed out.
    fn flush(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any;
}
