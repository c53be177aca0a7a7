//! Leveled logging with an asynchronous scribe shipping handler.
//!
//! Records are rendered with a [`FormatTemplate`] and handed to a
//! [`FemtoScribeHandler`], whose [`Shipper`] queues them without blocking and
//! forwards them to a remote collector from a supervised background thread.
//! Delivery is best-effort: when the collector is unreachable records are
//! dropped and reported through the `log` facade rather than to the caller.

pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod log_record;
mod macros;
pub mod rate_limited_warner;
pub mod scribe_handler;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use formatter::{
    DEFAULT_FORMAT, DefaultFormatter, FemtoFormatter, FormatTemplate, SharedFormatter,
    TemplateError,
};
pub use handler::{FemtoHandlerTrait, HandlerError};
pub use handlers::{HandlerBuildError, HandlerBuilderTrait, ScribeHandlerBuilder};
pub use level::{FemtoLevel, ParseLevelError};
pub use log_record::{FemtoLogRecord, LogEntry};
pub use scribe_handler::{
    Connector, Dial, FemtoScribeHandler, RemoteSink, RetryPolicy, ScribeDialer,
    ScribeHandlerConfig, ShipError, Shipper, ShipperConfig, SinkError, SocketTransport,
    StatsSnapshot, TcpTransport, TlsOptions, UnixTransport,
};
