//! Configuration structures consumed by the scribe handler lifecycle.
//!
//! `ScribeHandlerBuilder` constructs these values before passing them to
//! [`FemtoScribeHandler`](super::FemtoScribeHandler) for runtime use.

use std::time::Duration;

use crate::{formatter::FormatTemplate, rate_limited_warner::DEFAULT_WARN_INTERVAL};

use super::transport::{SocketTransport, TcpTransport};

/// Default bounded queue capacity used by the shipper.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;
/// Number of dial attempts made before an entry is given up on.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;
/// Pause between two dial attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Default connection timeout applied to each dial attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read and write timeout applied to each RPC.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);
/// Default maximum frame size (in bytes) for requests and replies.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB
/// How long dropping a shipper waits for its queue to drain.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);
/// Category prefix used when none is configured.
pub const DEFAULT_CATEGORY: &str = "default";

/// Fixed-delay retry policy for establishing connections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total dial attempts, including the first. Always at least one.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONNECT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Settings for a [`Shipper`](super::Shipper) independent of its transport.
#[derive(Clone, Debug)]
pub struct ShipperConfig {
    pub capacity: usize,
    /// Time `flush` waits for an acknowledgement.
    pub flush_timeout: Duration,
    /// Time `Drop` waits for the delivery thread to drain the queue.
    pub shutdown_timeout: Duration,
    pub warn_interval: Duration,
    /// Name given to the delivery thread.
    pub thread_name: String,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            flush_timeout: DEFAULT_IO_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            warn_interval: DEFAULT_WARN_INTERVAL,
            thread_name: "femtoscribe-shipper".into(),
        }
    }
}

impl ShipperConfig {
    /// Override the queue capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Settings used to construct a [`FemtoScribeHandler`](super::FemtoScribeHandler).
#[derive(Clone, Debug)]
pub struct ScribeHandlerConfig {
    /// Prefix of every category; the level name is appended after a dot.
    pub category: String,
    pub template: FormatTemplate,
    pub transport: SocketTransport,
    pub retry: RetryPolicy,
    pub connect_timeout: Duration,
    pub io_timeout: Duration,
    pub max_frame_size: usize,
    pub shipper: ShipperConfig,
}

/// Provide defaults that favour local development whilst encouraging
/// production callers to override the transport via the builder APIs.
impl Default for ScribeHandlerConfig {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.into(),
            template: FormatTemplate::default(),
            transport: SocketTransport::Tcp(TcpTransport {
                host: "localhost".into(),
                port: 1463,
                tls: None,
            }),
            retry: RetryPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: DEFAULT_IO_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            shipper: ShipperConfig::default(),
        }
    }
}

impl ScribeHandlerConfig {
    /// Override the transport configuration.
    pub fn with_transport(mut self, transport: SocketTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Override the category prefix.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
