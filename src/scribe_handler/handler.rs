//! Public handler type exported by the crate.

use std::{fmt, time::Duration};

use crate::{
    formatter::SharedFormatter,
    handler::{FemtoHandlerTrait, HandlerError},
    handlers::HandlerBuildError,
    level::FemtoLevel,
    log_record::{FemtoLogRecord, LogEntry},
};

use super::{
    config::{RetryPolicy, ScribeHandlerConfig, ShipperConfig},
    connector::Connector,
    shipper::Shipper,
    sink::{Dial, ScribeDialer},
    stats::StatsSnapshot,
    transport::SocketTransport,
};

/// Handler forwarding formatted records to a scribe collector.
///
/// Each record becomes a [`LogEntry`] whose category is
/// `"<category>.<LEVEL>"` and whose payload is the formatted record. Calls
/// never block: when the queue is full the record is dropped and
/// [`HandlerError::QueueFull`] is returned. Delivery failures are logged
/// through the `log` facade and never reach the caller, so records can be
/// lost silently while the collector is unavailable.
pub struct FemtoScribeHandler {
    category: String,
    formatter: SharedFormatter,
    shipper: Shipper,
}

impl FemtoScribeHandler {
    /// Connect lazily to the collector at `address` (`host:port`).
    pub fn new(address: &str, category: &str, capacity: usize) -> Result<Self, HandlerBuildError> {
        let transport = SocketTransport::parse_address(address).ok_or_else(|| {
            HandlerBuildError::InvalidConfig(format!("invalid scribe address: {address:?}"))
        })?;
        let mut config = ScribeHandlerConfig::default()
            .with_transport(transport)
            .with_category(category);
        config.shipper.capacity = capacity;
        Self::with_config(config)
    }

    /// Construct the handler from a configuration object.
    pub fn with_config(config: ScribeHandlerConfig) -> Result<Self, HandlerBuildError> {
        let dialer = ScribeDialer::from_config(&config);
        let formatter = SharedFormatter::new(config.template);
        Self::with_dialer(
            dialer,
            &config.category,
            formatter,
            config.retry,
            config.shipper,
        )
    }

    /// Construct the handler around a custom dialer.
    ///
    /// Used to plug in other RPC transports and test doubles.
    pub fn with_dialer(
        dialer: impl Dial + 'static,
        category: &str,
        formatter: SharedFormatter,
        retry: RetryPolicy,
        shipper: ShipperConfig,
    ) -> Result<Self, HandlerBuildError> {
        if category.trim().is_empty() {
            return Err(HandlerBuildError::InvalidConfig(
                "category must not be empty".into(),
            ));
        }
        if shipper.capacity == 0 {
            return Err(HandlerBuildError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        let shipper = Shipper::spawn(Connector::new(dialer, retry), shipper)?;
        Ok(Self {
            category: category.to_owned(),
            formatter,
            shipper,
        })
    }

    /// Format a call-site record and queue it.
    ///
    /// The message is rendered from `args` first, then the whole record is
    /// rendered with the handler's template.
    pub fn emit(
        &self,
        level: FemtoLevel,
        file: &str,
        line: u32,
        args: fmt::Arguments<'_>,
    ) -> Result<(), HandlerError> {
        self.handle(FemtoLogRecord::from_args(level, file, line, args))
    }

    /// Category used for records at `level`.
    pub fn category_for(&self, level: FemtoLevel) -> String {
        format!("{}.{}", self.category, level)
    }

    /// Flush pending log records.
    pub fn flush(&self) -> bool {
        <Self as FemtoHandlerTrait>::flush(self)
    }

    /// Stop accepting records. Queued records are still delivered.
    pub fn close(&self) {
        self.shipper.close();
    }

    /// Wait for queued records to be attempted after [`close`](Self::close).
    pub fn wait_closed(&self, timeout: Duration) -> bool {
        self.shipper.wait_closed(timeout)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shipper.stats()
    }

    pub fn shipper(&self) -> &Shipper {
        &self.shipper
    }
}

impl FemtoHandlerTrait for FemtoScribeHandler {
    fn handle(&self, record: FemtoLogRecord) -> Result<(), HandlerError> {
        let payload = self.formatter.format(&record);
        let entry = LogEntry::new(self.category_for(record.level), payload);
        self.shipper.submit(entry)
    }

    fn flush(&self) -> bool {
        self.shipper.flush()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl fmt::Debug for FemtoScribeHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemtoScribeHandler")
            .field("category", &self.category)
            .field("shipper", &self.shipper)
            .finish()
    }
}
