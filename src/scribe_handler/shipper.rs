//! Bounded, non-blocking front of the delivery pipeline.
//!
//! A [`Shipper`] owns the queue shared by every producer thread and the
//! supervised delivery thread that drains it. Submission never waits: an
//! entry is either queued whole or rejected straight away. Delivery is
//! best-effort and at most once, so a queued entry may still be lost when
//! the collector is unreachable.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

use crate::{handler::HandlerError, log_record::LogEntry, rate_limited_warner::RateLimitedWarner};

use super::{
    config::ShipperConfig,
    connector::Connector,
    stats::{ShipperStats, StatsSnapshot},
    worker::{ShipCommand, WorkerHandle, spawn_worker},
};

/// Asynchronous log shipper with a bounded queue.
pub struct Shipper {
    tx: RwLock<Option<Sender<ShipCommand>>>,
    enabled: AtomicBool,
    drained: AtomicBool,
    done_rx: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<ShipperStats>,
    warner: RateLimitedWarner,
    flush_timeout: Duration,
    shutdown_timeout: Duration,
    remote: String,
}

impl Shipper {
    /// Start a shipper delivering through `connector`.
    ///
    /// The delivery thread starts immediately; no connection is attempted
    /// until the first entry arrives.
    pub fn spawn(connector: Connector, config: ShipperConfig) -> io::Result<Self> {
        if config.capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "capacity must be greater than zero",
            ));
        }
        let remote = connector.describe();
        let stats = Arc::new(ShipperStats::default());
        let WorkerHandle {
            tx,
            done_rx,
            handle,
        } = spawn_worker(connector, &config, Arc::clone(&stats))?;
        Ok(Self {
            tx: RwLock::new(Some(tx)),
            enabled: AtomicBool::new(true),
            drained: AtomicBool::new(false),
            done_rx,
            handle: Mutex::new(Some(handle)),
            stats,
            warner: RateLimitedWarner::new(config.warn_interval),
            flush_timeout: config.flush_timeout,
            shutdown_timeout: config.shutdown_timeout,
            remote,
        })
    }

    /// Queue `entry` for delivery without blocking.
    ///
    /// # Errors
    ///
    /// * [`HandlerError::QueueFull`] - the queue is at capacity; the entry was dropped
    /// * [`HandlerError::Closed`] - [`close`](Self::close) was called; the entry was dropped
    ///
    /// Pending [`flush`](Self::flush) markers occupy queue slots too, so
    /// `QueueFull` can be returned with fewer than `capacity` entries queued
    /// while a flush is outstanding.
    pub fn submit(&self, entry: LogEntry) -> Result<(), HandlerError> {
        if !self.enabled.load(Ordering::Acquire) {
            return Err(self.reject_closed());
        }
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            return Err(self.reject_closed());
        };
        match tx.try_send(ShipCommand::Entry(entry)) {
            Ok(()) => {
                self.stats.record_accepted();
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.stats.record_rejected_full();
                self.warner.record_drop();
                self.warner.warn_if_due(|count| {
                    warn!("FemtoScribeHandler queue full; dropped {count} records");
                });
                Err(HandlerError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(self.reject_closed()),
        }
    }

    fn reject_closed(&self) -> HandlerError {
        self.stats.record_rejected_closed();
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("FemtoScribeHandler dropped {count} records after shutdown");
        });
        HandlerError::Closed
    }

    /// Wait until every entry queued before this call has been attempted.
    ///
    /// Returns `false` when the shipper is closed or the delivery thread does
    /// not acknowledge within the flush timeout.
    pub fn flush(&self) -> bool {
        let Some(tx) = self.tx.read().clone() else {
            return false;
        };
        self.warner.flush(|count| {
            warn!("FemtoScribeHandler dropped {count} records in the last interval");
        });
        let deadline = Instant::now() + self.flush_timeout;
        let (ack_tx, ack_rx) = bounded(1);
        if tx
            .send_timeout(ShipCommand::Flush(ack_tx), self.flush_timeout)
            .is_err()
        {
            return false;
        }
        drop(tx);
        let remaining = deadline.saturating_duration_since(Instant::now());
        ack_rx.recv_timeout(remaining).is_ok()
    }

    /// Stop accepting entries and close the queue.
    ///
    /// Returns immediately. Entries already queued are still attempted; use
    /// [`wait_closed`](Self::wait_closed) to wait for that to finish.
    pub fn close(&self) {
        self.enabled.store(false, Ordering::Release);
        self.tx.write().take();
    }

    /// Wait up to `timeout` for the delivery thread to drain the queue and
    /// exit after [`close`](Self::close).
    pub fn wait_closed(&self, timeout: Duration) -> bool {
        if !self.drained.load(Ordering::Acquire) {
            match self.done_rx.recv_timeout(timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    self.drained.store(true, Ordering::Release);
                }
                Err(RecvTimeoutError::Timeout) => return false,
            }
        }
        if let Some(handle) = self.handle.lock().take()
            && handle.join().is_err()
        {
            warn!("FemtoScribeHandler: delivery thread panicked");
        }
        true
    }

    /// Close and wait for the queue to drain.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.close();
        self.wait_closed(timeout)
    }

    /// Whether [`submit`](Self::submit) still accepts entries.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Description of the collector this shipper delivers to.
    pub fn remote(&self) -> &str {
        &self.remote
    }
}

impl Drop for Shipper {
    fn drop(&mut self) {
        self.close();
        if !self.wait_closed(self.shutdown_timeout) {
            warn!(
                "FemtoScribeHandler: delivery thread did not drain within {:?}; detaching",
                self.shutdown_timeout
            );
        }
    }
}

impl std::fmt::Debug for Shipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shipper")
            .field("remote", &self.remote)
            .field("enabled", &self.is_enabled())
            .field("stats", &self.stats())
            .finish()
    }
}
