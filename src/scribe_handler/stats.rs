//! Delivery counters shared between callers and the delivery thread.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ShipperStats {
    accepted: AtomicU64,
    rejected_full: AtomicU64,
    rejected_closed: AtomicU64,
    delivered: AtomicU64,
    connect_failures: AtomicU64,
    send_failures: AtomicU64,
    restarts: AtomicU64,
}

/// Point-in-time copy of [`ShipperStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Entries placed on the queue.
    pub accepted: u64,
    /// Entries rejected because the queue was full.
    pub rejected_full: u64,
    /// Entries rejected after close.
    pub rejected_closed: u64,
    /// Entries acknowledged by the collector.
    pub delivered: u64,
    /// Entries dropped because no connection could be made.
    pub connect_failures: u64,
    /// Entries dropped because the RPC failed.
    pub send_failures: u64,
    /// Times the delivery loop was restarted after a panic.
    pub restarts: u64,
}

impl StatsSnapshot {
    /// Entries that left the queue, whatever their fate.
    ///
    /// An entry that was in flight when the loop panicked is not counted.
    pub fn attempted(&self) -> u64 {
        self.delivered + self.connect_failures + self.send_failures
    }
}

macro_rules! counter {
    ($name:ident, $field:ident) => {
        pub(crate) fn $name(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl ShipperStats {
    counter!(record_accepted, accepted);
    counter!(record_rejected_full, rejected_full);
    counter!(record_rejected_closed, rejected_closed);
    counter!(record_delivered, delivered);
    counter!(record_connect_failure, connect_failures);
    counter!(record_send_failure, send_failures);
    counter!(record_restart, restarts);

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_full: self.rejected_full.load(Ordering::Relaxed),
            rejected_closed: self.rejected_closed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
        }
    }
}
