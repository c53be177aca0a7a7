//! Delivery loop driving scribe I/O.
//!
//! The loop is either disconnected (no sink) or connected. Each entry is
//! attempted exactly once: a failed connect or send drops the entry, and a
//! failed send also drops the connection so the next entry reconnects.

use std::{io, sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::{debug, warn};

use crate::{log_record::LogEntry, rate_limited_warner::RateLimitedWarner};

use super::{
    config::ShipperConfig,
    connector::Connector,
    error::ShipError,
    sink::RemoteSink,
    stats::ShipperStats,
    supervisor::supervise,
};

/// Commands processed by the delivery thread.
#[derive(Debug)]
pub enum ShipCommand {
    Entry(LogEntry),
    /// Acknowledged once every command queued before it was handled.
    Flush(Sender<()>),
}

/// Channels and handle returned by [`spawn_worker`].
pub struct WorkerHandle {
    pub tx: Sender<ShipCommand>,
    pub done_rx: Receiver<()>,
    pub handle: thread::JoinHandle<()>,
}

/// Spawn the supervised delivery thread.
pub fn spawn_worker(
    connector: Connector,
    config: &ShipperConfig,
    stats: Arc<ShipperStats>,
) -> io::Result<WorkerHandle> {
    let (tx, rx) = bounded(config.capacity);
    let (done_tx, done_rx) = bounded(1);
    let warner = RateLimitedWarner::new(config.warn_interval);
    let handle = thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            supervise(&stats, || {
                DeliveryLoop::new(&connector, &stats, &warner).run(&rx);
            });
            warner.flush(|count| {
                warn!("FemtoScribeHandler dropped {count} records before shutdown");
            });
            let _ = done_tx.send(());
        })?;
    Ok(WorkerHandle {
        tx,
        done_rx,
        handle,
    })
}

pub(super) struct DeliveryLoop<'a> {
    connector: &'a Connector,
    stats: &'a ShipperStats,
    warner: &'a RateLimitedWarner,
    sink: Option<Box<dyn RemoteSink>>,
}

impl<'a> DeliveryLoop<'a> {
    /// A fresh loop always starts disconnected.
    pub(super) fn new(
        connector: &'a Connector,
        stats: &'a ShipperStats,
        warner: &'a RateLimitedWarner,
    ) -> Self {
        Self {
            connector,
            stats,
            warner,
            sink: None,
        }
    }

    /// Handle commands until the queue is closed and empty.
    pub(super) fn run(mut self, rx: &Receiver<ShipCommand>) {
        for command in rx.iter() {
            match command {
                ShipCommand::Entry(entry) => {
                    if let Err(err) = self.deliver(&entry) {
                        self.report(&entry, &err);
                    }
                }
                ShipCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
    }

    fn deliver(&mut self, entry: &LogEntry) -> Result<(), ShipError> {
        let sink = match self.sink.as_mut() {
            Some(sink) => sink,
            None => {
                let sink = self.connector.connect().inspect_err(|_| {
                    self.stats.record_connect_failure();
                })?;
                self.sink.insert(sink)
            }
        };
        match sink.send(entry) {
            Ok(()) => {
                self.stats.record_delivered();
                Ok(())
            }
            Err(err) => {
                self.sink = None;
                self.stats.record_send_failure();
                Err(ShipError::SendFailed(err))
            }
        }
    }

    fn report(&self, entry: &LogEntry, err: &ShipError) {
        match err {
            ShipError::ConnectFailed { .. } => {
                warn!(
                    "FemtoScribeHandler error connecting to {}: {err}",
                    self.connector.describe()
                );
            }
            ShipError::SendFailed(_) => {
                warn!(
                    "FemtoScribeHandler lost connection to {}: {err}",
                    self.connector.describe()
                );
            }
        }
        debug!(
            "FemtoScribeHandler dropped entry [{}] {}",
            entry.category(),
            entry.payload()
        );
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("FemtoScribeHandler dropped {count} records due to delivery failures");
        });
    }
}
