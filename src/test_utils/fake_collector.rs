//! In-memory collector with scriptable failures.
//!
//! A [`FakeCollector`] records every entry its sinks accept. Tests can make
//! it unreachable, fail a number of sends, stall sends until released, or
//! panic on a chosen payload to exercise the supervisor.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Condvar, Mutex};

use crate::{
    log_record::LogEntry,
    scribe_handler::{Dial, RemoteSink, SinkError},
};

#[derive(Default)]
struct State {
    reachable: AtomicBool,
    fail_sends: AtomicU32,
    dials: AtomicU32,
    panic_on: Mutex<Option<String>>,
    stalled: Mutex<bool>,
    stall_cv: Condvar,
    entries: Mutex<Vec<LogEntry>>,
    entries_cv: Condvar,
}

/// Shared handle on the fake remote end.
#[derive(Clone)]
pub struct FakeCollector {
    state: Arc<State>,
    entered_tx: Sender<String>,
    entered_rx: Receiver<String>,
}

impl Default for FakeCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeCollector {
    /// A reachable collector that accepts everything.
    pub fn new() -> Self {
        let state = State::default();
        state.reachable.store(true, Ordering::SeqCst);
        let (entered_tx, entered_rx) = unbounded();
        Self {
            state: Arc::new(state),
            entered_tx,
            entered_rx,
        }
    }

    /// Dialer connecting to this collector.
    pub fn dialer(&self) -> FakeDialer {
        FakeDialer {
            collector: self.clone(),
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.state.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make the next `count` sends fail.
    pub fn fail_next_sends(&self, count: u32) {
        self.state.fail_sends.store(count, Ordering::SeqCst);
    }

    /// Panic inside `send` when the payload equals `payload`.
    pub fn panic_on(&self, payload: &str) {
        *self.state.panic_on.lock() = Some(payload.to_owned());
    }

    /// Block every send until [`release`](Self::release) is called.
    ///
    /// Sends that started before the stall are forgotten, so
    /// [`wait_for_send_start`](Self::wait_for_send_start) only reports sends
    /// that are actually blocked.
    pub fn stall(&self) {
        *self.state.stalled.lock() = true;
        while self.entered_rx.try_recv().is_ok() {}
    }

    pub fn release(&self) {
        *self.state.stalled.lock() = false;
        self.state.stall_cv.notify_all();
    }

    /// Wait until a send has started and return its payload.
    pub fn wait_for_send_start(&self, timeout: Duration) -> Option<String> {
        self.entered_rx.recv_timeout(timeout).ok()
    }

    /// Wait until a send whose payload ends with `suffix` has started.
    ///
    /// Sends of other payloads are skipped.
    pub fn wait_for_send_start_of(&self, suffix: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while let Ok(payload) = self.entered_rx.recv_deadline(deadline) {
            if payload.ends_with(suffix) {
                return true;
            }
        }
        false
    }

    pub fn dial_count(&self) -> u32 {
        self.state.dials.load(Ordering::SeqCst)
    }

    /// Entries accepted so far, in arrival order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.entries.lock().clone()
    }

    /// Payloads accepted so far, in arrival order.
    pub fn payloads(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|entry| entry.payload().to_owned())
            .collect()
    }

    /// Wait until at least `count` entries were accepted.
    pub fn wait_for_entries(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut entries = self.state.entries.lock();
        while entries.len() < count {
            if self
                .state
                .entries_cv
                .wait_until(&mut entries, deadline)
                .timed_out()
            {
                return entries.len() >= count;
            }
        }
        true
    }

    fn accept(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let _ = self.entered_tx.send(entry.payload().to_owned());
        {
            let mut stalled = self.state.stalled.lock();
            while *stalled {
                self.state.stall_cv.wait(&mut stalled);
            }
        }
        let panic_payload = self.state.panic_on.lock().clone();
        if panic_payload.as_deref() == Some(entry.payload()) {
            panic!("injected fault while sending {:?}", entry.payload());
        }
        let failing = self
            .state
            .fail_sends
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SinkError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected send failure",
            )));
        }
        self.state.entries.lock().push(entry.clone());
        self.state.entries_cv.notify_all();
        Ok(())
    }
}

/// [`Dial`] implementation backed by a [`FakeCollector`].
pub struct FakeDialer {
    collector: FakeCollector,
}

impl Dial for FakeDialer {
    fn dial(&self) -> io::Result<Box<dyn RemoteSink>> {
        let state = &self.collector.state;
        state.dials.fetch_add(1, Ordering::SeqCst);
        if !state.reachable.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "fake collector unreachable",
            ));
        }
        Ok(Box::new(FakeSink {
            collector: self.collector.clone(),
        }))
    }

    fn describe(&self) -> String {
        "fake-collector".into()
    }
}

struct FakeSink {
    collector: FakeCollector,
}

impl RemoteSink for FakeSink {
    fn send(&mut self, entry: &LogEntry) -> Result<(), SinkError> {
        self.collector.accept(entry)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const WAIT: Duration = Duration::from_secs(2);

    #[test]
    fn stall_forgets_earlier_sends() {
        let collector = FakeCollector::new();
        let mut sink = collector.dialer().dial().expect("reachable");
        sink.send(&LogEntry::new("c", "old")).expect("accepted");

        collector.stall();
        let stalled = thread::spawn(move || sink.send(&LogEntry::new("c", "new")));
        assert_eq!(collector.wait_for_send_start(WAIT).as_deref(), Some("new"));

        collector.release();
        stalled.join().expect("sender thread").expect("accepted");
        assert_eq!(collector.payloads(), vec!["old", "new"]);
    }

    #[test]
    fn waiting_for_a_payload_skips_other_sends() {
        let collector = FakeCollector::new();
        let mut sink = collector.dialer().dial().expect("reachable");
        for payload in ["first", "second", "target"] {
            sink.send(&LogEntry::new("c", payload)).expect("accepted");
        }
        assert!(collector.wait_for_send_start_of("target", WAIT));
        assert!(!collector.wait_for_send_start_of("target", Duration::from_millis(20)));
    }
}
