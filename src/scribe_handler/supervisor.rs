//! Restart-on-panic wrapper for the delivery loop.
//!
//! Network failures are handled inside the loop. A panic means the loop
//! body itself is broken, so the supervisor logs it and starts a fresh loop
//! straight away. There is no backoff and no restart limit.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use log::error;

use super::stats::ShipperStats;

/// Run `body` until it returns normally, restarting it after every panic.
pub(super) fn supervise(stats: &ShipperStats, mut body: impl FnMut()) {
    loop {
        match panic::catch_unwind(AssertUnwindSafe(&mut body)) {
            Ok(()) => return,
            Err(payload) => {
                stats.record_restart();
                error!(
                    "FemtoScribeHandler delivery loop crashed: {}; restarting",
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn restarts_until_body_returns() {
        let stats = ShipperStats::default();
        let runs = Cell::new(0);
        supervise(&stats, || {
            runs.set(runs.get() + 1);
            if runs.get() < 3 {
                panic!("injected fault {}", runs.get());
            }
        });
        assert_eq!(runs.get(), 3);
        assert_eq!(stats.snapshot().restarts, 2);
    }

    #[test]
    fn clean_return_is_not_a_restart() {
        let stats = ShipperStats::default();
        supervise(&stats, || {});
        assert_eq!(stats.snapshot().restarts, 0);
    }

    #[test]
    fn extracts_panic_messages() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }
}
