//! Delivery failures are reported through the `log` facade.

mod test_utils;

use std::time::Duration;

use femtoscribe::{
    FemtoLevel, FemtoScribeHandler, HandlerError, RetryPolicy, SharedFormatter, ShipperConfig,
    scribe_emit, test_utils::FakeCollector,
};
use logtest::Logger;
use serial_test::serial;

use test_utils::WAIT;

fn drain_warnings(logger: &mut Logger) -> Vec<String> {
    std::iter::from_fn(|| logger.pop())
        .filter(|record| record.level() <= log::Level::Warn)
        .map(|record| record.args().to_owned())
        .collect()
}

#[test]
#[serial]
fn failures_are_logged_not_raised() {
    let mut logger = Logger::start();
    let collector = FakeCollector::new();
    collector.set_reachable(false);
    let handler = FemtoScribeHandler::with_dialer(
        collector.dialer(),
        "diag",
        SharedFormatter::default(),
        RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(1),
        },
        ShipperConfig {
            warn_interval: Duration::ZERO,
            ..ShipperConfig::default().with_capacity(1)
        },
    )
    .expect("build handler");

    // Connection failures stay inside the handler.
    scribe_emit!(handler, FemtoLevel::Info, "unreachable").expect("queued");
    assert!(handler.flush());
    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("error connecting to fake-collector")
                && w.contains("after 2 attempt(s)")),
        "{warnings:?}"
    );

    // Send failures drop the connection and are logged too.
    collector.set_reachable(true);
    collector.fail_next_sends(1);
    scribe_emit!(handler, FemtoLevel::Info, "broken pipe").expect("queued");
    assert!(handler.flush());
    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("lost connection to fake-collector")),
        "{warnings:?}"
    );

    // A full queue surfaces to the caller and as a drop summary.
    collector.stall();
    scribe_emit!(handler, FemtoLevel::Info, "in flight").expect("queued");
    assert!(collector.wait_for_send_start_of("in flight", WAIT));
    scribe_emit!(handler, FemtoLevel::Info, "waiting").expect("queued");
    assert_eq!(
        scribe_emit!(handler, FemtoLevel::Info, "shed"),
        Err(HandlerError::QueueFull)
    );
    let warnings = drain_warnings(&mut logger);
    assert!(
        warnings.iter().any(|w| w.contains("queue full; dropped 1 records")),
        "{warnings:?}"
    );
    collector.release();
    assert!(handler.flush());

    // Loop crashes are logged at error level and the loop keeps going.
    collector.panic_on("INFO @ diagnostics_tests.rs:1: crash");
    handler
        .emit(FemtoLevel::Info, "diagnostics_tests.rs", 1, format_args!("crash"))
        .expect("queued");
    assert!(handler.flush());
    scribe_emit!(handler, FemtoLevel::Info, "recovered").expect("queued");
    assert!(handler.flush());
    let errors: Vec<String> = std::iter::from_fn(|| logger.pop())
        .filter(|record| record.level() == log::Level::Error)
        .map(|record| record.args().to_owned())
        .collect();
    assert!(
        errors
            .iter()
            .any(|e| e.contains("delivery loop crashed") && e.contains("injected fault")),
        "{errors:?}"
    );
    assert!(collector.payloads().last().is_some_and(|p| p.ends_with("recovered")));
}
