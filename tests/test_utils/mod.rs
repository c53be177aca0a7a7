//! Shared fixtures for the integration tests.

use std::time::Duration;

use femtoscribe::{
    FemtoScribeHandler, RetryPolicy, SharedFormatter, ShipperConfig, test_utils::FakeCollector,
};
use rstest::fixture;

pub const WAIT: Duration = Duration::from_secs(2);

#[fixture]
pub fn collector() -> FakeCollector {
    FakeCollector::new()
}

/// Handler over `collector` with a quick retry policy.
#[allow(dead_code)]
pub fn handler_for(collector: &FakeCollector, capacity: usize) -> FemtoScribeHandler {
    FemtoScribeHandler::with_dialer(
        collector.dialer(),
        "it",
        SharedFormatter::default(),
        RetryPolicy {
            attempts: 2,
            delay: Duration::from_millis(1),
        },
        ShipperConfig::default().with_capacity(capacity),
    )
    .expect("build handler")
}
