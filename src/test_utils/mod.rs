//! Test doubles for the delivery pipeline.
//!
//! Available to unit tests and, through the `test-util` feature, to the
//! integration tests under `tests/`.

pub mod fake_collector;
pub mod scribe_server;

pub use fake_collector::{FakeCollector, FakeDialer};
pub use scribe_server::ScribeTestServer;
