//! End-to-end tests against a loopback scribe collector.

mod test_utils;

use std::time::Duration;

use femtoscribe::{
    FemtoLevel, HandlerBuildError, HandlerBuilderTrait, ScribeHandlerBuilder, scribe_emit,
    test_utils::ScribeTestServer,
};
use rstest::{fixture, rstest};

use test_utils::WAIT;

#[fixture]
fn server() -> ScribeTestServer {
    ScribeTestServer::start().expect("start scribe server")
}

#[rstest]
fn builder_handler_ships_in_order(server: ScribeTestServer) {
    let handler = ScribeHandlerBuilder::new()
        .with_tcp(server.addr().ip().to_string(), server.addr().port())
        .with_category("orders".into())
        .with_format("[{level}] {message} ({file}:{line})".into())
        .with_capacity(8)
        .build_inner()
        .expect("build handler");

    for (level, message) in [
        (FemtoLevel::Info, "e1"),
        (FemtoLevel::Warning, "e2"),
        (FemtoLevel::Critical, "e3"),
    ] {
        handler
            .emit(level, "src/orders.rs", 12, format_args!("{message}"))
            .expect("queued");
    }

    let received: Vec<_> = (0..3).filter_map(|_| server.recv(WAIT)).collect();
    assert_eq!(
        received,
        vec![
            ("orders.INFO".into(), "[INFO] e1 (orders.rs:12)".into()),
            ("orders.WARNING".into(), "[WARNING] e2 (orders.rs:12)".into()),
            ("orders.CRITICAL".into(), "[CRITICAL] e3 (orders.rs:12)".into()),
        ]
    );
    assert_eq!(server.connections(), 1);
}

#[rstest]
fn closing_handler_delivers_queued_records(server: ScribeTestServer) {
    let handler = ScribeHandlerBuilder::new()
        .with_address(server.address())
        .build_inner()
        .expect("build handler");
    for i in 0..10 {
        scribe_emit!(handler, FemtoLevel::Info, "queued {i}").expect("queued");
    }
    handler.close();
    assert!(handler.wait_closed(WAIT));

    let received: Vec<String> = std::iter::from_fn(|| server.recv(Duration::from_millis(200)))
        .map(|(category, _)| category)
        .collect();
    assert_eq!(received.len(), 10);
    assert!(received.iter().all(|c| c == "default.INFO"));
}

#[rstest]
fn dropping_handler_drains_queue(server: ScribeTestServer) {
    {
        let handler = ScribeHandlerBuilder::new()
            .with_address(server.address())
            .with_category("drop".into())
            .build_inner()
            .expect("build handler");
        scribe_emit!(handler, FemtoLevel::Error, "last words").expect("queued");
    }
    let (category, message) = server.recv(WAIT).expect("record delivered before drop returned");
    assert_eq!(category, "drop.ERROR");
    assert!(message.ends_with("last words"));
}

#[rstest]
fn invalid_builder_settings_fail_before_spawning() {
    let err = ScribeHandlerBuilder::new()
        .with_address("localhost")
        .build_inner()
        .expect_err("address without port");
    assert!(matches!(err, HandlerBuildError::InvalidConfig(msg) if msg.contains("host:port")));
}

#[cfg(unix)]
#[rstest]
fn unix_socket_collector_missing_is_contained() {
    let dir = std::env::temp_dir().join(format!("femtoscribe-{}", std::process::id()));
    let handler = ScribeHandlerBuilder::new()
        .with_unix_path(dir.join("absent.sock"))
        .with_connect_attempts(1)
        .build_inner()
        .expect("build handler");
    scribe_emit!(handler, FemtoLevel::Info, "nowhere").expect("submit still succeeds");
    assert!(handler.flush());
    assert_eq!(handler.stats().connect_failures, 1);
}
