//! Handlers are shared across producer threads.

use femtoscribe::{
    Connector, FemtoScribeHandler, ScribeHandlerBuilder, SharedFormatter, Shipper,
};
use static_assertions::assert_impl_all;

assert_impl_all!(FemtoScribeHandler: Send, Sync);
assert_impl_all!(Shipper: Send, Sync);
assert_impl_all!(Connector: Send, Sync);
assert_impl_all!(SharedFormatter: Send, Sync, Clone);
assert_impl_all!(ScribeHandlerBuilder: Send, Sync, Clone);
