//! Connection establishment with a bounded, fixed-delay retry budget.

use std::{io, sync::Arc, thread};

use log::debug;

use super::{
    config::RetryPolicy,
    error::ShipError,
    sink::{Dial, RemoteSink},
};

/// Dials the collector, retrying a fixed number of times.
///
/// Only the delivery loop calls [`Connector::connect`], so attempts for a
/// given shipper never overlap.
#[derive(Clone)]
pub struct Connector {
    dialer: Arc<dyn Dial>,
    policy: RetryPolicy,
}

impl Connector {
    pub fn new(dialer: impl Dial + 'static, policy: RetryPolicy) -> Self {
        Self::from_arc(Arc::new(dialer), policy)
    }

    pub fn from_arc(dialer: Arc<dyn Dial>, policy: RetryPolicy) -> Self {
        Self { dialer, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Description of the remote end used in diagnostics.
    pub fn describe(&self) -> String {
        self.dialer.describe()
    }

    /// Open a sink, sleeping `policy.delay` between failed attempts.
    ///
    /// Returns the first successful connection, or `ConnectFailed` carrying
    /// the last dial error once the budget is spent.
    pub fn connect(&self) -> Result<Box<dyn RemoteSink>, ShipError> {
        let attempts = self.policy.attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.dialer.dial() {
                Ok(sink) => return Ok(sink),
                Err(err) => {
                    debug!(
                        "FemtoScribeHandler dial attempt {attempt}/{attempts} to {} failed: {err}",
                        self.dialer.describe()
                    );
                    last_err = Some(err);
                }
            }
            if attempt < attempts {
                thread::sleep(self.policy.delay);
            }
        }
        Err(ShipError::ConnectFailed {
            attempts,
            source: last_err.unwrap_or_else(|| io::Error::other("no dial attempt made")),
        })
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("remote", &self.dialer.describe())
            .field("policy", &self.policy)
            .finish()
    }
}
