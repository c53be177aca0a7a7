//! Formatter trait and the shared trait object used by handlers.
//!
//! Handlers own a [`SharedFormatter`] so one formatter instance can be reused
//! across several handlers and threads. The stock implementation is a
//! [`FormatTemplate`], which renders the four record fields in any order.

use std::{fmt, sync::Arc};

use crate::log_record::FemtoLogRecord;

mod template;

pub use template::{DEFAULT_FORMAT, FormatTemplate, TemplateError};

/// Trait for formatting log records into strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared between the caller threads that invoke a handler.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &FemtoLogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn FemtoFormatter + Send + Sync>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: FemtoFormatter + Send + Sync + 'static,
    {
        let inner: Arc<dyn FemtoFormatter + Send + Sync> = Arc::new(formatter);
        Self { inner }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn FemtoFormatter + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &FemtoLogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn FemtoFormatter>)")
    }
}

/// Formatter rendering [`DEFAULT_FORMAT`].
#[derive(Copy, Clone, Debug)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        format!(
            "{} @ {}:{}: {}",
            record.level,
            record.file_name(),
            record.line,
            record.message
        )
    }
}

impl FemtoFormatter for FormatTemplate {
    fn format(&self, record: &FemtoLogRecord) -> String {
        self.render(record)
    }
}

impl<F> FemtoFormatter for F
where
    F: Fn(&FemtoLogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &FemtoLogRecord) -> String {
        self(record)
    }
}
