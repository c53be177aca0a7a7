//! Record and entry types flowing through the handler.
//!
//! A [`FemtoLogRecord`] is what the logging front end hands to a handler: the
//! level, the call site and the already-rendered message. The handler turns
//! it into a [`LogEntry`], the immutable `(category, payload)` pair that is
//! queued and shipped to the collector.

use std::fmt;

use crate::level::FemtoLevel;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FemtoLogRecord {
    pub level: FemtoLevel,
    /// Source file of the log call, usually the output of `file!()`.
    pub file: String,
    pub line: u32,
    /// The message with the caller's arguments already substituted.
    pub message: String,
}

impl FemtoLogRecord {
    /// Construct a record from its parts.
    pub fn new(level: FemtoLevel, file: &str, line: u32, message: &str) -> Self {
        Self {
            level,
            file: file.to_owned(),
            line,
            message: message.to_owned(),
        }
    }

    /// Construct a record, rendering `args` into the message.
    pub fn from_args(level: FemtoLevel, file: &str, line: u32, args: fmt::Arguments<'_>) -> Self {
        let message = match args.as_str() {
            Some(literal) => literal.to_owned(),
            None => args.to_string(),
        };
        Self {
            level,
            file: file.to_owned(),
            line,
            message,
        }
    }

    /// File name without leading directories.
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

/// A formatted message addressed to a collector category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    category: String,
    payload: String,
}

impl LogEntry {
    pub fn new(category: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            payload: payload.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Consume the entry, returning `(category, payload)`.
    pub fn into_parts(self) -> (String, String) {
        (self.category, self.payload)
    }
}
