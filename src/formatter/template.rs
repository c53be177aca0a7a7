//! Format templates with named or positional record fields.
//!
//! A template references `{level}`, `{file}`, `{line}` and `{message}` (or
//! `{0}`..`{3}` in that order) any number of times and in any order. Literal
//! braces are written `{{` and `}}`. Templates are parsed once when the
//! handler is built so rendering never fails.

use std::{fmt::Write as _, str::FromStr};

use thiserror::Error;

use crate::log_record::FemtoLogRecord;

/// Template used when none is configured.
pub const DEFAULT_FORMAT: &str = "{level} @ {file}:{line}: {message}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Level,
    File,
    Line,
    Message,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "level" | "0" => Some(Field::Level),
            "file" | "1" => Some(Field::File),
            "line" | "2" => Some(Field::Line),
            "message" | "3" => Some(Field::Message),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Errors raised while parsing a template.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template field `{{{0}}}`")]
    UnknownField(String),
    #[error("unclosed `{{` at byte {0}")]
    Unclosed(usize),
    #[error("unmatched `}}` at byte {0}")]
    Unmatched(usize),
}

/// Parsed format template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FormatTemplate {
    /// Parse `source` into a template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(idx));
                    }
                    let field = Field::from_name(name.trim())
                        .ok_or_else(|| TemplateError::UnknownField(name.clone()))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(TemplateError::Unmatched(idx)),
                _ => literal.push(ch),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    /// The template text this value was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render `record`. `{file}` renders the file name without directories.
    pub fn render(&self, record: &FemtoLogRecord) -> String {
        let mut out = String::with_capacity(self.source.len() + record.message.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Level) => out.push_str(record.level.as_str()),
                Segment::Field(Field::File) => out.push_str(record.file_name()),
                Segment::Field(Field::Line) => {
                    let _ = write!(out, "{}", record.line);
                }
                Segment::Field(Field::Message) => out.push_str(&record.message),
            }
        }
        out
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_FORMAT.to_owned(),
            segments: vec![
                Segment::Field(Field::Level),
                Segment::Literal(" @ ".into()),
                Segment::Field(Field::File),
                Segment::Literal(":".into()),
                Segment::Field(Field::Line),
                Segment::Literal(": ".into()),
                Segment::Field(Field::Message),
            ],
        }
    }
}

impl FromStr for FormatTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
