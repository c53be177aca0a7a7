//! Framed MessagePack codec for the scribe `Log` call.
//!
//! A request carries a batch of `(category, message)` pairs and the collector
//! answers every request with a single result code. Both directions use a
//! four byte big-endian length prefix.

use std::io::{self, Read, Write};

use rmp_serde::Serializer;
use serde::{Deserialize, Serialize};

use crate::log_record::LogEntry;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireEntry<'a> {
    #[serde(borrow)]
    pub category: std::borrow::Cow<'a, str>,
    #[serde(borrow)]
    pub message: std::borrow::Cow<'a, str>,
}

impl<'a> From<&'a LogEntry> for WireEntry<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            category: entry.category().into(),
            message: entry.payload().into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogRequest<'a> {
    #[serde(borrow)]
    pub messages: Vec<WireEntry<'a>>,
}

/// Result code returned by the collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "TRY_LATER")]
    TryLater,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogReply {
    pub result: ResultCode,
}

fn encode<T: Serialize>(value: &T) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    value
        .serialize(&mut Serializer::new(&mut buf).with_struct_map())
        .map_err(io::Error::other)?;
    Ok(buf)
}

/// Serialise a batch of entries into a `Log` request payload.
pub fn serialise_request(entries: &[&LogEntry]) -> io::Result<Vec<u8>> {
    encode(&LogRequest {
        messages: entries.iter().map(|e| WireEntry::from(*e)).collect(),
    })
}

/// Serialise a reply payload.
pub fn serialise_reply(result: ResultCode) -> io::Result<Vec<u8>> {
    encode(&LogReply { result })
}

/// Frame the payload with a big-endian length prefix.
pub fn frame_payload(payload: &[u8], max_size: usize) -> Option<Vec<u8>> {
    if payload.len() > max_size {
        return None;
    }
    let len = u32::try_from(payload.len()).ok()?;
    let capacity = payload.len().checked_add(4)?;
    let mut framed = Vec::with_capacity(capacity);
    framed.extend(len.to_be_bytes());
    framed.extend_from_slice(payload);
    Some(framed)
}

/// Read one length-prefixed frame, rejecting frames above `max_size`.
pub fn read_frame(reader: &mut impl Read, max_size: usize) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds limit of {max_size}"),
        ));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Write a frame and flush the writer.
pub fn write_frame(writer: &mut impl Write, frame: &[u8]) -> io::Result<()> {
    writer.write_all(frame)?;
    writer.flush()
}

/// Decode a reply payload.
pub fn decode_reply(payload: &[u8]) -> io::Result<ResultCode> {
    rmp_serde::from_slice::<LogReply>(payload)
        .map(|reply| reply.result)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}
