use std::fmt;

use serde_json::Value;

use crate::events::{KNOWN_METHODS, Message};

/// Position in the server's message stream.
pub type Cursor = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct WaitEntry {
    pub cursor: Cursor,
    pub message: Message,
}

/// A wait response the client cannot interpret. Never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownMethod(String),
    Malformed(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod(method) => write!(f, "unknown method {method:?}"),
            Self::Malformed(reason) => write!(f, "malformed message: {reason}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// The body is not a `[[cursor, message], ...]` array at all: truncated, or an error
    /// page from something between us and the server.
    Unreadable(String),
    Protocol(ProtocolError),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(reason) => write!(f, "unreadable batch: {reason}"),
            Self::Protocol(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl std::error::Error for BatchError {}

impl From<ProtocolError> for BatchError {
    fn from(error: ProtocolError) -> Self {
        Self::Protocol(error)
    }
}

/// Decode a whole `[[cursor, message], ...]` batch. Nothing is returned unless every
/// entry decodes, so a bad entry never leaves a batch half applied.
pub fn decode_batch(body: &str) -> Result<Vec<WaitEntry>, BatchError> {
    let raw: Vec<(Cursor, Value)> =
        serde_json::from_str(body).map_err(|e| BatchError::Unreadable(e.to_string()))?;
    let entries = raw
        .into_iter()
        .map(|(cursor, value)| decode_message(value).map(|message| WaitEntry { cursor, message }))
        .collect::<Result<_, _>>()?;
    Ok(entries)
}

pub fn decode_message(value: Value) -> Result<Message, ProtocolError> {
    let Some(method) = value.get("method").and_then(Value::as_str) else {
        return Err(ProtocolError::Malformed("missing method".to_string()));
    };
    if !KNOWN_METHODS.contains(&method) {
        return Err(ProtocolError::UnknownMethod(method.to_string()));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
