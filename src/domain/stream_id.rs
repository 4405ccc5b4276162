use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque job identifier supplied by the caller.
///
/// Used verbatim as the first segment of every object-store key and as a
/// file-name stem, so it must be a single, non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StreamId(String);

impl StreamId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidStreamId> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidStreamId::Empty);
        }
        if trimmed == "." || trimmed == ".." {
            return Err(InvalidStreamId::NotASegment(raw));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(InvalidStreamId::NotASegment(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StreamId {
    type Error = InvalidStreamId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StreamId> for String {
    fn from(id: StreamId) -> Self {
        id.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidStreamId {
    #[error("stream id is empty")]
    Empty,
    #[error("stream id must be a single path segment of [A-Za-z0-9._-]: {0:?}")]
    NotASegment(String),
}
