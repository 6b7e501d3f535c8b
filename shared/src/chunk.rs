use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of board slots. The bank is not a slot.
pub const SLOT_COUNT: usize = 6;

/// Path segment the server uses for the bank destination.
pub const BANK_SEGMENT: &str = "bank";

/// Chunk identity. The label is the identity: chunk labels are unique within a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(String);

impl ChunkId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Element id used for the draggable element of a locally owned chunk.
    pub fn dom_id(&self) -> String {
        format!("chunk-{}", self.0)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner tag as it appears in snapshots, e.g. `w17`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerTag(String);

impl OwnerTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag the server assigns to the waiter with id `wid`.
    pub fn for_waiter(wid: u64) -> Self {
        Self(format!("w{wid}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a chunk can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Slot(usize),
    Bank,
}

impl Destination {
    pub fn slot(index: usize) -> Option<Self> {
        (index < SLOT_COUNT).then_some(Self::Slot(index))
    }

    /// Parses the `bank` / `0`..`5` path segment form.
    pub fn parse(segment: &str) -> Option<Self> {
        if segment == BANK_SEGMENT {
            return Some(Self::Bank);
        }
        segment.parse::<usize>().ok().and_then(Self::slot)
    }

    pub fn path_segment(self) -> String {
        match self {
            Self::Slot(index) => index.to_string(),
            Self::Bank => BANK_SEGMENT.to_string(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(index) => write!(f, "t{index}"),
            Self::Bank => f.write_str(BANK_SEGMENT),
        }
    }
}
