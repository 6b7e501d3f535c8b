use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkId, OwnerTag, SLOT_COUNT};

/// Server-pushed message, tagged by `method` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Message {
    AddChat {
        text: String,
    },
    ShowMessage {
        text: String,
    },
    ShowClue {
        clue: String,
    },
    ShowAnswer {
        answer: String,
    },
    VennState(VennState),
    VennComplete {
        targets: [String; SLOT_COUNT],
    },
    CenterComplete {
        targets: [String; SLOT_COUNT],
        answer: String,
    },
}

/// Every method name the client understands.
pub const KNOWN_METHODS: [&str; 7] = [
    "add_chat",
    "show_message",
    "show_clue",
    "show_answer",
    "venn_state",
    "venn_complete",
    "center_complete",
];

impl Message {
    pub fn method(&self) -> &'static str {
        match self {
            Self::AddChat { .. } => "add_chat",
            Self::ShowMessage { .. } => "show_message",
            Self::ShowClue { .. } => "show_clue",
            Self::ShowAnswer { .. } => "show_answer",
            Self::VennState(_) => "venn_state",
            Self::VennComplete { .. } => "venn_complete",
            Self::CenterComplete { .. } => "center_complete",
        }
    }
}

/// One `[chunk, owner]` entry of a slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement(pub ChunkId, pub OwnerTag);

impl Placement {
    pub fn chunk(&self) -> &ChunkId {
        &self.0
    }

    pub fn owner(&self) -> &OwnerTag {
        &self.1
    }
}

/// Authoritative board snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VennState {
    /// Chunk inventory per player.
    pub chunks: HashMap<OwnerTag, Vec<ChunkId>>,
    /// Ordered contents of each slot.
    pub targets: [Vec<Placement>; SLOT_COUNT],
    /// Clue answers, in clue order.
    pub words: Vec<String>,
}

impl VennState {
    pub fn inventory(&self, owner: &OwnerTag) -> Option<&[ChunkId]> {
        self.chunks.get(owner).map(Vec::as_slice)
    }

    /// Slot holding `chunk` for `owner`, if any.
    pub fn slot_of(&self, chunk: &ChunkId, owner: &OwnerTag) -> Option<usize> {
        self.targets.iter().position(|slot| {
            slot.iter()
                .any(|placement| placement.chunk() == chunk && placement.owner() == owner)
        })
    }
}
