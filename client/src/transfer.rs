use hatvenn_shared::endpoints::place_url;
use hatvenn_shared::{ChunkId, Destination, OwnerTag};

/// Tracks the chunk being dragged. At most one drag is tracked; a new drag start
/// replaces whatever was left over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferCoordinator {
    pending: Option<ChunkId>,
}

impl TransferCoordinator {
    pub fn begin(&mut self, chunk: ChunkId) {
        self.pending = Some(chunk);
    }

    /// Drag ended without a drop on a valid target.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&ChunkId> {
        self.pending.as_ref()
    }

    pub fn take(&mut self) -> Option<ChunkId> {
        self.pending.take()
    }
}

/// A placement the server still has to accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRequest {
    pub chunk: ChunkId,
    pub owner: OwnerTag,
    pub destination: Destination,
}

impl PlaceRequest {
    pub fn url(&self, base: &str) -> String {
        place_url(base, &self.chunk, &self.owner, self.destination)
    }
}
