use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkId, Destination, OwnerTag};
use crate::wait::Cursor;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NO_CONTENT: u16 = 204;
/// The session cookie is gone; the waiter must stop.
pub const STATUS_SESSION_EXPIRED: u16 = 401;

pub fn wait_url(base: &str, wid: u64, cursor: Cursor) -> String {
    format!("{}/{wid}/{cursor}", base.trim_end_matches('/'))
}

pub fn place_url(base: &str, chunk: &ChunkId, owner: &OwnerTag, destination: Destination) -> String {
    format!(
        "{}/{}/{}/{}",
        base.trim_end_matches('/'),
        chunk.label(),
        owner,
        destination.path_segment()
    )
}

/// JSON body of an answer submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub answer: String,
    pub who: String,
}
