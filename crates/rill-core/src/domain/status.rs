//! Serializable status snapshots for observability.

use serde::{Deserialize, Serialize};

use super::ids::StreamId;
use super::state::{ReadableStateView, WritableStateView};

/// Point-in-time view of a readable core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadableStatus {
    pub stream_id: StreamId,
    pub state: ReadableStateView,
    pub flowing: bool,
    pub buffered: usize,
    pub end_pending: bool,
}

/// Point-in-time view of a writable core.
///
/// `accepted` counts admitted writes, `completed` counts resolved
/// completions, `failed` the subset that resolved with an error. The
/// difference between accepted and completed is work still queued or in
/// flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritableStatus {
    pub stream_id: StreamId,
    pub state: WritableStateView,
    pub queued: usize,
    pub draining: bool,
    pub accepted: u64,
    pub completed: u64,
    pub failed: u64,
}
