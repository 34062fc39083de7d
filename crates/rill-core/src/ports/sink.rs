//! Sink port: where a writable core forwards accepted writes.

use async_trait::async_trait;

use crate::domain::{Chunk, Encoding, StreamError};

/// Downstream write target of a [`WritableCore`](crate::stream::WritableCore).
///
/// The core invokes `accept` at most once per admitted write, and
/// resolving the returned future is the exactly-once completion for that
/// write. Implementations are free to resolve on a later scheduling turn
/// to model real I/O latency; callers must not assume same-turn
/// completion.
///
/// A failed accept reports the failure through the `Err` value and
/// nothing else: no panic, and no effect on other writes.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn accept(&self, chunk: Chunk, encoding: Encoding) -> Result<(), StreamError>;
}
