//! Stream events as observed by subscribers.

use super::chunk::Chunk;
use super::errors::StreamError;

/// One event on a readable stream, delivered to subscribers in emission
/// order.
///
/// For any stream that terminates, a subscriber observes at most one
/// `End`, at most one `Error`, and exactly one `Close`. The cores enforce
/// this through [`ReadableLifecycle`](super::state::ReadableLifecycle);
/// the event type itself carries no ordering logic.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk of data reached a flowing consumer.
    Data(Chunk),

    /// The source was exhausted normally.
    End,

    /// The stream was destroyed with a reason.
    Error(StreamError),

    /// The underlying resource was released. Always the last event.
    Close,
}
