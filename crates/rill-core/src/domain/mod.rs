//! Domain model (ids, chunks, lifecycle states, events, errors, status).

pub mod chunk;
pub mod errors;
pub mod events;
pub mod ids;
pub mod state;
pub mod status;

pub use chunk::{Chunk, Encoding};
pub use errors::StreamError;
pub use events::StreamEvent;
pub use ids::{StreamId, WriterId};
pub use state::{ReadableLifecycle, ReadableStateView, WritableLifecycle, WritableStateView};
pub use status::{ReadableStatus, WritableStatus};
