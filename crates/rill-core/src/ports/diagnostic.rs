//! Diagnostic port: the non-throwing escape hatch for deferred failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::console::Level;
use crate::domain::{StreamError, WriterId};

/// Record of one failed console write.
///
/// This is the only channel by which a write failure reaches the
/// writer's environment. By the time a report fires, the emit call that
/// caused it has long returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteFailure {
    pub writer_id: WriterId,
    pub level: Level,
    pub error: StreamError,
    pub at: DateTime<Utc>,
}

/// Receives [`WriteFailure`] reports.
///
/// Implementations must not panic: the report call runs on the task that
/// observed the completion, and an escaping panic there would defeat the
/// isolation the writer guarantees.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, failure: WriteFailure);
}
