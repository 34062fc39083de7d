//! Diagnostic sink implementations.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::ports::{DiagnosticSink, WriteFailure};

/// Forwards every report to an unbounded channel.
///
/// The receiving side drains reports at its own pace; tests and the demo
/// binary use this to observe deferred failures without any shared
/// mutable state.
pub struct ChannelDiagnostic {
    tx: UnboundedSender<WriteFailure>,
}

impl ChannelDiagnostic {
    pub fn new() -> (Self, UnboundedReceiver<WriteFailure>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DiagnosticSink for ChannelDiagnostic {
    fn report(&self, failure: WriteFailure) {
        // Receiver gone means nobody is listening anymore; dropping the
        // report is the contract then.
        let _ = self.tx.send(failure);
    }
}

/// Logs the failure and drops it.
#[derive(Debug, Default)]
pub struct NullDiagnostic;

impl DiagnosticSink for NullDiagnostic {
    fn report(&self, failure: WriteFailure) {
        warn!(
            writer = %failure.writer_id,
            level = ?failure.level,
            error = %failure.error,
            "console write failed"
        );
    }
}
