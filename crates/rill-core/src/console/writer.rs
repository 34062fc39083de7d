//! The resilient writer: no sink failure ever surfaces synchronously.

use std::sync::Arc;

use tracing::trace;

use super::Level;
use crate::domain::{Encoding, WriterId};
use crate::ports::{Clock, DiagnosticSink, Formatter, SystemClock, WriteFailure};
use crate::stream::WritableCore;

/// Console-style writer over two writable cores.
///
/// Every logical output method formats its arguments, issues exactly one
/// write against the level's target, and returns. Whatever happens to
/// that write afterwards reaches the environment only through the
/// diagnostic sink:
///
/// - a refused write (finished or destroyed target) is reported before
///   the method returns, still without panicking;
/// - a failure reported by the sink arrives later, from the task that
///   observed the completion, after the method has long returned.
///
/// The writer holds references to its targets but does not own their
/// lifecycle; finishing or destroying a core is the embedder's call.
pub struct ConsoleWriter {
    id: WriterId,
    out: WritableCore,
    err: WritableCore,
    formatter: Arc<dyn Formatter>,
    diagnostics: Arc<dyn DiagnosticSink>,
    clock: Arc<dyn Clock>,
}

impl ConsoleWriter {
    /// Writer over separate out/err targets. Passing the same core for
    /// both multiplexes every level onto one sink.
    pub fn new(
        out: WritableCore,
        err: WritableCore,
        formatter: Arc<dyn Formatter>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            id: WriterId::generate(),
            out,
            err,
            formatter,
            diagnostics,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (tests pin diagnostic timestamps this way).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> WriterId {
        self.id
    }

    pub fn log(&self, args: &[&str]) {
        self.emit(Level::Log, args);
    }

    pub fn info(&self, args: &[&str]) {
        self.emit(Level::Info, args);
    }

    pub fn dir(&self, args: &[&str]) {
        self.emit(Level::Dir, args);
    }

    pub fn warn(&self, args: &[&str]) {
        self.emit(Level::Warn, args);
    }

    pub fn error(&self, args: &[&str]) {
        self.emit(Level::Error, args);
    }

    /// Format `args` and issue one write at `level`.
    ///
    /// Always returns normally. The completion is observed on a spawned
    /// task, so by the time a failure report fires this call has
    /// returned.
    pub fn emit(&self, level: Level, args: &[&str]) {
        let args: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        let chunk = self.formatter.format(level, &args);
        let target = if level.routes_to_err() {
            &self.err
        } else {
            &self.out
        };
        trace!(writer = %self.id, %level, bytes = chunk.len(), "emit");

        match target.write(chunk, Encoding::Utf8) {
            Ok(completion) => {
                let diagnostics = Arc::clone(&self.diagnostics);
                let clock = Arc::clone(&self.clock);
                let writer_id = self.id;
                tokio::spawn(async move {
                    if let Err(error) = completion.wait().await {
                        diagnostics.report(WriteFailure {
                            writer_id,
                            level,
                            error,
                            at: clock.now(),
                        });
                    }
                });
            }
            Err(error) => {
                self.diagnostics.report(WriteFailure {
                    writer_id: self.id,
                    level,
                    error,
                    at: self.clock.now(),
                });
            }
        }
    }
}
