//! In-memory sink for development and tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Chunk, Encoding, StreamError};
use crate::ports::Sink;

struct MemorySinkState {
    accepted: Vec<(Chunk, Encoding)>,
    fail_with: Option<StreamError>,
}

/// Records accepted writes; optionally fails every accept with a fixed
/// error.
///
/// Always yields one scheduler turn before resolving, so completion
/// lands on a later turn than the write that caused it. Tests that
/// assert "nothing fired during the call itself" rely on that.
pub struct MemorySink {
    state: Mutex<MemorySinkState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemorySinkState {
                accepted: Vec::new(),
                fail_with: None,
            }),
        }
    }

    /// A sink whose every accept resolves with `error`.
    pub fn failing(error: StreamError) -> Self {
        Self {
            state: Mutex::new(MemorySinkState {
                accepted: Vec::new(),
                fail_with: Some(error),
            }),
        }
    }

    /// Chunks accepted so far, in arrival order.
    pub fn accepted(&self) -> Vec<Chunk> {
        self.locked()
            .accepted
            .iter()
            .map(|(chunk, _)| chunk.clone())
            .collect()
    }

    /// Accepted chunks with their encoding tags.
    pub fn accepted_with_encoding(&self) -> Vec<(Chunk, Encoding)> {
        self.locked().accepted.clone()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, MemorySinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn accept(&self, chunk: Chunk, encoding: Encoding) -> Result<(), StreamError> {
        // 完了は必ず次のターンに回す
        tokio::task::yield_now().await;

        let mut state = self.locked();
        if let Some(error) = state.fail_with.clone() {
            return Err(error);
        }
        state.accepted.push((chunk, encoding));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_accepts_in_order() {
        let sink = MemorySink::new();
        sink.accept(Chunk::from("a"), Encoding::Utf8).await.unwrap();
        sink.accept(Chunk::from("b"), Encoding::Binary).await.unwrap();

        assert_eq!(sink.accepted(), vec![Chunk::from("a"), Chunk::from("b")]);
        assert_eq!(
            sink.accepted_with_encoding()[1],
            (Chunk::from("b"), Encoding::Binary)
        );
    }

    #[tokio::test]
    async fn failing_sink_reports_the_configured_error_and_records_nothing() {
        let error = StreamError::sink("broken pipe");
        let sink = MemorySink::failing(error.clone());

        let got = sink
            .accept(Chunk::from("x"), Encoding::Utf8)
            .await
            .unwrap_err();
        assert_eq!(got, error);
        assert!(sink.accepted().is_empty());
    }
}
