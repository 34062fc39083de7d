//! Readable core: data availability, exhaustion, destroy and close.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::domain::{
    Chunk, ReadableLifecycle, ReadableStatus, StreamError, StreamEvent, StreamId,
};

/// State behind the lock. Mutated only through the methods below, which
/// keep the lifecycle enum and the emission rules in one place.
struct ReadableInner {
    lifecycle: ReadableLifecycle,
    flowing: bool,
    end_pending: bool,
    buffer: VecDeque<Chunk>,
    subscribers: Vec<UnboundedSender<StreamEvent>>,
}

impl ReadableInner {
    fn emit(&mut self, event: StreamEvent) {
        // 切断された購読者はここで削除
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Emit `End`, then release the resource and emit `Close`.
    ///
    /// Only callable while `Idle` (the lifecycle predicate guards every
    /// caller), so a destroyed stream can never reach this path.
    fn finish_end(&mut self, id: StreamId) {
        self.lifecycle = ReadableLifecycle::Ended;
        self.emit(StreamEvent::End);
        debug!(stream = %id, "source exhausted, releasing");

        self.lifecycle = ReadableLifecycle::Closed { destroyed: false };
        self.emit(StreamEvent::Close);
    }
}

/// Readable stream core.
///
/// Cheap to clone; all clones share one state machine. Consumers observe
/// the stream through [`subscribe`](ReadableCore::subscribe), sources
/// feed it through [`push`](ReadableCore::push) and
/// [`push_end`](ReadableCore::push_end).
///
/// Ordering guarantees:
/// - `Close` is emitted exactly once per terminated stream, strictly
///   after any `End` and strictly after destroy processing.
/// - Once `destroy` ran, `End` is never emitted, even if the source
///   signals exhaustion afterwards.
/// - Events reach each subscriber in emission order.
#[derive(Clone)]
pub struct ReadableCore {
    id: StreamId,
    inner: Arc<Mutex<ReadableInner>>,
}

impl ReadableCore {
    pub fn new() -> Self {
        Self {
            id: StreamId::generate(),
            inner: Arc::new(Mutex::new(ReadableInner {
                lifecycle: ReadableLifecycle::Idle,
                flowing: false,
                end_pending: false,
                buffer: VecDeque::new(),
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Register a consumer. The receiver sees every event emitted after
    /// this call, in order. Subscribing to an already closed stream
    /// yields a receiver that never produces anything.
    pub fn subscribe(&self) -> UnboundedReceiver<StreamEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.locked().subscribers.push(tx);
        rx
    }

    /// Feed one chunk from the source.
    ///
    /// Returns `true` when the chunk was admitted (emitted or buffered).
    /// After exhaustion was signalled, or once the stream is destroyed or
    /// closed, the chunk is absorbed silently and `false` comes back; no
    /// event is emitted either way.
    pub fn push(&self, chunk: Chunk) -> bool {
        let mut inner = self.locked();
        if !inner.lifecycle.may_emit_end() || inner.end_pending {
            warn!(stream = %self.id, "push after termination absorbed");
            return false;
        }
        if inner.flowing {
            inner.emit(StreamEvent::Data(chunk));
        } else {
            inner.buffer.push_back(chunk);
        }
        true
    }

    /// Signal end of data from the source.
    ///
    /// Records the exhaustion; `End` (followed by `Close`) is emitted as
    /// soon as the stream is flowing with an empty buffer. A no-op once
    /// the stream is destroyed: the lifecycle gate permanently suppresses
    /// the exhaustion path.
    pub fn push_end(&self) {
        let mut inner = self.locked();
        if !inner.lifecycle.may_emit_end() {
            return;
        }
        inner.end_pending = true;
        if inner.flowing && inner.buffer.is_empty() {
            inner.finish_end(self.id);
        }
    }

    /// Begin or continue flowing: drain buffered chunks as `Data`
    /// events, then complete a pending exhaustion. A no-op once the
    /// stream is destroyed.
    pub fn resume(&self) {
        let mut inner = self.locked();
        if !inner.lifecycle.may_emit_end() {
            return;
        }
        inner.flowing = true;
        while let Some(chunk) = inner.buffer.pop_front() {
            inner.emit(StreamEvent::Data(chunk));
        }
        if inner.end_pending {
            inner.finish_end(self.id);
        }
    }

    /// Stop flowing. Subsequent pushes buffer until the next `resume`.
    pub fn pause(&self) {
        let mut inner = self.locked();
        if inner.lifecycle.may_emit_end() {
            inner.flowing = false;
        }
    }

    /// Tear the stream down without an error reason.
    pub fn destroy(&self) {
        self.teardown(None);
    }

    /// Tear the stream down, reporting `reason` to subscribers as an
    /// `Error` event before `Close`.
    pub fn destroy_with(&self, reason: StreamError) {
        self.teardown(Some(reason));
    }

    /// Did teardown (rather than natural exhaustion) terminate this
    /// stream?
    pub fn is_destroyed(&self) -> bool {
        self.locked().lifecycle.is_destroyed()
    }

    /// State snapshot for observability.
    pub fn status(&self) -> ReadableStatus {
        let inner = self.locked();
        ReadableStatus {
            stream_id: self.id,
            state: inner.lifecycle.into(),
            flowing: inner.flowing,
            buffered: inner.buffer.len(),
            end_pending: inner.end_pending,
        }
    }

    fn teardown(&self, reason: Option<StreamError>) {
        let mut inner = self.locked();
        if !inner.lifecycle.may_destroy() {
            // Repeat destroy, or destroy after natural close. One Close
            // total, so nothing more to emit.
            return;
        }
        inner.lifecycle = ReadableLifecycle::Destroyed;
        inner.flowing = false;
        inner.buffer.clear();
        debug!(stream = %self.id, "destroyed");

        if let Some(error) = reason {
            inner.emit(StreamEvent::Error(error));
        }
        inner.lifecycle = ReadableLifecycle::Closed { destroyed: true };
        inner.emit(StreamEvent::Close);
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, ReadableInner> {
        // The lock is never poisoned: no emit path panics.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ReadableCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn drained(rx: &mut UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn destroy_before_exhaustion_suppresses_end_forever() {
        // Scenario: destroy immediately, then the source reports "no
        // more data" late. End must never fire; Close fires once; the
        // late push is absorbed.
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.destroy();
        stream.push_end();
        stream.resume();

        assert_eq!(drained(&mut rx), vec![StreamEvent::Close]);

        assert!(!stream.push(Chunk::from("late")));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn natural_exhaustion_emits_end_then_close() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.resume();
        assert!(stream.push(Chunk::from("a")));
        assert!(stream.push(Chunk::from("b")));
        stream.push_end();

        assert_eq!(
            drained(&mut rx),
            vec![
                StreamEvent::Data(Chunk::from("a")),
                StreamEvent::Data(Chunk::from("b")),
                StreamEvent::End,
                StreamEvent::Close,
            ]
        );
    }

    #[test]
    fn paused_pushes_buffer_until_resume() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        assert!(stream.push(Chunk::from("x")));
        assert!(stream.push(Chunk::from("y")));
        stream.push_end();
        assert_eq!(drained(&mut rx), vec![]);
        assert_eq!(stream.status().buffered, 2);

        stream.resume();
        assert_eq!(
            drained(&mut rx),
            vec![
                StreamEvent::Data(Chunk::from("x")),
                StreamEvent::Data(Chunk::from("y")),
                StreamEvent::End,
                StreamEvent::Close,
            ]
        );
    }

    #[test]
    fn pause_interrupts_delivery() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.resume();
        stream.push(Chunk::from("first"));
        stream.pause();
        stream.push(Chunk::from("second"));

        assert_eq!(
            drained(&mut rx),
            vec![StreamEvent::Data(Chunk::from("first"))]
        );
        assert_eq!(stream.status().buffered, 1);
    }

    #[test]
    fn destroy_is_idempotent_one_close_total() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.destroy();
        stream.destroy();
        stream.destroy_with(StreamError::destroyed("again"));

        assert_eq!(drained(&mut rx), vec![StreamEvent::Close]);
    }

    #[test]
    fn destroy_with_reason_emits_error_before_close() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        let reason = StreamError::destroyed("upstream gone");
        stream.destroy_with(reason.clone());

        assert_eq!(
            drained(&mut rx),
            vec![StreamEvent::Error(reason), StreamEvent::Close]
        );
    }

    #[test]
    fn destroy_discards_buffered_data() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.push(Chunk::from("never seen"));
        stream.destroy();
        stream.resume();

        assert_eq!(drained(&mut rx), vec![StreamEvent::Close]);
        assert_eq!(stream.status().buffered, 0);
    }

    #[test]
    fn destroy_after_natural_close_is_a_no_op() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.resume();
        stream.push_end();
        stream.destroy();

        assert_eq!(
            drained(&mut rx),
            vec![StreamEvent::End, StreamEvent::Close]
        );
        assert!(!stream.is_destroyed());
    }

    #[test]
    fn push_after_end_signal_is_absorbed() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.push_end();
        assert!(!stream.push(Chunk::from("too late")));

        stream.resume();
        assert_eq!(drained(&mut rx), vec![StreamEvent::End, StreamEvent::Close]);
    }

    #[test]
    fn resume_after_destroy_does_not_reactivate() {
        let stream = ReadableCore::new();
        let mut rx = stream.subscribe();

        stream.destroy();
        stream.resume();
        assert!(!stream.status().flowing);
        assert_eq!(drained(&mut rx), vec![StreamEvent::Close]);
    }

    #[test]
    fn every_subscriber_sees_the_same_ordered_events() {
        let stream = ReadableCore::new();
        let mut rx1 = stream.subscribe();
        let mut rx2 = stream.subscribe();

        stream.resume();
        stream.push(Chunk::from("data"));
        stream.push_end();

        let expected = vec![
            StreamEvent::Data(Chunk::from("data")),
            StreamEvent::End,
            StreamEvent::Close,
        ];
        assert_eq!(drained(&mut rx1), expected);
        assert_eq!(drained(&mut rx2), expected);
    }

    #[test]
    fn status_reflects_lifecycle() {
        let stream = ReadableCore::new();
        assert_eq!(stream.status().state, crate::domain::ReadableStateView::Idle);

        stream.destroy();
        assert_eq!(
            stream.status().state,
            crate::domain::ReadableStateView::Closed
        );
    }
}
