//! Writable core: FIFO write admission over a sink capability.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::domain::{Chunk, Encoding, StreamError, StreamId, WritableLifecycle, WritableStatus};
use crate::ports::Sink;

/// One admitted write waiting for the sink.
struct PendingWrite {
    chunk: Chunk,
    encoding: Encoding,
    done: oneshot::Sender<Result<(), StreamError>>,
}

struct WritableInner {
    lifecycle: WritableLifecycle,
    queue: VecDeque<PendingWrite>,
    draining: bool,
    accepted: u64,
    completed: u64,
    failed: u64,
}

struct WritableShared {
    id: StreamId,
    sink: Arc<dyn Sink>,
    state: Mutex<WritableInner>,
}

/// Handle to one admitted write. Resolves exactly once with the sink's
/// verbatim result: `Ok` in, `Ok` out; error in, the same error out.
#[derive(Debug)]
pub struct WriteCompletion {
    rx: oneshot::Receiver<Result<(), StreamError>>,
}

impl WriteCompletion {
    /// Wait for the completion. Resolution may land on a later
    /// scheduling turn than the write call; callers must not assume
    /// same-turn completion.
    pub async fn wait(self) -> Result<(), StreamError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(StreamError::CompletionLost),
        }
    }
}

/// Writable stream core.
///
/// Cheap to clone; all clones share one admission queue. Writes are
/// admitted FIFO and handed to the sink one at a time, so completions
/// resolve in admission order. A sink failure completes that one write
/// and nothing else: the lifecycle stays `Open` unless the caller also
/// finishes or destroys the core.
#[derive(Clone)]
pub struct WritableCore {
    inner: Arc<WritableShared>,
}

impl WritableCore {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Self {
            inner: Arc::new(WritableShared {
                id: StreamId::generate(),
                sink,
                state: Mutex::new(WritableInner {
                    lifecycle: WritableLifecycle::Open,
                    queue: VecDeque::new(),
                    draining: false,
                    accepted: 0,
                    completed: 0,
                    failed: 0,
                }),
            }),
        }
    }

    pub fn id(&self) -> StreamId {
        self.inner.id
    }

    /// Admit one unit of data.
    ///
    /// Refused with `Finished`/`Destroyed` after the corresponding call.
    /// Overlapping writes are admitted and serialized: the core keeps at
    /// most one write outstanding against the sink, so a caller that
    /// issues several writes before awaiting any completion still gets
    /// each resolved exactly once, in admission order.
    pub fn write(
        &self,
        chunk: Chunk,
        encoding: Encoding,
    ) -> Result<WriteCompletion, StreamError> {
        let (tx, rx) = oneshot::channel();
        let spawn_drain = {
            let mut inner = lock(&self.inner.state);
            match inner.lifecycle {
                WritableLifecycle::Open => {}
                WritableLifecycle::Finished => return Err(StreamError::Finished),
                WritableLifecycle::Destroyed => {
                    return Err(StreamError::destroyed("writable destroyed"));
                }
            }
            inner.queue.push_back(PendingWrite {
                chunk,
                encoding,
                done: tx,
            });
            inner.accepted += 1;
            trace!(stream = %self.inner.id, queued = inner.queue.len(), "write admitted");
            if inner.draining {
                false
            } else {
                inner.draining = true;
                true
            }
        };
        if spawn_drain {
            let shared = Arc::clone(&self.inner);
            tokio::spawn(async move { drain(shared).await });
        }
        Ok(WriteCompletion { rx })
    }

    /// Stop admitting writes; already admitted writes drain to
    /// completion.
    pub fn finish(&self) {
        let mut inner = lock(&self.inner.state);
        if inner.lifecycle == WritableLifecycle::Open {
            inner.lifecycle = WritableLifecycle::Finished;
            debug!(stream = %self.inner.id, "finished");
        }
    }

    /// Stop admitting writes and fail everything still queued.
    ///
    /// Queued writes that have not reached the sink complete with
    /// `Destroyed`; a write already in flight completes with whatever
    /// the sink reports. Every admitted write still resolves exactly
    /// once.
    pub fn destroy(&self) {
        let abandoned = {
            let mut inner = lock(&self.inner.state);
            if inner.lifecycle == WritableLifecycle::Destroyed {
                return;
            }
            inner.lifecycle = WritableLifecycle::Destroyed;
            let abandoned: Vec<PendingWrite> = inner.queue.drain(..).collect();
            inner.completed += abandoned.len() as u64;
            inner.failed += abandoned.len() as u64;
            debug!(stream = %self.inner.id, abandoned = abandoned.len(), "destroyed");
            abandoned
        };
        for write in abandoned {
            let _ = write
                .done
                .send(Err(StreamError::destroyed("writable destroyed")));
        }
    }

    /// State snapshot for observability.
    pub fn status(&self) -> WritableStatus {
        let inner = lock(&self.inner.state);
        WritableStatus {
            stream_id: self.inner.id,
            state: inner.lifecycle.into(),
            queued: inner.queue.len(),
            draining: inner.draining,
            accepted: inner.accepted,
            completed: inner.completed,
            failed: inner.failed,
        }
    }
}

/// Single consumer of the admission queue. At most one instance runs per
/// core, guarded by the `draining` flag, so at most one write is ever
/// outstanding against the sink.
async fn drain(shared: Arc<WritableShared>) {
    loop {
        // ロックを await を跨いで保持しない
        let next = {
            let mut inner = lock(&shared.state);
            match inner.queue.pop_front() {
                Some(write) => write,
                None => {
                    inner.draining = false;
                    break;
                }
            }
        };

        let result = shared.sink.accept(next.chunk, next.encoding).await;
        {
            let mut inner = lock(&shared.state);
            inner.completed += 1;
            if result.is_err() {
                inner.failed += 1;
            }
        }
        // Receiver may be gone (caller dropped the completion); the
        // write itself already happened, so nothing to undo.
        let _ = next.done.send(result);
    }
}

fn lock(state: &Mutex<WritableInner>) -> std::sync::MutexGuard<'_, WritableInner> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
