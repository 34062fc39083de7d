//! Lifecycle state machines for the readable and writable cores.
//!
//! State transitions:
//! - Readable: Idle -> Ended -> Closed (natural exhaustion)
//! - Readable: Idle -> Destroyed -> Closed (explicit teardown, Ended skipped)
//! - Writable: Open -> Finished (drain and stop) / Open -> Destroyed
//!
//! Design note: Using one enum instead of independent booleans makes the
//! "destroy suppresses end" rule structural. `may_emit_end` is only true
//! in `Idle`, so once a stream is `Destroyed` there is no code path that
//! can reach the end emission, even if the source later signals
//! exhaustion.

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a readable core.
///
/// `Closed` remembers which path led there so `is_destroyed` stays true
/// after the final transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadableLifecycle {
    /// Accepting pushes; data may be buffered or flowing.
    Idle,

    /// End was emitted, resource release pending.
    Ended,

    /// Teardown requested, close pending.
    Destroyed,

    /// Terminal. No further transitions.
    Closed { destroyed: bool },
}

impl ReadableLifecycle {
    /// Is this the terminal state?
    pub fn is_terminal(self) -> bool {
        matches!(self, ReadableLifecycle::Closed { .. })
    }

    /// May the stream still emit `End`? Only before any termination began.
    pub fn may_emit_end(self) -> bool {
        matches!(self, ReadableLifecycle::Idle)
    }

    /// May `destroy` act? Repeat destroys and destroy-after-close are no-ops.
    pub fn may_destroy(self) -> bool {
        matches!(self, ReadableLifecycle::Idle)
    }

    /// Did teardown (rather than natural exhaustion) terminate the stream?
    pub fn is_destroyed(self) -> bool {
        matches!(
            self,
            ReadableLifecycle::Destroyed | ReadableLifecycle::Closed { destroyed: true }
        )
    }
}

/// Lifecycle phase of a writable core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritableLifecycle {
    /// Accepting writes.
    Open,

    /// No new writes; already admitted writes drain to completion.
    Finished,

    /// No new writes; queued writes fail immediately.
    Destroyed,
}

impl WritableLifecycle {
    /// May a new write be admitted?
    pub fn accepts_writes(self) -> bool {
        matches!(self, WritableLifecycle::Open)
    }
}

/// Serializable view of [`ReadableLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadableStateView {
    Idle,
    Ended,
    Destroyed,
    Closed,
}

impl From<ReadableLifecycle> for ReadableStateView {
    fn from(state: ReadableLifecycle) -> Self {
        match state {
            ReadableLifecycle::Idle => ReadableStateView::Idle,
            ReadableLifecycle::Ended => ReadableStateView::Ended,
            ReadableLifecycle::Destroyed => ReadableStateView::Destroyed,
            ReadableLifecycle::Closed { .. } => ReadableStateView::Closed,
        }
    }
}

/// Serializable view of [`WritableLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritableStateView {
    Open,
    Finished,
    Destroyed,
}

impl From<WritableLifecycle> for WritableStateView {
    fn from(state: WritableLifecycle) -> Self {
        match state {
            WritableLifecycle::Open => WritableStateView::Open,
            WritableLifecycle::Finished => WritableStateView::Finished,
            WritableLifecycle::Destroyed => WritableStateView::Destroyed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_is_only_reachable_from_idle() {
        assert!(ReadableLifecycle::Idle.may_emit_end());
        assert!(!ReadableLifecycle::Ended.may_emit_end());
        assert!(!ReadableLifecycle::Destroyed.may_emit_end());
        assert!(!ReadableLifecycle::Closed { destroyed: true }.may_emit_end());
        assert!(!ReadableLifecycle::Closed { destroyed: false }.may_emit_end());
    }

    #[test]
    fn destroy_acts_at_most_once() {
        assert!(ReadableLifecycle::Idle.may_destroy());
        assert!(!ReadableLifecycle::Destroyed.may_destroy());
        assert!(!ReadableLifecycle::Closed { destroyed: true }.may_destroy());
    }

    #[test]
    fn closed_remembers_the_destroy_path() {
        assert!(ReadableLifecycle::Closed { destroyed: true }.is_destroyed());
        assert!(!ReadableLifecycle::Closed { destroyed: false }.is_destroyed());
        assert!(ReadableLifecycle::Destroyed.is_destroyed());
    }

    #[test]
    fn only_closed_is_terminal() {
        assert!(ReadableLifecycle::Closed { destroyed: false }.is_terminal());
        assert!(!ReadableLifecycle::Idle.is_terminal());
        assert!(!ReadableLifecycle::Ended.is_terminal());
        assert!(!ReadableLifecycle::Destroyed.is_terminal());
    }

    #[test]
    fn writable_accepts_writes_only_while_open() {
        assert!(WritableLifecycle::Open.accepts_writes());
        assert!(!WritableLifecycle::Finished.accepts_writes());
        assert!(!WritableLifecycle::Destroyed.accepts_writes());
    }

    #[test]
    fn state_views_serialize_snake_case() {
        let view: ReadableStateView = ReadableLifecycle::Closed { destroyed: true }.into();
        assert_eq!(serde_json::to_string(&view).unwrap(), "\"closed\"");

        let view: WritableStateView = WritableLifecycle::Open.into();
        assert_eq!(serde_json::to_string(&view).unwrap(), "\"open\"");
    }
}
