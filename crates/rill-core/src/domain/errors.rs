use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate error type.
///
/// `Clone + PartialEq` matter here: a sink failure travels from the sink,
/// through the drain task, into a write completion (and possibly a
/// diagnostic report), and callers assert it arrived unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StreamError {
    /// The stream was torn down explicitly, with the caller's reason.
    #[error("stream destroyed: {reason}")]
    Destroyed { reason: String },

    /// The sink reported a write failure. Scoped to that single write.
    #[error("sink write failed: {0}")]
    Sink(String),

    /// Write refused: the writable was finished.
    #[error("writable already finished")]
    Finished,

    /// The completion channel dropped before resolving. Only reachable
    /// when the runtime tears down mid-write.
    #[error("write completion lost")]
    CompletionLost,
}

impl StreamError {
    pub fn destroyed(reason: impl Into<String>) -> Self {
        StreamError::Destroyed {
            reason: reason.into(),
        }
    }

    pub fn sink(message: impl Into<String>) -> Self {
        StreamError::Sink(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_part() {
        let err = StreamError::destroyed("teardown requested");
        assert_eq!(err.to_string(), "stream destroyed: teardown requested");

        let err = StreamError::sink("disk full");
        assert_eq!(err.to_string(), "sink write failed: disk full");
    }

    #[test]
    fn errors_compare_by_value() {
        assert_eq!(StreamError::sink("x"), StreamError::sink("x"));
        assert_ne!(StreamError::sink("x"), StreamError::sink("y"));
        assert_ne!(StreamError::Finished, StreamError::CompletionLost);
    }

    #[test]
    fn errors_round_trip_through_serde() {
        let err = StreamError::destroyed("boom");
        let json = serde_json::to_string(&err).unwrap();
        let back: StreamError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
