//! Strongly-typed stream identifiers.
//!
//! Ids exist for correlation only: every core and writer gets one at
//! construction and carries it through tracing spans and diagnostic
//! reports. ULID keeps them sortable by creation time, which is all the
//! log tooling needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait tying an [`Id`] to the kind of thing it names.
///
/// The prefix shows up in Display output ("stream-", "writer-") so a log
/// line identifies its subject without extra context.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic id over a phantom marker type.
///
/// `StreamId` and `WriterId` share this implementation but cannot be
/// mixed up at compile time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// Mint a fresh id.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Marker for stream cores (readable or writable side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stream {}

impl IdMarker for Stream {
    fn prefix() -> &'static str {
        "stream-"
    }
}

/// Marker for console writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Writer {}

impl IdMarker for Writer {
    fn prefix() -> &'static str {
        "writer-"
    }
}

/// Identifier of a stream core.
pub type StreamId = Id<Stream>;

/// Identifier of a console writer.
pub type WriterId = Id<Writer>;
