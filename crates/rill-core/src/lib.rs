//! rill-core
//!
//! Core building blocks for the rill stream runtime: a readable/writable
//! lifecycle engine with explicit destroy semantics, and a console-style
//! writer that never lets an asynchronous sink failure become a
//! synchronous panic at the call site.
//!
//! # Module map
//! - **domain**: ids, chunks, lifecycle state machines, events, errors,
//!   status views
//! - **ports**: capability seams (Sink, Formatter, DiagnosticSink, Clock)
//! - **stream**: ReadableCore and WritableCore
//! - **console**: ConsoleWriter and Level
//! - **impls**: in-memory implementations for development and tests
//!
//! # Guarantees, in one place
//! - A readable emits `Close` exactly once per termination, strictly
//!   after any `End`, and never emits `End` once destroyed.
//! - A writable resolves every admitted write exactly once, in admission
//!   order, with the sink's verbatim result.
//! - A console method call returns normally no matter what the sink does
//!   later; failures surface only through the diagnostic port.

pub mod console;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod stream;

pub use console::{ConsoleWriter, Level};
pub use domain::{Chunk, Encoding, StreamError, StreamEvent};
pub use stream::{ReadableCore, WritableCore, WriteCompletion};
