//! Stream cores: the readable and writable lifecycle engines.

mod readable;
mod writable;

pub use readable::ReadableCore;
pub use writable::{WritableCore, WriteCompletion};
