//! Console writer: logical output methods over writable cores.

mod writer;

pub use writer::ConsoleWriter;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical output level.
///
/// The level picks the target stream (`Warn`/`Error` go to the err
/// target, the rest to out) and travels with the diagnostic report when
/// a write fails. The isolation guarantee is level-agnostic: every
/// method behaves identically on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Log,
    Info,
    Dir,
    Warn,
    Error,
}

impl Level {
    /// Does this level route to the err target?
    pub fn routes_to_err(self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Info => "info",
            Level::Dir => "dir",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_and_error_route_to_err() {
        assert!(Level::Warn.routes_to_err());
        assert!(Level::Error.routes_to_err());
        assert!(!Level::Log.routes_to_err());
        assert!(!Level::Info.routes_to_err());
        assert!(!Level::Dir.routes_to_err());
    }

    #[test]
    fn level_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Level::Warn).unwrap(), "\"warn\"");
    }
}
