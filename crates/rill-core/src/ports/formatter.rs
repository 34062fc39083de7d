//! Formatter port: renders logical output arguments into a chunk.

use crate::domain::Chunk;
use crate::console::Level;

/// Pure, synchronous rendering of console arguments.
///
/// The writer calls this exactly once per emit, before touching the
/// target stream. Implementations must not perform I/O.
pub trait Formatter: Send + Sync {
    fn format(&self, level: Level, args: &[String]) -> Chunk;
}

/// Default formatter: arguments joined with spaces, newline-terminated.
///
/// Deliberately minimal. Inspect-style rendering of structured values is
/// a separate concern layered on top, not part of the stream core.
#[derive(Debug, Default)]
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, _level: Level, args: &[String]) -> Chunk {
        let mut line = args.join(" ");
        line.push('\n');
        Chunk::from(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_args_with_spaces_and_terminates_the_line() {
        let chunk = LineFormatter.format(Level::Log, &["a".into(), "b".into(), "c".into()]);
        assert_eq!(chunk.as_bytes(), b"a b c\n");
    }

    #[test]
    fn empty_args_render_a_bare_newline() {
        let chunk = LineFormatter.format(Level::Warn, &[]);
        assert_eq!(chunk.as_bytes(), b"\n");
    }
}
