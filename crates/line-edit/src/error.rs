//! Errors a line read can end with.
//!
//! Boundary conditions (cursor at an edge, full buffer, empty history) are
//! not errors: the editor ignores the key. Only the conditions below end a
//! read without a committed line.

use std::io;

/// Why [`LineEditor::read_line`](crate::LineEditor::read_line) returned
/// without a line.
#[derive(Debug, thiserror::Error)]
pub enum ReadLineError {
    /// The configured capacity cannot hold even one character plus the
    /// terminator. Reported before any console I/O.
    #[error("line buffer too small: at least {required} characters are required")]
    BufferTooSmall { required: usize },

    /// Storage for the edit session could not be allocated.
    #[error("out of memory while allocating the line buffer")]
    OutOfMemory,

    /// The console failed, or input was interrupted or ended.
    #[error(transparent)]
    Console(#[from] io::Error),
}

impl ReadLineError {
    /// True when the console reported Ctrl-C (or another interrupt).
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Console(e) if e.kind() == io::ErrorKind::Interrupted)
    }

    /// True when the input source is exhausted.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Console(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}
