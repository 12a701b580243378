//! The line editor context.
//!
//! [`LineEditor`] holds everything that outlives a single read: history,
//! the insert/overwrite flag, options and the completion provider. Build
//! one at startup and keep it; every `read_line` call starts a fresh
//! [`Session`] against it. All reads take `&mut self`, so a nested read
//! while one is in progress cannot be expressed.

use std::fmt;

use grid_term::Console;

use crate::complete::{Complete, NoCompletion};
use crate::cursor::{Grid, GridPos};
use crate::error::ReadLineError;
use crate::history::History;
use crate::mode::EditMode;
use crate::options::{EditorOptions, MIN_CAPACITY, OptionError, parse_set};
use crate::session::Session;

pub struct LineEditor {
    history: History,
    mode: EditMode,
    options: EditorOptions,
    completer: Box<dyn Complete>,
}

impl fmt::Debug for LineEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEditor")
            .field("history", &self.history.len())
            .field("mode", &self.mode)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl LineEditor {
    #[must_use]
    pub fn new(options: EditorOptions) -> Self {
        Self {
            history: History::new(),
            mode: EditMode::from_insert(options.insert_mode),
            options,
            completer: Box::new(NoCompletion),
        }
    }

    /// Use `completer` for Tab.
    #[must_use]
    pub fn with_completer(mut self, completer: impl Complete + 'static) -> Self {
        self.completer = Box::new(completer);
        self
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Append a committed line to the history. Reads never do this
    /// themselves.
    pub fn add_history(&mut self, line: &str) {
        self.history.append(line);
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    /// Current options, with `insert_mode` reflecting the live mode flag.
    #[must_use]
    pub fn options(&self) -> EditorOptions {
        EditorOptions {
            insert_mode: self.mode.is_insert(),
            ..self.options
        }
    }

    /// Apply `:set` arguments. Returns the messages queries produced.
    ///
    /// Directives before a failing one stay applied.
    ///
    /// # Errors
    ///
    /// The first [`OptionError`] encountered.
    pub fn set_options(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let mut options = self.options();
        let mut messages = Vec::new();
        let mut outcome = Ok(());
        for directive in parse_set(args) {
            match options.apply(&directive) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.options = options;
        self.mode = EditMode::from_insert(options.insert_mode);
        outcome.map(|()| messages)
    }

    /// Read one line starting at `start`.
    ///
    /// # Errors
    ///
    /// [`ReadLineError::BufferTooSmall`] before any console I/O when the
    /// capacity is below two characters, [`ReadLineError::OutOfMemory`]
    /// when the line buffer cannot be allocated, and
    /// [`ReadLineError::Console`] for console failures, interrupts and end
    /// of input.
    pub fn read_line<C: Console + ?Sized>(
        &mut self,
        console: &mut C,
        start: GridPos,
    ) -> Result<String, ReadLineError> {
        let grid = Grid::from(console.grid_size());
        let start = GridPos::new(
            start.col.min(grid.cols() - 1),
            start.row.min(grid.last_row()),
        );
        let limit = line_limit(self.options.capacity, grid, start.col)?;
        tracing::debug!(%start, limit, mode = %self.mode, "reading line");

        let mut session = Session::new(
            grid,
            start,
            limit,
            self.mode,
            &self.history,
            self.completer.as_ref(),
        )?;
        let result = session.run(console);
        self.mode = session.mode();
        result
    }

    /// Read one line starting wherever the console cursor is.
    ///
    /// # Errors
    ///
    /// As [`read_line`](Self::read_line).
    pub fn read_line_here<C: Console + ?Sized>(
        &mut self,
        console: &mut C,
    ) -> Result<String, ReadLineError> {
        if self.options.capacity < MIN_CAPACITY {
            return Err(ReadLineError::BufferTooSmall {
                required: MIN_CAPACITY,
            });
        }
        let at = console.cursor_position()?;
        self.read_line(console, at.into())
    }

    /// Write `prompt`, then read one line after it.
    ///
    /// # Errors
    ///
    /// As [`read_line`](Self::read_line).
    pub fn readline<C: Console + ?Sized>(
        &mut self,
        console: &mut C,
        prompt: &str,
    ) -> Result<String, ReadLineError> {
        if self.options.capacity < MIN_CAPACITY {
            return Err(ReadLineError::BufferTooSmall {
                required: MIN_CAPACITY,
            });
        }
        console.write_text(prompt)?;
        self.read_line_here(console)
    }
}

/// Characters a line may hold on `grid` when it starts at `start_col`.
///
/// The line may use every row but the last, minus the columns before
/// `start_col`, and never more than `capacity`. One slot of that is kept
/// for the terminator of a fixed-size caller buffer.
///
/// # Errors
///
/// [`ReadLineError::BufferTooSmall`] when `capacity` is below two.
pub fn line_limit(capacity: usize, grid: Grid, start_col: u16) -> Result<usize, ReadLineError> {
    if capacity < MIN_CAPACITY {
        return Err(ReadLineError::BufferTooSmall {
            required: MIN_CAPACITY,
        });
    }
    let room = (usize::from(grid.cols()) * usize::from(grid.last_row()))
        .saturating_sub(usize::from(start_col));
    Ok(room.min(capacity).saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
