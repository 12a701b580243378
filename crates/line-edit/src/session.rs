//! One read of one line: key dispatch and minimal repaint.
//!
//! A [`Session`] is created for every line requested and dropped when the
//! line is committed or the read fails. It owns the edit buffer and the
//! cursor's grid position; the history and the completion provider are
//! borrowed from the [`LineEditor`](crate::LineEditor).
//!
//! # Loop
//!
//! ```text
//! wait for key -> classify -> handle (buffer, cursor, repaint mark)
//!              -> repaint marked span -> place cursor -> wait ...
//! ```
//!
//! # Repaint
//!
//! Handlers never draw. They mark `Repaint { from, delete }` and leave
//! `pos` on the grid cell of offset `from`. The repaint writes
//! `buffer[from..]` followed by `delete` blanks (covering text the line
//! lost), accounts for any scrolling the write caused, and moves `pos`
//! forward to the logical cursor.
//!
//! When no repaint is pending, `pos` is always the cell of the logical
//! cursor, so the line's first row can be recovered from it at any time
//! (see [`Grid::line_start_row`]).

use std::fmt;
use std::io;
use std::iter;

use grid_term::{Console, KeyStroke, Modifiers, ScanCode};

use crate::buffer::EditBuffer;
use crate::complete::{Complete, Cycle, word_start};
use crate::cursor::{Grid, GridPos, is_single_cell};
use crate::error::ReadLineError;
use crate::history::{Browse, History, Recall};
use crate::mode::EditMode;

// ---------------------------------------------------------------------------
// EditKey
// ---------------------------------------------------------------------------

/// What a key stroke means to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Confirm,
    EraseBackward,
    EraseForward,
    Char(char),
    Left,
    Right,
    Home,
    End,
    ToggleInsert,
    HistoryPrevious,
    HistoryNext,
    /// Page Up / Page Down: consumed, no effect on the line.
    Page,
    /// Escape: empty the line.
    Clear,
    /// F7: print the history and commit an empty line.
    ListHistory,
    Complete,
    Ignored,
}

impl EditKey {
    #[must_use]
    pub fn classify(stroke: KeyStroke) -> Self {
        if let Some(scan) = stroke.scan {
            return match scan {
                ScanCode::Up => Self::HistoryPrevious,
                ScanCode::Down => Self::HistoryNext,
                ScanCode::Left => Self::Left,
                ScanCode::Right => Self::Right,
                ScanCode::Home => Self::Home,
                ScanCode::End => Self::End,
                ScanCode::Insert => Self::ToggleInsert,
                ScanCode::Delete => Self::EraseForward,
                ScanCode::PageUp | ScanCode::PageDown => Self::Page,
                ScanCode::Escape => Self::Clear,
                ScanCode::F(7) => Self::ListHistory,
                ScanCode::F(_) => Self::Ignored,
            };
        }

        let Some(ch) = stroke.ch else {
            return Self::Ignored;
        };
        match ch {
            KeyStroke::CARRIAGE_RETURN | '\n' => Self::Confirm,
            KeyStroke::BACKSPACE => Self::EraseBackward,
            KeyStroke::TAB if stroke.modifiers.is_empty() => Self::Complete,
            _ if stroke.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT) => Self::Ignored,
            _ if stroke.is_printable() => Self::Char(ch),
            _ => Self::Ignored,
        }
    }
}

// ---------------------------------------------------------------------------
// Repaint / Step
// ---------------------------------------------------------------------------

/// The span of the line that must be redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repaint {
    /// First offset to redraw; everything after it is redrawn too.
    pub from: usize,
    /// Blanks to write after the text, for characters the line lost.
    pub delete: usize,
}

/// What the loop does after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Commit,
    ListHistory,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session<'a> {
    buf: EditBuffer,
    grid: Grid,
    start_col: u16,
    pos: GridPos,
    mode: EditMode,
    history: &'a History,
    browse: Browse,
    completer: &'a dyn Complete,
    cycle: Option<Cycle>,
    repaint: Option<Repaint>,
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("buf", &self.buf)
            .field("grid", &self.grid)
            .field("start_col", &self.start_col)
            .field("pos", &self.pos)
            .field("mode", &self.mode)
            .field("browse", &self.browse)
            .field("repaint", &self.repaint)
            .finish_non_exhaustive()
    }
}

impl<'a> Session<'a> {
    /// A fresh, empty line starting at `start`.
    ///
    /// # Errors
    ///
    /// [`ReadLineError::OutOfMemory`] if the buffer cannot be allocated.
    pub fn new(
        grid: Grid,
        start: GridPos,
        limit: usize,
        mode: EditMode,
        history: &'a History,
        completer: &'a dyn Complete,
    ) -> Result<Self, ReadLineError> {
        Ok(Self {
            buf: EditBuffer::with_limit(limit)?,
            grid,
            start_col: start.col,
            pos: start,
            mode,
            history,
            browse: Browse::new(),
            completer,
            cycle: None,
            repaint: None,
        })
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &EditBuffer {
        &self.buf
    }

    /// Grid cell of the cursor (of the repaint start while one is pending).
    #[inline]
    #[must_use]
    pub const fn pos(&self) -> GridPos {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> EditMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn pending_repaint(&self) -> Option<Repaint> {
        self.repaint
    }

    /// Read keys until the line is committed.
    ///
    /// # Errors
    ///
    /// Console failures, including interrupt and end of input.
    pub fn run<C: Console + ?Sized>(&mut self, console: &mut C) -> Result<String, ReadLineError> {
        console.set_cursor_position(self.pos.into())?;

        loop {
            let stroke = match next_key(console) {
                Ok(Some(stroke)) => stroke,
                Ok(None) => continue,
                Err(err) => {
                    // Interrupt or end of input: leave the cursor below the
                    // abandoned line.
                    if matches!(
                        err.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof
                    ) {
                        self.finish(console)?;
                    }
                    return Err(err.into());
                }
            };
            let key = EditKey::classify(stroke);
            tracing::trace!(?key, cursor = self.buf.cursor(), len = self.buf.len(), "key");

            match self.handle(key) {
                Step::Continue => {}
                Step::Commit => {
                    self.finish(console)?;
                    tracing::debug!(len = self.buf.len(), "line committed");
                    return Ok(self.buf.text());
                }
                Step::ListHistory => {
                    self.finish(console)?;
                    self.list_history(console)?;
                    return Ok(String::new());
                }
            }

            self.repaint(console)?;
            console.set_cursor_position(self.pos.into())?;
        }
    }

    /// Apply one key to the buffer and cursor. Draws nothing.
    pub fn handle(&mut self, key: EditKey) -> Step {
        if key != EditKey::Complete {
            self.cycle = None;
        }

        match key {
            EditKey::Confirm => return Step::Commit,
            EditKey::ListHistory => return Step::ListHistory,
            EditKey::EraseBackward => {
                if self.buf.erase_backward() {
                    self.pos = self.grid.step_backward(self.pos);
                    self.mark(self.buf.cursor(), 1);
                }
            }
            EditKey::EraseForward => {
                if self.buf.erase_forward() {
                    self.mark(self.buf.cursor(), 1);
                }
            }
            EditKey::Char(ch) => self.type_char(ch),
            EditKey::Left => {
                if self.buf.move_left() {
                    self.pos = self.grid.step_backward(self.pos);
                }
            }
            EditKey::Right => {
                if self.buf.move_right() {
                    self.pos = self.grid.step_forward(self.pos);
                }
            }
            EditKey::Home => {
                self.pos = self.offset_position(0);
                self.buf.move_home();
            }
            EditKey::End => {
                self.pos = self.offset_position(self.buf.len());
                self.buf.move_end();
            }
            EditKey::ToggleInsert => {
                self.mode = self.mode.toggled();
                tracing::debug!(mode = %self.mode, "edit mode toggled");
            }
            EditKey::HistoryPrevious => {
                let recall = self.browse.previous(self.history);
                self.recall(recall);
            }
            EditKey::HistoryNext => {
                let recall = self.browse.next(self.history);
                self.recall(recall);
            }
            EditKey::Clear => self.clear_line(),
            EditKey::Complete => self.complete(),
            EditKey::Page | EditKey::Ignored => {}
        }
        Step::Continue
    }

    /// Draw the pending repaint span, if any, and move `pos` to the
    /// logical cursor.
    ///
    /// # Errors
    ///
    /// Console write failures.
    pub fn repaint<C: Console + ?Sized>(&mut self, console: &mut C) -> io::Result<()> {
        let Some(Repaint { from, delete }) = self.repaint.take() else {
            return Ok(());
        };

        let mut text = self.buf.text_from(from);
        text.extend(iter::repeat_n(' ', delete));
        let written = self.buf.len() - from + delete;

        console.set_cursor_position(self.pos.into())?;
        console.write_text(&text)?;

        // Writing past the bottom row scrolled the line up with the grid.
        let scrolled = self.grid.scroll_after_write(self.pos, written);
        self.pos.row = self.pos.row.saturating_sub(scrolled);
        self.pos = self.grid.advance(self.pos, self.buf.cursor() - from);
        Ok(())
    }

    // -- key handlers -------------------------------------------------------

    fn type_char(&mut self, ch: char) {
        if !is_single_cell(ch) {
            tracing::trace!(?ch, "not a single-cell character");
            return;
        }
        let from = self.buf.cursor();
        if self.buf.put(ch, self.mode) {
            self.mark(from, 0);
        } else {
            tracing::trace!(limit = self.buf.limit(), "line is full");
        }
    }

    fn recall(&mut self, recall: Recall<'_>) {
        let text = match recall {
            Recall::Entry(text) => text,
            Recall::Cleared => "",
            Recall::Unchanged => return,
        };
        let start = self.offset_position(0);
        let old = self.buf.replace(text);
        self.pos = start;
        self.mark(0, old.saturating_sub(self.buf.len()));
        tracing::debug!(selected = ?self.browse.selected(), "history recalled");
    }

    fn clear_line(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let start = self.offset_position(0);
        let old = self.buf.len();
        self.buf.clear();
        self.pos = start;
        self.mark(0, old);
    }

    fn complete(&mut self) {
        let cursor = self.buf.cursor();
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.advance();
        } else {
            let chars = self.buf.as_chars();
            let start = word_start(&chars[..cursor]);
            let word: String = chars[start..cursor].iter().collect();
            let candidates = self.completer.candidates(&word);
            tracing::debug!(%word, count = candidates.len(), "completing");
            self.cycle = Cycle::begin(start, cursor - start, candidates);
        }

        let Some(cycle) = self.cycle.as_ref() else {
            return;
        };
        let (start, inserted, text) = (cycle.start, cycle.inserted, cycle.current());

        let at = self.offset_position(start);
        let old = self.buf.len();
        if !self.buf.splice(start..start + inserted, &text) {
            return;
        }
        if let Some(cycle) = self.cycle.as_mut() {
            cycle.inserted = text.chars().count();
        }
        self.pos = at;
        self.mark(start, old.saturating_sub(self.buf.len()));
    }

    // -- helpers ------------------------------------------------------------

    fn mark(&mut self, from: usize, delete: usize) {
        self.repaint = Some(Repaint { from, delete });
    }

    /// Grid cell of `offset`, derived from where the cursor is now.
    fn offset_position(&self, offset: usize) -> GridPos {
        let start_row = self
            .grid
            .line_start_row(self.pos, self.start_col, self.buf.cursor());
        self.grid.tail_position(self.start_col, start_row, offset)
    }

    /// Move below the line so whatever comes next starts on a fresh row.
    fn finish<C: Console + ?Sized>(&mut self, console: &mut C) -> io::Result<()> {
        self.pos = self.offset_position(self.buf.len());
        self.buf.move_end();
        console.set_cursor_position(self.pos.into())?;
        console.write_text("\r\n")
    }

    fn list_history<C: Console + ?Sized>(&self, console: &mut C) -> io::Result<()> {
        for (i, line) in self.history.iter().enumerate() {
            console.write_text(&format!("{:>4}  {line}\r\n", i + 1))?;
        }
        Ok(())
    }
}

fn next_key<C: Console + ?Sized>(console: &mut C) -> io::Result<Option<KeyStroke>> {
    console.wait_for_key()?;
    console.read_key_stroke()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
