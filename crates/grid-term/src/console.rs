// SPDX-License-Identifier: MIT
//
// The console capability a line editor consumes, and its ANSI backend.
//
// `Console` is small on purpose. It has the primitives of a firmware text
// console (grid size, cursor get/set, text output, key wait and read), and
// anything built on them runs unchanged on a real terminal (`AnsiConsole`)
// or on an in-memory grid (`VirtualConsole` in `grid.rs`).
//
// # Write semantics
//
// `write_text` writes at the cursor and advances it. Filling the last
// column moves the cursor to column 0 of the next row immediately, and
// moving past the last row scrolls the grid up one row. VT terminals defer
// that wrap until the next printable character ("pending wrap"), so the
// ANSI backend resolves it eagerly with `\r\n` to keep both backends
// identical.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::ansi;
use crate::input::{Event, KeyStroke, Parser};
use crate::reader::{Chunk, StdinReader};
use crate::terminal::{self, Point, RawMode, Size};

// ─── Console ────────────────────────────────────────────────────────────────

/// A fixed-size character grid with a cursor and a key source.
pub trait Console {
    /// Columns and rows of the grid.
    fn grid_size(&self) -> Size;

    /// Where the cursor currently is.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures of the underlying device.
    fn cursor_position(&mut self) -> io::Result<Point>;

    /// Move the cursor. Positions outside the grid are clamped.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures of the underlying device.
    fn set_cursor_position(&mut self, at: Point) -> io::Result<()>;

    /// Write text at the cursor, advancing (and wrapping, and scrolling) it.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures of the underlying device.
    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// Block until a key stroke is available.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` when the key source is exhausted.
    fn wait_for_key(&mut self) -> io::Result<()>;

    /// Take the next key stroke, or `None` if none is ready yet.
    ///
    /// # Errors
    ///
    /// `Interrupted` when the user asked to abandon input (Ctrl-C), and
    /// `UnexpectedEof` when input has ended (Ctrl-D or a closed source).
    fn read_key_stroke(&mut self) -> io::Result<Option<KeyStroke>>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn grid_size(&self) -> Size {
        (**self).grid_size()
    }

    fn cursor_position(&mut self) -> io::Result<Point> {
        (**self).cursor_position()
    }

    fn set_cursor_position(&mut self, at: Point) -> io::Result<()> {
        (**self).set_cursor_position(at)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        (**self).wait_for_key()
    }

    fn read_key_stroke(&mut self) -> io::Result<Option<KeyStroke>> {
        (**self).read_key_stroke()
    }
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Output half of the ANSI console: encodes cursor moves and text into a
/// byte buffer while tracking where the terminal cursor ends up.
#[derive(Debug)]
pub struct Screen {
    buf: Vec<u8>,
    size: Size,
    cursor: Point,
    hidden: bool,
}

impl Screen {
    #[must_use]
    pub fn new(size: Size, cursor: Point) -> Self {
        Self {
            buf: Vec::with_capacity(1024),
            size,
            cursor,
            hidden: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Adopt a new geometry, keeping the tracked cursor inside it.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.cursor = clamp(self.cursor, size);
    }

    /// Record a cursor position learned from the terminal itself.
    pub fn sync_cursor(&mut self, at: Point) {
        self.cursor = clamp(at, self.size);
    }

    /// Encoded bytes not yet sent.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Hand the encoded bytes to `w` and forget them.
    ///
    /// # Errors
    ///
    /// Propagates write or flush failures of `w`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.hidden {
            ansi::cursor_show(&mut self.buf)?;
            self.hidden = false;
        }
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            self.buf.clear();
        }
        w.flush()
    }

    /// Queue a cursor move.
    ///
    /// # Errors
    ///
    /// Only if encoding into the buffer fails.
    pub fn move_to(&mut self, at: Point) -> io::Result<()> {
        self.hide_cursor()?;
        let at = clamp(at, self.size);
        ansi::cursor_to(&mut self.buf, at.col, at.row)?;
        self.cursor = at;
        Ok(())
    }

    /// Queue `text`, tracking where the terminal cursor ends up.
    ///
    /// # Errors
    ///
    /// Only if encoding into the buffer fails.
    pub fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.hide_cursor()?;
        let last_row = self.size.rows.saturating_sub(1);
        for ch in text.chars() {
            match ch {
                '\r' => {
                    self.buf.push(b'\r');
                    self.cursor.col = 0;
                }
                '\n' => {
                    self.buf.push(b'\n');
                    self.cursor.row = (self.cursor.row + 1).min(last_row);
                }
                _ => {
                    let mut utf8 = [0u8; 4];
                    self.buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                    self.cursor.col += 1;
                    if self.cursor.col >= self.size.cols {
                        ansi::new_line(&mut self.buf)?;
                        self.cursor.col = 0;
                        self.cursor.row = (self.cursor.row + 1).min(last_row);
                    }
                }
            }
        }
        Ok(())
    }
}

impl Screen {
    /// The cursor stays hidden from the first queued change until the
    /// flush, so a repaint never shows it jumping around.
    fn hide_cursor(&mut self) -> io::Result<()> {
        if !self.hidden {
            ansi::cursor_hide(&mut self.buf)?;
            self.hidden = true;
        }
        Ok(())
    }
}

fn clamp(at: Point, size: Size) -> Point {
    Point {
        col: at.col.min(size.cols.saturating_sub(1)),
        row: at.row.min(size.rows.saturating_sub(1)),
    }
}

// ─── AnsiConsole ────────────────────────────────────────────────────────────

/// Idle time after a lone ESC before it is taken as the Escape key.
const ESC_TIMEOUT: Duration = Duration::from_millis(25);

/// How long to wait for the terminal to answer a cursor position request.
const REPORT_TIMEOUT: Duration = Duration::from_millis(300);

/// [`Console`] on the process's controlling terminal.
///
/// Owns raw mode for its lifetime: construction enters it, drop restores
/// it. Output is buffered and flushed in one write whenever the console is
/// about to wait for input.
#[derive(Debug)]
pub struct AnsiConsole {
    screen: Screen,
    reader: StdinReader,
    parser: Parser,
    keys: VecDeque<KeyStroke>,
    closed: bool,
    raw: RawMode,
}

impl AnsiConsole {
    /// Enter raw mode and start reading stdin.
    ///
    /// # Errors
    ///
    /// Fails if raw mode cannot be entered or the reader thread cannot start.
    pub fn new() -> io::Result<Self> {
        let mut raw = RawMode::new();
        raw.enter()?;
        let size = terminal::get_size().unwrap_or(Size::FALLBACK);

        Ok(Self {
            screen: Screen::new(size, Point::default()),
            reader: StdinReader::spawn()?,
            parser: Parser::new(),
            keys: VecDeque::new(),
            closed: false,
            raw,
        })
    }

    /// Send buffered output to the terminal.
    ///
    /// # Errors
    ///
    /// Propagates stdout write failures.
    pub fn flush(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.screen.flush_to(&mut lock)
    }

    /// Restore cooked mode early (it is restored on drop anyway).
    ///
    /// # Errors
    ///
    /// Propagates flush or termios failures.
    pub fn release(&mut self) -> io::Result<()> {
        self.flush()?;
        self.raw.leave()
    }

    /// Pull one chunk from stdin (or resolve a pending ESC) into the
    /// event queue. Cursor reports are handed back instead of queued.
    fn pump(&mut self, timeout: Option<Duration>) -> Option<Point> {
        let timeout = if self.parser.has_pending() {
            Some(timeout.map_or(ESC_TIMEOUT, |t| t.min(ESC_TIMEOUT)))
        } else {
            timeout
        };

        let events = match self.reader.recv(timeout) {
            Chunk::Bytes(bytes) => self.parser.advance(&bytes),
            Chunk::Timeout => self.parser.flush(),
            Chunk::Closed => {
                self.closed = true;
                self.parser.flush()
            }
        };

        let mut report = None;
        for event in events {
            match event {
                Event::Key(stroke) => self.keys.push_back(stroke),
                Event::CursorReport(at) => report = Some(at),
            }
        }
        report
    }
}

impl Console for AnsiConsole {
    fn grid_size(&self) -> Size {
        terminal::get_size().unwrap_or(self.screen.size())
    }

    fn cursor_position(&mut self) -> io::Result<Point> {
        self.screen.resize(self.grid_size());
        ansi::request_cursor_position(&mut self.screen.buf)?;
        self.flush()?;

        let deadline = Instant::now() + REPORT_TIMEOUT;
        while !self.closed {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            if let Some(at) = self.pump(Some(left)) {
                self.screen.sync_cursor(at);
                return Ok(self.screen.cursor());
            }
        }
        // No answer: trust our own bookkeeping.
        Ok(self.screen.cursor())
    }

    fn set_cursor_position(&mut self, at: Point) -> io::Result<()> {
        self.screen.move_to(at)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.screen.write_text(text)
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        self.flush()?;
        while self.keys.is_empty() {
            if self.closed {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
            }
            let _ = self.pump(None);
        }
        Ok(())
    }

    fn read_key_stroke(&mut self) -> io::Result<Option<KeyStroke>> {
        match self.keys.pop_front() {
            Some(stroke) if stroke == KeyStroke::ctrl('c') => {
                Err(io::Error::from(io::ErrorKind::Interrupted))
            }
            Some(stroke) if stroke == KeyStroke::ctrl('d') => {
                Err(io::Error::from(io::ErrorKind::UnexpectedEof))
            }
            other => Ok(other),
        }
    }
}

impl Drop for AnsiConsole {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn screen() -> Screen {
        Screen::new(Size { cols: 10, rows: 3 }, Point::default())
    }

    fn output(s: &Screen) -> String {
        String::from_utf8(s.pending().to_vec()).unwrap()
    }

    #[test]
    fn move_to_emits_cup_and_tracks() {
        let mut s = screen();
        s.move_to(Point::new(4, 1)).unwrap();
        assert_eq!(output(&s), "\x1b[?25l\x1b[2;5H");
        assert_eq!(s.cursor(), Point::new(4, 1));
    }

    #[test]
    fn move_to_clamps_to_grid() {
        let mut s = screen();
        s.move_to(Point::new(40, 9)).unwrap();
        assert_eq!(s.cursor(), Point::new(9, 2));
    }

    #[test]
    fn text_advances_cursor() {
        let mut s = screen();
        s.write_text("abc").unwrap();
        assert_eq!(output(&s), "\x1b[?25labc");
        assert_eq!(s.cursor(), Point::new(3, 0));
    }

    #[test]
    fn filling_last_column_wraps_eagerly() {
        let mut s = screen();
        s.move_to(Point::new(8, 0)).unwrap();
        s.write_text("xy").unwrap();
        assert_eq!(output(&s), "\x1b[?25l\x1b[1;9Hxy\r\n");
        assert_eq!(s.cursor(), Point::new(0, 1));
    }

    #[test]
    fn wrap_on_last_row_stays_on_last_row() {
        let mut s = screen();
        s.move_to(Point::new(9, 2)).unwrap();
        s.write_text("z").unwrap();
        assert_eq!(s.cursor(), Point::new(0, 2));
    }

    #[test]
    fn carriage_return_and_line_feed() {
        let mut s = screen();
        s.write_text("ab\r\n").unwrap();
        assert_eq!(s.cursor(), Point::new(0, 1));
    }

    #[test]
    fn multibyte_chars_are_encoded() {
        let mut s = screen();
        s.write_text("é").unwrap();
        assert!(output(&s).ends_with('é'));
        assert_eq!(s.cursor(), Point::new(1, 0));
    }

    #[test]
    fn flush_drains_buffer() {
        let mut s = screen();
        s.write_text("hi").unwrap();
        let mut sink = Vec::new();
        s.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"\x1b[?25lhi\x1b[?25h");
        assert!(s.pending().is_empty());
    }

    #[test]
    fn cursor_hidden_once_per_flush() {
        let mut s = screen();
        s.move_to(Point::new(1, 1)).unwrap();
        s.write_text("a").unwrap();
        s.move_to(Point::new(2, 1)).unwrap();
        assert_eq!(output(&s).matches("\x1b[?25l").count(), 1);

        s.flush_to(&mut Vec::new()).unwrap();
        s.flush_to(&mut Vec::new()).unwrap();
        s.write_text("b").unwrap();
        assert_eq!(output(&s), "\x1b[?25lb");
    }

    #[test]
    fn resize_clamps_cursor() {
        let mut s = screen();
        s.move_to(Point::new(9, 2)).unwrap();
        s.resize(Size { cols: 5, rows: 2 });
        assert_eq!(s.cursor(), Point::new(4, 1));
    }
}
