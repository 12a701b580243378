// SPDX-License-Identifier: MIT
//
// In-memory character grid and the scripted console built on it.
//
// `CharGrid` is a flat row-major array of cells plus a cursor. It follows
// the same write rules as the ANSI console: filling the last column wraps
// to the next row, running off the last row scrolls everything up.
//
// `VirtualConsole` pairs a grid with a queue of key strokes and implements
// `Console`, so a line editor can be driven and inspected without a
// terminal. Running out of scripted keys reports end of input.

use std::collections::VecDeque;
use std::io;

use crate::console::Console;
use crate::input::KeyStroke;
use crate::terminal::{Point, Size};

// ─── CharGrid ───────────────────────────────────────────────────────────────

/// A fixed-size grid of characters with a write cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharGrid {
    size: Size,
    cells: Vec<char>,
    cursor: Point,
    scrolled: usize,
}

impl CharGrid {
    /// A blank grid with the cursor at the origin.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            cells: vec![' '; size.area() as usize],
            cursor: Point::default(),
            scrolled: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Point {
        self.cursor
    }

    /// Number of rows that have scrolled off the top so far.
    #[inline]
    #[must_use]
    pub const fn scrolled(&self) -> usize {
        self.scrolled
    }

    /// Move the cursor, clamped to the grid.
    pub fn set_cursor(&mut self, at: Point) {
        self.cursor = Point {
            col: at.col.min(self.size.cols.saturating_sub(1)),
            row: at.row.min(self.size.rows.saturating_sub(1)),
        };
    }

    #[must_use]
    pub fn cell(&self, col: u16, row: u16) -> Option<char> {
        self.index(col, row).map(|i| self.cells[i])
    }

    /// One row as a string, trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        if row >= self.size.rows {
            return String::new();
        }
        let start = usize::from(row) * usize::from(self.size.cols);
        let end = start + usize::from(self.size.cols);
        let line: String = self.cells[start..end].iter().collect();
        line.trim_end().to_owned()
    }

    /// Every row, top to bottom, via [`row_text`](Self::row_text).
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.size.rows).map(|row| self.row_text(row)).collect()
    }

    /// Write `text` at the cursor.
    pub fn write_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.put(ch);
        }
    }

    /// Write one character at the cursor and advance.
    pub fn put(&mut self, ch: char) {
        if self.size.cols == 0 || self.size.rows == 0 {
            return;
        }
        match ch {
            '\r' => self.cursor.col = 0,
            '\n' => self.line_feed(),
            _ => {
                if let Some(i) = self.index(self.cursor.col, self.cursor.row) {
                    self.cells[i] = ch;
                }
                self.cursor.col += 1;
                if self.cursor.col >= self.size.cols {
                    self.cursor.col = 0;
                    self.line_feed();
                }
            }
        }
    }

    /// Move down one row, scrolling when already on the last one.
    fn line_feed(&mut self) {
        if self.cursor.row + 1 < self.size.rows {
            self.cursor.row += 1;
        } else {
            self.scroll_up();
        }
    }

    fn scroll_up(&mut self) {
        let cols = usize::from(self.size.cols);
        self.cells.drain(..cols);
        self.cells.extend(std::iter::repeat_n(' ', cols));
        self.scrolled += 1;
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.size.cols && row < self.size.rows)
            .then(|| usize::from(row) * usize::from(self.size.cols) + usize::from(col))
    }
}

// ─── VirtualConsole ─────────────────────────────────────────────────────────

/// A [`Console`] backed by a [`CharGrid`] and a scripted key queue.
#[derive(Debug, Clone)]
pub struct VirtualConsole {
    grid: CharGrid,
    keys: VecDeque<KeyStroke>,
    writes: usize,
}

impl VirtualConsole {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            grid: CharGrid::new(size),
            keys: VecDeque::new(),
            writes: 0,
        }
    }

    /// Start with the cursor somewhere other than the origin.
    #[must_use]
    pub fn with_cursor(mut self, at: Point) -> Self {
        self.grid.set_cursor(at);
        self
    }

    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &CharGrid {
        &self.grid
    }

    /// Number of `write_text` calls so far.
    #[inline]
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Key strokes not consumed yet.
    #[must_use]
    pub fn pending_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn push_key(&mut self, stroke: KeyStroke) {
        self.keys.push_back(stroke);
    }

    pub fn push_keys(&mut self, strokes: impl IntoIterator<Item = KeyStroke>) {
        self.keys.extend(strokes);
    }

    /// Queue one character stroke per char of `text`.
    pub fn type_text(&mut self, text: &str) {
        self.keys.extend(text.chars().map(KeyStroke::char));
    }
}

impl Console for VirtualConsole {
    fn grid_size(&self) -> Size {
        self.grid.size()
    }

    fn cursor_position(&mut self) -> io::Result<Point> {
        Ok(self.grid.cursor())
    }

    fn set_cursor_position(&mut self, at: Point) -> io::Result<()> {
        self.grid.set_cursor(at);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.writes += 1;
        self.grid.write_str(text);
        Ok(())
    }

    fn wait_for_key(&mut self) -> io::Result<()> {
        if self.keys.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no scripted key strokes left",
            ));
        }
        Ok(())
    }

    fn read_key_stroke(&mut self) -> io::Result<Option<KeyStroke>> {
        Ok(self.keys.pop_front())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
