//! Grid arithmetic — mapping buffer offsets onto a wrapped character grid.
//!
//! The edited line starts at some column of some row and wraps at the
//! right edge, so offset `n` lives at column `(start_col + n) % cols` of row
//! `start_row + (start_col + n) / cols`. Everything the editor knows about
//! rows and columns comes from the functions here; no caller tracks deltas
//! by hand.
//!
//! Rows never go below 0 or past the last row. Those clamps are the only
//! "invalid position" handling there is: positions are always valid.

use std::fmt;

use grid_term::{Point, Size};
use unicode_width::UnicodeWidthChar;

// ---------------------------------------------------------------------------
// GridPos
// ---------------------------------------------------------------------------

/// A cell on the grid, 0-indexed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub row: u16,
    pub col: u16,
}

impl GridPos {
    #[inline]
    #[must_use]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl From<Point> for GridPos {
    fn from(p: Point) -> Self {
        Self::new(p.col, p.row)
    }
}

impl From<GridPos> for Point {
    fn from(p: GridPos) -> Self {
        Self::new(p.col, p.row)
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Grid geometry. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cols: u16,
    rows: u16,
}

impl Grid {
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: if cols == 0 { 1 } else { cols },
            rows: if rows == 0 { 1 } else { rows },
        }
    }

    #[inline]
    #[must_use]
    pub const fn cols(self) -> u16 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(self) -> u16 {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn last_row(self) -> u16 {
        self.rows - 1
    }

    /// One cell back, wrapping to the end of the previous row.
    #[must_use]
    pub const fn step_backward(self, p: GridPos) -> GridPos {
        if p.col == 0 {
            GridPos {
                col: self.cols - 1,
                row: p.row.saturating_sub(1),
            }
        } else {
            GridPos {
                col: p.col - 1,
                row: p.row,
            }
        }
    }

    /// One cell forward, wrapping to the start of the next row.
    #[must_use]
    pub const fn step_forward(self, p: GridPos) -> GridPos {
        if p.col + 1 >= self.cols {
            GridPos {
                col: 0,
                row: if p.row >= self.last_row() {
                    self.last_row()
                } else {
                    p.row + 1
                },
            }
        } else {
            GridPos {
                col: p.col + 1,
                row: p.row,
            }
        }
    }

    /// `n` cells forward from `p`. Same result as `n` calls to
    /// [`step_forward`](Self::step_forward).
    #[must_use]
    pub fn advance(self, p: GridPos, n: usize) -> GridPos {
        let cols = usize::from(self.cols);
        let linear = usize::from(p.col) + n;
        let row = usize::from(p.row) + linear / cols;
        GridPos {
            col: narrow(linear % cols),
            row: narrow(row.min(usize::from(self.last_row()))),
        }
    }

    /// The cell just past a line of `len` characters that starts at
    /// `(start_col, start_row)`.
    #[must_use]
    pub fn tail_position(self, start_col: u16, start_row: u16, len: usize) -> GridPos {
        self.advance(GridPos::new(start_col, start_row), len)
    }

    /// Row the line starts on, given that offset `offset` is at `p`.
    #[must_use]
    pub fn line_start_row(self, p: GridPos, start_col: u16, offset: usize) -> u16 {
        let back = (offset + usize::from(start_col)) / usize::from(self.cols);
        narrow(usize::from(p.row).saturating_sub(back))
    }

    /// Rows the terminal must scroll when `n` characters are written from
    /// `p`. Filling the last column of the last row already scrolls.
    #[must_use]
    pub fn scroll_after_write(self, p: GridPos, n: usize) -> u16 {
        let end_row = usize::from(p.row) + (usize::from(p.col) + n) / usize::from(self.cols);
        narrow(end_row.saturating_sub(usize::from(self.last_row())))
    }
}

impl From<Size> for Grid {
    fn from(s: Size) -> Self {
        Self::new(s.cols, s.rows)
    }
}

/// True when `ch` draws as exactly one cell. Everything the editor puts
/// on the line must pass this, or the cell arithmetic above drifts from
/// what the terminal shows.
#[must_use]
pub fn is_single_cell(ch: char) -> bool {
    !ch.is_control() && ch.width() == Some(1)
}

fn narrow(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
