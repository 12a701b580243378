//! The edit buffer — one line of fixed-width characters and an insertion
//! point.
//!
//! Storage for `limit` characters is reserved up front with
//! `try_reserve_exact`, so editing never allocates and an allocation failure
//! surfaces once, as [`ReadLineError::OutOfMemory`], before the session
//! starts.
//!
//! Invariant: `cursor <= len <= limit`. Every mutator keeps it and reports
//! whether it changed anything; hitting a boundary is a no-op, not an error.

use std::ops::Range;

use crate::error::ReadLineError;
use crate::mode::EditMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    limit: usize,
}

impl EditBuffer {
    /// An empty buffer that holds at most `limit` characters.
    ///
    /// # Errors
    ///
    /// [`ReadLineError::OutOfMemory`] if the storage cannot be reserved.
    pub fn with_limit(limit: usize) -> Result<Self, ReadLineError> {
        let mut chars = Vec::new();
        chars.try_reserve_exact(limit).map_err(|err| {
            tracing::warn!(limit, %err, "line buffer allocation failed");
            ReadLineError::OutOfMemory
        })?;
        Ok(Self {
            chars,
            cursor: 0,
            limit,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.chars.len() >= self.limit
    }

    #[inline]
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.cursor == self.chars.len()
    }

    #[must_use]
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// The whole line.
    #[must_use]
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Characters from `from` to the end.
    #[must_use]
    pub fn text_from(&self, from: usize) -> String {
        self.chars.get(from..).unwrap_or_default().iter().collect()
    }

    // -- movement -----------------------------------------------------------

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    // -- editing ------------------------------------------------------------

    /// Would a character typed now be accepted?
    ///
    /// A full buffer still accepts an overwrite that lands on an existing
    /// character.
    #[must_use]
    pub fn accepts(&self, mode: EditMode) -> bool {
        !(self.is_full() && (mode.is_insert() || self.at_end()))
    }

    /// Type `ch` at the cursor and move past it.
    pub fn put(&mut self, ch: char, mode: EditMode) -> bool {
        if !self.accepts(mode) {
            return false;
        }
        if mode.is_insert() || self.at_end() {
            self.chars.insert(self.cursor, ch);
        } else {
            self.chars[self.cursor] = ch;
        }
        self.cursor += 1;
        true
    }

    /// Remove the character before the cursor.
    pub fn erase_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Remove the character under the cursor.
    pub fn erase_forward(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    /// Replace the whole line, truncated to the limit, and put the cursor
    /// at the end. Returns the old length.
    pub fn replace(&mut self, text: &str) -> usize {
        let old = self.chars.len();
        self.chars.clear();
        self.chars.extend(text.chars().take(self.limit));
        self.cursor = self.chars.len();
        old
    }

    /// Replace `range` with `text` and put the cursor after it.
    ///
    /// Refused (returning `false`) when the result would exceed the limit or
    /// `range` is out of bounds.
    pub fn splice(&mut self, range: Range<usize>, text: &str) -> bool {
        if range.start > range.end || range.end > self.chars.len() {
            return false;
        }
        let count = text.chars().count();
        if self.chars.len() - range.len() + count > self.limit {
            return false;
        }
        let start = range.start;
        let _ = self.chars.splice(range, text.chars());
        self.cursor = start + count;
        true
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(limit: usize, text: &str) -> EditBuffer {
        let mut b = EditBuffer::with_limit(limit).unwrap();
        for ch in text.chars() {
            assert!(b.put(ch, EditMode::Insert));
        }
        b
    }

    #[test]
    fn typing_appends_in_order() {
        let b = buf(10, "hello");
        assert_eq!(b.text(), "hello");
        assert_eq!(b.cursor(), 5);
    }

    #[test]
    fn typed_text_with_left_moves() {
        let mut b = buf(10, "ac");
        b.move_left();
        b.put('b', EditMode::Insert);
        assert_eq!(b.text(), "abc");
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn insert_shifts_right() {
        let mut b = buf(10, "abc");
        b.move_home();
        b.move_right();
        assert!(b.put('X', EditMode::Insert));
        assert_eq!(b.text(), "aXbc");
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let mut b = buf(10, "abc");
        b.move_home();
        b.move_right();
        assert!(b.put('X', EditMode::Overwrite));
        assert_eq!(b.text(), "aXc");
        assert_eq!(b.len(), 3);
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn overwrite_at_end_appends() {
        let mut b = buf(10, "ab");
        assert!(b.put('c', EditMode::Overwrite));
        assert_eq!(b.text(), "abc");
    }

    #[test]
    fn full_buffer_rejects_insert() {
        let mut b = buf(3, "abc");
        assert!(!b.put('d', EditMode::Insert));
        b.move_home();
        assert!(!b.put('d', EditMode::Insert));
        assert_eq!(b.text(), "abc");
    }

    #[test]
    fn full_buffer_accepts_overwrite_inside() {
        let mut b = buf(3, "abc");
        assert!(!b.put('d', EditMode::Overwrite));
        b.move_home();
        assert!(b.put('d', EditMode::Overwrite));
        assert_eq!(b.text(), "dbc");
    }

    #[test]
    fn erase_backward_at_start_is_noop() {
        let mut b = buf(10, "abc");
        b.move_home();
        assert!(!b.erase_backward());
        assert_eq!(b.text(), "abc");
    }

    #[test]
    fn erase_then_retype_restores() {
        for pos in 1..=4 {
            let mut b = buf(10, "abcd");
            b.move_home();
            for _ in 0..pos {
                b.move_right();
            }
            let before = b.clone();
            let removed = b.as_chars()[pos - 1];
            assert!(b.erase_backward());
            assert!(b.put(removed, EditMode::Insert));
            assert_eq!(b, before, "pos = {pos}");
        }
    }

    #[test]
    fn erase_forward_at_end_is_noop() {
        let mut b = buf(10, "abc");
        assert!(!b.erase_forward());
        b.move_left();
        assert!(b.erase_forward());
        assert_eq!(b.text(), "ab");
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn movement_clamps() {
        let mut b = buf(10, "ab");
        assert!(!b.move_right());
        b.move_home();
        assert!(!b.move_left());
        b.move_end();
        assert_eq!(b.cursor(), 2);
    }

    #[test]
    fn replace_truncates_to_limit() {
        let mut b = buf(4, "ab");
        assert_eq!(b.replace("abcdefg"), 2);
        assert_eq!(b.text(), "abcd");
        assert_eq!(b.cursor(), 4);
    }

    #[test]
    fn splice_replaces_range() {
        let mut b = buf(20, "git sta");
        assert!(b.splice(4..7, "status"));
        assert_eq!(b.text(), "git status");
        assert_eq!(b.cursor(), 10);
    }

    #[test]
    fn splice_refuses_overflow() {
        let mut b = buf(8, "git sta");
        assert!(!b.splice(4..7, "status"));
        assert_eq!(b.text(), "git sta");
    }

    #[test]
    fn text_from_offset() {
        let b = buf(10, "abcd");
        assert_eq!(b.text_from(2), "cd");
        assert_eq!(b.text_from(4), "");
        assert_eq!(b.text_from(9), "");
    }

    #[test]
    fn zero_limit_accepts_nothing() {
        let mut b = EditBuffer::with_limit(0).unwrap();
        assert!(!b.put('a', EditMode::Insert));
        assert!(b.is_empty());
    }
}
