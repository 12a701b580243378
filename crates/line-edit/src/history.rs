//! Line history — previously committed lines and a browse position.
//!
//! [`History`] is an append-only list, oldest first. Nothing is ever
//! removed, deduplicated or edited. It lives on the
//! [`LineEditor`](crate::LineEditor) and survives across reads.
//!
//! [`Browse`] is per read: it remembers which entry (if any) the user has
//! recalled with Up/Down. "No selection" is the state of a fresh line.
//!
//! ```text
//!   entries:  [ first, second, third ]
//!   Up   from none   -> third
//!   Up   from third  -> second -> first -> first (clamped, Unchanged)
//!   Down from first  -> second -> third -> none (Cleared)
//!   Down from none   -> none (Unchanged)
//! ```

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a copy of `line` as the newest entry.
    pub fn append(&mut self, line: &str) {
        self.entries.push(line.to_owned());
        tracing::debug!(len = self.entries.len(), "history entry added");
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for History {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|s| s.as_ref().to_owned()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Browse
// ---------------------------------------------------------------------------

/// What a browse step asks the editor to do with its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall<'a> {
    /// Substitute this entry's text.
    Entry(&'a str),
    /// Back to "no selection": empty the line.
    Cleared,
    /// Nothing to do.
    Unchanged,
}

/// Browse position over a [`History`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Browse {
    selected: Option<usize>,
}

impl Browse {
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Index of the recalled entry, if any.
    #[inline]
    #[must_use]
    pub const fn selected(self) -> Option<usize> {
        self.selected
    }

    /// Step toward older entries.
    pub fn previous<'h>(&mut self, history: &'h History) -> Recall<'h> {
        let target = match self.selected {
            None => history.len().checked_sub(1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        match target.and_then(|i| history.get(i).map(|text| (i, text))) {
            Some((i, text)) => {
                self.selected = Some(i);
                Recall::Entry(text)
            }
            None => Recall::Unchanged,
        }
    }

    /// Step toward newer entries, falling off the newest into "no
    /// selection".
    pub fn next<'h>(&mut self, history: &'h History) -> Recall<'h> {
        let Some(i) = self.selected else {
            return Recall::Unchanged;
        };
        match history.get(i + 1) {
            Some(text) => {
                self.selected = Some(i + 1);
                Recall::Entry(text)
            }
            None => {
                self.selected = None;
                Recall::Cleared
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history() -> History {
        ["first", "second", "third"].into_iter().collect()
    }

    #[test]
    fn append_keeps_order() {
        let mut h = History::new();
        h.append("a");
        h.append("b");
        h.append("a");
        assert_eq!(h.iter().collect::<Vec<_>>(), vec!["a", "b", "a"]);
    }

    #[test]
    fn previous_starts_at_newest() {
        let h = history();
        let mut b = Browse::new();
        assert_eq!(b.previous(&h), Recall::Entry("third"));
        assert_eq!(b.selected(), Some(2));
    }

    #[test]
    fn previous_clamps_at_oldest() {
        let h = history();
        let mut b = Browse::new();
        b.previous(&h);
        b.previous(&h);
        assert_eq!(b.previous(&h), Recall::Entry("first"));
        assert_eq!(b.previous(&h), Recall::Unchanged);
        assert_eq!(b.previous(&h), Recall::Unchanged);
        assert_eq!(b.selected(), Some(0));
    }

    #[test]
    fn next_walks_forward_then_clears() {
        let h = history();
        let mut b = Browse::new();
        for _ in 0..3 {
            b.previous(&h);
        }
        assert_eq!(b.next(&h), Recall::Entry("second"));
        assert_eq!(b.next(&h), Recall::Entry("third"));
        assert_eq!(b.next(&h), Recall::Cleared);
        assert_eq!(b.selected(), None);
        assert_eq!(b.next(&h), Recall::Unchanged);
    }

    #[test]
    fn next_without_selection_is_noop() {
        let h = history();
        let mut b = Browse::new();
        assert_eq!(b.next(&h), Recall::Unchanged);
    }

    #[test]
    fn empty_history_never_recalls() {
        let h = History::new();
        let mut b = Browse::new();
        assert_eq!(b.previous(&h), Recall::Unchanged);
        assert_eq!(b.next(&h), Recall::Unchanged);
        assert_eq!(b.selected(), None);
    }

    #[test]
    fn get_out_of_range() {
        let h = history();
        assert_eq!(h.get(1), Some("second"));
        assert_eq!(h.get(3), None);
    }
}
