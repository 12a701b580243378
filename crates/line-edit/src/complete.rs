//! Tab completion: a pluggable source of candidates.
//!
//! The editor owns the key handling: it finds the word being completed,
//! asks a [`Complete`] provider for candidates, and cycles through them on
//! repeated Tab. Providers only map a word to strings and know nothing about
//! the buffer or the screen.
//!
//! The word under completion starts after the last space that is not
//! inside double quotes and ends at the cursor.

use crate::cursor::is_single_cell;

/// A source of completion candidates.
pub trait Complete {
    /// Candidates that could replace `word`, in the order Tab offers them.
    fn candidates(&self, word: &str) -> Vec<String>;
}

/// Offers nothing; Tab does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompletion;

impl Complete for NoCompletion {
    fn candidates(&self, _word: &str) -> Vec<String> {
        Vec::new()
    }
}

impl<F> Complete for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn candidates(&self, word: &str) -> Vec<String> {
        self(word)
    }
}

/// Completes against a fixed word list by prefix.
#[derive(Debug, Default, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }
}

impl Complete for WordList {
    fn candidates(&self, word: &str) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| w.starts_with(word))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Word splitting and cycling
// ---------------------------------------------------------------------------

/// Offset where the word ending at `line.len()` starts.
#[must_use]
pub fn word_start(line: &[char]) -> usize {
    let mut quoted = false;
    let mut start = 0;
    for (i, &ch) in line.iter().enumerate() {
        match ch {
            '"' => quoted = !quoted,
            ' ' if !quoted => start = i + 1,
            _ => {}
        }
    }
    start
}

/// The text a candidate is inserted as: wrapped in double quotes when it
/// contains a space.
#[must_use]
pub fn quote(candidate: &str) -> String {
    if candidate.contains(' ') && !candidate.starts_with('"') {
        format!("\"{candidate}\"")
    } else {
        candidate.to_owned()
    }
}

/// An active round of Tab presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Where the word being completed starts.
    pub start: usize,
    /// Characters the current candidate occupies after `start`.
    pub inserted: usize,
    candidates: Vec<String>,
    index: usize,
}

impl Cycle {
    /// Begin a round, or `None` when there is nothing to offer. Candidates
    /// with characters that do not fit one cell are dropped.
    #[must_use]
    pub fn begin(start: usize, word_len: usize, mut candidates: Vec<String>) -> Option<Self> {
        candidates.retain(|c| c.chars().all(is_single_cell));
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            start,
            inserted: word_len,
            candidates,
            index: 0,
        })
    }

    /// The candidate to insert now, already quoted.
    #[must_use]
    pub fn current(&self) -> String {
        quote(&self.candidates[self.index])
    }

    /// Move to the next candidate, wrapping around.
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.candidates.len();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn word_start_after_last_space() {
        assert_eq!(word_start(&chars("git sta")), 4);
        assert_eq!(word_start(&chars("status")), 0);
        assert_eq!(word_start(&chars("a b ")), 4);
    }

    #[test]
    fn word_start_ignores_quoted_spaces() {
        assert_eq!(word_start(&chars("open \"my fi")), 5);
        assert_eq!(word_start(&chars("open \"my file\" ot")), 15);
    }

    #[test]
    fn quote_wraps_spaces() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("my file"), "\"my file\"");
        assert_eq!(quote("\"already\" quoted"), "\"already\" quoted");
    }

    #[test]
    fn word_list_prefix_match() {
        let w = WordList::new([":history", ":help", ":quit"]);
        assert_eq!(w.candidates(":h"), vec![":history", ":help"]);
        assert!(w.candidates("x").is_empty());
    }

    #[test]
    fn closures_complete() {
        let c = |word: &str| vec![format!("{word}!")];
        assert_eq!(c.candidates("hi"), vec!["hi!"]);
    }

    #[test]
    fn no_completion_is_empty() {
        assert!(NoCompletion.candidates("anything").is_empty());
    }

    #[test]
    fn cycle_wraps() {
        let mut c = Cycle::begin(0, 1, vec!["ab".into(), "a c".into()]).unwrap();
        assert_eq!(c.current(), "ab");
        c.advance();
        assert_eq!(c.current(), "\"a c\"");
        c.advance();
        assert_eq!(c.current(), "ab");
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn cycle_needs_candidates() {
        assert_eq!(Cycle::begin(0, 0, Vec::new()), None);
    }

    #[test]
    fn cycle_drops_candidates_wider_than_a_cell() {
        let c = Cycle::begin(0, 1, vec!["漢字".into(), "ab".into(), "a\tb".into()]).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.current(), "ab");
        assert_eq!(Cycle::begin(0, 1, vec!["漢字".into(), "a\tb".into()]), None);
    }
}
