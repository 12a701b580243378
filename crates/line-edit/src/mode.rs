//! Insert vs. overwrite editing.
//!
//! | Mode        | Typing at offset `i < len`          | Length |
//! |-------------|-------------------------------------|--------|
//! | `Insert`    | shifts `i..len` right, stores at `i` | +1     |
//! | `Overwrite` | replaces the character at `i`        | same   |
//!
//! At the end of the line both modes append. The flag belongs to the
//! [`LineEditor`](crate::LineEditor), not to a single read: toggling it
//! with the Insert key carries over to the next line.

use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditMode {
    #[default]
    Insert,
    Overwrite,
}

impl EditMode {
    #[must_use]
    pub const fn from_insert(insert: bool) -> Self {
        if insert { Self::Insert } else { Self::Overwrite }
    }

    #[inline]
    #[must_use]
    pub const fn is_insert(self) -> bool {
        matches!(self, Self::Insert)
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Insert => Self::Overwrite,
            Self::Overwrite => Self::Insert,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Overwrite => "OVERWRITE",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_insert() {
        assert_eq!(EditMode::default(), EditMode::Insert);
        assert!(EditMode::default().is_insert());
    }

    #[test]
    fn toggle_round_trips() {
        let m = EditMode::Insert;
        assert_eq!(m.toggled(), EditMode::Overwrite);
        assert_eq!(m.toggled().toggled(), m);
    }

    #[test]
    fn from_insert_flag() {
        assert_eq!(EditMode::from_insert(true), EditMode::Insert);
        assert_eq!(EditMode::from_insert(false), EditMode::Overwrite);
    }

    #[test]
    fn display() {
        assert_eq!(EditMode::Overwrite.to_string(), "OVERWRITE");
    }
}
