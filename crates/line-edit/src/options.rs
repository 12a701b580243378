//! Editor options and the `:set` directive parser.
//!
//! [`EditorOptions`] is the configuration a [`LineEditor`](crate::LineEditor)
//! is built from. The front end can change it at run time with Vim-style
//! `:set` arguments:
//!
//! | Syntax            | Effect                          |
//! |-------------------|---------------------------------|
//! | `set insert`      | Insert mode                     |
//! | `set noinsert`    | Overwrite mode                  |
//! | `set insert!`     | Toggle                          |
//! | `set insert?`     | Show the current value          |
//! | `set capacity=N`  | Line buffer capacity for later reads |
//! | `set capacity`    | Show the capacity               |
//! | `set`             | Show every option               |
//!
//! | Option     | Abbrev | Type    | Default |
//! |------------|--------|---------|---------|
//! | `insert`   | `im`   | bool    | true    |
//! | `capacity` | `cap`  | integer | 4096    |

use std::fmt;

/// Default line buffer capacity in characters.
pub const DEFAULT_CAPACITY: usize = 0x1000;

/// Smallest capacity a read accepts: one character plus the terminator.
pub const MIN_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    /// Maximum characters a line buffer may hold, terminator included.
    pub capacity: usize,
    /// Start in insert mode (overwrite otherwise).
    pub insert_mode: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            insert_mode: true,
        }
    }
}

impl fmt::Display for EditorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} capacity={}",
            format_bool("insert", self.insert_mode),
            self.capacity
        )
    }
}

/// A `:set` argument the editor could not apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("{0} is not a boolean option")]
    NotBoolean(String),
}

impl EditorOptions {
    /// Apply one directive. Returns text to show the user, if any.
    ///
    /// # Errors
    ///
    /// [`OptionError`] for unknown names, non-numeric or too small
    /// capacities, and boolean syntax on a numeric option.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, OptionError> {
        match directive {
            SetDirective::ShowAll => Ok(Some(self.to_string())),
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Query(name) => match canonical(name) {
                Some("insert") => Ok(Some(format_bool("insert", self.insert_mode))),
                Some("capacity") => Ok(Some(format!("capacity={}", self.capacity))),
                _ => Err(OptionError::Unknown(name.clone())),
            },
            SetDirective::Assign(name, value) => match canonical(name) {
                Some("capacity") => {
                    let n = value
                        .parse::<usize>()
                        .ok()
                        .filter(|&n| n >= MIN_CAPACITY)
                        .ok_or_else(|| OptionError::InvalidValue {
                            name: name.clone(),
                            value: value.clone(),
                        })?;
                    self.capacity = n;
                    tracing::debug!(capacity = n, "capacity changed");
                    Ok(None)
                }
                Some(_) => Err(OptionError::InvalidValue {
                    name: name.clone(),
                    value: value.clone(),
                }),
                None => Err(OptionError::Unknown(name.clone())),
            },
        }
    }

    fn set_bool(
        &mut self,
        name: &str,
        f: impl FnOnce(bool) -> bool,
    ) -> Result<Option<String>, OptionError> {
        match canonical(name) {
            Some("insert") => {
                self.insert_mode = f(self.insert_mode);
                Ok(None)
            }
            Some(_) => Err(OptionError::NotBoolean(name.to_owned())),
            None => Err(OptionError::Unknown(name.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Directive parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option`
    On(String),
    /// `set nooption`
    Off(String),
    /// `set option!`
    Toggle(String),
    /// `set option?`, or a bare numeric option
    Query(String),
    /// `set option=value`
    Assign(String, String),
    /// `set` with no arguments
    ShowAll,
}

/// Full option name for `name` or one of its abbreviations.
#[must_use]
pub fn canonical(name: &str) -> Option<&'static str> {
    match name {
        "insert" | "im" => Some("insert"),
        "capacity" | "cap" => Some("capacity"),
        _ => None,
    }
}

#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    canonical(name) == Some("insert")
}

#[must_use]
pub fn is_numeric_option(name: &str) -> bool {
    canonical(name) == Some("capacity")
}

/// Parse everything after `set`. Several space-separated arguments are
/// allowed; no arguments means [`SetDirective::ShowAll`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() || trimmed == "all" {
        return vec![SetDirective::ShowAll];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_owned(), value.to_owned());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_owned());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_owned());
    }
    // Only strip "no" when what is left is a boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_owned());
        }
    }
    if is_numeric_option(arg) {
        return SetDirective::Query(arg.to_owned());
    }
    SetDirective::On(arg.to_owned())
}

/// `"name"` when on, `"noname"` when off.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_owned()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
