//! # line-edit — interactive line editing on a character grid
//!
//! Reads one line from a [`grid_term::Console`], redrawing only what each
//! key changes:
//!
//! - **[`cursor`]** — `Grid`/`GridPos` and the offset ⇄ cell arithmetic
//! - **[`buffer`]** — `EditBuffer`, the line and its insertion point
//! - **[`history`]** — append-only `History` and the per-read `Browse`
//! - **[`mode`]** — insert vs. overwrite
//! - **[`session`]** — key dispatch and repaint for a single read
//! - **[`complete`]** — the Tab completion seam
//! - **[`options`]** — `EditorOptions` and `:set` parsing
//! - **[`editor`]** — `LineEditor`, the context that ties them together
//!
//! ```no_run
//! use grid_term::AnsiConsole;
//! use line_edit::LineEditor;
//!
//! let mut console = AnsiConsole::new()?;
//! let mut editor = LineEditor::default();
//! let line = editor.readline(&mut console, "> ")?;
//! editor.add_history(&line);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod buffer;
pub mod complete;
pub mod cursor;
pub mod editor;
pub mod error;
pub mod history;
pub mod mode;
pub mod options;
pub mod session;

pub use complete::{Complete, NoCompletion, WordList};
pub use cursor::{Grid, GridPos};
pub use editor::LineEditor;
pub use error::ReadLineError;
pub use history::History;
pub use mode::EditMode;
pub use options::EditorOptions;
