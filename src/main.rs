// SPDX-License-Identifier: MIT
//
// gridline — a line-at-a-time shell on a character grid.
//
// This binary wires the two crates together and stands in for the program
// that would consume the lines (an interpreter, a command shell):
//
//   grid-term → raw mode, key decoding, ANSI console
//   line-edit → the line editor, history, options
//
// Each line flows through:
//
//   keys → LineEditor::readline → committed text → add_history → command
//
// A handful of `:` commands are answered here; anything else is echoed.
// When stdin is not a terminal the same commands run over plain lines.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use grid_term::{AnsiConsole, Console, terminal};
use line_edit::options::DEFAULT_CAPACITY;
use line_edit::{EditorOptions, LineEditor, WordList};

const PROMPT: &str = "> ";

/// Words Tab completes.
const COMMANDS: [&str; 5] = [":help", ":history", ":set", ":quit", ":exit"];

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "gridline", version, about = "Interactive line editing on a character grid")]
struct Cli {
    /// Line buffer capacity in characters (terminator included).
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Start in overwrite mode instead of insert mode.
    #[arg(long)]
    overwrite: bool,

    /// Write logs to this file. Without it nothing is logged.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Most verbose level written to the log file.
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: LevelFilter,
}

impl Cli {
    const fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            capacity: self.capacity,
            insert_mode: !self.overwrite,
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Log to `path` at `level`. Stdout is the UI, so there is no console
/// logging at all.
fn init_tracing(path: &Path, level: LevelFilter) -> miette::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| miette::miette!("{} has no parent directory", path.display()))?;
    let name = path
        .file_name()
        .ok_or_else(|| miette::miette!("{} has no file name", path.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(appender)
        .with_max_level(level)
        .with_ansi(false)
        .try_init()
        .map_err(|err| miette::miette!("cannot install the log subscriber: {err}"))
}

// ─── Commands ───────────────────────────────────────────────────────────────

/// What the shell does with a committed line.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Print(Vec<String>),
    Quit,
}

fn run_command(editor: &mut LineEditor, line: &str) -> Reply {
    let trimmed = line.trim();
    let (command, args) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

    match command {
        "" => Reply::Print(Vec::new()),
        ":quit" | ":exit" => Reply::Quit,
        ":help" => Reply::Print(vec![COMMANDS.join("  ")]),
        ":history" => Reply::Print(
            editor
                .history()
                .iter()
                .enumerate()
                .map(|(i, entry)| format!("{:>4}  {entry}", i + 1))
                .collect(),
        ),
        ":set" => match editor.set_options(args) {
            Ok(messages) => Reply::Print(messages),
            Err(err) => Reply::Print(vec![format!("E: {err}")]),
        },
        _ if command.starts_with(':') => Reply::Print(vec![format!("E: not a command: {command}")]),
        _ => Reply::Print(vec![line.to_owned()]),
    }
}

// ─── Front ends ─────────────────────────────────────────────────────────────

fn run_interactive(editor: &mut LineEditor) -> miette::Result<()> {
    let mut console = AnsiConsole::new()
        .into_diagnostic()
        .wrap_err("cannot put the terminal in raw mode")?;
    tracing::info!(size = ?console.grid_size(), "interactive session started");

    loop {
        match editor.readline(&mut console, PROMPT) {
            Ok(line) => {
                if !line.is_empty() {
                    editor.add_history(&line);
                }
                match run_command(editor, &line) {
                    Reply::Quit => break,
                    Reply::Print(lines) => {
                        for text in lines {
                            console.write_text(&text).into_diagnostic()?;
                            console.write_text("\r\n").into_diagnostic()?;
                        }
                    }
                }
            }
            // Ctrl-C abandons the line; the session already moved below it.
            Err(err) if err.is_interrupted() => tracing::debug!("line abandoned"),
            Err(err) if err.is_eof() => break,
            Err(err) => return Err(err).into_diagnostic().wrap_err("reading a line failed"),
        }
    }

    tracing::info!(history = editor.history().len(), "interactive session ended");
    console.release().into_diagnostic()
}

fn run_script(editor: &mut LineEditor, input: impl BufRead, mut out: impl Write) -> miette::Result<()> {
    for line in input.lines() {
        let line = line.into_diagnostic()?;
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            editor.add_history(line);
        }
        match run_command(editor, line) {
            Reply::Quit => break,
            Reply::Print(lines) => {
                for text in lines {
                    writeln!(out, "{text}").into_diagnostic()?;
                }
            }
        }
    }
    out.flush().into_diagnostic()
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_tracing(path, cli.log_level)?;
    }

    let mut editor =
        LineEditor::new(cli.editor_options()).with_completer(WordList::new(COMMANDS));

    if terminal::is_tty() {
        run_interactive(&mut editor)
    } else {
        tracing::info!("stdin is not a terminal, reading lines");
        run_script(&mut editor, io::stdin().lock(), io::stdout().lock())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use line_edit::EditMode;
    use pretty_assertions::assert_eq;

    fn script(input: &str) -> (LineEditor, String) {
        let mut editor = LineEditor::default();
        let mut out = Vec::new();
        run_script(&mut editor, input.as_bytes(), &mut out).unwrap();
        (editor, String::from_utf8(out).unwrap())
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["gridline"]);
        assert_eq!(cli.capacity, 4096);
        assert!(!cli.overwrite);
        assert_eq!(cli.log_level, LevelFilter::INFO);
        assert_eq!(cli.editor_options(), EditorOptions::default());
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "gridline",
            "--capacity",
            "64",
            "--overwrite",
            "--log-level",
            "trace",
        ]);
        assert_eq!(
            cli.editor_options(),
            EditorOptions {
                capacity: 64,
                insert_mode: false,
            }
        );
        assert_eq!(cli.log_level, LevelFilter::TRACE);
    }

    #[test]
    fn plain_lines_are_echoed() {
        let (editor, out) = script("hello\r\nworld\n");
        assert_eq!(out, "hello\nworld\n");
        assert_eq!(editor.history().iter().collect::<Vec<_>>(), ["hello", "world"]);
    }

    #[test]
    fn empty_lines_skip_history() {
        let (editor, out) = script("\n\nx\n");
        assert_eq!(out, "x\n");
        assert_eq!(editor.history().len(), 1);
    }

    #[test]
    fn history_command_lists_entries() {
        let (_, out) = script("one\ntwo\n:history\n");
        assert_eq!(out, "one\ntwo\n   1  one\n   2  two\n   3  :history\n");
    }

    #[test]
    fn quit_stops_reading() {
        let (_, out) = script("a\n:quit\nb\n");
        assert_eq!(out, "a\n");
    }

    #[test]
    fn set_changes_the_editor() {
        let mut editor = LineEditor::default();
        assert_eq!(run_command(&mut editor, ":set noinsert"), Reply::Print(Vec::new()));
        assert_eq!(editor.mode(), EditMode::Overwrite);
        assert_eq!(
            run_command(&mut editor, ":set insert?"),
            Reply::Print(vec!["noinsert".to_owned()])
        );
        assert_eq!(
            run_command(&mut editor, ":set bogus"),
            Reply::Print(vec!["E: unknown option: bogus".to_owned()])
        );
    }

    #[test]
    fn unknown_commands_are_reported() {
        let mut editor = LineEditor::default();
        assert_eq!(
            run_command(&mut editor, ":frobnicate now"),
            Reply::Print(vec!["E: not a command: :frobnicate".to_owned()])
        );
    }

    #[test]
    fn commands_complete() {
        use line_edit::Complete;
        let words = WordList::new(COMMANDS);
        assert_eq!(words.candidates(":h"), [":help", ":history"]);
    }
}
