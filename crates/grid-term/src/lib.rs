// SPDX-License-Identifier: MIT
//
// grid-term — character-grid console for gridline.
//
// A line editor needs very little from a terminal: its size, a cursor it
// can read and place, a way to write text, and a stream of decoded key
// strokes. This crate provides exactly that as the `Console` trait, with
// two implementations: `AnsiConsole` drives the controlling terminal in
// raw mode with plain ANSI escapes, `VirtualConsole` is an in-memory grid
// fed by a scripted key queue for tests and headless use.
//
// Output stays inline in the normal screen. No alternate screen, no
// full-frame redraws: the editor decides which cells change.

pub mod ansi;
pub mod console;
pub mod grid;
pub mod input;
pub mod reader;
pub mod terminal;

pub use console::{AnsiConsole, Console};
pub use grid::{CharGrid, VirtualConsole};
pub use input::{KeyStroke, Modifiers, ScanCode};
pub use terminal::{Point, Size};
