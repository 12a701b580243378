// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into key strokes shaped like a firmware key
// record: an optional character plus an optional named scan code. A line
// editor needs nothing richer, so mouse, paste and focus protocols are
// never enabled and never decoded.
//
// Handled encodings:
//
// - Control bytes (CR/LF, BS/DEL, TAB, Ctrl+letter)
// - Legacy CSI sequences (arrows, Home/End, editing keys, F1-F12)
// - SS3 sequences (arrows and F1-F4 from application-mode terminals)
// - Alt+key (ESC followed by a printable or control byte)
// - UTF-8 multi-byte characters
// - Cursor position reports (`ESC [ row ; col R`), the answer to DSR 6
//
// The decoder buffers incomplete sequences across `advance` calls. A lone
// ESC stays pending until the caller's idle timeout, then `flush` turns it
// into an Escape key stroke.

use bitflags::bitflags;

use crate::terminal::Point;

// ─── Key Strokes ────────────────────────────────────────────────────────────

/// Named non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanCode {
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    Insert,
    Delete,
    PageUp,
    PageDown,
    Escape,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys held during a key stroke.
    ///
    /// Bit layout matches the xterm CSI modifier parameter
    /// (`param = 1 + bitmask`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// One key stroke.
///
/// Exactly one of `ch` and `scan` is normally set. Enter, Backspace and Tab
/// arrive as characters ([`CARRIAGE_RETURN`](Self::CARRIAGE_RETURN),
/// [`BACKSPACE`](Self::BACKSPACE), [`TAB`](Self::TAB)); Ctrl+letter arrives
/// as the matching C0 control character with [`Modifiers::CTRL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyStroke {
    pub ch: Option<char>,
    pub scan: Option<ScanCode>,
    pub modifiers: Modifiers,
}

impl KeyStroke {
    pub const CARRIAGE_RETURN: char = '\r';
    pub const BACKSPACE: char = '\u{8}';
    pub const TAB: char = '\t';

    /// A character key stroke with no modifiers.
    #[inline]
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self {
            ch: Some(ch),
            scan: None,
            modifiers: Modifiers::empty(),
        }
    }

    /// A scan-code key stroke with no modifiers.
    #[inline]
    #[must_use]
    pub const fn scan(code: ScanCode) -> Self {
        Self {
            ch: None,
            scan: Some(code),
            modifiers: Modifiers::empty(),
        }
    }

    /// The same key stroke with `modifiers` held.
    #[inline]
    #[must_use]
    pub const fn with(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }

    /// Control-key shorthand: `KeyStroke::ctrl('c')` is Ctrl+C (0x03).
    #[must_use]
    pub fn ctrl(letter: char) -> Self {
        let code = (letter.to_ascii_lowercase() as u32)
            .wrapping_sub('a' as u32)
            .wrapping_add(1);
        let ch = char::from_u32(code & 0x1F).unwrap_or('\0');
        Self::char(ch).with(Modifiers::CTRL)
    }

    /// True for a character at or above space (and not DEL).
    #[inline]
    #[must_use]
    pub fn is_printable(self) -> bool {
        self.ch.is_some_and(|c| c >= ' ' && c != '\u{7f}')
    }
}

/// A decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyStroke),
    /// Answer to a cursor position request, converted to 0-indexed.
    CursorReport(Point),
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte decoder.
///
/// Feed raw bytes via [`advance`](Parser::advance); incomplete sequences
/// are kept and completed by later calls.
#[derive(Debug)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed raw bytes and return every event that can be decoded so far.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }
        events
    }

    /// Bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes after an idle timeout.
    ///
    /// A lone ESC becomes [`ScanCode::Escape`]; any other leftovers are
    /// emitted as plain characters.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(KeyStroke::scan(ScanCode::Escape)),
                0x20..=0x7E => Some(KeyStroke::char(char::from(byte))),
                _ => None,
            })
            .map(Event::Key)
            .collect();
        self.buf.clear();
        events
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

enum Parsed {
    Event(Event, usize),
    Incomplete,
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&lead) = buf.first() else {
        return Parsed::Skip(0);
    };

    match lead {
        0x1B => parse_escape(buf),
        0x0A | 0x0D => key(KeyStroke::char(KeyStroke::CARRIAGE_RETURN), 1),
        0x08 | 0x7F => key(KeyStroke::char(KeyStroke::BACKSPACE), 1),
        0x09 => key(KeyStroke::char(KeyStroke::TAB), 1),
        b @ 0x00..=0x1F => key(KeyStroke::char(char::from(b)).with(Modifiers::CTRL), 1),
        b @ 0x20..=0x7E => key(KeyStroke::char(char::from(b)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        // Bare continuation byte.
        _ => Parsed::Skip(1),
    }
}

const fn key(stroke: KeyStroke, consumed: usize) -> Parsed {
    Parsed::Event(Event::Key(stroke), consumed)
}

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => key(KeyStroke::scan(ScanCode::Escape).with(Modifiers::ALT), 2),
        b @ 0x20..=0x7E => key(KeyStroke::char(char::from(b)).with(Modifiers::ALT), 2),
        b @ 0x01..=0x1A => key(
            KeyStroke::char(char::from(b)).with(Modifiers::ALT | Modifiers::CTRL),
            2,
        ),
        _ => key(KeyStroke::scan(ScanCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Final byte is 0x40..=0x7E; parameters and intermediates sit in 0x20..=0x3F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_csi_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    if final_byte == b'~' {
        let code = match params.first().copied().unwrap_or(0) {
            1 | 7 => ScanCode::Home,
            2 => ScanCode::Insert,
            3 => ScanCode::Delete,
            4 | 8 => ScanCode::End,
            5 => ScanCode::PageUp,
            6 => ScanCode::PageDown,
            15 => ScanCode::F(5),
            17 => ScanCode::F(6),
            18 => ScanCode::F(7),
            19 => ScanCode::F(8),
            20 => ScanCode::F(9),
            21 => ScanCode::F(10),
            23 => ScanCode::F(11),
            24 => ScanCode::F(12),
            _ => return Parsed::Skip(consumed),
        };
        return key(KeyStroke::scan(code).with(modifiers), consumed);
    }

    // `CSI row ; col R` is a cursor report. A bare `CSI R` (or `CSI 1 ; m R`
    // from very old xterms) would be F3, but we only ever see `R` in answer
    // to our own DSR request, so two parameters always mean a report.
    if final_byte == b'R' && params.len() == 2 {
        let row = params[0].saturating_sub(1);
        let col = params[1].saturating_sub(1);
        return Parsed::Event(Event::CursorReport(Point::new(col, row)), consumed);
    }

    let code = match final_byte {
        b'A' => ScanCode::Up,
        b'B' => ScanCode::Down,
        b'C' => ScanCode::Right,
        b'D' => ScanCode::Left,
        b'H' => ScanCode::Home,
        b'F' => ScanCode::End,
        b'P' => ScanCode::F(1),
        b'Q' => ScanCode::F(2),
        b'R' => ScanCode::F(3),
        b'S' => ScanCode::F(4),
        b'Z' => {
            return key(
                KeyStroke::char(KeyStroke::TAB).with(Modifiers::SHIFT),
                consumed,
            );
        }
        _ => return Parsed::Skip(consumed),
    };
    key(KeyStroke::scan(code).with(modifiers), consumed)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match b {
        b'A' => ScanCode::Up,
        b'B' => ScanCode::Down,
        b'C' => ScanCode::Right,
        b'D' => ScanCode::Left,
        b'H' => ScanCode::Home,
        b'F' => ScanCode::End,
        b'P' => ScanCode::F(1),
        b'Q' => ScanCode::F(2),
        b'R' => ScanCode::F(3),
        b'S' => ScanCode::F(4),
        _ => return Parsed::Skip(3),
    };
    key(KeyStroke::scan(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        return Parsed::Incomplete;
    }
    if buf[1..expected].iter().any(|&b| b & 0xC0 != 0x80) {
        return Parsed::Skip(1);
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(expected), |ch| {
            key(KeyStroke::char(ch), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated numeric CSI parameters. Empty fields read as 0.
fn parse_csi_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode the xterm modifier parameter (`1 + bitmask`). 0 and 1 mean none.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = if param > 0 { param - 1 } else { 0 };
    Modifiers::from_bits_truncate(val as u8)
}

/// Expected byte length of a UTF-8 character from its lead byte, 0 if invalid.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn parse_one(data: &[u8]) -> Event {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected 1 event, got {events:?}");
        events[0]
    }

    fn ch(c: char) -> Event {
        Event::Key(KeyStroke::char(c))
    }

    fn scan(code: ScanCode) -> Event {
        Event::Key(KeyStroke::scan(code))
    }

    // ── Characters ──────────────────────────────────────────────────────

    #[test]
    fn ascii_printable() {
        assert_eq!(parse_one(b"a"), ch('a'));
        assert_eq!(parse_one(b"~"), ch('~'));
        assert_eq!(parse_one(b" "), ch(' '));
    }

    #[test]
    fn enter_from_cr_and_lf() {
        assert_eq!(parse_one(b"\r"), ch('\r'));
        assert_eq!(parse_one(b"\n"), ch('\r'));
    }

    #[test]
    fn backspace_from_bs_and_del() {
        assert_eq!(parse_one(&[0x08]), ch(KeyStroke::BACKSPACE));
        assert_eq!(parse_one(&[0x7F]), ch(KeyStroke::BACKSPACE));
    }

    #[test]
    fn tab() {
        assert_eq!(parse_one(b"\t"), ch('\t'));
    }

    #[test]
    fn ctrl_c_is_control_char_with_ctrl() {
        assert_eq!(parse_one(&[0x03]), Event::Key(KeyStroke::ctrl('c')));
    }

    #[test]
    fn ctrl_helper_maps_letters() {
        assert_eq!(KeyStroke::ctrl('d').ch, Some('\u{4}'));
        assert_eq!(KeyStroke::ctrl('A').ch, Some('\u{1}'));
    }

    #[test]
    fn printable_classification() {
        assert!(KeyStroke::char('x').is_printable());
        assert!(KeyStroke::char(' ').is_printable());
        assert!(!KeyStroke::char('\r').is_printable());
        assert!(!KeyStroke::char('\u{7f}').is_printable());
        assert!(!KeyStroke::scan(ScanCode::Left).is_printable());
    }

    // ── CSI ─────────────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(
            parse(b"\x1b[A\x1b[B\x1b[C\x1b[D"),
            [
                scan(ScanCode::Up),
                scan(ScanCode::Down),
                scan(ScanCode::Right),
                scan(ScanCode::Left),
            ]
        );
    }

    #[test]
    fn home_end_letter_forms() {
        assert_eq!(parse_one(b"\x1b[H"), scan(ScanCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), scan(ScanCode::End));
    }

    #[test]
    fn tilde_editing_keys() {
        assert_eq!(parse_one(b"\x1b[1~"), scan(ScanCode::Home));
        assert_eq!(parse_one(b"\x1b[2~"), scan(ScanCode::Insert));
        assert_eq!(parse_one(b"\x1b[3~"), scan(ScanCode::Delete));
        assert_eq!(parse_one(b"\x1b[4~"), scan(ScanCode::End));
        assert_eq!(parse_one(b"\x1b[5~"), scan(ScanCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), scan(ScanCode::PageDown));
        assert_eq!(parse_one(b"\x1b[7~"), scan(ScanCode::Home));
        assert_eq!(parse_one(b"\x1b[8~"), scan(ScanCode::End));
    }

    #[test]
    fn tilde_function_keys() {
        assert_eq!(parse_one(b"\x1b[15~"), scan(ScanCode::F(5)));
        assert_eq!(parse_one(b"\x1b[18~"), scan(ScanCode::F(7)));
        assert_eq!(parse_one(b"\x1b[24~"), scan(ScanCode::F(12)));
    }

    #[test]
    fn unknown_tilde_is_skipped() {
        assert!(parse(b"\x1b[99~").is_empty());
    }

    #[test]
    fn modified_arrow() {
        assert_eq!(
            parse_one(b"\x1b[1;5D"),
            Event::Key(KeyStroke::scan(ScanCode::Left).with(Modifiers::CTRL))
        );
    }

    #[test]
    fn shift_tab() {
        assert_eq!(
            parse_one(b"\x1b[Z"),
            Event::Key(KeyStroke::char('\t').with(Modifiers::SHIFT))
        );
    }

    #[test]
    fn cursor_report_is_zero_indexed() {
        assert_eq!(
            parse_one(b"\x1b[12;40R"),
            Event::CursorReport(Point::new(39, 11))
        );
    }

    #[test]
    fn bare_csi_r_is_f3() {
        assert_eq!(parse_one(b"\x1b[R"), scan(ScanCode::F(3)));
    }

    #[test]
    fn invalid_byte_aborts_csi() {
        assert_eq!(parse(b"\x1b[1\x01a"), [ch('a')]);
    }

    // ── SS3 ─────────────────────────────────────────────────────────────

    #[test]
    fn ss3_keys() {
        assert_eq!(parse_one(b"\x1bOA"), scan(ScanCode::Up));
        assert_eq!(parse_one(b"\x1bOH"), scan(ScanCode::Home));
        assert_eq!(parse_one(b"\x1bOS"), scan(ScanCode::F(4)));
    }

    // ── Alt ─────────────────────────────────────────────────────────────

    #[test]
    fn alt_letter() {
        assert_eq!(
            parse_one(b"\x1bx"),
            Event::Key(KeyStroke::char('x').with(Modifiers::ALT))
        );
    }

    #[test]
    fn alt_escape() {
        assert_eq!(
            parse_one(b"\x1b\x1b"),
            Event::Key(KeyStroke::scan(ScanCode::Escape).with(Modifiers::ALT))
        );
    }

    // ── UTF-8 ───────────────────────────────────────────────────────────

    #[test]
    fn utf8_two_byte() {
        assert_eq!(parse_one(&[0xC3, 0xA9]), ch('é'));
    }

    #[test]
    fn utf8_incomplete_waits() {
        let mut parser = Parser::new();
        assert!(parser.advance(&[0xE4]).is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.advance(&[0xB8, 0xAD]), [ch('中')]);
    }

    #[test]
    fn utf8_bad_continuation_skipped() {
        assert_eq!(parse(&[0xC3, b'a']), [ch('a')]);
    }

    // ── Incremental / flush ─────────────────────────────────────────────

    #[test]
    fn lone_escape_pending_then_flushed() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b").is_empty());
        assert!(parser.has_pending());
        assert_eq!(parser.flush(), [scan(ScanCode::Escape)]);
        assert!(!parser.has_pending());
    }

    #[test]
    fn split_csi_sequence() {
        let mut parser = Parser::new();
        assert!(parser.advance(b"\x1b[3").is_empty());
        assert_eq!(parser.advance(b"~x"), [scan(ScanCode::Delete), ch('x')]);
    }

    #[test]
    fn typed_text_interleaved_with_report() {
        assert_eq!(
            parse(b"ab\x1b[1;1Rc"),
            [
                ch('a'),
                ch('b'),
                Event::CursorReport(Point::new(0, 0)),
                ch('c'),
            ]
        );
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    #[test]
    fn csi_params() {
        assert_eq!(parse_csi_params(b""), Vec::<u16>::new());
        assert_eq!(parse_csi_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_csi_params(b";7"), vec![0, 7]);
        assert_eq!(parse_csi_params(b"99999"), vec![u16::MAX]);
    }

    #[test]
    fn modifier_decoding() {
        assert_eq!(decode_modifiers(0), Modifiers::empty());
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(3), Modifiers::ALT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(6), Modifiers::SHIFT | Modifiers::CTRL);
    }

    #[test]
    fn utf8_lengths() {
        assert_eq!(utf8_char_len(b'a'), 1);
        assert_eq!(utf8_char_len(0xC3), 2);
        assert_eq!(utf8_char_len(0xE4), 3);
        assert_eq!(utf8_char_len(0xF0), 4);
        assert_eq!(utf8_char_len(0x80), 0);
    }
}
