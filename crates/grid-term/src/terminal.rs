// SPDX-License-Identifier: MIT
//
// Terminal geometry and raw mode.
//
// A line editor works inline: the prompt, the line being edited and
// everything printed before it stay in the normal scrollback. Raw mode is
// the only terminal state we change, so it is the only state we restore.
//
// The termios snapshot taken on entering raw mode lives in one process-wide
// slot. `RawMode::leave`, `Drop` and the panic hook all restore from that
// slot, so whichever runs first wins and the others find it empty.
//
// Raw mode clears OPOST: a bare `\n` moves down without returning to
// column 0, so callers write `\r\n`.
#![allow(unsafe_code)]

use std::io;
use std::sync::{Mutex, Once};

// ─── Geometry ───────────────────────────────────────────────────────────────

/// Grid dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Used when the real geometry is unknown.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    /// Number of cells.
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

/// A cell address, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub col: u16,
    pub row: u16,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }
}

// ─── Queries ────────────────────────────────────────────────────────────────

/// Window size of the terminal behind stdout, or behind stdin when stdout
/// is redirected. `None` when neither is a terminal.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    [libc::STDOUT_FILENO, libc::STDIN_FILENO]
        .into_iter()
        .find_map(window_size)
}

#[cfg(unix)]
fn window_size(fd: libc::c_int) -> Option<Size> {
    // SAFETY: TIOCGWINSZ writes one `winsize` into the struct we own.
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &raw mut ws) };
    (rc == 0 && ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// True when stdin is a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    // SAFETY: isatty only inspects the descriptor.
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Saved termios ──────────────────────────────────────────────────────────

#[cfg(unix)]
static SAVED: Mutex<Option<libc::termios>> = Mutex::new(None);

static HOOK: Once = Once::new();

/// Put back the saved termios, if any. Returns whether there was one.
#[cfg(unix)]
fn restore_saved() -> io::Result<bool> {
    let Ok(mut slot) = SAVED.lock() else {
        return Ok(false);
    };
    let Some(saved) = slot.take() else {
        return Ok(false);
    };
    // SAFETY: `saved` came from tcgetattr on the same descriptor.
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const saved) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(true)
}

#[cfg(not(unix))]
fn restore_saved() -> io::Result<bool> {
    Ok(false)
}

/// A panic in raw mode would leave the shell unusable; restore first, then
/// let the previous hook print the message.
fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_saved();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn switch_to_raw() -> io::Result<()> {
    if !is_tty() {
        return Ok(());
    }
    let Ok(mut slot) = SAVED.lock() else {
        return Err(io::Error::other("termios slot poisoned"));
    };
    if slot.is_some() {
        return Ok(());
    }

    // SAFETY: plain termios calls on stdin with structs we own.
    unsafe {
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        let saved = termios;
        libc::cfmakeraw(&raw mut termios);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) != 0 {
            return Err(io::Error::last_os_error());
        }
        *slot = Some(saved);
    }
    Ok(())
}

#[cfg(not(unix))]
fn switch_to_raw() -> io::Result<()> {
    Ok(())
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw-mode guard for stdin.
///
/// While active, keys arrive byte by byte with no echo and no signal
/// handling (Ctrl-C is just 0x03). Leaving, dropping the guard, or a panic
/// restores the previous mode. Without a terminal on stdin both directions
/// are no-ops.
///
/// ```no_run
/// use grid_term::terminal::RawMode;
///
/// let mut raw = RawMode::new();
/// raw.enter()?;
/// // read keys, edit a line
/// raw.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct RawMode {
    active: bool,
}

impl RawMode {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: false }
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Switch stdin to raw mode. Entering twice is harmless.
    ///
    /// # Errors
    ///
    /// The OS error from `tcgetattr`/`tcsetattr`.
    pub fn enter(&mut self) -> io::Result<()> {
        if !self.active {
            install_panic_hook();
            switch_to_raw()?;
            self.active = true;
        }
        Ok(())
    }

    /// Restore the mode saved by [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// The OS error from `tcsetattr`.
    pub fn leave(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            restore_saved()?;
        }
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_multiplies() {
        assert_eq!(Size { cols: 80, rows: 24 }.area(), 1920);
        assert_eq!(Size { cols: 80, rows: 0 }.area(), 0);
        assert_eq!(Size { cols: u16::MAX, rows: u16::MAX }.area(), 65535 * 65535);
    }

    #[test]
    fn fallback_is_80_by_24() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn point_default_is_origin() {
        assert_eq!(Point::default(), Point::new(0, 0));
    }

    #[test]
    fn queries_do_not_panic() {
        let _ = get_size();
        let _ = is_tty();
    }

    #[test]
    fn enter_and_leave() {
        let mut raw = RawMode::new();
        assert!(!raw.is_active());
        raw.enter().unwrap();
        raw.enter().unwrap();
        assert!(raw.is_active());
        raw.leave().unwrap();
        raw.leave().unwrap();
        assert!(!raw.is_active());
    }

    #[test]
    fn leave_without_enter_is_noop() {
        let mut raw = RawMode::default();
        raw.leave().unwrap();
        assert!(!raw.is_active());
    }

    #[test]
    fn drop_while_active() {
        let mut raw = RawMode::new();
        raw.enter().unwrap();
        drop(raw);
    }
}
