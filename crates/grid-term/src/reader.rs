// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A dedicated thread reads stdin and forwards byte chunks over a channel.
// The console waits on that channel with a deadline, which a blocking
// `read()` cannot do: we need deadlines to tell a lone ESC from the start
// of an escape sequence, and to give up on a cursor report the terminal
// never sends.
//
// Shutdown: the thread polls stdin with a short timeout and checks an
// `AtomicBool` between polls, so dropping the reader never leaves a thread
// stuck in `read()`.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A keypress is a handful of bytes; a pasted line can be a few KB.
const READ_BUF_SIZE: usize = 4096;

/// How often the thread re-checks the stop flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// What [`StdinReader::recv`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A non-empty run of raw bytes.
    Bytes(Vec<u8>),
    /// Nothing arrived before the deadline.
    Timeout,
    /// Stdin reached end of file (or the thread is gone).
    Closed,
}

/// Background stdin reader thread.
///
/// The thread runs until the reader is dropped or stdin hits EOF.
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<Vec<u8>>,
}

impl std::fmt::Debug for StdinReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinReader")
            .field("running", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || reader_loop(&tx, &stop_flag))?;

        Ok(Self {
            handle: Some(handle),
            stop,
            rx,
        })
    }

    /// Block until bytes arrive, stdin closes, or `timeout` elapses.
    ///
    /// `None` waits indefinitely.
    pub fn recv(&self, timeout: Option<Duration>) -> Chunk {
        let received = match timeout {
            Some(t) => self.rx.recv_timeout(t),
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(bytes) => Chunk::Bytes(bytes),
            Err(RecvTimeoutError::Timeout) => Chunk::Timeout,
            Err(RecvTimeoutError::Disconnected) => Chunk::Closed,
        }
    }

    /// Signal the thread to stop and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Poll stdin, read what is there, forward it. Exits on stop, EOF, read
/// error, or when the receiving side is gone.
#[cfg(unix)]
fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n <= 0 {
            break;
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
        let chunk = buf[..n as usize].to_vec();
        if tx.send(chunk).is_err() {
            break;
        }
    }
}

/// Blocking fallback without `poll()`: shutdown waits for the next read.
#[cfg(not(unix))]
fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
