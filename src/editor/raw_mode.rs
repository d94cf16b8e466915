//! Raw input mode (§4.1: "character echo disabled, canonical line editing
//! disabled, signal generation disabled").
//!
//! Uses the same `nix::sys::termios` entry points [`crate::jobs::JobTable`]
//! already relies on for saving and restoring a job's terminal modes; this
//! module does the analogous save/restore around a single line read instead
//! of around a job.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

use nix::sys::termios::{self, LocalFlags, SetArg, Termios};

use crate::errors::ShellResult;

nix::ioctl_read_bad!(window_size, nix::libc::TIOCGWINSZ, nix::libc::winsize);

/// Puts `fd`'s terminal into raw mode and returns the previous attributes,
/// which the caller must pass to [`restore`] once the read completes (on
/// every return path, including early ones -- the spec's "atexit-style
/// hook").
pub struct RawMode {
    fd: std::os::fd::RawFd,
    saved: Termios,
}

impl RawMode {
    /// Disables `ECHO`, `ICANON`, and `ISIG` so Ctrl-C/Ctrl-Z arrive as
    /// ordinary bytes instead of terminal-generated signals.
    pub fn enable(fd: std::os::fd::RawFd) -> ShellResult<RawMode> {
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        let saved = termios::tcgetattr(borrowed)?;
        let mut raw = saved.clone();
        raw.local_flags
            .remove(LocalFlags::ECHO | LocalFlags::ICANON | LocalFlags::ISIG);
        termios::tcsetattr(borrowed, SetArg::TCSANOW, &raw)?;
        Ok(RawMode { fd, saved })
    }
}

impl Drop for RawMode {
    /// Restores the mode captured at [`RawMode::enable`], regardless of how
    /// the reader returned.
    fn drop(&mut self) {
        let borrowed = unsafe { BorrowedFd::borrow_raw(self.fd) };
        let _ = termios::tcsetattr(borrowed, SetArg::TCSANOW, &self.saved);
    }
}

/// Current terminal width in columns, used to size the completion column
/// display; falls back to 80 when it cannot be determined (no controlling
/// terminal, or `ioctl` failure).
pub fn terminal_width(fd: impl AsFd) -> usize {
    let mut size = nix::libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    match unsafe { window_size(fd.as_fd().as_raw_fd(), &mut size) } {
        Ok(_) if size.ws_col > 0 => size.ws_col as usize,
        _ => 80,
    }
}
