//! Line Reader (C1): a raw-mode terminal editor implementing §4.1's key
//! table, redisplay protocol, and completion protocol.
//!
//! The C original's `readline.c` is a thin canonical-mode `getchar` loop with
//! no raw-mode handling at all (see `include/readline.h`'s unused key
//! constants), so this module is built from the protocol description rather
//! than adapted line-by-line from a source file; it reuses the same
//! `nix::sys::termios` entry points [`crate::jobs::JobTable`] already uses
//! for saving and restoring terminal modes around a job.

pub mod completion;
pub mod raw_mode;

use std::io::{self, Read, Write};
use std::os::fd::RawFd;

use self::raw_mode::{terminal_width, RawMode};
use crate::errors::ShellResult;
use crate::state::State;

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const CTRL_H: u8 = 0x08;
const CTRL_L: u8 = 0x0c;
const TAB: u8 = b'\t';
const ENTER_LF: u8 = b'\n';
const ENTER_CR: u8 = b'\r';
const BACKSPACE: u8 = 0x7f;
const ESC: u8 = 0x1b;

/// Reads one logical line at a time from a terminal, in raw mode.
pub struct LineReader {
    terminal_fd: RawFd,
}

impl LineReader {
    pub fn new(terminal_fd: RawFd) -> LineReader {
        LineReader { terminal_fd }
    }

    /// Reads one line per §4.1. Returns `Ok(None)` on end of input (Ctrl-D
    /// with an empty buffer, or EOF on a non-terminal stdin).
    pub fn read_line(&self, prompt: &str, state: &State) -> ShellResult<Option<String>> {
        if !is_a_tty(self.terminal_fd) {
            return read_line_plain(prompt);
        }

        let _raw = RawMode::enable(self.terminal_fd)?;
        let mut buffer = String::new();
        let mut cursor = 0usize;
        let mut history_cursor = state.history_len();
        let mut draft: Option<String> = None;

        redisplay(prompt, &buffer, cursor)?;

        let mut stdin = io::stdin();
        let mut byte = [0u8; 1];
        loop {
            if stdin.read(&mut byte)? == 0 {
                return Ok(None);
            }
            match byte[0] {
                ENTER_CR | ENTER_LF => {
                    print!("\r\n");
                    io::stdout().flush()?;
                    return Ok(Some(buffer));
                }
                CTRL_C => {
                    buffer.clear();
                    cursor = 0;
                    history_cursor = state.history_len();
                    draft = None;
                    print!("\r\n");
                    redisplay(prompt, &buffer, cursor)?;
                }
                CTRL_D if buffer.is_empty() => return Ok(None),
                BACKSPACE | CTRL_H => {
                    if cursor > 0 {
                        let prev = prev_char_boundary(&buffer, cursor);
                        buffer.drain(prev..cursor);
                        cursor = prev;
                        redisplay(prompt, &buffer, cursor)?;
                    }
                }
                CTRL_L => {
                    print!("\x1b[H\x1b[2J");
                    redisplay(prompt, &buffer, cursor)?;
                }
                TAB => {
                    self.complete(prompt, &mut buffer, &mut cursor)?;
                }
                ESC => {
                    self.handle_escape(&mut buffer, &mut cursor, &mut history_cursor, &mut draft, state)?;
                    redisplay(prompt, &buffer, cursor)?;
                }
                b if (0x20..0x7f).contains(&b) => {
                    buffer.insert(cursor, b as char);
                    cursor += 1;
                    redisplay(prompt, &buffer, cursor)?;
                }
                _ => {}
            }
        }
    }

    fn handle_escape(
        &self,
        buffer: &mut String,
        cursor: &mut usize,
        history_cursor: &mut usize,
        draft: &mut Option<String>,
        state: &State,
    ) -> ShellResult<()> {
        let mut stdin = io::stdin();
        let mut bracket = [0u8; 1];
        if stdin.read(&mut bracket)? == 0 || bracket[0] != b'[' {
            return Ok(());
        }
        let mut code = [0u8; 1];
        if stdin.read(&mut code)? == 0 {
            return Ok(());
        }
        let mut final_byte = code[0];
        if final_byte.is_ascii_digit() {
            let mut tail = [0u8; 1];
            while stdin.read(&mut tail)? != 0 && tail[0] != b'~' {
                final_byte = tail[0];
            }
            final_byte = match code[0] {
                b'1' | b'7' => b'H',
                b'4' | b'8' => b'F',
                other => other,
            };
        }

        match final_byte {
            b'A' => history_up(buffer, cursor, history_cursor, draft, state),
            b'B' => history_down(buffer, cursor, history_cursor, draft, state),
            b'C' if *cursor < buffer.len() => *cursor = next_char_boundary(buffer, *cursor),
            b'D' if *cursor > 0 => *cursor = prev_char_boundary(buffer, *cursor),
            b'H' => *cursor = 0,
            b'F' => *cursor = buffer.len(),
            _ => {}
        }
        Ok(())
    }

    fn complete(&self, prompt: &str, buffer: &mut String, cursor: &mut usize) -> ShellResult<()> {
        let found = completion::complete(buffer, *cursor);
        match found.candidates.len() {
            0 => {
                print!("\x07");
                io::stdout().flush()?;
            }
            1 => {
                let replacement = found.candidates[0].clone();
                buffer.replace_range(found.token_start..found.token_end, &replacement);
                *cursor = found.token_start + replacement.len();
                redisplay(prompt, buffer, *cursor)?;
            }
            _ => {
                let common = found.common_prefix().to_string();
                let current = &buffer[found.token_start..found.token_end];
                if common.len() > current.len() {
                    buffer.replace_range(found.token_start..found.token_end, &common);
                    *cursor = found.token_start + common.len();
                    redisplay(prompt, buffer, *cursor)?;
                } else {
                    self.display_candidates(&found.candidates)?;
                    redisplay(prompt, buffer, *cursor)?;
                }
            }
        }
        Ok(())
    }

    fn display_candidates(&self, candidates: &[String]) -> ShellResult<()> {
        if candidates.len() > completion::MANY_COMPLETIONS_THRESHOLD {
            print!("\r\nDisplay all {} possibilities? (y or n)", candidates.len());
            io::stdout().flush()?;
            let mut answer = [0u8; 1];
            io::stdin().read_exact(&mut answer)?;
            print!("\r\n");
            if answer[0] != b'y' && answer[0] != b'Y' {
                return Ok(());
            }
        } else {
            print!("\r\n");
        }
        let width = terminal_width(io::stdin());
        print!("{}", completion::format_columns(candidates, width));
        io::stdout().flush()?;
        Ok(())
    }
}

fn history_up(
    buffer: &mut String,
    cursor: &mut usize,
    history_cursor: &mut usize,
    draft: &mut Option<String>,
    state: &State,
) {
    if *history_cursor == 0 {
        return;
    }
    if *history_cursor == state.history_len() {
        *draft = Some(buffer.clone());
    }
    *history_cursor -= 1;
    if let Some(entry) = state.history_entry(*history_cursor + 1) {
        *buffer = entry.clone();
        *cursor = buffer.len();
    }
}

fn history_down(
    buffer: &mut String,
    cursor: &mut usize,
    history_cursor: &mut usize,
    draft: &mut Option<String>,
    state: &State,
) {
    if *history_cursor >= state.history_len() {
        return;
    }
    *history_cursor += 1;
    if *history_cursor == state.history_len() {
        *buffer = draft.take().unwrap_or_default();
    } else if let Some(entry) = state.history_entry(*history_cursor + 1) {
        *buffer = entry.clone();
    }
    *cursor = buffer.len();
}

/// CR, prompt, buffer, erase-to-EOL, CR, reposition -- §4.1's redisplay
/// protocol, verbatim.
fn redisplay(prompt: &str, buffer: &str, cursor: usize) -> ShellResult<()> {
    let mut out = io::stdout();
    let column = prompt.chars().count() + buffer[..cursor].chars().count();
    write!(out, "\r{prompt}{buffer}\x1b[K\r")?;
    if column > 0 {
        write!(out, "\x1b[{column}C")?;
    }
    out.flush()?;
    Ok(())
}

fn prev_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.saturating_sub(1);
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn next_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn is_a_tty(fd: RawFd) -> bool {
    nix::unistd::isatty(fd).unwrap_or(false)
}

/// Non-terminal fallback (piped stdin): a plain, unedited line read.
fn read_line_plain(prompt: &str) -> ShellResult<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    let bytes_read = io::stdin().read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_up_then_down_restores_draft() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo one");
        state.record_history("echo two");

        let mut buffer = "draft text".to_string();
        let mut cursor = buffer.len();
        let mut history_cursor = state.history_len();
        let mut draft = None;

        history_up(&mut buffer, &mut cursor, &mut history_cursor, &mut draft, &state);
        assert_eq!(buffer, "echo two");

        history_up(&mut buffer, &mut cursor, &mut history_cursor, &mut draft, &state);
        assert_eq!(buffer, "echo one");

        history_down(&mut buffer, &mut cursor, &mut history_cursor, &mut draft, &state);
        history_down(&mut buffer, &mut cursor, &mut history_cursor, &mut draft, &state);
        assert_eq!(buffer, "draft text");
    }

    #[test]
    fn char_boundary_helpers_skip_multibyte_sequences() {
        let s = "a\u{00e9}b"; // 'a', 'é' (2 bytes), 'b'
        let end = s.len();
        let before_b = prev_char_boundary(s, end);
        assert_eq!(&s[before_b..end], "b");
        let before_e = prev_char_boundary(s, before_b);
        assert_eq!(&s[before_e..before_b], "\u{00e9}");
        assert_eq!(next_char_boundary(s, 0), 1);
    }
}
