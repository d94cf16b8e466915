//! History expansion (C2.1), the first Expander stage.
//!
//! `!!`, `!N`, `!-N` are grounded in the distilled spec; the prefix-search
//! form (`!prefix`) is carried forward from the teacher's own
//! `Editor::expand_history`, which resolves a non-numeric `!arg` via a
//! reverse search instead of treating it as an error.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

/// Rewrites a leading `!...` history reference in `line` using `state`'s
/// history ring. Lines that do not start with `!` pass through unchanged.
/// "No expansion fails silently produces the original line" (§4.2.1) for the
/// single case the distilled spec calls out -- bare `!` with nothing after
/// it -- but a reference that names a nonexistent entry is a builtin-style
/// error, matching the teacher's `event not found`.
pub fn expand(line: &str) -> ShellResult<String> {
    expand_with(line, |_| None)
}

/// Same as [`expand`] but resolves references against an actual [`State`].
pub fn expand_in(line: &str, state: &State) -> ShellResult<String> {
    expand_with(line, |arg| resolve(arg, state))
}

fn expand_with(line: &str, resolve: impl FnOnce(&str) -> Option<String>) -> ShellResult<String> {
    if !line.starts_with('!') {
        return Ok(line.to_string());
    }
    let arg = &line[1..];
    if arg.is_empty() {
        return Ok(line.to_string());
    }
    match resolve(arg) {
        Some(resolved) => Ok(resolved),
        None => Err(ShellError::builtin("history", format!("{line}: event not found"), 1)),
    }
}

fn resolve(arg: &str, state: &State) -> Option<String> {
    if arg == "!" {
        return state.last_history_entry().cloned();
    }
    if let Ok(n) = arg.parse::<isize>() {
        return if n >= 0 {
            state.history_entry(n as usize).cloned()
        } else {
            state.history_entry_from_end((-n) as usize).cloned()
        };
    }
    state.history_entry_by_prefix(arg).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_bang_lines_pass_through() {
        assert_eq!(expand("echo hi").unwrap(), "echo hi");
    }

    #[test]
    fn bang_bang_repeats_the_last_entry() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo a");
        state.record_history("echo b");
        assert_eq!(expand_in("!!", &state).unwrap(), "echo b");
    }

    #[test]
    fn bang_n_indexes_from_the_start() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo a");
        state.record_history("echo b");
        assert_eq!(expand_in("!1", &state).unwrap(), "echo a");
    }

    #[test]
    fn bang_negative_n_indexes_from_the_end() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo a");
        state.record_history("echo b");
        assert_eq!(expand_in("!-1", &state).unwrap(), "echo b");
    }

    #[test]
    fn bang_prefix_reverse_searches() {
        let mut state = State::new("hush", vec![]);
        state.record_history("git status");
        state.record_history("echo hi");
        assert_eq!(expand_in("!git", &state).unwrap(), "git status");
    }

    #[test]
    fn unresolvable_reference_is_an_error() {
        let state = State::new("hush", vec![]);
        assert!(expand_in("!5", &state).is_err());
    }
}
