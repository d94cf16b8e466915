//! `exit [N]`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &State) -> ShellResult<BuiltinOutcome> {
    let code = match args.first() {
        None => state.last_exit_status,
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| ShellError::builtin("exit", format!("{raw}: numeric argument required"), 2))?,
    };
    Ok(BuiltinOutcome::Exit(normalize_exit_code(code)))
}

/// Folds an arbitrary exit code into the 0..=255 range a real process exit
/// status can carry, matching how a negative or overflowing `exit N` behaves
/// in practice.
fn normalize_exit_code(code: i32) -> i32 {
    if code < 0 {
        256 + (code % 256)
    } else {
        code % 256
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_with_no_args_uses_last_status() {
        let mut state = State::new("hush", vec![]);
        state.last_exit_status = 7;
        assert_eq!(run(&[], &state).unwrap(), BuiltinOutcome::Exit(7));
    }

    #[test]
    fn exit_normalizes_negative_and_large_codes() {
        assert_eq!(normalize_exit_code(-1), 255);
        assert_eq!(normalize_exit_code(300), 44);
        assert_eq!(normalize_exit_code(0), 0);
    }

    #[test]
    fn exit_rejects_non_numeric_argument() {
        let state = State::new("hush", vec![]);
        assert!(run(&["nope".to_string()], &state).is_err());
    }
}
