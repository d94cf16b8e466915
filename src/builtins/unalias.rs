//! `unalias [-a] NAME...`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    if args.first().map(String::as_str) == Some("-a") {
        state.clear_aliases();
        return Ok(BuiltinOutcome::Continue(0));
    }
    if args.is_empty() {
        return Err(ShellError::builtin("unalias", "usage: unalias [-a] NAME...", 1));
    }
    for arg in args {
        if !state.unset_alias(arg) {
            return Err(ShellError::builtin("unalias", format!("{arg}: not found"), 1));
        }
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unalias_dash_a_clears_everything() {
        let mut state = State::new("hush", vec![]);
        state.set_alias("ll", "ls -l");
        run(&["-a".to_string()], &mut state).unwrap();
        assert_eq!(state.all_aliases().len(), 0);
    }

    #[test]
    fn unalias_unknown_name_errors() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&["ghost".to_string()], &mut state).is_err());
    }
}
