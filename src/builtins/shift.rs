//! `shift [N]`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    let n = match args.first() {
        Some(raw) => raw
            .parse()
            .map_err(|_| ShellError::builtin("shift", format!("{raw}: numeric argument required"), 1))?,
        None => 1,
    };
    state
        .shift(n)
        .map_err(|message| ShellError::builtin("shift", message, 1))?;
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_defaults_to_one() {
        let mut state = State::new("hush", vec!["a".into(), "b".into()]);
        run(&[], &mut state).unwrap();
        assert_eq!(state.positional(), &["b".to_string()]);
    }

    #[test]
    fn shift_past_the_end_errors() {
        let mut state = State::new("hush", vec!["a".into()]);
        assert!(run(&["5".to_string()], &mut state).is_err());
    }
}
