//! `unset NAME...`.

use crate::errors::ShellResult;
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    for arg in args {
        state.unset(arg);
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_removes_a_variable() {
        let mut state = State::new("hush", vec![]);
        state.set("FOO", "bar");
        run(&["FOO".to_string()], &mut state).unwrap();
        assert_eq!(state.get("FOO"), None);
    }
}
