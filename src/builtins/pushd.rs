//! `pushd DIR`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    let target = args
        .first()
        .ok_or_else(|| ShellError::builtin("pushd", "no other directory", 1))?;
    let previous = std::env::current_dir().unwrap_or_default();
    std::env::set_current_dir(target)
        .map_err(|e| ShellError::builtin("pushd", format!("{target}: {e}"), 1))?;
    state.push_dir(previous);
    super::dirs::print_stack(state, false);
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushd_with_no_args_errors() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&[], &mut state).is_err());
    }

    #[test]
    fn pushd_records_previous_directory() {
        let start = std::env::current_dir().unwrap();
        let mut state = State::new("hush", vec![]);
        let tmp = std::env::temp_dir();
        run(&[tmp.display().to_string()], &mut state).unwrap();
        assert_eq!(state.dir_stack(), &[start.clone()]);
        std::env::set_current_dir(&start).unwrap();
    }
}
