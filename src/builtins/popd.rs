//! `popd`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(_args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    let target = state
        .pop_dir()
        .ok_or_else(|| ShellError::builtin("popd", "directory stack empty", 1))?;
    std::env::set_current_dir(&target)
        .map_err(|e| ShellError::builtin("popd", format!("{}: {e}", target.display()), 1))?;
    println!("{}", std::env::current_dir().unwrap_or_default().display());
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popd_with_empty_stack_errors() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&[], &mut state).is_err());
    }

    #[test]
    fn popd_restores_pushed_directory() {
        let start = std::env::current_dir().unwrap();
        let mut state = State::new("hush", vec![]);
        state.push_dir(start.clone());
        run(&[], &mut state).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), start);
    }
}
