//! `cd [DIR|-]` -- also the target of the Dispatcher's implicit-cd rule
//! (§4.5: "bare directory name" behaves as if typed after `cd`).

use std::path::{Path, PathBuf};

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    let target = match args.first().map(String::as_str) {
        None | Some("~") => {
            dirs::home_dir().ok_or_else(|| ShellError::builtin("cd", "HOME not set", 1))?
        }
        Some("-") => {
            let oldpwd = state
                .get("OLDPWD")
                .ok_or_else(|| ShellError::builtin("cd", "OLDPWD not set", 1))?;
            PathBuf::from(oldpwd)
        }
        Some(path) => PathBuf::from(path),
    };
    change_dir(&target, state)?;
    Ok(BuiltinOutcome::Continue(0))
}

/// Changes the process's working directory and updates `PWD`/`OLDPWD`,
/// shared with the Dispatcher's implicit-cd path.
pub fn change_dir(target: &Path, state: &mut State) -> ShellResult<()> {
    let previous = std::env::current_dir().unwrap_or_default();
    std::env::set_current_dir(target)
        .map_err(|e| ShellError::builtin("cd", format!("{}: {e}", target.display()), 1))?;
    state.set("OLDPWD", previous.display().to_string());
    state.set(
        "PWD",
        std::env::current_dir().unwrap_or_default().display().to_string(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cd_dash_returns_to_oldpwd() {
        let dir_a = std::env::temp_dir();
        let dir_b = std::env::current_dir().unwrap();
        let mut state = State::new("hush", vec![]);

        change_dir(&dir_a, &mut state).unwrap();
        assert_eq!(state.get("OLDPWD").unwrap(), dir_b.display().to_string());

        run(&["-".to_string()], &mut state).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), dir_b);

        std::env::set_current_dir(&dir_b).unwrap();
    }

    #[test]
    fn cd_unknown_dir_is_a_builtin_error() {
        let mut state = State::new("hush", vec![]);
        let err = run(&["/no/such/dir".to_string()], &mut state).unwrap_err();
        assert!(matches!(err, ShellError::Builtin { .. }));
    }
}
