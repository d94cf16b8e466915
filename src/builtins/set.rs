//! `set [-xeu] [NAME=VALUE...]` (§10.5 supplement).

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    if args.is_empty() {
        for (name, value) in state.all_variables() {
            println!("{name}={value}");
        }
        return Ok(BuiltinOutcome::Continue(0));
    }
    let mut rest = args.iter();
    for arg in args {
        if let Some(flags) = arg.strip_prefix('-') {
            if flags.is_empty() || flags.starts_with('-') {
                break;
            }
            for flag in flags.chars() {
                match flag {
                    'x' => state.xtrace = true,
                    'e' => state.errexit = true,
                    'u' => state.nounset = true,
                    other => {
                        return Err(ShellError::builtin(
                            "set",
                            format!("-{other}: unknown flag"),
                            1,
                        ))
                    }
                }
            }
            rest.next();
        } else {
            break;
        }
    }
    for arg in rest {
        match arg.split_once('=') {
            Some((name, value)) => state.set(name, value),
            None => return Err(ShellError::builtin("set", format!("{arg}: not a NAME=VALUE pair"), 1)),
        }
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_assigns_a_shell_variable() {
        let mut state = State::new("hush", vec![]);
        run(&["FOO=bar".to_string()], &mut state).unwrap();
        assert_eq!(state.get("FOO"), Some("bar".to_string()));
    }

    #[test]
    fn set_rejects_bare_names() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&["FOO".to_string()], &mut state).is_err());
    }

    #[test]
    fn set_combined_short_flags_set_the_matching_modes() {
        let mut state = State::new("hush", vec![]);
        run(&["-xeu".to_string()], &mut state).unwrap();
        assert!(state.xtrace);
        assert!(state.errexit);
        assert!(state.nounset);
    }

    #[test]
    fn set_flags_can_be_followed_by_assignments() {
        let mut state = State::new("hush", vec![]);
        run(&["-x".to_string(), "FOO=bar".to_string()], &mut state).unwrap();
        assert!(state.xtrace);
        assert_eq!(state.get("FOO"), Some("bar".to_string()));
    }

    #[test]
    fn set_rejects_unknown_flags() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&["-z".to_string()], &mut state).is_err());
    }
}
