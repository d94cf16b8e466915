//! `alias [NAME=VALUE...]`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    if args.is_empty() {
        for (name, expansion) in state.all_aliases() {
            println!("alias {name}='{expansion}'");
        }
        return Ok(BuiltinOutcome::Continue(0));
    }
    for arg in args {
        match arg.split_once('=') {
            Some((name, expansion)) => state.set_alias(name, expansion),
            None => match state.get_alias(arg) {
                Some(expansion) => println!("alias {arg}='{expansion}'"),
                None => return Err(ShellError::builtin("alias", format!("{arg}: not found"), 1)),
            },
        }
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_defines_and_looks_up() {
        let mut state = State::new("hush", vec![]);
        run(&["ll=ls -l".to_string()], &mut state).unwrap();
        assert_eq!(state.get_alias("ll"), Some("ls -l"));
    }

    #[test]
    fn alias_lookup_of_unknown_name_errors() {
        let mut state = State::new("hush", vec![]);
        assert!(run(&["nope".to_string()], &mut state).is_err());
    }
}
