//! `export [NAME[=VALUE]...]`.

use crate::errors::ShellResult;
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    if args.is_empty() {
        for name in state.exported_names() {
            println!("export {name}={}", state.get(name).unwrap_or_default());
        }
        return Ok(BuiltinOutcome::Continue(0));
    }
    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => state.export(name, Some(value.to_string())),
            None => state.export(arg.clone(), None),
        }
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_with_value_sets_and_marks_exported() {
        let mut state = State::new("hush", vec![]);
        run(&["FOO=bar".to_string()], &mut state).unwrap();
        assert_eq!(state.get("FOO"), Some("bar".to_string()));
        assert!(state.exported_names().iter().any(|n| n.as_str() == "FOO"));
        std::env::remove_var("FOO");
    }
}
