//! `dirs [-v]` -- prints the directory stack, current directory first.
//!
//! `dirs` takes no flags in the distillation, but the original's
//! `dir_stack.c` numbers each stack entry when printed with `-v`; §10.5
//! carries that forward as an enrichment, shared with `pushd`'s own
//! unconditional print of the stack after a successful change.

use crate::errors::ShellResult;
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &State) -> ShellResult<BuiltinOutcome> {
    let verbose = args.iter().any(|a| a == "-v");
    print_stack(state, verbose);
    Ok(BuiltinOutcome::Continue(0))
}

/// Prints the stack, current directory first; numbered `N  path` per entry
/// when `verbose`, matching `dir_stack.c`'s `-v` form.
pub(crate) fn print_stack(state: &State, verbose: bool) {
    let cwd = std::env::current_dir().unwrap_or_default();
    let mut entries: Vec<String> = vec![cwd.display().to_string()];
    entries.extend(state.dir_stack().iter().rev().map(|p| p.display().to_string()));
    if verbose {
        for (index, entry) in entries.iter().enumerate() {
            println!("{index}  {entry}");
        }
    } else {
        println!("{}", entries.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_with_no_flags_runs() {
        let state = State::new("hush", vec![]);
        run(&[], &state).unwrap();
    }

    #[test]
    fn dirs_v_runs_numbered() {
        let mut state = State::new("hush", vec![]);
        state.push_dir(std::env::current_dir().unwrap());
        run(&["-v".to_string()], &state).unwrap();
    }
}
