//! Builtins (§4.5's "Builtins" list): commands run in-process rather than
//! execed, so they can mutate shell state directly.
//!
//! Generalizes the teacher's trait-based `BuiltinCommand` registry
//! (`shell/builtins/mod.rs`'s `is_builtin`/`run` pair) to the full set named
//! in the spec, and replaces its docopt-based argument parsing -- most of
//! these builtins take a flat word list with no flags worth a usage grammar
//! -- with direct slice matching.

pub mod alias;
pub mod bg;
pub mod cd;
pub mod dirs;
pub mod disown;
pub mod exit;
pub mod export;
pub mod fg;
pub mod help;
pub mod history;
pub mod jobs;
pub mod popd;
pub mod pushd;
pub mod set;
pub mod shift;
pub mod unalias;
pub mod unset;
pub mod wait;

use crate::errors::{ShellError, ShellResult};
use crate::jobs::JobTable;
use crate::state::State;

const NAMES: &[&str] = &[
    "cd", "help", "exit", "export", "history", "alias", "unalias", "pushd", "popd", "dirs",
    "jobs", "fg", "bg", "wait", "disown", "set", "unset", "shift",
];

/// What the REPL should do after a builtin runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    /// Keep reading commands; `$?` becomes this code.
    Continue(i32),
    /// Terminate the shell with this process exit code.
    Exit(i32),
}

/// `true` if `name` is one of the names in §4.5's builtin list.
pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Runs `words[0]` as a builtin. `Ok(None)` means `words[0]` is not a
/// builtin and the Dispatcher should fall through to external execution.
pub fn dispatch(
    words: &[String],
    state: &mut State,
    jobs: &mut JobTable,
) -> ShellResult<Option<BuiltinOutcome>> {
    let Some(name) = words.first().map(String::as_str) else {
        return Ok(None);
    };
    if !is_builtin(name) {
        return Ok(None);
    }
    let args = &words[1..];
    let outcome = match name {
        "cd" => cd::run(args, state)?,
        "help" => help::run(args)?,
        "exit" => exit::run(args, state)?,
        "export" => export::run(args, state)?,
        "history" => history::run(args, state)?,
        "alias" => alias::run(args, state)?,
        "unalias" => unalias::run(args, state)?,
        "pushd" => pushd::run(args, state)?,
        "popd" => popd::run(args, state)?,
        "dirs" => dirs::run(args, state)?,
        "jobs" => jobs::run(args, jobs)?,
        "fg" => fg::run(args, jobs)?,
        "bg" => bg::run(args, jobs)?,
        "wait" => wait::run(args, jobs)?,
        "disown" => disown::run(args, jobs)?,
        "set" => set::run(args, state)?,
        "unset" => unset::run(args, state)?,
        "shift" => shift::run(args, state)?,
        _ => unreachable!("is_builtin guards this match"),
    };
    Ok(Some(outcome))
}

/// Resolves a job argument (`%3`, `3`, or bare) to a table id, shared by
/// `fg`/`bg`/`wait`/`disown`.
pub(crate) fn parse_job_spec(spec: &str, jobs: &JobTable) -> ShellResult<usize> {
    let digits = spec.strip_prefix('%').unwrap_or(spec);
    let id: usize = digits
        .parse()
        .map_err(|_| ShellError::NoSuchJob(spec.to_string()))?;
    if jobs.job(id).is_some() {
        Ok(id)
    } else {
        Err(ShellError::NoSuchJob(spec.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_returns_none_for_non_builtins() {
        let mut state = State::new("hush", vec![]);
        let mut jobs = test_job_table();
        let result = dispatch(&["ls".to_string()], &mut state, &mut jobs).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn parse_job_spec_accepts_percent_prefix() {
        let mut jobs = test_job_table();
        let id = jobs.create_job("sleep 1".into(), false).unwrap();
        assert_eq!(parse_job_spec(&format!("%{id}"), &jobs).unwrap(), id);
        assert!(parse_job_spec("%99", &jobs).is_err());
    }

    pub(crate) fn test_job_table() -> JobTable {
        crate::jobs::JobTable::init(-1).unwrap_or_else(|_| panic!("test job table init"))
    }
}
