//! `help [NAME...]` -- lists or describes builtins.

use crate::errors::{ShellError, ShellResult};

use super::BuiltinOutcome;

const TOPICS: &[(&str, &str)] = &[
    ("cd", "cd [DIR|-]\n    Change the working directory to DIR, $HOME, or $OLDPWD."),
    ("help", "help [NAME...]\n    Print this summary, or details for specific builtins."),
    ("exit", "exit [N]\n    Exit the shell with status N (default: the status of the last command)."),
    ("export", "export [NAME[=VALUE]...]\n    Mark variables for export to child processes, or list exported names."),
    ("history", "history [-c] [-s SIZE]\n    List recorded commands, clear history, or resize the history ring."),
    ("alias", "alias [NAME=VALUE...]\n    Define or list command aliases."),
    ("unalias", "unalias [-a] NAME...\n    Remove one or all aliases."),
    ("pushd", "pushd DIR\n    Push the current directory and switch to DIR."),
    ("popd", "popd\n    Pop the directory stack and switch to the popped directory."),
    ("dirs", "dirs\n    Print the directory stack."),
    ("jobs", "jobs\n    List background and stopped jobs."),
    ("fg", "fg [%JOB]\n    Resume a job in the foreground."),
    ("bg", "bg [%JOB]\n    Resume a stopped job in the background."),
    ("wait", "wait [%JOB]\n    Wait for a job, or all jobs, to finish."),
    ("disown", "disown [%JOB]\n    Remove a job from the table without waiting for it."),
    ("set", "set [NAME=VALUE...]\n    Set shell variables, or list every variable."),
    ("unset", "unset NAME...\n    Remove shell variables."),
    ("shift", "shift [N]\n    Shift positional parameters left by N (default 1)."),
];

pub fn run(args: &[String]) -> ShellResult<BuiltinOutcome> {
    if args.is_empty() {
        println!("hush, a POSIX-style interactive shell");
        println!("These shell commands are defined internally:\n");
        for (name, _) in TOPICS {
            print!("{name:<10}");
        }
        println!();
        return Ok(BuiltinOutcome::Continue(0));
    }

    let mut matched_any = false;
    for arg in args {
        if let Some((_, text)) = TOPICS.iter().find(|(name, _)| name == arg) {
            println!("{text}");
            matched_any = true;
        }
    }
    if !matched_any {
        return Err(ShellError::builtin(
            "help",
            format!("no help topics match `{}`", args.join(" ")),
            1,
        ));
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_topic_is_an_error() {
        assert!(run(&["nosuchbuiltin".to_string()]).is_err());
    }

    #[test]
    fn known_topic_succeeds() {
        let outcome = run(&["cd".to_string()]).unwrap();
        assert_eq!(outcome, BuiltinOutcome::Continue(0));
    }
}
