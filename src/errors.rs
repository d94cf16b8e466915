//! Error and Result types used throughout hush.
//!
//! Mirrors the three channels described in the design: syntax errors (parser),
//! runtime command errors (whatever the command itself emits), and shell-internal
//! resource errors (fork/pipe/io failures), each carrying enough information for
//! the REPL to pick the right exit status and message prefix.

use std::fmt;
use thiserror::Error;

/// Specialized Result type for all hush operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors that can occur at any stage of the pipeline: splitting, expansion,
/// control parsing, dispatch, or job control.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Unclosed quote, unmatched `if`/`fi`, stray operator, or other
    /// grammar-level failure. Carries the offending source text.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A builtin command reported a failure with an associated exit code.
    #[error("{message}")]
    Builtin {
        /// Human-readable description of the failure.
        message: String,
        /// Exit code the builtin wants `$?` set to.
        code: i32,
    },

    /// The first word of a command did not resolve to a builtin or an
    /// executable found on `PATH`.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// A job specifier (`%N` or a bare job id) did not match any job in the
    /// job table.
    #[error("{0}: no such job")]
    NoSuchJob(String),

    /// Wraps an I/O failure (file open for redirection, pipe creation, etc).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wraps a failure from a `nix` system call (fork, waitpid, tcsetpgrp, ...).
    #[error(transparent)]
    Nix(#[from] nix::Error),
}

impl ShellError {
    /// Constructs a [`ShellError::Builtin`] with a `name: message` style body,
    /// matching how every builtin in this crate reports its own failures.
    pub fn builtin(name: &str, message: impl fmt::Display, code: i32) -> Self {
        ShellError::Builtin {
            message: format!("{name}: {message}"),
            code,
        }
    }

    /// Exit status this error should leave in `$?`.
    ///
    /// Matches the table in the design: syntax errors exit 2, command-not-found
    /// exits 127 (a POSIX convention), builtin errors carry their own code, and
    /// everything else defaults to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Syntax(_) => 2,
            ShellError::CommandNotFound(_) => 127,
            ShellError::Builtin { code, .. } => *code,
            ShellError::NoSuchJob(_) => 1,
            ShellError::Io(_) | ShellError::Nix(_) => 1,
        }
    }

    /// `true` for the "shell-internal resource error" channel, which gets a
    /// `shell:`-prefixed message rather than a bare one.
    pub fn is_internal(&self) -> bool {
        matches!(self, ShellError::Io(_) | ShellError::Nix(_))
    }
}
