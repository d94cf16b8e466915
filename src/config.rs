//! Configuration & startup surface (§10.3): the policy object a [`crate::shell::Shell`]
//! is built from, plus the `clap`-derived command line.
//!
//! Generalizes the teacher's `ShellConfig` (`enable_command_history`,
//! `command_history_capacity`, `enable_job_control`, `display_messages`) with
//! the history file location and alias seed this rewrite adds.

use std::path::PathBuf;

use clap::Parser;

/// `hush`, `hush -c CMD`, or `hush SCRIPT [ARGS...]` (§6).
#[derive(Debug, Parser)]
#[command(name = "hush", version, about = "A POSIX-style interactive shell")]
pub struct Cli {
    /// Run COMMAND instead of reading from a script or the terminal.
    #[arg(short = 'c', value_name = "COMMAND")]
    pub command: Option<String>,

    /// Write structured logs to $HOME/.hush_log (or HUSH_LOG's path, if set).
    #[arg(long)]
    pub log: bool,

    /// Script to run non-interactively, with any trailing arguments as its
    /// positional parameters.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Arguments passed to SCRIPT as `$1`, `$2`, ...
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

/// Policy object a [`crate::shell::Shell`] is constructed from.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Whether input lines are recorded in the history ring at all. Checked
    /// before `history_capacity`/`history_file`.
    pub enable_command_history: bool,

    /// Entries retained in the history ring (§3, default 100).
    pub history_capacity: usize,

    /// Where history is loaded from on startup and saved to on clean exit.
    pub history_file: Option<PathBuf>,

    /// Whether `fg`/`bg`/`jobs` and terminal ownership transfer are active.
    pub enable_job_control: bool,

    /// Whether informational messages ("exit", job status lines) are
    /// printed; suppressed for `-c`/script invocations.
    pub display_messages: bool,

    /// `true` when stdin is a terminal and the shell should run its
    /// interactive read-eval-print loop.
    pub interactive: bool,

    /// Aliases seeded before the first prompt. Deliberately empty by
    /// default -- the specific startup alias set is out of scope (§1) -- but
    /// an embedder may supply one.
    pub alias_seed: Vec<(String, String)>,
}

impl ShellConfig {
    /// An interactive terminal session: history, job control, and messages
    /// all on, history persisted to `$HOME/.hush_history`.
    pub fn interactive() -> ShellConfig {
        ShellConfig {
            enable_command_history: true,
            history_capacity: crate::state::HISTORY_CAPACITY,
            history_file: dirs::home_dir().map(|home| home.join(".hush_history")),
            enable_job_control: true,
            display_messages: true,
            interactive: true,
            alias_seed: Vec::new(),
        }
    }

    /// A `-c COMMAND` or script invocation: no history persistence, no job
    /// control handoff of the controlling terminal, quieter output.
    pub fn noninteractive() -> ShellConfig {
        ShellConfig {
            enable_command_history: false,
            history_capacity: 0,
            history_file: None,
            enable_job_control: false,
            display_messages: false,
            interactive: false,
            alias_seed: Vec::new(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> ShellConfig {
        ShellConfig::noninteractive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interactive_enables_job_control_and_history() {
        let config = ShellConfig::interactive();
        assert!(config.enable_job_control);
        assert!(config.enable_command_history);
        assert_eq!(config.history_capacity, crate::state::HISTORY_CAPACITY);
    }

    #[test]
    fn noninteractive_disables_persistence_and_job_control() {
        let config = ShellConfig::noninteractive();
        assert!(!config.enable_job_control);
        assert!(config.history_file.is_none());
    }
}
