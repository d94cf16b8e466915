//! Ties the Line Reader, Expander's history stage, Control Parser, and
//! Dispatcher into the read-eval-print loop and the two non-interactive entry
//! points (`-c COMMAND`, SCRIPT).
//!
//! Generalizes the teacher's `Shell` struct (`shell.rs`): the same
//! history-file load/save around a config-driven session, the same
//! `last_exit_status`-in-the-prompt idea, and the same `exit()` code
//! normalization, but command execution is handed off to [`crate::dispatcher`]
//! instead of spawning `std::process::Command` inline, and multiline `if`/
//! `for`/`while` blocks are collected by the reader before the line reaches
//! the parser at all.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::config::ShellConfig;
use crate::dispatcher;
use crate::editor::LineReader;
use crate::errors::ShellResult;
use crate::expansion;
use crate::jobs::{self, JobTable};
use crate::parser;
use crate::splitter;
use crate::state::State;

/// Owns everything a running session needs: variable/alias/history state, the
/// job table, and the line reader. One `Shell` per process.
pub struct Shell {
    state: State,
    jobs: JobTable,
    reader: LineReader,
    config: ShellConfig,
}

impl Shell {
    /// Builds a session for `script_name`/`args` (`$0`/`$1`...), seeding
    /// aliases and loading history from `config.history_file` when present.
    pub fn new(script_name: &str, args: Vec<String>, config: ShellConfig) -> ShellResult<Shell> {
        let mut state = State::new(script_name, args);
        state.set_history_capacity(config.history_capacity);
        for (name, expansion) in &config.alias_seed {
            state.set_alias(name.clone(), expansion.clone());
        }

        if config.enable_command_history {
            if let Some(history_file) = &config.history_file {
                match fs::read_to_string(history_file) {
                    Ok(contents) => state.load_history_from_str(&contents),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => warn!("failed to load history from {}: {e}", history_file.display()),
                }
            }
        }

        let terminal_fd = jobs::terminal_fd();
        let jobs = JobTable::init(terminal_fd)?;
        let reader = LineReader::new(terminal_fd);

        info!("hush started up");
        Ok(Shell { state, jobs, reader, config })
    }

    /// Renders the two-line `$?|cwd` / `$ ` prompt (§4.1), matching the
    /// teacher's `Shell::prompt` layout.
    fn prompt(&self) -> String {
        let cwd = std::env::current_dir().unwrap_or_default();
        let rel = match dirs::home_dir() {
            Some(home) => match cwd.strip_prefix(&home) {
                Ok(rel) if rel.as_os_str().is_empty() => Path::new("~").to_path_buf(),
                Ok(rel) => Path::new("~").join(rel),
                Err(_) => cwd.clone(),
            },
            None => cwd.clone(),
        };
        format!("{}|{}\n$ ", self.state.last_exit_status, rel.display())
    }

    /// Runs the interactive read-eval-print loop until end of input.
    pub fn run_interactive(&mut self) -> i32 {
        loop {
            self.jobs.reap_all();
            self.jobs.notify_changed();

            let prompt = self.prompt();
            let line = match self.reader.read_line(&prompt, &self.state) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    eprintln!("hush: {e}");
                    continue;
                }
            };

            let mut block = vec![line];
            while parser::depth_delta(&block.join(" ")) > 0 {
                match self.reader.read_line("> ", &self.state) {
                    Ok(Some(line)) => block.push(line),
                    Ok(None) | Err(_) => break,
                }
            }
            let combined = block.join("; ");

            let reader = &self.reader;
            let mut heredocs = move || {
                let scratch = State::new("hush", vec![]);
                reader.read_line("heredoc> ", &scratch).ok().flatten()
            };
            Self::execute_line(&mut self.state, &mut self.jobs, &combined, &mut heredocs);
        }

        if self.config.enable_command_history {
            self.save_history();
        }
        self.state.last_exit_status
    }

    /// Runs a single `-c COMMAND` invocation.
    pub fn run_command(&mut self, command: &str) -> i32 {
        let mut no_more = || None;
        Self::execute_line(&mut self.state, &mut self.jobs, command, &mut no_more);
        self.state.last_exit_status
    }

    /// Runs every line of `path` in order. A failing line is reported and
    /// skipped; it does not abort the rest of the script, matching §6.
    pub fn run_script(&mut self, path: &Path) -> ShellResult<i32> {
        let contents = fs::read_to_string(path)?;
        let physical_lines: Vec<String> = contents.lines().map(str::to_string).collect();
        let mut index = 0usize;

        while index < physical_lines.len() {
            let mut block = vec![physical_lines[index].clone()];
            index += 1;
            while parser::depth_delta(&block.join(" ")) > 0 && index < physical_lines.len() {
                block.push(physical_lines[index].clone());
                index += 1;
            }
            let combined = block.join("; ");

            let mut heredocs = || {
                if index < physical_lines.len() {
                    let line = physical_lines[index].clone();
                    index += 1;
                    Some(line)
                } else {
                    None
                }
            };
            Self::execute_line(&mut self.state, &mut self.jobs, &combined, &mut heredocs);
        }
        Ok(self.state.last_exit_status)
    }

    /// Expands history references, splits, parses, and dispatches one
    /// logical (possibly multiline) input, reporting any failure to stderr
    /// without killing the session. A free function (not a method) so the
    /// heredoc supplier can borrow other `Shell` fields concurrently.
    fn execute_line(state: &mut State, jobs: &mut JobTable, line: &str, heredocs: dispatcher::LineSource) {
        let prepared = match expansion::prepare_line(line, state) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("hush: {e}");
                return;
            }
        };
        if prepared.trim().is_empty() {
            return;
        }

        let tokens = match splitter::split(&prepared) {
            Ok(tokens) => tokens,
            Err(message) => {
                eprintln!("hush: {message}");
                state.last_exit_status = 2;
                return;
            }
        };

        let command = match parser::parse_chain(tokens) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("hush: {e}");
                state.last_exit_status = e.exit_code();
                return;
            }
        };

        dispatcher::execute(&command, state, jobs, heredocs);
    }

    fn save_history(&self) {
        let Some(history_file) = &self.config.history_file else {
            return;
        };
        if let Err(e) = fs::write(history_file, self.state.history_to_string()) {
            warn!("failed to save history to {}: {e}", history_file.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_command_sets_last_exit_status_from_a_builtin_failure() {
        let mut shell = Shell::new("hush", vec![], ShellConfig::noninteractive()).unwrap();
        let status = shell.run_command("cd /no/such/directory/anywhere");
        assert_ne!(status, 0);
    }

    #[test]
    fn run_command_runs_an_implicit_cd() {
        let dir = std::env::temp_dir();
        let mut shell = Shell::new("hush", vec![], ShellConfig::noninteractive()).unwrap();
        let status = shell.run_command(&dir.display().to_string());
        assert_eq!(status, 0);
    }
}
