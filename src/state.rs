//! State Store (C7): shell variables, aliases, the history ring, positional
//! parameters, and the directory stack. Everything here is owned by a single
//! `State` value that the rest of the shell borrows from -- no module-level
//! globals, per the design note on replacing the teacher's ambient statics.

use std::collections::{HashSet, VecDeque};
use std::env;
use std::path::PathBuf;

/// Maximum number of entries retained in the history ring (§3).
pub const HISTORY_CAPACITY: usize = 100;

/// Shell variables, aliases, history, positional parameters, and the
/// directory stack -- the full contents of §3's "Variable" through
/// "Directory stack" data model, minus jobs (which live in [`crate::jobs`]).
#[derive(Debug)]
pub struct State {
    variables: std::collections::HashMap<String, String>,
    exported: HashSet<String>,
    aliases: Vec<(String, String)>,
    history: VecDeque<String>,
    history_capacity: usize,
    dir_stack: Vec<PathBuf>,
    positional: Vec<String>,
    script_name: String,
    /// `$?`
    pub last_exit_status: i32,
    /// `$!`
    pub last_background_pid: Option<i32>,
    /// `set -x`: trace each command before it runs.
    pub xtrace: bool,
    /// `set -e`: exit on the first command that fails.
    pub errexit: bool,
    /// `set -u`: treat an unset variable reference as an error.
    pub nounset: bool,
}

impl State {
    /// Builds a fresh state seeded from the process's own environment, with
    /// `script_name` as `$0` and `args` as `$1..$#`.
    pub fn new(script_name: impl Into<String>, args: Vec<String>) -> State {
        let exported: HashSet<String> = env::vars().map(|(k, _)| k).collect();
        State {
            variables: std::collections::HashMap::new(),
            exported,
            aliases: Vec::new(),
            history: VecDeque::new(),
            history_capacity: HISTORY_CAPACITY,
            dir_stack: Vec::new(),
            positional: args,
            script_name: script_name.into(),
            last_exit_status: 0,
            last_background_pid: None,
            xtrace: false,
            errexit: false,
            nounset: false,
        }
    }

    // --- Variables -------------------------------------------------------

    /// Looks up a name, checking special parameters, then shell variables
    /// (which shadow the environment), then the process environment.
    pub fn get(&self, name: &str) -> Option<String> {
        if let Some(special) = self.get_special(name) {
            return Some(special);
        }
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        env::var(name).ok()
    }

    fn get_special(&self, name: &str) -> Option<String> {
        match name {
            "?" => Some(self.last_exit_status.to_string()),
            "$" => Some(std::process::id().to_string()),
            "!" => self.last_background_pid.map(|p| p.to_string()),
            "#" => Some(self.positional.len().to_string()),
            "0" => Some(self.script_name.clone()),
            n if n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty() => {
                let idx: usize = n.parse().ok()?;
                self.positional.get(idx.wrapping_sub(1)).cloned()
            }
            _ => None,
        }
    }

    /// Writes to the shell variable table only (plain `set NAME=VALUE`).
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if self.exported.contains(&name) {
            env::set_var(&name, &value);
        }
        self.variables.insert(name, value);
    }

    /// Writes to the process environment (`export NAME=VALUE`) and marks
    /// `name` so future assignments keep it exported.
    pub fn export(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        let resolved = value.unwrap_or_else(|| self.get(&name).unwrap_or_default());
        env::set_var(&name, &resolved);
        self.variables.insert(name.clone(), resolved);
        self.exported.insert(name);
    }

    /// Removes a name from both the shell table and the environment.
    pub fn unset(&mut self, name: &str) {
        self.variables.remove(name);
        self.exported.remove(name);
        env::remove_var(name);
    }

    /// Every currently exported name, for `export` with no arguments.
    pub fn exported_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.exported.iter().collect();
        names.sort();
        names
    }

    /// Every shell-table variable as `(name, value)`, for `set` with no
    /// arguments (§10.5 supplement from the original's `hush_set`).
    pub fn all_variables(&self) -> Vec<(&String, &String)> {
        let mut pairs: Vec<_> = self.variables.iter().collect();
        pairs.sort_by_key(|(k, _)| k.clone());
        pairs
    }

    // --- Positional parameters --------------------------------------------

    /// `$0`.
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// `$1..$#`.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Drops the first `n` positional parameters (`shift [N]`).
    pub fn shift(&mut self, n: usize) -> Result<(), String> {
        if n > self.positional.len() {
            return Err(format!(
                "shift count must be <= {}",
                self.positional.len()
            ));
        }
        self.positional.drain(0..n);
        Ok(())
    }

    // --- Aliases -----------------------------------------------------------

    /// Defines or redefines an alias.
    pub fn set_alias(&mut self, name: impl Into<String>, expansion: impl Into<String>) {
        let name = name.into();
        let expansion = expansion.into();
        if let Some(existing) = self.aliases.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = expansion;
        } else {
            self.aliases.push((name, expansion));
        }
    }

    /// Looks up an alias's expansion text.
    pub fn get_alias(&self, name: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e.as_str())
    }

    /// Removes a single alias; returns `false` if it did not exist.
    pub fn unset_alias(&mut self, name: &str) -> bool {
        let before = self.aliases.len();
        self.aliases.retain(|(n, _)| n != name);
        self.aliases.len() != before
    }

    /// Removes every alias (`unalias -a`).
    pub fn clear_aliases(&mut self) {
        self.aliases.clear();
    }

    /// All aliases in definition order, for `alias` with no arguments.
    pub fn all_aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    // --- History -------------------------------------------------------

    /// Appends `line` to the history ring, collapsing a duplicate of the
    /// immediately preceding entry and evicting the oldest entry once the
    /// ring is at capacity (§3's invariants).
    pub fn record_history(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if self.history.back().map(String::as_str) == Some(line) {
            return;
        }
        if self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }

    /// 1-based lookup used by `!N`.
    pub fn history_entry(&self, n: usize) -> Option<&String> {
        if n == 0 {
            return None;
        }
        self.history.get(n - 1)
    }

    /// Lookup from the end used by `!-N`.
    pub fn history_entry_from_end(&self, n: usize) -> Option<&String> {
        if n == 0 || n > self.history.len() {
            return None;
        }
        self.history.get(self.history.len() - n)
    }

    /// Reverse prefix search used by `!prefix` (§10.5 supplement).
    pub fn history_entry_by_prefix(&self, prefix: &str) -> Option<&String> {
        self.history.iter().rev().find(|e| e.starts_with(prefix))
    }

    /// Most recent entry, used by `!!`.
    pub fn last_history_entry(&self) -> Option<&String> {
        self.history.back()
    }

    /// All entries, oldest first, for the `history` builtin and the editor's
    /// Up/Down navigation.
    pub fn history_entries(&self) -> impl Iterator<Item = &String> {
        self.history.iter()
    }

    /// Current number of retained entries.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Empties the ring (`history -c`).
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Changes the ring's capacity, truncating the oldest entries if the new
    /// size is smaller (`history -s SIZE`).
    pub fn set_history_capacity(&mut self, capacity: usize) {
        while self.history.len() > capacity {
            self.history.pop_front();
        }
        self.history_capacity = capacity;
    }

    /// Loads history entries from a persisted file, most recent last,
    /// truncating to [`HISTORY_CAPACITY`] as specified in §6.
    pub fn load_history_from_str(&mut self, contents: &str) {
        for line in contents.lines() {
            self.record_history(line);
        }
    }

    /// Renders the ring as newline-joined text for writing to the history
    /// file on clean exit.
    pub fn history_to_string(&self) -> String {
        let mut s = String::new();
        for line in &self.history {
            s.push_str(line);
            s.push('\n');
        }
        s
    }

    // --- Directory stack -----------------------------------------------

    /// Pushes `previous_cwd` onto the stack (called by `pushd` after it
    /// changes directory).
    pub fn push_dir(&mut self, previous_cwd: PathBuf) {
        self.dir_stack.push(previous_cwd);
    }

    /// Pops and returns the top of the stack (called by `popd` before it
    /// changes back).
    pub fn pop_dir(&mut self) -> Option<PathBuf> {
        self.dir_stack.pop()
    }

    /// The stack, top of stack last, for `dirs`.
    pub fn dir_stack(&self) -> &[PathBuf] {
        &self.dir_stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_collapses_consecutive_duplicates() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo a");
        state.record_history("echo a");
        assert_eq!(state.history_len(), 1);
        state.record_history("echo b");
        assert_eq!(state.history_len(), 2);
    }

    #[test]
    fn history_ring_is_bounded() {
        let mut state = State::new("hush", vec![]);
        for i in 0..(HISTORY_CAPACITY + 10) {
            state.record_history(&format!("cmd{i}"));
        }
        assert_eq!(state.history_len(), HISTORY_CAPACITY);
        assert_eq!(
            state.history_entry(1).unwrap(),
            &format!("cmd{}", 10)
        );
    }

    #[test]
    fn special_parameters_resolve() {
        let mut state = State::new("script.sh", vec!["a".into(), "b".into()]);
        state.last_exit_status = 7;
        assert_eq!(state.get("?"), Some("7".to_string()));
        assert_eq!(state.get("#"), Some("2".to_string()));
        assert_eq!(state.get("0"), Some("script.sh".to_string()));
        assert_eq!(state.get("1"), Some("a".to_string()));
        assert_eq!(state.get("2"), Some("b".to_string()));
        assert_eq!(state.get("3"), None);
    }

    #[test]
    fn shell_variable_shadows_environment() {
        let mut state = State::new("hush", vec![]);
        env::set_var("HUSH_TEST_SHADOW", "env-value");
        state.set("HUSH_TEST_SHADOW", "shell-value");
        assert_eq!(state.get("HUSH_TEST_SHADOW"), Some("shell-value".to_string()));
        env::remove_var("HUSH_TEST_SHADOW");
    }

    #[test]
    fn alias_round_trip() {
        let mut state = State::new("hush", vec![]);
        state.set_alias("ll", "ls -l");
        assert_eq!(state.get_alias("ll"), Some("ls -l"));
        assert!(state.unset_alias("ll"));
        assert_eq!(state.get_alias("ll"), None);
    }

    #[test]
    fn shift_moves_positional_parameters() {
        let mut state = State::new("hush", vec!["a".into(), "b".into(), "c".into()]);
        state.shift(2).unwrap();
        assert_eq!(state.positional(), &["c".to_string()]);
        assert!(state.shift(5).is_err());
    }
}
