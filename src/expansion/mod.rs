//! Expander (C2): runs every expansion stage in the strict order fixed by
//! §4.2.
//!
//! The stages split across two different times. History (`!!`, `!N`,
//! `!prefix`) resolves once, against the raw line, before the line is even
//! split or parsed -- it is asking "what did I type before", a question
//! about input history rather than about a parsed command. Everything else
//! (command substitution, variable expansion, alias expansion, wildcard
//! expansion) runs once per *execution* of a `Command::Simple`, driven by
//! the Dispatcher, because a parsed AST is reused across loop iterations
//! (see the design note on `ast::Command::Simple`) and `for i in 1 2 3; do
//! echo $i; done` must see a different `$i` -- and a freshly run `$(date)`
//! -- on every pass through the same body.
//!
//! Command substitution and variable expansion both operate on whole text,
//! not on individual words -- `$(echo a b)` or `${FOO:-a b}` is free to
//! produce several fields, and a `$(...)` span can itself contain spaces,
//! pipes, or nested `$(...)` that must stay inside the substitution rather
//! than being mistaken for token boundaries. [`crate::splitter::split`]
//! already keeps a `$(...)`/backtick span intact as one `Token::Word`, so
//! rejoining `Command::Simple`'s already-split words with single spaces
//! reconstructs the substitution-bearing text those two stages need, and
//! they are run once over the whole reconstructed line rather than once per
//! word. Alias expansion (which only ever looks at the first word) and
//! wildcard expansion (which needs real word boundaries to match a glob
//! pattern per argument) still run after splitting the result back into
//! words, since both legitimately want word boundaries rather than raw text.

pub mod alias;
pub mod command_sub;
pub mod glob;
pub mod history;
pub mod variables;

use crate::errors::ShellResult;
use crate::state::State;

/// Resolves `!`-history references against the raw line and records it,
/// once, before the Splitter ever sees it. Called from the line-reading
/// loop, not from the Dispatcher.
pub fn prepare_line(line: &str, state: &mut State) -> ShellResult<String> {
    let line = history::expand_in(line, state)?;
    state.record_history(&line);
    Ok(line)
}

/// Re-expands a `Command::Simple`'s raw words immediately before it runs:
/// command substitution and variable expansion over the whole reconstructed
/// line, then alias expansion of the first word, then wildcard expansion --
/// §4.2's stage order, with the first two stages run line-at-a-time (per
/// the module doc comment) rather than per already-split word.
pub fn expand_command_words(words: &[String], state: &mut State) -> ShellResult<Vec<String>> {
    if words.is_empty() {
        return Ok(Vec::new());
    }
    let joined = words.join(" ");
    let substituted = command_sub::expand(&joined)?;
    let value = variables::expand(&substituted, state);
    let aliased = alias::expand(&value, state);
    let words: Vec<String> = aliased.split_whitespace().map(str::to_string).collect();
    Ok(glob::expand_words(words))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_words_resolve_default_value() {
        let mut state = State::new("hush", vec![]);
        let expanded =
            expand_command_words(&["echo".to_string(), "${FOO:-default}".to_string()], &mut state)
                .unwrap();
        assert_eq!(expanded, vec!["echo".to_string(), "default".to_string()]);
    }

    #[test]
    fn command_words_expand_alias_after_variables() {
        let mut state = State::new("hush", vec![]);
        state.set("DIR", "/tmp");
        state.set_alias("go", "cd $DIR");
        let expanded = expand_command_words(&["go".to_string()], &mut state).unwrap();
        assert_eq!(expanded, vec!["cd".to_string(), "/tmp".to_string()]);
    }

    #[test]
    fn command_words_run_command_substitution_fresh_each_call() {
        let mut state = State::new("hush", vec![]);
        let words = vec!["echo".to_string(), "$(echo recorded)".to_string()];
        let expanded = expand_command_words(&words, &mut state).unwrap();
        assert_eq!(expanded, vec!["echo".to_string(), "recorded".to_string()]);
    }

    #[test]
    fn command_words_resolve_nested_command_substitution_spanning_a_single_word() {
        let mut state = State::new("hush", vec![]);
        let words = vec![
            "echo".to_string(),
            "$(echo nested $(echo deep))".to_string(),
        ];
        let expanded = expand_command_words(&words, &mut state).unwrap();
        assert_eq!(
            expanded,
            vec!["echo".to_string(), "nested".to_string(), "deep".to_string()]
        );
    }

    #[test]
    fn command_words_resolve_command_substitution_containing_an_operator() {
        let mut state = State::new("hush", vec![]);
        let words = vec!["echo".to_string(), "$(echo a | cat)".to_string()];
        let expanded = expand_command_words(&words, &mut state).unwrap();
        assert_eq!(expanded, vec!["echo".to_string(), "a".to_string()]);
    }

    #[test]
    fn prepare_line_records_history_without_expanding_variables() {
        let mut state = State::new("hush", vec![]);
        let prepared = prepare_line("echo $FOO", &mut state).unwrap();
        assert_eq!(prepared, "echo $FOO");
        assert_eq!(state.last_history_entry().unwrap(), "echo $FOO");
    }
}
