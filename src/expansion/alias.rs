//! Alias expansion (C2.5): first-token substitution, applied once.
//!
//! Grounded in the original's alias table semantics (`alias.c`) -- a linear
//! `(name, value)` list matched against only the first word of a command --
//! generalized to splice the alias's own tokens in place of that first word
//! rather than a single string, so `alias ll='ls -l'` followed by `ll /tmp`
//! becomes `ls -l /tmp` before the Splitter ever sees it.

use crate::state::State;

/// If `line`'s first whitespace-delimited word names an alias, replaces it
/// with the alias's expansion text and appends the remaining words
/// unchanged. Performs exactly one substitution; the replacement text is
/// never re-scanned for a nested alias (§3's invariant).
pub fn expand(line: &str, state: &State) -> String {
    let trimmed = line.trim_start();
    let leading_ws = &line[..line.len() - trimmed.len()];
    let (first, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest),
        None => (trimmed, ""),
    };

    match state.get_alias(first) {
        Some(expansion) if !first.is_empty() => {
            if rest.is_empty() {
                format!("{leading_ws}{expansion}")
            } else {
                format!("{leading_ws}{expansion} {rest}")
            }
        }
        _ => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_first_word_only() {
        let mut state = State::new("hush", vec![]);
        state.set_alias("ll", "ls -l");
        assert_eq!(expand("ll /tmp", &state), "ls -l /tmp");
    }

    #[test]
    fn leaves_non_alias_commands_untouched() {
        let state = State::new("hush", vec![]);
        assert_eq!(expand("ls -l /tmp", &state), "ls -l /tmp");
    }

    #[test]
    fn expansion_is_not_rescanned() {
        let mut state = State::new("hush", vec![]);
        state.set_alias("ll", "ll -a");
        assert_eq!(expand("ll", &state), "ll -a");
    }

    #[test]
    fn alias_with_no_arguments_expands_bare() {
        let mut state = State::new("hush", vec![]);
        state.set_alias("la", "ls -a");
        assert_eq!(expand("la", &state), "ls -a");
    }
}
