//! Wildcard expansion (C2.6): brace expansion followed by pathname matching.
//!
//! Brace expansion has no counterpart in either the teacher or the original
//! and is built fresh from the grammar in §4.2.6 (`a{b,c}d` -> `abd acd`,
//! recursive on nested braces). Pathname matching reuses the `glob` crate,
//! which every pattern in this corpus that needs filesystem wildcards reaches
//! for rather than hand-rolling `fnmatch`.

/// Expands braces and then glob-matches each token in `words` against the
/// filesystem. A token with no metacharacters passes through unchanged. A
/// pattern that matches nothing is left intact, per §4.2.6.
pub fn expand_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .flat_map(|word| {
            expand_braces(&word)
                .into_iter()
                .flat_map(expand_wildcard)
        })
        .collect()
}

fn has_wildcard_chars(s: &str) -> bool {
    s.contains(['*', '?', '[']) || s.contains("**")
}

fn expand_wildcard(word: String) -> Vec<String> {
    if !has_wildcard_chars(&word) {
        return vec![word];
    }
    match glob::glob(&word) {
        Ok(paths) => {
            let matches: Vec<String> = paths
                .filter_map(Result::ok)
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            if matches.is_empty() {
                vec![word]
            } else {
                matches
            }
        }
        Err(_) => vec![word],
    }
}

/// Recursively expands `{a,b,c}` groups, returning every combination.
fn expand_braces(word: &str) -> Vec<String> {
    match find_brace(word) {
        None => vec![word.to_string()],
        Some((open, close)) => {
            let prefix = &word[..open];
            let suffix = &word[close + 1..];
            let body = &word[open + 1..close];
            let alternatives = split_top_level_commas(body);
            if alternatives.len() < 2 {
                // Not a real alternation (e.g. a single-element `{x}`); treat
                // the braces as literal text.
                return vec![word.to_string()];
            }
            alternatives
                .into_iter()
                .flat_map(|alt| expand_braces(&format!("{prefix}{alt}{suffix}")))
                .collect()
        }
    }
}

/// Finds the first top-level `{`...`}` span, returning its byte offsets.
fn find_brace(word: &str) -> Option<(usize, usize)> {
    let bytes = word.as_bytes();
    let open = bytes.iter().position(|&b| b == b'{')?;
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `body` on commas that are not inside a nested `{...}` group.
fn split_top_level_commas(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_expansion_produces_every_combination() {
        assert_eq!(expand_braces("a{b,c}d"), vec!["abd", "acd"]);
    }

    #[test]
    fn nested_braces_expand_recursively() {
        let mut result = expand_braces("{a,b{c,d}}");
        result.sort();
        assert_eq!(result, vec!["a", "bc", "bd"]);
    }

    #[test]
    fn single_element_braces_are_literal() {
        assert_eq!(expand_braces("a{b}c"), vec!["a{b}c"]);
    }

    #[test]
    fn unmatched_pattern_stays_intact() {
        let words = expand_words(vec!["/no/such/*.nonexistent".to_string()]);
        assert_eq!(words, vec!["/no/such/*.nonexistent".to_string()]);
    }

    #[test]
    fn plain_word_passes_through() {
        let words = expand_words(vec!["echo".to_string(), "hi".to_string()]);
        assert_eq!(words, vec!["echo".to_string(), "hi".to_string()]);
    }
}
