//! Variable and parameter expansion (C2.4), performed on the raw line after
//! command substitution and before alias/wildcard expansion.
//!
//! The five `${NAME:op word}` forms and `${#NAME}` are grounded directly in
//! the original's `expand_parameter` (`variables.c`); this rewrite replaces
//! its hand-rolled offset-indexed C-string scanner with a `Peekable<Chars>`
//! walk that never copies more than once per expansion.

use crate::state::State;

/// Expands every `$...` form in `line` against `state`, in a single
/// left-to-right pass. `${NAME:=word}` assignments are applied to `state`
/// as they are encountered.
pub fn expand(line: &str, state: &mut State) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('{') => {
                chars.next();
                out.push_str(&expand_braced(&mut chars, state));
            }
            Some(next) if is_name_start(next) || next.is_ascii_digit() || is_special(next) => {
                let name = take_simple_name(&mut chars);
                out.push_str(&state.get(&name).unwrap_or_default());
            }
            _ => out.push('$'),
        }
    }

    out
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_special(c: char) -> bool {
    matches!(c, '?' | '$' | '!' | '#')
}

/// Reads a bare `$NAME`, `$?`, `$$`, `$!`, `$#`, or `$N` reference, leaving
/// the cursor just past it.
fn take_simple_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let first = chars.next().unwrap();
    if is_special(first) || first.is_ascii_digit() {
        return first.to_string();
    }
    let mut name = String::new();
    name.push(first);
    while let Some(&c) = chars.peek() {
        if is_name_char(c) {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

/// Reads the body of a `${...}` form, whose opening `${` has already been
/// consumed, and evaluates it against `state`.
fn expand_braced(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, state: &mut State) -> String {
    if chars.peek() == Some(&'#') {
        chars.next();
        let name = read_until_close(chars);
        let len = state.get(&name).map(|v| v.chars().count()).unwrap_or(0);
        return len.to_string();
    }

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '}' {
            chars.next();
            return state.get(&name).unwrap_or_default();
        }
        if c == ':' {
            chars.next();
            let op = chars.next();
            let word = read_until_close(chars);
            let current = state.get(&name);
            let is_set_and_nonempty = current.as_deref().map(|v| !v.is_empty()).unwrap_or(false);

            return match op {
                Some('-') => {
                    if is_set_and_nonempty {
                        current.unwrap()
                    } else {
                        word
                    }
                }
                Some('=') => {
                    if is_set_and_nonempty {
                        current.unwrap()
                    } else {
                        state.set(name.clone(), word.clone());
                        word
                    }
                }
                Some('+') => {
                    if is_set_and_nonempty {
                        word
                    } else {
                        String::new()
                    }
                }
                Some('?') => {
                    if is_set_and_nonempty {
                        current.unwrap()
                    } else {
                        let message = if word.is_empty() {
                            "parameter null or not set".to_string()
                        } else {
                            word
                        };
                        eprintln!("hush: {name}: {message}");
                        String::new()
                    }
                }
                _ => String::new(),
            };
        }
        name.push(c);
        chars.next();
    }
    // Unterminated `${...}`: return whatever name we gathered, verbatim.
    name
}

/// Consumes characters up to (and including) the next unescaped `}`.
fn read_until_close(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut word = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            break;
        }
        word.push(c);
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_simple_variable() {
        let mut state = State::new("hush", vec![]);
        state.set("FOO", "bar");
        assert_eq!(expand("echo $FOO", &mut state), "echo bar");
    }

    #[test]
    fn expands_braced_variable() {
        let mut state = State::new("hush", vec![]);
        state.set("FOO", "bar");
        assert_eq!(expand("echo ${FOO}baz", &mut state), "echo barbaz");
    }

    #[test]
    fn default_value_does_not_assign() {
        let mut state = State::new("hush", vec![]);
        assert_eq!(expand("echo ${BAZ:-default}", &mut state), "echo default");
        assert_eq!(state.get("BAZ"), None);
    }

    #[test]
    fn assign_default_persists() {
        let mut state = State::new("hush", vec![]);
        expand("echo ${BAZ:=default}", &mut state);
        assert_eq!(state.get("BAZ"), Some("default".to_string()));
    }

    #[test]
    fn plus_form_only_fires_when_set() {
        let mut state = State::new("hush", vec![]);
        assert_eq!(expand("${UNSET:+x}", &mut state), "");
        state.set("SET", "1");
        assert_eq!(expand("${SET:+x}", &mut state), "x");
    }

    #[test]
    fn length_form_counts_chars() {
        let mut state = State::new("hush", vec![]);
        state.set("FOO", "hello");
        assert_eq!(expand("${#FOO}", &mut state), "5");
    }

    #[test]
    fn special_parameters_expand() {
        let mut state = State::new("script", vec!["a".into()]);
        state.last_exit_status = 4;
        assert_eq!(expand("$? $# $0 $1", &mut state), "4 1 script a");
    }

    #[test]
    fn literal_dollar_without_a_name_is_untouched() {
        let mut state = State::new("hush", vec![]);
        assert_eq!(expand("price: $ 5", &mut state), "price: $ 5");
    }
}
