//! Tab-completion protocol (§4.1's "Completion protocol" paragraph).
//!
//! Grounded in the original's `completion.c`: `get_completions` splitting on
//! command position vs. argument position, `add_executables_from_path`'s
//! PATH scan with an executable-bit check, `find_common_prefix`, and
//! `display_completions`'s column layout with the "Display all N
//! possibilities?" threshold prompt.

use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Above this many candidates, the caller must confirm before the full set
/// is printed (the C original's `MANY_COMPLETIONS_THRESHOLD`).
pub const MANY_COMPLETIONS_THRESHOLD: usize = 100;

/// The result of completing the token under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Byte offset in the line where the completed token begins.
    pub token_start: usize,
    /// Byte offset where the completed token ends (the cursor position).
    pub token_end: usize,
    /// Every match, deduplicated and sorted.
    pub candidates: Vec<String>,
}

impl Completion {
    /// The longest string every candidate starts with, case-sensitive.
    pub fn common_prefix(&self) -> &str {
        let Some(first) = self.candidates.first() else {
            return "";
        };
        let mut len = first.len();
        for candidate in &self.candidates[1..] {
            len = common_prefix_len(&first[..len], candidate);
        }
        &first[..len]
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.char_indices())
        .take_while(|((_, ca), (_, cb))| ca == cb)
        .last()
        .map(|((i, c), _)| i + c.len_utf8())
        .unwrap_or(0)
}

/// Finds the token containing `cursor` (bytes) and the candidates that
/// complete it, per §4.1.
pub fn complete(line: &str, cursor: usize) -> Completion {
    let cursor = cursor.min(line.len());
    let token_start = line[..cursor]
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let prefix = &line[token_start..cursor];
    let is_first_word = !line[..token_start].trim_start().contains(char::is_whitespace)
        && line[..token_start].trim().is_empty();

    let candidates = if is_first_word && !starts_as_path(prefix) {
        complete_command(prefix)
    } else {
        complete_path(prefix)
    };

    Completion {
        token_start,
        token_end: cursor,
        candidates,
    }
}

fn starts_as_path(prefix: &str) -> bool {
    prefix.starts_with('.') || prefix.starts_with('/') || prefix.starts_with('~')
}

/// First-word completion: every executable on `PATH` whose name starts with
/// `prefix` (the original's `add_executables_from_path`).
fn complete_command(prefix: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(path_var) = env::var_os("PATH") {
        for dir in env::split_paths(&path_var) {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.starts_with(prefix) {
                    continue;
                }
                if is_executable(&entry.path()) {
                    names.push(name);
                }
            }
        }
    }
    dedup_and_sort(names, prefix)
}

fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Filesystem-path completion: entries of the directory containing `prefix`
/// whose name starts with the file-name part of `prefix`. Directories are
/// suffixed with `/`.
fn complete_path(prefix: &str) -> Vec<String> {
    let expanded = expand_tilde(prefix);
    let (dir, file_prefix) = split_path(&expanded);
    let list_dir = if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir.clone()
    };

    let Ok(entries) = fs::read_dir(&list_dir) else {
        return Vec::new();
    };

    let dir_prefix = prefix
        .rsplit_once('/')
        .map(|(d, _)| format!("{d}/"))
        .unwrap_or_default();

    let mut names = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(&file_prefix) {
            continue;
        }
        if (name == "." || name == "..") && !file_prefix.starts_with('.') {
            continue;
        }
        let is_dir = entry.path().is_dir();
        let mut full = format!("{dir_prefix}{name}");
        if is_dir {
            full.push('/');
        }
        names.push(full);
    }
    dedup_and_sort(names, &format!("{dir_prefix}{file_prefix}"))
}

fn dedup_and_sort(mut names: Vec<String>, _prefix: &str) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}

/// Splits a path into its containing directory and the file-name prefix
/// still being typed (the original's `parse_path`).
fn split_path(path: &str) -> (PathBuf, String) {
    match path.rsplit_once('/') {
        Some((dir, file)) => {
            let dir = if dir.is_empty() { "/" } else { dir };
            (PathBuf::from(dir), file.to_string())
        }
        None => (PathBuf::new(), path.to_string()),
    }
}

/// Expands a leading `~` or `~user` to a home directory (the original's
/// `expand_tilde`). Falls back to the input unchanged when no home is
/// known.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.display().to_string();
        }
    }
    path.to_string()
}

/// Lays candidates out in as many equal-width columns as fit in `width`
/// columns of terminal space (the original's `display_completions_in_columns`).
pub fn format_columns(candidates: &[String], width: usize) -> String {
    if candidates.is_empty() {
        return String::new();
    }
    let longest = candidates.iter().map(|c| c.len()).max().unwrap_or(1);
    let col_width = longest + 2;
    let columns = (width / col_width).max(1);
    let rows = candidates.len().div_ceil(columns);

    let mut out = String::new();
    for row in 0..rows {
        for col in 0..columns {
            let idx = col * rows + row;
            let Some(candidate) = candidates.get(idx) else {
                continue;
            };
            if col + 1 == columns || idx + rows >= candidates.len() {
                out.push_str(candidate);
            } else {
                out.push_str(&format!("{candidate:<col_width$}"));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_of_sorted_candidates() {
        let c = Completion {
            token_start: 0,
            token_end: 0,
            candidates: vec!["cargo".into(), "cargo-fmt".into(), "cargo-clippy".into()],
        };
        assert_eq!(c.common_prefix(), "cargo");
    }

    #[test]
    fn common_prefix_with_no_shared_chars_is_empty() {
        let c = Completion {
            token_start: 0,
            token_end: 0,
            candidates: vec!["ls".into(), "cat".into()],
        };
        assert_eq!(c.common_prefix(), "");
    }

    #[test]
    fn complete_finds_token_start_at_last_whitespace() {
        let result = complete("echo hel", 8);
        assert_eq!(result.token_start, 5);
        assert_eq!(&"echo hel"[result.token_start..result.token_end], "hel");
    }

    #[test]
    fn first_word_with_dot_slash_uses_path_completion() {
        let result = complete("./conf", 6);
        assert_eq!(result.token_start, 0);
    }

    #[test]
    fn hidden_entries_are_suppressed_unless_prefix_starts_with_dot() {
        let tmp = std::env::temp_dir().join("hush_completion_test_hidden");
        let _ = fs::create_dir_all(&tmp);
        let _ = fs::write(tmp.join(".hidden"), b"");
        let _ = fs::write(tmp.join("visible"), b"");

        let prefix = format!("{}/", tmp.display());
        let result = complete_path(&prefix);
        assert!(result.iter().any(|c| c.ends_with("visible")));
        assert!(!result.iter().any(|c| c.ends_with(".hidden")));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn columns_layout_wraps_within_width() {
        let candidates: Vec<String> = (0..6).map(|i| format!("item{i}")).collect();
        let text = format_columns(&candidates, 20);
        assert!(text.lines().count() >= 2);
    }
}
