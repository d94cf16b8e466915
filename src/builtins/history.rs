//! `history [-c] [-s SIZE]`.

use crate::errors::{ShellError, ShellResult};
use crate::state::State;

use super::BuiltinOutcome;

pub fn run(args: &[String], state: &mut State) -> ShellResult<BuiltinOutcome> {
    match args.first().map(String::as_str) {
        None => {
            for (i, entry) in state.history_entries().enumerate() {
                println!("{:5}  {entry}", i + 1);
            }
        }
        Some("-c") => state.clear_history(),
        Some("-s") => {
            let size = args
                .get(1)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ShellError::builtin("history", "-s requires a numeric SIZE", 1))?;
            state.set_history_capacity(size);
        }
        Some(other) => return Err(ShellError::builtin("history", format!("{other}: invalid option"), 1)),
    }
    Ok(BuiltinOutcome::Continue(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_dash_c_clears() {
        let mut state = State::new("hush", vec![]);
        state.record_history("echo a");
        run(&["-c".to_string()], &mut state).unwrap();
        assert_eq!(state.history_len(), 0);
    }

    #[test]
    fn history_dash_s_resizes() {
        let mut state = State::new("hush", vec![]);
        for i in 0..5 {
            state.record_history(&format!("cmd{i}"));
        }
        run(&["-s".to_string(), "2".to_string()], &mut state).unwrap();
        assert_eq!(state.history_len(), 2);
    }
}
