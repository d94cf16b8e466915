//! Thin entry point: parses the command line, wires up logging, builds a
//! [`hush::Shell`], and dispatches to one of the three invocation modes
//! `hush` / `hush -c COMMAND` / `hush SCRIPT [ARGS...]` (§6).

use std::fs::OpenOptions;
use std::process;

use clap::Parser;
use tracing::error;

use hush::config::Cli;
use hush::{Shell, ShellConfig};

const LOG_FILE_NAME: &str = ".hush_log";

fn main() {
    let cli = Cli::parse();
    if cli.log {
        init_file_logging();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let code = if let Some(command) = &cli.command {
        run_command(command)
    } else if let Some(script) = &cli.script {
        run_script(script, &cli.args)
    } else {
        run_interactive()
    };

    process::exit(code);
}

fn init_file_logging() {
    let Some(mut path) = dirs::home_dir() else {
        eprintln!("hush: could not determine home directory for logging");
        return;
    };
    path.push(LOG_FILE_NAME);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_writer(file)
                .with_ansi(false)
                .init();
        }
        Err(e) => eprintln!("hush: failed to open {}: {e}", path.display()),
    }
}

fn run_command(command: &str) -> i32 {
    let mut shell = match Shell::new("hush", Vec::new(), ShellConfig::noninteractive()) {
        Ok(shell) => shell,
        Err(e) => return display_error_and_exit(&e),
    };
    shell.run_command(command)
}

fn run_script(script: &std::path::Path, args: &[String]) -> i32 {
    let script_name = script.display().to_string();
    let mut shell = match Shell::new(&script_name, args.to_vec(), ShellConfig::noninteractive()) {
        Ok(shell) => shell,
        Err(e) => return display_error_and_exit(&e),
    };
    match shell.run_script(script) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("hush: {e}");
            e.exit_code()
        }
    }
}

fn run_interactive() -> i32 {
    let mut shell = match Shell::new("hush", Vec::new(), ShellConfig::interactive()) {
        Ok(shell) => shell,
        Err(e) => return display_error_and_exit(&e),
    };
    shell.run_interactive()
}

fn display_error_and_exit(error: &hush::ShellError) -> i32 {
    error!("failed to create shell: {error}");
    eprintln!("hush: {error}");
    error.exit_code()
}
