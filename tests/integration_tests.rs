//! End-to-end scenarios driven against the built `hush` binary, adapted from
//! the teacher's `tests/integration_tests.rs` + `tests/workdir.rs` fixture
//! harness (`assert_cmd`/`predicates` in place of the teacher's
//! `assert_cli`/`tempdir`, which are both unmaintained).

use assert_cmd::Command;
use predicates::prelude::*;

fn hush() -> Command {
    Command::cargo_bin("hush").unwrap()
}

#[test]
fn echoes_its_arguments() {
    hush()
        .args(["-c", "echo a b c"])
        .assert()
        .success()
        .stdout("a b c\n");
}

#[test]
fn variable_assignment_is_visible_to_a_later_command() {
    hush()
        .args(["-c", "FOO=bar; echo ${FOO:-default}"])
        .assert()
        .success()
        .stdout("bar\n");
}

#[test]
fn unset_variable_falls_back_to_its_default() {
    hush()
        .args(["-c", "echo ${BAZ:-default}"])
        .assert()
        .success()
        .stdout("default\n");
}

#[test]
fn pipeline_runs_every_stage() {
    hush()
        .args(["-c", "echo hello | tr a-z A-Z | wc -c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6"));
}

#[test]
fn and_short_circuits_so_the_semicolon_tail_still_runs() {
    hush()
        .args(["-c", "false && echo x ; echo y"])
        .assert()
        .success()
        .stdout("y\n");
}

#[test]
fn for_loop_expands_the_variable_fresh_each_pass() {
    hush()
        .args(["-c", "for i in 1 2 3; do echo $i; done"])
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn alias_expands_before_the_first_word_is_dispatched() {
    hush()
        .args(["-c", "alias say='echo'; say hi there"])
        .assert()
        .success()
        .stdout("hi there\n");
}

#[test]
fn nested_command_substitution_runs_innermost_first() {
    hush()
        .args(["-c", "echo $(echo nested $(echo deep))"])
        .assert()
        .success()
        .stdout("nested deep\n");
}

#[test]
fn command_not_found_exits_127() {
    hush()
        .args(["-c", "no_such_program_anywhere_on_path"])
        .assert()
        .code(127);
}

#[test]
fn unterminated_if_block_reports_a_syntax_error() {
    hush()
        .args(["-c", "if true then echo x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn if_else_picks_the_matching_branch() {
    hush()
        .args(["-c", "if false; then echo yes; else echo no; fi"])
        .assert()
        .success()
        .stdout("no\n");
}

#[test]
fn exit_builtin_sets_the_process_exit_code() {
    hush().args(["-c", "exit 7"]).assert().code(7);
}
