use std::fs;
use std::path::PathBuf;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const MODEL: &str = r#"
[model]
nodes = [
    { id = "a", name = "Alpha" },
    { id = "b", name = "Beta" },
    { id = "c", name = "Gamma", node_type = "box" },
]
links = [
    { id = "l1", source = "a", target = "c" },
    { id = "l2", source = "c", target = "b", sign = "negative" },
]
instances = [
    { id = "root", nodes = ["a", "b", "c"], links = ["l1", "l2"] },
]
build_instructions = [{ id = "bi-1", nodes = ["a"] }]
"#;

fn write_script(steps: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("script.toml");
    fs::write(&path, format!("{MODEL}\n{steps}")).expect("write script");
    (dir, path)
}

macro_rules! netedit {
    () => {
        assert_cmd::cargo::cargo_bin_cmd!("netedit")
    };
}

#[test]
fn merge_with_confirmation_commits_one_entry() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "merge-nodes"
keep = "b"
absorb = ["a"]
answers = [{ confirm = true }]
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(contains("[1] merge-nodes: done"))
        .stdout(contains("committed #1 Merge nodes into Beta"))
        .stdout(contains("Undo stack:\n  #1 Merge nodes into Beta"));
}

#[test]
fn declining_the_warning_cancels_without_changes() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "merge-nodes"
keep = "b"
absorb = ["a"]
answers = [{ confirm = false }]
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .arg("--print-model")
        .assert()
        .success()
        .stdout(contains("[1] merge-nodes: cancelled"))
        .stdout(contains("(empty)"))
        .stdout(contains("name = \"Alpha\""));
}

#[test]
fn undo_and_redo_steps_walk_the_history() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "rename-node"
node = "c"
name = "Gamma Prime"

[[steps]]
do = "undo"

[[steps]]
do = "undo"

[[steps]]
do = "redo"
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(contains("[1] rename-node: done"))
        .stdout(contains("[2] undo: Rename node c"))
        .stdout(contains("[3] undo: nothing to undo"))
        .stdout(contains("[4] redo: Rename node c"));
}

#[test]
fn trace_flag_lists_steps() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "change-node-type"
node = "c"
node-type = "diamond"
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .arg("--trace")
        .assert()
        .success()
        .stdout(contains("→ warn-if-build-instructions (continue)"))
        .stdout(contains("✓ will-exit (done)"));
}

#[test]
fn domain_error_is_reported_and_script_continues() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "rename-node"
node = "a"
name = "Beta"

[[steps]]
do = "rename-node"
node = "a"
name = "Omega"
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout(contains("[1] rename-node: error: name 'Beta' is already used by node 'b'"))
        .stdout(contains("[2] rename-node: done"));
}

#[test]
fn running_out_of_answers_fails() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "merge-nodes"
keep = "b"
absorb = ["a"]
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains(
            "script step 1 ('merge-nodes') ran out of answers at step 'await-warning-answer'",
        ));
}

#[test]
fn unknown_operation_lists_available_ones() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "explode"
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("error: operation failed to start"))
        .stderr(contains("caused by: unknown operation 'explode'").and(contains("merge-nodes")));
}

#[test]
fn bad_arguments_show_the_cause() {
    let (_dir, script) = write_script(
        r#"
[[steps]]
do = "rename-node"
nodes = ["a"]
"#,
    );

    netedit!()
        .arg("run")
        .arg(&script)
        .assert()
        .failure()
        .stderr(contains("invalid arguments for 'rename-node'"))
        .stderr(contains("caused by:"));
}

#[test]
fn missing_script_reports_the_path() {
    netedit!()
        .args(["run", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(contains("failed to read script 'does-not-exist.toml'"));
}

#[test]
fn interactive_mode_requires_a_terminal() {
    let (_dir, script) = write_script("");

    netedit!()
        .arg("run")
        .arg(&script)
        .arg("--interactive")
        .env_remove("NETEDIT_FORCE_TTY")
        .assert()
        .failure()
        .stderr(contains("interactive mode requires a terminal"));
}
