use std::path::PathBuf;

use assert_cmd::Command;

fn sample(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("samples");
    path.push(name);
    path
}

fn lucix() -> Command {
    Command::cargo_bin("lucix").expect("lucix binary")
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn run_prints_entry_point_result() {
    let output = lucix()
        .arg("run")
        .arg(sample("add.lx"))
        .output()
        .expect("failed to spawn lucix");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "5");
    assert!(stderr_of(&output).contains("define i32 @add(i32 %a, i32 %b)"));
}

#[test]
fn run_with_branches_and_shadowing() {
    for (name, expected) in [("branch.lx", "1"), ("shadow.lx", "2")] {
        let output = lucix()
            .args(["run", "--no-opt"])
            .arg(sample(name))
            .output()
            .expect("failed to spawn lucix");
        assert!(output.status.success(), "{}: {}", name, stderr_of(&output));
        assert_eq!(stdout_of(&output).trim(), expected, "{}", name);
    }
}

#[test]
fn undeclared_call_exits_with_failure() {
    let output = lucix()
        .arg("run")
        .arg(sample("undeclared.lx"))
        .output()
        .expect("failed to spawn lucix");
    assert!(!output.status.success());
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("cannot resolve function missing"));
}

#[test]
fn json_report_is_machine_readable() {
    let output = lucix()
        .args(["run", "--report", "json"])
        .arg(sample("undeclared.lx"))
        .output()
        .expect("failed to spawn lucix");
    let report: serde_json::Value =
        serde_json::from_str(stderr_of(&output).trim()).expect("json report");
    assert_eq!(report["code"], 3);
}

#[test]
fn build_summarizes_without_running() {
    let output = lucix()
        .args(["build", "--dump", "ast"])
        .arg(sample("add.lx"))
        .output()
        .expect("failed to spawn lucix");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Build summary for add.lx"));
    assert!(stdout.contains("i32 @add(i32, i32)"));
    assert!(!stdout.lines().any(|l| l.trim() == "5"));
    assert!(stderr_of(&output).contains("FunctionDeclaration"));
}

#[test]
fn config_file_changes_entry_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("main.lx");
    std::fs::write(&script, "fn main() i32 { return 42; }").expect("write script");
    let config = dir.path().join("lucix.json");
    std::fs::write(&config, r#"{ "entry_point": "main", "print_ir": false }"#)
        .expect("write config");

    let output = lucix()
        .current_dir(dir.path())
        .arg("run")
        .arg(&script)
        .output()
        .expect("failed to spawn lucix");
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output).trim(), "42");
    assert!(!stderr_of(&output).contains("define"));
}

#[test]
fn missing_script_is_reported() {
    lucix()
        .args(["run", "does/not/exist.lx"])
        .assert()
        .failure();
}
