use std::{fs, path::Path, process::Command};

const EXPECTED: &str = "Resultant Matrix C = A x B:\n  30  24  18\n  84  69  54\n 138 114  90\n";

fn run_in(dir: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rowmul"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("couldn't run rowmul")
}

#[test]
fn prints_product_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
    assert!(output.stderr.is_empty());
}

#[test]
fn pool_strategy_prints_same_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(rowmul::config::CONFIG_FILE),
        "strategy = \"pool\"\nthreads = 2\n",
    )
    .unwrap();

    let output = run_in(dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
}

#[test]
fn logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(rowmul::config::CONFIG_FILE),
        "log = \"rowmul=trace\"\n",
    )
    .unwrap();

    let output = run_in(dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("AwaitingCompletion -> Printing"), "{stderr}");
}

#[test]
fn broken_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(rowmul::config::CONFIG_FILE), "strategy = 3\n").unwrap();

    let output = run_in(dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("warning: ignoring rowmul.toml"));
}

#[test]
fn layout_is_not_configurable() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(rowmul::config::CONFIG_FILE), "width = 6\n").unwrap();

    let output = run_in(dir.path());

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), EXPECTED);
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("warning: ignoring rowmul.toml"));
}
