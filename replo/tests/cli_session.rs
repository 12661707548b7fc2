//! CLI tests for the `replo` binary.
//!
//! Spawns the binary with piped stdin and a config that swaps the Go
//! toolchain for `cat`.

use std::io::Write;
use std::process::{Command, Stdio};

use replo::exit_codes;
use replo::io::config::write_config;
use replo::test_support::cat_config;

fn replo(args: &[&str], input: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_replo"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn replo");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait replo")
}

#[test]
fn runs_buffer_and_saves_history() {
    let temp = tempfile::tempdir().expect("tempdir");
    let staging = temp.path().join("staging");
    std::fs::create_dir_all(&staging).expect("staging");
    let config = temp.path().join("config.toml");
    write_config(&config, &cat_config(&staging)).expect("config");
    let history = temp.path().join("history.replo");

    let output = replo(
        &[
            "--config",
            config.to_str().expect("utf8"),
            "--file",
            history.to_str().expect("utf8"),
        ],
        "x := 1\n:run\n:quit\n",
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("import \"fmt\"\n"));
    assert!(stdout.contains("package main\n"));
    assert!(stdout.contains("func main() {\nx := 1\n"));
    assert_eq!(
        std::fs::read_to_string(&history).expect("history"),
        "import \"fmt\"\nx := 1\n"
    );
}

#[test]
fn skip_history_leaves_file_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let staging = temp.path().join("staging");
    std::fs::create_dir_all(&staging).expect("staging");
    let config = temp.path().join("config.toml");
    write_config(&config, &cat_config(&staging)).expect("config");
    let history = temp.path().join("history.replo");
    std::fs::write(&history, "saved := true\n").expect("history");

    let output = replo(
        &[
            "-s",
            "-c",
            config.to_str().expect("utf8"),
            "-f",
            history.to_str().expect("utf8"),
        ],
        "y := 2\n:q\n",
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("saved := true"));
    assert_eq!(
        std::fs::read_to_string(&history).expect("history"),
        "saved := true\n"
    );
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "output_limit_bytes = 0\n").expect("config");

    let output = replo(&["-s", "-c", config.to_str().expect("utf8")], "");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("output_limit_bytes"));
}
