//! Exercises the `babyduckc` binary's file-path input branch end to end.

use std::io::Write;
use std::process::Command;

#[test]
fn compiles_and_runs_a_source_file_given_as_an_argument() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "program p; var x: int; main {{ x = 2 + 3 * 4; print(x); }} end").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_babyduckc"))
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "14\n");
}

#[test]
fn dump_quads_on_a_file_argument_prints_a_quadruple_listing_instead_of_running() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "program p; var x: int; main {{ x = 1; }} end").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_babyduckc"))
        .arg(file.path())
        .arg("--dump-quads")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("MainStart") || stdout.lines().count() > 1, "unexpected dump: {stdout}");
}

#[test]
fn a_missing_source_file_is_reported_as_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_babyduckc"))
        .arg("/nonexistent/path/does-not-exist.bd")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("Error:"));
}
