use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn gesso() -> Command {
    Command::cargo_bin("gesso").expect("binary builds")
}

#[test]
fn renders_stdin_markdown_to_html() {
    gesso()
        .write_stdin("# Title\n\nhello *world*\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1"))
        .stdout(predicate::str::contains("<em>world</em>"))
        .stdout(predicate::str::contains("msg-assistant"));
}

#[test]
fn renders_file_with_math() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "energy: $E=mc^2$").expect("write");

    gesso()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("math-inline"))
        .stdout(predicate::str::contains("katex"));
}

#[test]
fn user_scheme_flag_changes_classes() {
    gesso()
        .arg("--color-scheme")
        .arg("user")
        .write_stdin("hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("msg-user"));
}

#[test]
fn json_format_emits_parseable_document() {
    let output = gesso()
        .arg("--format")
        .arg("json")
        .write_stdin("one $x^2$ two")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(value["contains_math"], serde_json::Value::Bool(true));
    assert!(value["document"]["blocks"].is_array());
}

#[test]
fn no_chemistry_flag_disables_sniffing() {
    gesso()
        .arg("--format")
        .arg("json")
        .arg("--no-chemistry")
        .write_stdin("$\\ce{H2O}$")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"contains_chemistry\": false"));
}

#[test]
fn output_flag_writes_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("message.html");

    gesso()
        .arg("--output")
        .arg(&out_path)
        .write_stdin("plain text")
        .assert()
        .success();

    let written = std::fs::read_to_string(&out_path).expect("output written");
    assert!(written.contains("plain text"));
}

#[test]
fn missing_input_file_fails_with_message() {
    gesso()
        .arg("/definitely/not/a/file.md")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read input"));
}
