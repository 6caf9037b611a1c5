// CLI integration tests: check and normalize against a schema document.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_json-codec");
    Command::new(exe)
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn run(args: &[&str]) -> Output {
    cmd().args(args).env("NO_COLOR", "1").output().expect("spawn json-codec")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

const STATUS_SCHEMA: &str = r#"{
    "root": {
        "type": "object",
        "properties": {
            "status": { "type": "number" },
            "error": { "type": "string", "optional": true }
        }
    }
}"#;

const LEDGER_SCHEMA: &str = r#"{
    "root": { "type": "array", "items": { "type": "ref", "name": "entry" } },
    "definitions": {
        "entry": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "amount": { "type": "bigint" }
            }
        }
    }
}"#;

#[test]
fn check_reports_each_document() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write(temp.path(), "schema.json", STATUS_SCHEMA);
    let good = write(temp.path(), "good.json", r#"{"status": 200}"#);
    let bad = write(temp.path(), "bad.json", r#"{"status": 500, "error": null}"#);

    let passed = run(&["check", "-s", schema.to_str().unwrap(), "-i", good.to_str().unwrap()]);
    assert!(passed.status.success());
    assert!(stdout(&passed).contains("good.json"));

    let failed = run(&[
        "check",
        "-s",
        schema.to_str().unwrap(),
        "-i",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
    ]);
    assert_eq!(failed.status.code(), Some(1));
    let text = stdout(&failed);
    assert!(text.contains("bad.json"), "{text}");
    assert!(text.contains("error"), "{text}");
    assert!(String::from_utf8_lossy(&failed.stderr).contains("1 passed, 1 failed"));
}

#[test]
fn ndjson_lines_are_separate_documents() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write(temp.path(), "schema.json", STATUS_SCHEMA);
    let input = write(temp.path(), "events.ndjson", "{\"status\": 1}\n\n{\"status\": \"2\"}\n{\"status\": 3}\n");

    let output = run(&["check", "--ndjson", "-s", schema.to_str().unwrap(), "-i", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("events.ndjson:3"), "{text}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 passed, 1 failed"));
}

#[test]
fn normalize_keeps_exact_integers() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write(temp.path(), "schema.json", LEDGER_SCHEMA);
    let input = write(
        temp.path(),
        "ledger.json",
        r#"[ { "id": "123e4567-e89b-12d3-a456-426614174000",
               "amount": 249859248759324985924875932498592487593249859248759324985924875932498592487593 } ]"#,
    );
    let out = temp.path().join("nested").join("out.ndjson");

    let output = run(&[
        "normalize",
        "-s",
        schema.to_str().unwrap(),
        "-i",
        input.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let written = std::fs::read_to_string(&out).expect("read output");
    assert_eq!(
        written,
        "[{\"id\":\"123e4567-e89b-12d3-a456-426614174000\",\
         \"amount\":249859248759324985924875932498592487593249859248759324985924875932498592487593}]\n"
    );
}

#[test]
fn jq_outputs_are_decoded_one_by_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write(temp.path(), "schema.json", STATUS_SCHEMA);
    let input = write(temp.path(), "batch.json", r#"{"items": [{"status": 1}, {"status": 2, "error": "x"}]}"#);

    let output = run(&[
        "normalize",
        "-s",
        schema.to_str().unwrap(),
        "-i",
        input.to_str().unwrap(),
        "--jq-expr",
        ".items[]",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "{\"status\":1}\n{\"status\":2,\"error\":\"x\"}\n");
}

#[test]
fn json_pointer_selects_the_checked_node() {
    let temp = tempfile::tempdir().expect("tempdir");
    let schema = write(temp.path(), "schema.json", STATUS_SCHEMA);
    let input = write(temp.path(), "wrapped.json", r#"{"data": {"status": 7}}"#);

    let output = run(&[
        "normalize",
        "-s",
        schema.to_str().unwrap(),
        "-i",
        input.to_str().unwrap(),
        "--json-pointer",
        "/data",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "{\"status\":7}\n");
}

#[test]
fn invalid_schema_documents_exit_with_two() {
    let temp = tempfile::tempdir().expect("tempdir");
    let input = write(temp.path(), "doc.json", "{}");

    let unknown_type = write(temp.path(), "unknown.json", r#"{"root": {"type": "float"}}"#);
    let output = run(&["check", "-s", unknown_type.to_str().unwrap(), "-i", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));

    let dangling = write(temp.path(), "dangling.json", r#"{"root": {"type": "ref", "name": "missing"}}"#);
    let output = run(&["check", "-s", dangling.to_str().unwrap(), "-i", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}
