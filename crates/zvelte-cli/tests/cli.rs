//! End-to-end tests of the `zvelte-parse` binary.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(dir: &TempDir, name: &str, source: &str, extra: &[&str]) -> Output {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("Failed to write template");
    Command::new(env!("CARGO_BIN_EXE_zvelte-parse"))
        .arg(&path)
        .args(extra)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run zvelte-parse")
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "page.zvelte", "<h1>{{ title }}</h1>", &[]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "Root");
    assert_eq!(value["fragment"]["nodes"][0]["type"], "RegularElement");
    assert_eq!(
        value["fragment"]["nodes"][0]["fragment"]["nodes"][0]["expression"]["name"],
        "title"
    );
}

#[test]
fn test_check_output() {
    let dir = TempDir::new().unwrap();
    let output = run(
        &dir,
        "page.zvelte",
        "<script>import A from 'a';</script>\n<A key=\"a\" />",
        &["--output", "check"],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim_end().ends_with("page.zvelte: ok (2 top-level nodes, 1 imports)"));
}

#[test]
fn test_debug_output() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "page.zvelte", "<p></p>", &["--output", "debug"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("RegularElement"));
}

#[test]
fn test_parse_error_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, "broken.zvelte", "<div>\n  {% endif %}\n</div>", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("`{% endif %}` does not close the current block"));
    assert!(stderr.contains("broken.zvelte"));
}

#[test]
fn test_options_are_forwarded() {
    let dir = TempDir::new().unwrap();
    let source = "<z:head></z:head>";
    assert!(!run(&dir, "a.zvelte", source, &[]).status.success());
    assert!(run(&dir, "a.zvelte", source, &["--special-tag", "z"]).status.success());

    let nested = "<a><b><c></c></b></a>";
    assert!(!run(&dir, "b.zvelte", nested, &["--max-depth", "2"]).status.success());

    let brackets = "{{ [[[a]]] }}";
    assert!(run(&dir, "c.zvelte", brackets, &[]).status.success());
    assert!(!run(&dir, "c.zvelte", brackets, &["--max-expression-depth", "3"]).status.success());
}

#[test]
fn test_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_zvelte-parse"))
        .arg(Path::new("does/not/exist.zvelte"))
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run zvelte-parse");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
