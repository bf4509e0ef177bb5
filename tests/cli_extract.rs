mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use common::temp_config_file;

fn chatdrop(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("chatdrop").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_extract_prints_text_file_block() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "abc").unwrap();

    chatdrop(&dir.path().join("missing-config.yaml"))
        .arg("extract")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("[File: notes.txt]"))
        .stdout(predicate::str::contains("abc"));
}

#[test]
fn test_extract_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("deck.pptx");
    fs::write(&file, b"PK\x03\x04").unwrap();

    let output = chatdrop(&dir.path().join("missing-config.yaml"))
        .arg("extract")
        .arg("--json")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["attachments"][0]["name"], "deck.pptx");
    assert_eq!(parsed["attachments"][0]["kind"], "slide_deck");
    assert!(parsed["failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_extract_reports_failed_files() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.txt");
    let bad = dir.path().join("bad.txt");
    fs::write(&good, "fine").unwrap();
    fs::write(&bad, [0xffu8, 0xfe]).unwrap();

    chatdrop(&dir.path().join("missing-config.yaml"))
        .arg("extract")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[File: good.txt]"))
        .stderr(predicate::str::contains(
            "Failed to process the following files: bad.txt",
        ));
}

#[test]
fn test_extract_rejects_oversized_batch_from_config() {
    let (dir, config) = temp_config_file(
        r#"
provider:
  type: openai
upload:
  max_files_per_batch: 1
"#,
    );
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();

    chatdrop(&config)
        .arg("extract")
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many files"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_dir, config) = temp_config_file("provider:\n  type: copilot\n");
    let file_dir = TempDir::new().unwrap();
    let file = file_dir.path().join("a.txt");
    fs::write(&file, "a").unwrap();

    chatdrop(&config)
        .arg("extract")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid provider type"));
}

#[test]
fn test_extract_workbook_fixture_writes_dates() {
    let dir = TempDir::new().unwrap();
    let workbook = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("orders.xlsx");

    chatdrop(&dir.path().join("missing-config.yaml"))
        .arg("extract")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("[File: orders.xlsx]"))
        .stdout(predicate::str::contains("\"pear, green\",2024-01-15,3"));
}
