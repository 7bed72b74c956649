//! Integration tests for the zsplit CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write `data` zstd-compressed to `dir/name`
fn compressed_input(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, zstd::encode_all(data, 3).unwrap()).unwrap();
    path
}

/// Shell converter that copies the segment to `<base>.parquet`
fn copy_script(dir: &Path) -> PathBuf {
    let path = dir.join("convert.sh");
    fs::write(&path, "#!/bin/sh\ncp \"$1\" \"$2.parquet\"\necho \"converted $1\"\n").unwrap();
    path
}

fn split_cmd(input: &Path, prefix: &Path, script: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zsplit").unwrap();
    cmd.arg("split")
        .arg("-i")
        .arg(input)
        .arg("-o")
        .arg(prefix)
        .arg("--converter-program")
        .arg("sh")
        .arg("--converter-script")
        .arg(script)
        .arg("-q");
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("zsplit").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("generate-config"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_missing_input() {
    let mut cmd = Command::cargo_bin("zsplit").unwrap();
    cmd.arg("split").arg("-i").arg("/nonexistent/RC.zst").arg("-q");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File not found: /nonexistent/RC.zst"));
}

#[cfg(unix)]
#[test]
fn test_split_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let input = compressed_input(temp_dir.path(), "RC.zst", b"{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n");
    let script = copy_script(temp_dir.path());
    let prefix = temp_dir.path().join("RC");

    split_cmd(&input, &prefix, &script)
        .arg("--segment-bytes")
        .arg("16")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total lines processed: 3"))
        .stdout(predicate::str::contains("Parts written: 2"))
        .stdout(predicate::str::contains("RC_part_002.parquet"));

    assert_eq!(
        fs::read(temp_dir.path().join("RC_part_001.parquet")).unwrap(),
        b"{\"a\":1}\n{\"a\":2}\n"
    );
    assert_eq!(
        fs::read(temp_dir.path().join("RC_part_002.parquet")).unwrap(),
        b"{\"a\":3}\n"
    );
    assert!(!temp_dir.path().join("RC_part_001.jsonl").exists());
    assert!(!temp_dir.path().join("RC_part_002.jsonl").exists());
}

#[cfg(unix)]
#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = compressed_input(temp_dir.path(), "RC.zst", b"x\ny\n");
    let script = copy_script(temp_dir.path());

    let output = split_cmd(&input, &temp_dir.path().join("RC"), &script)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["stats"]["total_records"], 2);
    assert_eq!(value["stats"]["segments"], 1);
}

#[cfg(unix)]
#[test]
fn test_converter_failure_reports_part() {
    let temp_dir = TempDir::new().unwrap();
    let input = compressed_input(temp_dir.path(), "RC.zst", b"x\ny\n");
    let script = temp_dir.path().join("fail.sh");
    fs::write(&script, "#!/bin/sh\necho 'Binder Error: bad column' >&2\nexit 1\n").unwrap();

    split_cmd(&input, &temp_dir.path().join("RC"), &script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process part 1"))
        .stderr(predicate::str::contains("Binder Error: bad column"));

    // The failing segment is kept for inspection
    assert_eq!(
        fs::read(temp_dir.path().join("RC_part_001.jsonl")).unwrap(),
        b"x\ny\n"
    );
}

#[cfg(unix)]
#[test]
fn test_empty_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = compressed_input(temp_dir.path(), "RC.zst", b"");
    let script = copy_script(temp_dir.path());

    split_cmd(&input, &temp_dir.path().join("RC"), &script)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No data was written from the input file",
        ));

    assert!(!temp_dir.path().join("RC_part_001.jsonl").exists());
}

#[cfg(unix)]
#[test]
fn test_oversized_record_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut data = vec![b'z'; 4096];
    data.push(b'\n');
    let input = compressed_input(temp_dir.path(), "RC.zst", &data);
    let script = copy_script(temp_dir.path());

    split_cmd(&input, &temp_dir.path().join("RC"), &script)
        .arg("--max-record-bytes")
        .arg("1024")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process part 1"));
}

#[test]
fn test_zero_segment_size_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let input = compressed_input(temp_dir.path(), "RC.zst", b"x\n");

    let mut cmd = Command::cargo_bin("zsplit").unwrap();
    cmd.arg("split")
        .arg("-i")
        .arg(&input)
        .arg("--segment-bytes")
        .arg("0")
        .arg("-q");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_conflicting_size_flags() {
    let mut cmd = Command::cargo_bin("zsplit").unwrap();
    cmd.arg("split")
        .arg("-i")
        .arg("in.zst")
        .arg("--buffer-mb")
        .arg("1")
        .arg("--buffer-bytes")
        .arg("1024");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
