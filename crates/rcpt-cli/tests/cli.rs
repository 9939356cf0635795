use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const SAFEWAY: &str = "SAFEWAY\nBANANAS 1.29\nMILK 3.49\nSUBTOTAL 4.78\nTAX 0.38\nTOTAL 5.16\n";

fn rcpt() -> Command {
    Command::cargo_bin("rcpt").unwrap()
}

#[test]
fn test_process_file_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("safeway.txt");
    let config = dir.path().join("config.json");
    fs::write(&input, SAFEWAY).unwrap();
    fs::write(&config, "{}").unwrap();

    let output = rcpt()
        .args(["-c", config.to_str().unwrap(), "process"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["merchant"], "SAFEWAY");
    assert_eq!(json["total"], "$5.16");
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
}

#[test]
fn test_process_stdin_text_format() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    rcpt()
        .args(["-c", config.to_str().unwrap(), "process", "-", "-f", "text"])
        .write_stdin(SAFEWAY)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merchant: SAFEWAY"))
        .stdout(predicate::str::contains("$5.16"));
}

#[test]
fn test_process_explain_and_validate() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    rcpt()
        .args(["-c", config.to_str().unwrap(), "process", "-", "--explain", "--validate"])
        .write_stdin("CORNER STORE\nSANDWICH 7.50\nCHIPS 3.25\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Line classification:"))
        .stderr(predicate::str::contains("Validation issues:"))
        .stderr(predicate::str::contains("Missing date"));
}

#[test]
fn test_process_remote_response() {
    let dir = tempdir().unwrap();
    let reply = dir.path().join("reply.txt");
    let config = dir.path().join("config.json");
    fs::write(&reply, r#"Result: {"merchant":"TARGET","total":9.5}"#).unwrap();
    fs::write(&config, "{}").unwrap();

    rcpt()
        .args(["-c", config.to_str().unwrap(), "process", "--remote-response"])
        .arg(&reply)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"merchant\": \"TARGET\""))
        .stdout(predicate::str::contains("$9.50"));
}

#[test]
fn test_process_missing_input() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();

    rcpt()
        .args(["-c", config.to_str().unwrap(), "process", "/nonexistent/receipt.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_writes_outputs_and_summary() {
    let dir = tempdir().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    let config = dir.path().join("config.json");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(&config, "{}").unwrap();
    fs::write(inputs.join("a.txt"), SAFEWAY).unwrap();
    fs::write(inputs.join("b.txt"), "KROGER\nEGGS 2.99\nTOTAL 2.99\n").unwrap();
    fs::write(inputs.join("notes.md"), "ignored").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());

    rcpt()
        .args(["-c", config.to_str().unwrap(), "batch", &pattern, "-j", "2", "--summary", "-f", "csv"])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(outputs.join("a.csv").exists());
    assert!(outputs.join("b.csv").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,SAFEWAY"));
    assert!(summary.contains("b.txt,success,KROGER"));
}

#[test]
fn test_batch_stops_on_error_unless_asked() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    fs::write(dir.path().join("binary.txt"), [0xff, 0xfe, 0xfd]).unwrap();

    let pattern = format!("{}/*.txt", dir.path().display());

    rcpt()
        .args(["-c", config.to_str().unwrap(), "batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));

    rcpt()
        .args(["-c", config.to_str().unwrap(), "batch", &pattern, "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"));
}

#[test]
fn test_batch_accepts_empty_files() {
    let dir = tempdir().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    let config = dir.path().join("config.json");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(&config, "{}").unwrap();
    fs::write(inputs.join("a.txt"), SAFEWAY).unwrap();
    fs::write(inputs.join("empty.txt"), "   \n").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());

    rcpt()
        .args(["-c", config.to_str().unwrap(), "batch", &pattern, "--summary"])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .success();

    assert!(outputs.join("empty.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,SAFEWAY"));
    assert!(summary.contains("empty.txt,partial"));
}

#[test]
fn test_batch_names_outputs_after_subdirectory_on_collision() {
    let dir = tempdir().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    let config = dir.path().join("config.json");
    fs::create_dir_all(inputs.join("a")).unwrap();
    fs::create_dir_all(inputs.join("b")).unwrap();
    fs::write(&config, "{}").unwrap();
    fs::write(inputs.join("a").join("receipt.txt"), SAFEWAY).unwrap();
    fs::write(inputs.join("b").join("receipt.txt"), "KROGER\nEGGS 2.99\nTOTAL 2.99\n").unwrap();

    let pattern = format!("{}/*/receipt.txt", inputs.display());

    rcpt()
        .args(["-c", config.to_str().unwrap(), "batch", &pattern])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let a = fs::read_to_string(outputs.join("a_receipt.json")).unwrap();
    let b = fs::read_to_string(outputs.join("b_receipt.json")).unwrap();
    assert!(a.contains("SAFEWAY"));
    assert!(b.contains("KROGER"));
    assert!(!outputs.join("receipt.json").exists());
}

#[test]
fn test_config_init_set_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("rcpt").join("config.json");
    let config_arg = config.to_str().unwrap();

    rcpt()
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    rcpt()
        .args(["-c", config_arg, "config", "set", "extraction.min_item_name_len", "3"])
        .assert()
        .success();

    rcpt()
        .args(["-c", config_arg, "config", "get", "extraction.min_item_name_len"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    rcpt()
        .args(["-c", config_arg, "config", "set", "extraction.no_such_key", "1"])
        .assert()
        .failure();

    rcpt()
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_min_item_name_len_applies() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"extraction":{"min_item_name_len":3}}"#).unwrap();

    let output = rcpt()
        .args(["-c", config.to_str().unwrap(), "process", "-"])
        .write_stdin("SHOP\nOJ 2.49\nBREAD 2.50\nTOTAL 4.99\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["name"], "BREAD");
}
