use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const STATEMENT_CSV: &str = "Transaction Date,Description,Debit\n\
                             12/20/2025,CHIPOTLE ONLINE,7.17\n\
                             12/21/2025,TARGET,15.00\n\
                             12/21/2025,Target,15.00\n";

fn txtract() -> Command {
    let mut cmd = Command::cargo_bin("txtract").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("GEMINI_API_KEY");
    cmd
}

fn write_config(dir: &Path) -> String {
    let path = dir.join("config.json");
    fs::write(&path, r#"{"extraction": {"default_year": 2025}}"#).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_process_csv_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("export.csv");
    fs::write(&input, STATEMENT_CSV).unwrap();

    txtract()
        .args(["-c", &write_config(dir.path()), "process"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("CHIPOTLE ONLINE"))
        .stdout(predicate::str::contains("\"source_method\": \"csv\""));
}

#[test]
fn test_process_csv_as_csv_deduplicates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("export.csv");
    fs::write(&input, STATEMENT_CSV).unwrap();

    let output = txtract()
        .args(["-c", &write_config(dir.path()), "process", "-f", "csv"])
        .arg(&input)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "date,merchant,amount,source_method\n\
         2025-12-20,CHIPOTLE ONLINE,7.17,csv\n\
         2025-12-21,TARGET,15.00,csv\n"
    );
}

#[test]
fn test_process_writes_output_file_and_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("export.csv");
    let out = dir.path().join("out.txt");
    fs::write(&input, STATEMENT_CSV).unwrap();

    txtract()
        .args(["-c", &write_config(dir.path()), "process", "-f", "text", "--show-run", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Final method: csv"));

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("2025-12-20  CHIPOTLE ONLINE"));
}

#[test]
fn test_process_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, "12/20 CHIPOTLE $7.17").unwrap();

    txtract()
        .args(["-c", &write_config(dir.path()), "process"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported document"));
}

#[test]
fn test_process_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    txtract()
        .args(["-c", &write_config(dir.path()), "process"])
        .arg(dir.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unparseable_pdf_reports_total_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("statement.pdf");
    fs::write(&input, "this is not a pdf").unwrap();

    txtract()
        .args(["-c", &write_config(dir.path()), "process"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not extract transactions"))
        .stderr(predicate::str::contains("text failed"));
}

#[test]
fn test_config_init_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.json");
    let config = config.to_string_lossy().into_owned();

    txtract()
        .args(["-c", &config, "config", "init"])
        .assert()
        .success();

    txtract()
        .args(["-c", &config, "config", "get", "extraction.yield_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    txtract()
        .args(["-c", &config, "config", "set", "extraction.yield_threshold", "5"])
        .assert()
        .success();

    txtract()
        .args(["-c", &config, "config", "get", "extraction.yield_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    txtract()
        .args(["-c", &config, "config", "get", "extraction.nope"])
        .assert()
        .failure();

    txtract()
        .args(["-c", &config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    txtract()
        .args(["-c", &config, "config", "set", "render.ocr_dpi", "high"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_batch_with_summary() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.csv"), STATEMENT_CSV).unwrap();
    fs::write(inputs.join("b.csv"), "Date,Payee,Amount\n01/05/2025,SHELL OIL,40.00\n").unwrap();
    fs::write(inputs.join("ignored.txt"), "nothing").unwrap();

    let pattern = inputs.join("*").to_string_lossy().into_owned();

    txtract()
        .args(["-c", &write_config(dir.path()), "batch", &pattern, "-j", "2", "--summary", "-f", "csv", "-o"])
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(outputs.join("a.csv").exists());
    assert!(outputs.join("b.csv").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,final_method,transactions,issues,error"));
    assert!(summary.contains("a.csv,success,csv,2,0,"));
    assert!(summary.contains("b.csv,success,csv,1,0,"));
}

#[test]
fn test_batch_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("bad.csv"), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(inputs.join("good.csv"), STATEMENT_CSV).unwrap();

    let pattern = inputs.join("*.csv").to_string_lossy().into_owned();

    txtract()
        .args(["-c", &write_config(dir.path()), "batch", &pattern, "-j", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.csv"));
}

#[test]
fn test_batch_continue_on_error_records_failure() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("bad.csv"), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(inputs.join("good.csv"), STATEMENT_CSV).unwrap();

    let pattern = inputs.join("*.csv").to_string_lossy().into_owned();

    txtract()
        .args(["-c", &write_config(dir.path()), "batch", &pattern, "--continue-on-error", "--summary", "-o"])
        .arg(&outputs)
        .assert()
        .success();

    assert!(outputs.join("good.json").exists());
    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("bad.csv,error"));
    assert!(summary.contains("good.csv,success,csv,2,0,"));
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.pdf").to_string_lossy().into_owned();

    txtract()
        .args(["-c", &write_config(dir.path()), "batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF or CSV files"));
}
