use std::io::Write;
use std::process::{Command, Stdio};

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lifepath-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("full-coverage"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_simulates_smoke_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "smoke,replay-determinism",
            "--iterations",
            "2",
            "--seeds",
            "1,MZ-LOTUS42",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lifepath Automated Tester"));

    let content = std::fs::read_to_string(&output_path).expect("read output");
    let results: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let results = results.as_array().expect("array of results");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["passed"] == true));
    assert!(results.iter().any(|r| r["seed"] == "MZ-LOTUS42"));
    let coded = results
        .iter()
        .find(|r| r["seed"] == "MZ-LOTUS42")
        .expect("coded seed ran");
    assert!(
        coded["runs"]
            .as_array()
            .expect("runs")
            .iter()
            .all(|run| run["philosopher"] == "Mozi")
    );
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_writes_csv_rows_per_journey() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let output_path = temp_path("csv");
    let status = Command::new(exe)
        .args([
            "--report",
            "csv",
            "--scenarios",
            "devoted-survives",
            "--iterations",
            "3",
            "--output",
        ])
        .arg(&output_path)
        .stdout(Stdio::null())
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert_eq!(content.lines().count(), 4);
    assert!(content.starts_with("scenario,iteration,seed"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_rejects_unrecognized_seed() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let output = Command::new(exe)
        .args(["--seeds", "not-a-seed", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token: not-a-seed"));
}

#[test]
fn cli_plays_a_devoted_journey_from_stdin() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let config_path = temp_path("rules");
    std::fs::write(&config_path, r#"{"shuffle_options": false}"#).expect("write config");

    let mut child = Command::new(exe)
        .args(["--mode", "play", "--philosopher", "kongzi", "--config"])
        .arg(&config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cli");
    let script = format!("{}n\n", "1\n".repeat(9));
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes())
        .expect("feed answers");
    let output = child.wait_with_output().expect("play finishes");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kongzi (Confucius)"));
    assert!(stdout.contains("Adherence: 100% (9 of 9 choices)"));
    assert!(stdout.contains("Replay with journey code KZ-"));
    let _ = std::fs::remove_file(config_path);
}

#[test]
fn cli_reports_missing_question_table() {
    let exe = env!("CARGO_BIN_EXE_lifepath-tester");
    let output = Command::new(exe)
        .args(["--data", "/definitely/not/here.csv"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load question table"));
}
