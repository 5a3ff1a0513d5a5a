use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use tempfile::tempdir;

fn spikeburst(workspace: &std::path::Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("spikeburst")?;
    cmd.current_dir(workspace).arg("--workspace").arg(workspace);
    Ok(cmd)
}

#[test]
fn encode_step_signal_writes_report_and_events() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(
        tmp.path().join("sig.csv"),
        "time,amplitude\n0,0\n1,2\n2,2\n3,2\n4,0\n",
    )?;

    spikeburst(tmp.path())?
        .args([
            "encode", "sig.csv",
            "--threshold-up", "1",
            "--threshold-down", "-1",
            "--refractory", "0",
            "--out", "report.json",
            "--events-out", "events.csv",
            "--polarity", "both",
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("report.json"))?)?;
    assert_eq!(report["channels"]["sig"]["up"], serde_json::json!([1.0]));
    assert_eq!(report["channels"]["sig"]["down"], serde_json::json!([4.0]));
    assert_eq!(report["resampler"], "identity");

    let events = std::fs::read_to_string(tmp.path().join("events.csv"))?;
    let lines: Vec<&str> = events.lines().collect();
    assert_eq!(lines, vec!["time,channel", "1,sig:up", "4,sig:down"]);
    Ok(())
}

#[test]
fn encode_prints_report_to_stdout() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("ramp.csv"), "time,amplitude\n0,0\n1,1\n2,2\n3,3\n")?;

    spikeburst(tmp.path())?
        .args(["encode", "ramp.csv", "--threshold-up", "0.5", "--interpolation-factor", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ramp\"").and(predicate::str::contains("\"linear\"")));
    Ok(())
}

#[test]
fn encode_uses_workspace_config() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(
        tmp.path().join("spikeburst.toml"),
        "[encoder]\nthreshold_up = 5.0\nthreshold_down = -5.0\n",
    )?;
    std::fs::write(tmp.path().join("sig.csv"), "time,amplitude\n0,0\n1,2\n2,0\n")?;

    let output = spikeburst(tmp.path())?.args(["encode", "sig.csv"]).output()?;
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["params"]["threshold_up"], 5.0);
    assert_eq!(report["channels"]["sig"]["up"], serde_json::json!([]));
    Ok(())
}

#[test]
fn encode_rejects_bad_thresholds() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("sig.csv"), "time,amplitude\n0,0\n1,2\n")?;

    spikeburst(tmp.path())?
        .args(["encode", "sig.csv", "--threshold-up", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold_up"));
    Ok(())
}

#[test]
fn encode_rejects_unbounded_grid() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("sig.csv"), "time,amplitude\n0,0\n1,5\n")?;

    spikeburst(tmp.path())?
        .args(["encode", "sig.csv", "--interpolation-factor", "1e300"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interpolation_factor"));
    Ok(())
}

#[test]
fn encode_missing_input_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    spikeburst(tmp.path())?
        .args(["encode", "absent.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.csv"));

    // clap requires at least one input
    spikeburst(tmp.path())?.arg("encode").assert().failure();
    Ok(())
}

#[test]
fn completions_are_generated() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("spikeburst")?
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spikeburst"));
    Ok(())
}
