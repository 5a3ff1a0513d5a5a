use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::error::Error;
use tempfile::tempdir;

const EVENTS: &str = "time,channel\n0,a\n0.1,b\n0.2,a\n0.3,c\n0.4,a\n5,b\n5.1,c\n5.2,a\n";

const STUDY: &str = r#"
[study]
name = "three-channel"
events = "events.csv"

[grid]
num_spikes_to_burst = [2, 3]
max_burst_duration = [0.5, 1.0]
min_inter_burst_interval = [0.0, 10.0]

[expected]
network = [0.3, 5.2]

[expected.channel]
a = [0.4]
"#;

fn spikeburst(workspace: &std::path::Path) -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("spikeburst")?;
    cmd.current_dir(workspace).arg("--workspace").arg(workspace);
    Ok(cmd)
}

#[test]
fn sweep_reports_intersecting_parameter_sets() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("events.csv"), EVENTS)?;
    std::fs::write(tmp.path().join("study.toml"), STUDY)?;

    spikeburst(tmp.path())?
        .args(["sweep", "study.toml", "--quiet", "--out", "sweep.json"])
        .assert()
        .success();

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("sweep.json"))?)?;
    assert_eq!(report["study"], "three-channel");
    assert_eq!(report["grid_points"], 8);
    assert_eq!(report["network_matches"], 2);
    assert_eq!(
        report["matches"],
        json!([
            {"num_spikes_to_burst": 3, "max_burst_duration": 0.5, "min_inter_burst_interval": 0.0},
            {"num_spikes_to_burst": 3, "max_burst_duration": 1.0, "min_inter_burst_interval": 0.0}
        ])
    );
    Ok(())
}

#[test]
fn sweep_events_path_is_relative_to_study() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let studies = tmp.path().join("studies");
    std::fs::create_dir_all(&studies)?;
    std::fs::write(studies.join("events.csv"), EVENTS)?;
    std::fs::write(studies.join("study.toml"), STUDY)?;

    let output = spikeburst(tmp.path())?
        .args(["sweep", "studies/study.toml", "--quiet"])
        .output()?;
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["matches"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn sweep_without_expectations_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("events.csv"), EVENTS)?;
    std::fs::write(
        tmp.path().join("study.toml"),
        "[study]\nevents = \"events.csv\"\n\n[grid]\nnum_spikes_to_burst = [2]\nmax_burst_duration = [1.0]\nmin_inter_burst_interval = [0.0]\n",
    )?;

    spikeburst(tmp.path())?
        .args(["sweep", "study.toml", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected"));
    Ok(())
}

#[test]
fn sweep_malformed_study_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    std::fs::write(tmp.path().join("study.toml"), "[grid\nnum_spikes_to_burst = [2]\n")?;

    spikeburst(tmp.path())?
        .args(["sweep", "study.toml", "--quiet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid TOML"));
    Ok(())
}
