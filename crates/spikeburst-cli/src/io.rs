//! Reading recordings and writing reports
//!
//! Signals are `time,amplitude` CSV files and spike events are `time,channel`
//! CSV files, both with a header row. Numbers may use scientific notation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use spikeburst_core::{Signal, SpikeEvent};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{CliError, CliResult};

fn csv_reader(path: &Path) -> CliResult<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(CliError::missing_resource(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

fn parse_number(field: Option<&str>, column: &str, path: &Path, line: u64) -> CliResult<f64> {
    let raw = field.ok_or_else(|| {
        CliError::data(format!("{}:{}: missing {} column", path.display(), line, column))
    })?;
    raw.parse::<f64>().map_err(|_| {
        CliError::data(format!("{}:{}: invalid {} '{}'", path.display(), line, column, raw))
    })
}

fn record_line(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

/// Read a `time,amplitude` signal
pub fn read_signal(path: &Path) -> CliResult<Signal> {
    let mut reader = csv_reader(path)?;
    let mut times = Vec::new();
    let mut amplitudes = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record_line(&record);
        times.push(parse_number(record.get(0), "time", path, line)?);
        amplitudes.push(parse_number(record.get(1), "amplitude", path, line)?);
    }

    debug!("Read {} samples from {}", times.len(), path.display());
    Ok(Signal::new(times, amplitudes)?)
}

/// Read `time,channel` events, stable-sorted by time
pub fn read_events(path: &Path) -> CliResult<Vec<SpikeEvent<String>>> {
    let mut reader = csv_reader(path)?;
    let mut events = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line = record_line(&record);
        let time = parse_number(record.get(0), "time", path, line)?;
        let channel = match record.get(1) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => {
                return Err(CliError::data(format!(
                    "{}:{}: missing channel column",
                    path.display(),
                    line
                )))
            }
        };
        events.push(SpikeEvent::new(time, channel));
    }

    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Write events as `time,channel` CSV
pub fn write_events<K: std::fmt::Display>(path: &Path, events: &[SpikeEvent<K>]) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["time", "channel"])?;
    for event in events {
        writer.write_record([event.time.to_string(), event.channel.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a JSON report to `path`, or to stdout when no path is given
pub fn write_json<T: Serialize>(path: Option<&Path>, value: &T, pretty: bool) -> CliResult<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text)?;
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// CSV files under `root` in path order; a file is returned as-is
pub fn collect_csv_files(root: &Path) -> CliResult<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(CliError::missing_resource(format!(
            "Input not found: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CliError::Generic(anyhow::anyhow!(e)))?;
        let is_csv = entry
            .path()
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        if entry.file_type().is_file() && is_csv {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Channel id for a recording file: its stem
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
