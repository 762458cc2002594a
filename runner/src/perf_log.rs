//! Per-iteration timing records and the append-only `bezi_performance.csv`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::debug;

use crate::config::Mode;

/// Column header written once, when the CSV file is first created.
pub const CSV_HEADER: &str = "Timestamp,Mode,Iteration,Duration";

/// Timing record for one successful iteration. Never mutated once created.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// Local wall-clock time, `yyyy-MM-dd HH:mm:ss`.
    pub timestamp: String,
    pub mode: Mode,
    /// 1-based, monotonic within a run.
    pub iteration: u32,
    /// Elapsed seconds rounded to two decimal places.
    pub duration_secs: f64,
}

impl IterationRecord {
    pub fn new(mode: Mode, iteration: u32, elapsed: Duration) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            mode,
            iteration,
            duration_secs: round2(elapsed.as_secs_f64()),
        }
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{},{},{:.2}",
            self.timestamp, self.mode, self.iteration, self.duration_secs
        )
    }
}

/// Append records as CSV rows, writing the header only on file creation.
pub fn append_records(path: &Path, records: &[IterationRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let write_header = !path.exists();

    let mut buf = String::new();
    if write_header {
        buf.push_str(CSV_HEADER);
        buf.push('\n');
    }
    for record in records {
        buf.push_str(&record.csv_row());
        buf.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(buf.as_bytes())
        .with_context(|| format!("append {}", path.display()))?;
    debug!(rows = records.len(), path = %path.display(), "performance log appended");
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(iteration: u32, secs: f64) -> IterationRecord {
        IterationRecord {
            timestamp: "2026-01-02 03:04:05".to_string(),
            mode: Mode::Build,
            iteration,
            duration_secs: secs,
        }
    }

    #[test]
    fn new_record_rounds_duration_to_two_places() {
        let rec = IterationRecord::new(Mode::Plan, 1, Duration::from_millis(1234));
        assert_eq!(rec.duration_secs, 1.23);
        assert_eq!(rec.timestamp.len(), "2026-01-02 03:04:05".len());
    }

    #[test]
    fn creates_file_with_header_then_appends_without() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bezi_performance.csv");

        append_records(&path, &[record(1, 1.5)]).expect("first append");
        append_records(&path, &[record(2, 0.25), record(3, 2.0)]).expect("second append");

        let contents = fs::read_to_string(&path).expect("read csv");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,Mode,Iteration,Duration",
                "2026-01-02 03:04:05,build,1,1.50",
                "2026-01-02 03:04:05,build,2,0.25",
                "2026-01-02 03:04:05,build,3,2.00",
            ]
        );
    }

    #[test]
    fn empty_record_set_writes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bezi_performance.csv");
        append_records(&path, &[]).expect("append nothing");
        assert!(!path.exists());
    }

    #[test]
    fn preserves_preexisting_rows() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bezi_performance.csv");
        fs::write(&path, "Timestamp,Mode,Iteration,Duration\nold,plan,1,9.99\n")
            .expect("seed csv");

        append_records(&path, &[record(1, 0.5)]).expect("append");

        let contents = fs::read_to_string(&path).expect("read csv");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "old,plan,1,9.99");
        assert!(lines[2].ends_with(",build,1,0.50"));
    }
}
