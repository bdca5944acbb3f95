use crate::error::Error;
use crate::tracker::{AggregateEntry, LogEntry};
use log::debug;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends drained tracker output to a JSON-lines file.
///
/// The tracker itself never persists anything; `drain_aggregate` in
/// particular is consume-once, so whoever calls it owns retention. This
/// writer is that caller for the bundled binary.
pub struct ReportWriter {
    out: BufWriter<File>,
}

impl ReportWriter {
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub fn write_entries(&mut self, entries: &[LogEntry]) -> Result<(), Error> {
        self.write_lines(entries)?;
        debug!("wrote {} log entries", entries.len());
        Ok(())
    }

    pub fn write_aggregate(&mut self, rows: &[AggregateEntry]) -> Result<(), Error> {
        self.write_lines(rows)?;
        debug!("wrote {} aggregate rows", rows.len());
        Ok(())
    }

    fn write_lines<T: Serialize>(&mut self, rows: &[T]) -> Result<(), Error> {
        for row in rows {
            serde_json::to_writer(&mut self.out, row)?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::FocusLabel;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    #[test]
    fn test_writes_entries_and_aggregate_as_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.jsonl");

        let mut writer = ReportWriter::create(&path).unwrap();
        writer
            .write_entries(&[LogEntry {
                timestamp: UNIX_EPOCH + Duration::from_secs(1_700_000_005),
                label: FocusLabel::Window("Editor".to_string()),
            }])
            .unwrap();
        writer
            .write_aggregate(&[AggregateEntry {
                label: "Editor".to_string(),
                minutes: 0.17,
            }])
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["label"], "Editor");
        assert_eq!(lines[0]["timestamp"], 1_700_000_005.0);
        assert_eq!(lines[1]["minutes"], 0.17);
    }

    #[test]
    fn test_appends_across_writers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.jsonl");

        for label in ["A", "B"] {
            let mut writer = ReportWriter::create(&path).unwrap();
            writer
                .write_aggregate(&[AggregateEntry {
                    label: label.to_string(),
                    minutes: 1.0,
                }])
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
