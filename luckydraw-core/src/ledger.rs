use crate::error::{DrawError, Result};
use crate::roster::RosterStore;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// On-disk timestamp layout, local wall clock.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const HEADER_FIELDS: [&str; 3] = ["prize", "participant", "time"];

/// One committed draw result. Immutable once created; the prize name is
/// stored denormalized so history survives later tier reconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub prize: String,
    pub participant: String,
    pub drawn_at: NaiveDateTime,
}

impl WinnerRecord {
    pub fn new(prize: impl Into<String>, participant: impl Into<String>) -> Self {
        // truncate to whole seconds, matching the on-disk resolution
        let now = Local::now().naive_local();
        Self {
            prize: prize.into(),
            participant: participant.into(),
            drawn_at: now.with_nanosecond(0).unwrap_or(now),
        }
    }
}

/// Append-only history of all winners across all rounds; the single source
/// of truth for "who has already won".
///
/// The durable file is delimited text: one record per line, every field
/// double-quoted with embedded quotes doubled, plus a header row written
/// once when the file is first created. Records are appended after each
/// committed round and never rewritten in place.
#[derive(Debug)]
pub struct WinnerLedger {
    records: Vec<WinnerRecord>,
    path: Option<PathBuf>,
}

impl WinnerLedger {
    /// In-memory ledger with no durable store.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            path: None,
        }
    }

    /// Ledger backed by `path`, reloading any records already on disk so
    /// prior winners stay excluded across restarts. Unreadable lines are
    /// skipped individually.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut records = Vec::new();

        if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match parse_record_line(line) {
                    Some(ParsedLine::Header) => {}
                    Some(ParsedLine::Record(record)) => records.push(record),
                    None => {
                        tracing::warn!("Skipping malformed ledger line: {}", line);
                    }
                }
            }
            tracing::info!(
                "Loaded {} winner records from {}",
                records.len(),
                path.display()
            );
        }

        Ok(Self {
            records,
            path: Some(path),
        })
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[WinnerRecord] {
        &self.records
    }

    /// Exact-match membership test against all historical records.
    pub fn has_won(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.participant == name)
    }

    /// Roster names with no prior record, in roster order.
    pub fn remaining_pool(&self, roster: &RosterStore) -> Vec<String> {
        roster
            .all()
            .iter()
            .filter(|name| !self.has_won(name))
            .cloned()
            .collect()
    }

    /// Append a committed round's records.
    ///
    /// The in-memory append is all-or-nothing. The durable append is
    /// attempted synchronously afterwards; on failure the in-memory state
    /// stays authoritative and the error is only logged. A crash between
    /// the two loses at most this round, never earlier records.
    pub fn append(&mut self, records: Vec<WinnerRecord>) {
        if records.is_empty() {
            return;
        }

        self.records.extend(records.iter().cloned());

        if let Some(path) = &self.path {
            if let Err(e) = persist_append(path, &records) {
                tracing::warn!(
                    "Failed to persist {} winner records to {}: {}",
                    records.len(),
                    path.display(),
                    e
                );
            }
        }
    }

    /// Wipe the history and delete the durable store. Only an explicit full
    /// reset calls this.
    pub fn clear(&mut self) {
        self.records.clear();

        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!("Failed to delete ledger file {}: {}", path.display(), e);
                }
            }
        }
        tracing::info!("Winner ledger cleared");
    }

    /// Copy the durable file verbatim to `dest`. Never overwrites an
    /// existing destination.
    pub fn export_to(&self, dest: &Path) -> Result<()> {
        let src = match &self.path {
            Some(path) if path.exists() => path,
            _ => return Err(DrawError::NothingToExport),
        };
        if dest.exists() {
            return Err(DrawError::DestinationExists(dest.to_path_buf()));
        }
        std::fs::copy(src, dest)?;
        tracing::info!("Exported winner ledger to {}", dest.display());
        Ok(())
    }
}

impl Default for WinnerLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn persist_append(path: &Path, records: &[WinnerRecord]) -> std::io::Result<()> {
    let fresh = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut out = String::new();
    if fresh {
        out.push_str(&format_fields(&HEADER_FIELDS));
        out.push('\n');
    }
    for record in records {
        let time = record.drawn_at.format(TIMESTAMP_FORMAT).to_string();
        out.push_str(&format_fields(&[
            record.prize.as_str(),
            record.participant.as_str(),
            time.as_str(),
        ]));
        out.push('\n');
    }

    file.write_all(out.as_bytes())?;
    file.flush()
}

fn format_fields(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

enum ParsedLine {
    Header,
    Record(WinnerRecord),
}

fn parse_record_line(line: &str) -> Option<ParsedLine> {
    let fields = split_quoted_fields(line)?;
    if fields.len() != 3 {
        return None;
    }
    if fields == HEADER_FIELDS {
        return Some(ParsedLine::Header);
    }

    let drawn_at = NaiveDateTime::parse_from_str(&fields[2], TIMESTAMP_FORMAT).ok()?;
    let mut fields = fields.into_iter();
    Some(ParsedLine::Record(WinnerRecord {
        prize: fields.next()?,
        participant: fields.next()?,
        drawn_at,
    }))
}

/// Split a line of individually-quoted fields, undoing quote-doubling.
fn split_quoted_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        if chars.next() != Some('"') {
            return None;
        }
        let mut field = String::new();
        loop {
            match chars.next() {
                Some('"') => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        break;
                    }
                }
                Some(c) => field.push(c),
                None => return None,
            }
        }
        fields.push(field);

        match chars.next() {
            Some(',') => continue,
            None => return Some(fields),
            Some(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_of(names: &[&str]) -> RosterStore {
        let mut roster = RosterStore::new();
        roster.replace_all(names);
        roster
    }

    #[test]
    fn remaining_pool_preserves_roster_order() {
        let roster = roster_of(&["Alice", "Bob", "Carol"]);
        let mut ledger = WinnerLedger::new();
        ledger.append(vec![WinnerRecord::new("一等奖", "Bob")]);

        assert!(ledger.has_won("Bob"));
        assert!(!ledger.has_won("Alice"));
        assert_eq!(ledger.remaining_pool(&roster), ["Alice", "Carol"]);
    }

    #[test]
    fn appends_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(vec![
            WinnerRecord::new("一等奖", "Alice"),
            WinnerRecord::new("一等奖", "Bob"),
        ]);
        ledger.append(vec![WinnerRecord::new("二等奖", "Carol")]);

        let reloaded = WinnerLedger::open(&path).unwrap();
        assert_eq!(reloaded.count(), 3);
        assert!(reloaded.has_won("Carol"));
        assert_eq!(reloaded.records(), ledger.records());
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(vec![WinnerRecord::new("A", "Alice")]);
        ledger.append(vec![WinnerRecord::new("A", "Bob")]);

        let text = std::fs::read_to_string(&path).unwrap();
        let headers = text
            .lines()
            .filter(|l| l.starts_with("\"prize\""))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn embedded_quotes_and_commas_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(vec![WinnerRecord::new("grand \"prize\"", "Doe, Jane")]);

        let reloaded = WinnerLedger::open(&path).unwrap();
        assert_eq!(reloaded.count(), 1);
        assert_eq!(reloaded.records()[0].prize, "grand \"prize\"");
        assert_eq!(reloaded.records()[0].participant, "Doe, Jane");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");
        std::fs::write(
            &path,
            "\"prize\",\"participant\",\"time\"\nnot quoted at all\n\"A\",\"Alice\",\"2024-01-01 10:00:00\"\n",
        )
        .unwrap();

        let ledger = WinnerLedger::open(&path).unwrap();
        assert_eq!(ledger.count(), 1);
        assert!(ledger.has_won("Alice"));
    }

    #[test]
    fn clear_deletes_durable_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(vec![WinnerRecord::new("A", "Alice")]);
        assert!(path.exists());

        ledger.clear();
        assert_eq!(ledger.count(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn export_never_clobbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");
        let dest = dir.path().join("export.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(vec![WinnerRecord::new("A", "Alice")]);

        ledger.export_to(&dest).unwrap();
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            std::fs::read_to_string(&path).unwrap()
        );

        let err = ledger.export_to(&dest).unwrap_err();
        assert!(matches!(err, DrawError::DestinationExists(_)));
    }

    #[test]
    fn export_without_durable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = WinnerLedger::new();
        let err = ledger.export_to(&dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(err, DrawError::NothingToExport));
    }

    #[test]
    fn empty_append_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("winners.csv");

        let mut ledger = WinnerLedger::open(&path).unwrap();
        ledger.append(Vec::new());
        assert!(!path.exists());
    }
}
