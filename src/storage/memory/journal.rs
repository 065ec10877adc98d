//! JSON-lines journal backing the memory store
//!
//! One [`JournalRecord`] per line. Replay reads the file front to back, so a
//! later line for the same `(user_id, short_url)` overrides an earlier one.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, warn};

use crate::errors::{Result, TinylinkError};
use crate::storage::models::JournalRecord;

/// When the journal is written
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JournalMode {
    /// Only `backup()` writes, rewriting the whole file
    #[default]
    Backup,
    /// Every mutation is appended as it happens; `backup()` compacts
    Append,
}

pub(crate) struct Journal {
    path: PathBuf,
    mode: JournalMode,
    /// Append 模式下的写句柄
    writer: Mutex<Option<File>>,
}

impl Journal {
    /// Open (creating if absent) and read every record in file order.
    pub fn open(path: &Path, mode: JournalMode) -> Result<(Self, Vec<JournalRecord>)> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                TinylinkError::file_operation(format!(
                    "Failed to open journal {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let records = read_records(&file, path)?;

        let writer = match mode {
            JournalMode::Append => Some(file),
            JournalMode::Backup => None,
        };

        Ok((
            Journal {
                path: path.to_path_buf(),
                mode,
                writer: Mutex::new(writer),
            },
            records,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> JournalMode {
        self.mode
    }

    /// Append one record. Does nothing in `Backup` mode.
    pub fn append(&self, record: &JournalRecord) -> Result<()> {
        if self.mode != JournalMode::Append {
            return Ok(());
        }

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock();
        if writer.is_none() {
            *writer = Some(self.open_for_append()?);
        }
        if let Some(file) = writer.as_mut() {
            file.write_all(&line).map_err(|e| {
                TinylinkError::file_operation(format!(
                    "Failed to append to journal {}: {}",
                    self.path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Replace the file with exactly `records`, via a temp file and rename.
    pub fn rewrite(&self, records: &[JournalRecord]) -> Result<()> {
        let mut writer = self.writer.lock();
        let tmp_path = self.tmp_path();

        {
            let file = File::create(&tmp_path)?;
            let mut out = BufWriter::new(file);
            for record in records {
                serde_json::to_writer(&mut out, record)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
            out.get_ref().sync_all()?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            TinylinkError::file_operation(format!(
                "Failed to replace journal {}: {}",
                self.path.display(),
                e
            ))
        })?;

        // 旧句柄指向被替换掉的文件
        *writer = match self.mode {
            JournalMode::Append => Some(self.open_for_append()?),
            JournalMode::Backup => None,
        };

        debug!(
            "Journal {} rewritten with {} records",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    fn open_for_append(&self) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                TinylinkError::file_operation(format!(
                    "Failed to open journal {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn read_records(file: &File, path: &Path) -> Result<Vec<JournalRecord>> {
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    "Skipping malformed journal line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(code: &str, owner: &str, deleted: bool) -> JournalRecord {
        JournalRecord {
            short_url: code.into(),
            original_url: format!("https://{}.example.com", code),
            user_id: owner.into(),
            is_deleted: deleted,
        }
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("journal.json");

        let (journal, records) = Journal::open(&path, JournalMode::Backup).unwrap();
        assert!(records.is_empty());
        assert!(path.exists());
        assert_eq!(journal.path(), path.as_path());
    }

    #[test]
    fn test_backup_mode_append_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");

        let (journal, _) = Journal::open(&path, JournalMode::Backup).unwrap();
        journal.append(&record("a", "u1", false)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_append_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");

        let (journal, _) = Journal::open(&path, JournalMode::Append).unwrap();
        journal.append(&record("a", "u1", false)).unwrap();
        journal.append(&record("a", "u1", true)).unwrap();
        drop(journal);

        let (_, records) = Journal::open(&path, JournalMode::Append).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].is_deleted);
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");

        let (journal, _) = Journal::open(&path, JournalMode::Append).unwrap();
        for code in ["a", "b", "c"] {
            journal.append(&record(code, "u1", false)).unwrap();
        }
        journal.rewrite(&[record("z", "u2", true)]).unwrap();
        // 重写后仍可继续追加
        journal.append(&record("y", "u2", false)).unwrap();
        drop(journal);

        let (_, records) = Journal::open(&path, JournalMode::Backup).unwrap();
        let codes: Vec<_> = records.iter().map(|r| r.short_url.as_str()).collect();
        assert_eq!(codes, vec!["z", "y"]);
        assert!(!dir.path().join("journal.json.tmp").exists());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("journal.json");
        fs::write(
            &path,
            concat!(
                r#"{"short_url":"a","original_url":"https://a.test","user_id":"u1","is_deleted":"false"}"#,
                "\n",
                "not json\n",
                "\n",
                r#"{"short_url":"b","original_url":"https://b.test","user_id":"u1","is_deleted":"true"}"#,
                "\n",
            ),
        )
        .unwrap();

        let (_, records) = Journal::open(&path, JournalMode::Backup).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].short_url, "a");
        assert!(records[1].is_deleted);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("append".parse::<JournalMode>().unwrap(), JournalMode::Append);
        assert_eq!(JournalMode::Backup.to_string(), "backup");
    }
}
