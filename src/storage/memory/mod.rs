//! In-process storage backend
//!
//! State is `owner -> (code -> StoredUrl)` behind a single `RwLock`. When a
//! journal path is configured the file is replayed on open and written
//! according to [`JournalMode`]. Journal file I/O runs on the blocking pool
//! while the map lock is held, so a mutation and its journal line stay in
//! step.
//!
//! Lock order is always map lock, then journal writer.

mod journal;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::{Result, TinylinkError};
use crate::storage::Storage;
use crate::storage::models::{JournalRecord, ShortUrlRecord, Stats, StoredUrl};

use journal::Journal;
pub use journal::JournalMode;

type OwnerMap = HashMap<String, HashMap<String, StoredUrl>>;

pub struct MemoryStore {
    urls: RwLock<OwnerMap>,
    journal: Option<Arc<Journal>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store without persistence.
    pub fn new() -> Self {
        Self {
            urls: RwLock::new(HashMap::new()),
            journal: None,
        }
    }

    /// Open a journal-backed store, replaying the file if it exists.
    pub fn open(path: impl AsRef<Path>, mode: JournalMode) -> Result<Self> {
        let (journal, records) = Journal::open(path.as_ref(), mode)?;

        let mut urls = OwnerMap::new();
        let replayed = records.len();
        for record in records.into_iter().map(ShortUrlRecord::from) {
            urls.entry(record.owner_id).or_default().insert(
                record.short_code,
                StoredUrl {
                    original_url: record.original_url,
                    deleted: record.deleted,
                },
            );
        }

        let total: usize = urls.values().map(HashMap::len).sum();
        info!(
            "Memory store loaded {} records ({} journal lines) from {}",
            total,
            replayed,
            journal.path().display()
        );

        Ok(Self {
            urls: RwLock::new(urls),
            journal: Some(Arc::new(journal)),
        })
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_deref().map(Journal::path)
    }

    pub fn journal_mode(&self) -> Option<JournalMode> {
        self.journal.as_deref().map(Journal::mode)
    }

    /// Append records to the journal, one result per record.
    async fn journal_append(&self, records: Vec<ShortUrlRecord>) -> Result<Vec<Result<()>>> {
        let Some(journal) = self
            .journal
            .as_ref()
            .filter(|journal| journal.mode() == JournalMode::Append)
        else {
            return Ok(records.iter().map(|_| Ok(())).collect());
        };

        let journal = Arc::clone(journal);
        run_blocking(move || {
            Ok(records
                .into_iter()
                .map(|record| journal.append(&JournalRecord::from(record)))
                .collect())
        })
        .await
    }
}

/// Run journal file I/O off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        TinylinkError::file_operation(format!("journal task did not complete: {}", e))
    })?
}

fn record(code: &str, url: &str, owner_id: &str, deleted: bool) -> ShortUrlRecord {
    ShortUrlRecord {
        short_code: code.to_owned(),
        original_url: url.to_owned(),
        owner_id: owner_id.to_owned(),
        deleted,
    }
}

fn snapshot(urls: &OwnerMap) -> Vec<JournalRecord> {
    let mut records: Vec<ShortUrlRecord> = urls
        .iter()
        .flat_map(|(owner, owned)| {
            owned.iter().map(move |(code, stored)| {
                record(code, &stored.original_url, owner, stored.deleted)
            })
        })
        .collect();
    // 稳定输出，便于比对
    records.sort_by(|a, b| {
        a.owner_id
            .cmp(&b.owner_id)
            .then_with(|| a.short_code.cmp(&b.short_code))
    });
    records.into_iter().map(JournalRecord::from).collect()
}

/// Fold every per-row persistence failure of a batch into one error.
fn fold_failures(
    owner_id: &str,
    mut failures: Vec<(String, TinylinkError)>,
) -> Option<TinylinkError> {
    if failures.is_empty() {
        return None;
    }
    failures.sort_by(|a, b| a.0.cmp(&b.0));

    let details: Vec<String> = failures
        .iter()
        .map(|(code, err)| format!("{}: {}", code, err))
        .collect();
    Some(TinylinkError::file_operation(format!(
        "{} short code(s) for owner {} were not persisted: {}",
        failures.len(),
        owner_id,
        details.join("; ")
    )))
}

#[async_trait]
impl Storage for MemoryStore {
    async fn add(&self, code: &str, url: &str, owner_id: &str) -> Result<()> {
        let mut urls = self.urls.write().await;

        if urls
            .get(owner_id)
            .is_some_and(|owned| owned.contains_key(code))
        {
            return Err(TinylinkError::conflict(format!(
                "short code {} already exists for owner {}",
                code, owner_id
            )));
        }

        let appended = self
            .journal_append(vec![record(code, url, owner_id, false)])
            .await?;
        appended.into_iter().next().unwrap_or(Ok(()))?;

        urls.entry(owner_id.to_owned())
            .or_default()
            .insert(code.to_owned(), StoredUrl::active(url));

        debug!("Stored {} -> {} for {}", code, url, owner_id);
        Ok(())
    }

    async fn add_batch(&self, batch: &HashMap<String, String>, owner_id: &str) -> Result<()> {
        let mut urls = self.urls.write().await;

        let mut conflicts = Vec::new();
        let mut pending = Vec::new();
        for (code, url) in batch {
            if urls
                .get(owner_id)
                .is_some_and(|owned| owned.contains_key(code))
            {
                conflicts.push(code.clone());
            } else {
                pending.push(record(code, url, owner_id, false));
            }
        }

        let results = self.journal_append(pending.clone()).await?;

        let mut failures = Vec::new();
        let mut added = 0usize;
        for (entry, result) in pending.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    urls.entry(owner_id.to_owned()).or_default().insert(
                        entry.short_code,
                        StoredUrl::active(entry.original_url),
                    );
                    added += 1;
                }
                Err(e) => failures.push((entry.short_code, e)),
            }
        }
        drop(urls);

        debug!(
            "Batch for {}: {} added, {} existing, {} failed",
            owner_id,
            added,
            conflicts.len(),
            failures.len()
        );

        if let Some(err) = fold_failures(owner_id, failures) {
            return Err(err);
        }

        if !conflicts.is_empty() {
            conflicts.sort();
            return Err(TinylinkError::conflict(format!(
                "{} short code(s) already exist for owner {}: {}",
                conflicts.len(),
                owner_id,
                conflicts.join(", ")
            )));
        }

        Ok(())
    }

    async fn get(&self, code: &str) -> Result<String> {
        let urls = self.urls.read().await;
        let mut tombstoned = false;

        // 代码可能属于多个 owner，任一未删除记录即命中
        for owned in urls.values() {
            if let Some(stored) = owned.get(code) {
                if !stored.deleted {
                    return Ok(stored.original_url.clone());
                }
                tombstoned = true;
            }
        }

        if tombstoned {
            Err(TinylinkError::deleted(format!(
                "short code {} has been deleted",
                code
            )))
        } else {
            Err(TinylinkError::not_found(format!(
                "short code {} not found",
                code
            )))
        }
    }

    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, StoredUrl>> {
        let urls = self.urls.read().await;
        match urls.get(owner_id) {
            Some(owned) if !owned.is_empty() => Ok(owned.clone()),
            _ => Err(TinylinkError::not_found(format!(
                "no URLs stored for owner {}",
                owner_id
            ))),
        }
    }

    async fn delete(&self, code: &str, owner_id: &str) -> Result<()> {
        let mut urls = self.urls.write().await;

        let Some(stored) = urls.get_mut(owner_id).and_then(|owned| owned.get_mut(code)) else {
            debug!("Delete of {} by {} matched nothing", code, owner_id);
            return Ok(());
        };
        if stored.deleted {
            return Ok(());
        }

        let appended = self
            .journal_append(vec![record(code, &stored.original_url, owner_id, true)])
            .await?;
        appended.into_iter().next().unwrap_or(Ok(()))?;
        stored.deleted = true;

        debug!("Deleted {} for {}", code, owner_id);
        Ok(())
    }

    async fn get_stats(&self) -> Result<Stats> {
        let urls = self.urls.read().await;
        Ok(Stats {
            total_urls: urls.values().map(HashMap::len).sum(),
            total_users: urls.values().filter(|owned| !owned.is_empty()).count(),
        })
    }

    async fn backup(&self) -> Result<()> {
        let Some(journal) = &self.journal else {
            debug!("Memory store has no journal, nothing to back up");
            return Ok(());
        };

        // 持有读锁直到文件替换完成，避免与并发追加交错
        let urls = self.urls.read().await;
        let records = snapshot(&urls);
        let count = records.len();

        let writer = Arc::clone(journal);
        run_blocking(move || writer.rewrite(&records)).await?;
        drop(urls);

        info!(
            "Backed up {} records to {}",
            count,
            journal.path().display()
        );
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_add_and_get() {
        let store = MemoryStore::new();
        store.add("abc", "https://a.test", "u1").await.unwrap();
        assert_eq!(store.get("abc").await.unwrap(), "https://a.test");
    }

    #[tokio::test]
    async fn test_same_code_same_owner_conflicts() {
        let store = MemoryStore::new();
        store.add("abc", "https://a.test", "u1").await.unwrap();
        let err = store.add("abc", "https://a.test", "u1").await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_same_code_other_owner_is_allowed() {
        let store = MemoryStore::new();
        store.add("abc", "https://a.test", "u1").await.unwrap();
        store.add("abc", "https://a.test", "u2").await.unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_urls, 2);
        assert_eq!(stats.total_users, 2);
    }

    #[tokio::test]
    async fn test_active_record_wins_over_tombstone() {
        let store = MemoryStore::new();
        store.add("abc", "https://a.test", "u1").await.unwrap();
        store.add("abc", "https://a.test", "u2").await.unwrap();
        store.delete("abc", "u1").await.unwrap();

        assert_eq!(store.get("abc").await.unwrap(), "https://a.test");

        store.delete("abc", "u2").await.unwrap();
        assert!(store.get("abc").await.unwrap_err().is_deleted());
    }

    #[tokio::test]
    async fn test_backup_without_journal_is_noop() {
        let store = MemoryStore::new();
        store.add("abc", "https://a.test", "u1").await.unwrap();
        store.backup().await.unwrap();
        assert!(store.journal_path().is_none());
    }

    #[tokio::test]
    async fn test_backup_writes_sorted_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");

        let store = MemoryStore::open(&path, JournalMode::Backup).unwrap();
        store.add("b", "https://b.test", "u2").await.unwrap();
        store.add("a", "https://a.test", "u1").await.unwrap();
        store.delete("a", "u1").await.unwrap();
        store.backup().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"short_url":"a","original_url":"https://a.test","user_id":"u1","is_deleted":"true"}"#
        );
        assert!(lines[1].contains(r#""user_id":"u2""#));
    }

    #[test]
    fn test_fold_failures_keeps_every_message() {
        assert!(fold_failures("u1", Vec::new()).is_none());

        let err = fold_failures(
            "u1",
            vec![
                ("b".to_string(), TinylinkError::file_operation("disk full")),
                ("a".to_string(), TinylinkError::serialization("bad record")),
            ],
        )
        .unwrap();

        assert!(matches!(err, TinylinkError::FileOperation(_)));
        let msg = err.message();
        assert!(msg.starts_with("2 short code(s) for owner u1"), "{}", msg);
        let a = msg.find("a: ").unwrap();
        let b = msg.find("b: ").unwrap();
        assert!(a < b);
        assert!(msg.contains("disk full"));
        assert!(msg.contains("bad record"));
    }

    #[tokio::test]
    async fn test_append_mode_batch_is_replayed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("links.json");

        let store = MemoryStore::open(&path, JournalMode::Append).unwrap();
        let batch = HashMap::from([
            ("a".to_string(), "https://a.test".to_string()),
            ("b".to_string(), "https://b.test".to_string()),
        ]);
        store.add_batch(&batch, "u1").await.unwrap();
        store.delete("a", "u1").await.unwrap();
        drop(store);

        let reopened = MemoryStore::open(&path, JournalMode::Backup).unwrap();
        assert!(reopened.get("a").await.unwrap_err().is_deleted());
        assert_eq!(reopened.get("b").await.unwrap(), "https://b.test");
    }

    #[tokio::test]
    async fn test_journal_mode_accessors() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::open(dir.path().join("j.json"), JournalMode::Append).unwrap();
        assert_eq!(store.journal_mode(), Some(JournalMode::Append));
        assert_eq!(store.backend_name(), "memory");
    }
}
