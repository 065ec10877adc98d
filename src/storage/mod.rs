//! Storage contract and backends
//!
//! Two implementations sit behind [`Storage`]:
//! - [`MemoryStore`]: owner-keyed map behind one read/write lock, with an
//!   optional JSON-lines journal replayed on startup
//! - [`SeaOrmStorage`]: the `urls` table via SeaORM (SQLite, MySQL, PostgreSQL)
//!
//! [`StorageFactory`] picks one at startup by probing the configured database.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StaticConfig, StorageConfig};
use crate::errors::{Result, TinylinkError};

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::{JournalMode, MemoryStore};
pub use models::{JournalRecord, ShortUrlRecord, Stats, StoredUrl};

#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert `(owner_id, code) -> url`. `Conflict` if that owner already has the code.
    async fn add(&self, code: &str, url: &str, owner_id: &str) -> Result<()>;

    /// Insert many `code -> url` pairs for one owner.
    ///
    /// Failure policy is backend specific: the relational store is
    /// all-or-nothing, the memory store commits what it can and reports the rest.
    async fn add_batch(&self, urls: &HashMap<String, String>, owner_id: &str) -> Result<()>;

    /// Owner-agnostic lookup. `NotFound` when absent, `Deleted` when tombstoned.
    async fn get(&self, code: &str) -> Result<String>;

    /// Every record of one owner, tombstones flagged. `NotFound` if there are none.
    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, StoredUrl>>;

    /// Tombstone a code. Missing, already deleted or foreign codes are a no-op.
    async fn delete(&self, code: &str, owner_id: &str) -> Result<()>;

    async fn get_stats(&self) -> Result<Stats>;

    /// Snapshot state to durable storage. No-op where every write is durable.
    async fn backup(&self) -> Result<()>;

    /// Cheap liveness check against the underlying backend.
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

pub struct StorageFactory;

impl StorageFactory {
    /// Pick a backend: the relational store when a database URL is configured
    /// and reachable, otherwise the memory store.
    pub async fn create(config: &StaticConfig) -> Result<Arc<dyn Storage>> {
        let database_url = config
            .database
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());

        if let Some(database_url) = database_url {
            match Self::probe_relational(database_url, &config.database).await {
                Ok(storage) => return Ok(Arc::new(storage)),
                Err(e) => {
                    warn!(
                        "Database unavailable ({}), falling back to memory storage",
                        e
                    );
                }
            }
        }

        let storage = Self::create_memory(&config.storage)?;
        Ok(Arc::new(storage))
    }

    /// 探测关系型数据库：连接 + 迁移 + ping，整体受 connect_timeout 约束
    pub async fn probe_relational(
        database_url: &str,
        options: &DatabaseConfig,
    ) -> Result<SeaOrmStorage> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;
        let connect_timeout = Duration::from_secs(options.connect_timeout_secs);

        let storage = tokio::time::timeout(
            connect_timeout,
            SeaOrmStorage::new(database_url, &backend_type, options),
        )
        .await
        .map_err(|_| {
            TinylinkError::timeout(format!(
                "connecting to {} took longer than {}s",
                backend_type,
                options.connect_timeout_secs
            ))
        })??;

        storage.ping().await?;
        info!("Using {} storage", backend_type.to_uppercase());
        Ok(storage)
    }

    pub fn create_memory(options: &StorageConfig) -> Result<MemoryStore> {
        let path = options
            .file_storage_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        match path {
            Some(path) => {
                let store = MemoryStore::open(path, options.journal_mode)?;
                info!(
                    "Using memory storage with {} journal at {}",
                    options.journal_mode, path
                );
                Ok(store)
            }
            None => {
                info!("Using memory storage without persistence");
                Ok(MemoryStore::new())
            }
        }
    }
}
