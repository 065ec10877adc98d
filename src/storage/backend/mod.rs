//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TinylinkError};
use crate::storage::Storage;
use crate::storage::models::{Stats, StoredUrl};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{is_not_inserted, is_unique_violation, new_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TinylinkError::database_config(format!(
            "cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 单次存储操作的上限
    op_timeout: Duration,
}

impl SeaOrmStorage {
    pub async fn new(
        database_url: &str,
        backend_name: &str,
        options: &DatabaseConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(TinylinkError::database_config("database URL is empty"));
        }

        let backend_name = normalize_backend_name(backend_name);

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, options.pool_size).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            op_timeout: Duration::from_millis(options.op_timeout_ms),
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized (op timeout {} ms)",
            storage.backend_name.to_uppercase(),
            storage.op_timeout.as_millis()
        );
        Ok(storage)
    }

    /// Run one storage call under `op_timeout`.
    async fn with_timeout<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TinylinkError::timeout(format!(
                "{} on {} exceeded {} ms",
                operation,
                self.backend_name,
                self.op_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn add(&self, code: &str, url: &str, owner_id: &str) -> Result<()> {
        self.with_timeout("add", self.insert_url(code, url, owner_id))
            .await
    }

    async fn add_batch(&self, urls: &HashMap<String, String>, owner_id: &str) -> Result<()> {
        // 超时会丢弃事务，未提交的事务在 drop 时回滚
        self.with_timeout("add_batch", self.insert_batch(urls, owner_id))
            .await
    }

    async fn get(&self, code: &str) -> Result<String> {
        self.with_timeout("get", self.find_url(code)).await
    }

    async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, StoredUrl>> {
        self.with_timeout("get_all", self.find_by_owner(owner_id))
            .await
    }

    async fn delete(&self, code: &str, owner_id: &str) -> Result<()> {
        self.with_timeout("delete", self.mark_deleted(code, owner_id))
            .await
    }

    async fn get_stats(&self) -> Result<Stats> {
        self.with_timeout("get_stats", self.aggregate_stats()).await
    }

    async fn backup(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.with_timeout("ping", async {
            self.db.ping().await.map_err(|e| {
                TinylinkError::database_connection(format!(
                    "{} ping failed: {}",
                    self.backend_name.to_uppercase(),
                    e
                ))
            })
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        match self.backend_name.as_str() {
            "sqlite" => "sqlite",
            "mysql" => "mysql",
            "postgres" => "postgres",
            _ => "sql",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("links.sqlite").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mariadb://root@localhost/links").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/links").unwrap(),
            "postgres"
        );
    }

    #[test]
    fn test_infer_backend_rejects_unknown_scheme() {
        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, TinylinkError::DatabaseConfig(_)));
    }

    #[test]
    fn test_normalize_backend_name() {
        assert_eq!(normalize_backend_name("mariadb"), "mysql");
        assert_eq!(normalize_backend_name("postgresql"), "postgres");
        assert_eq!(normalize_backend_name("sqlite"), "sqlite");
    }
}
