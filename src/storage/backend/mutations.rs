//! Mutation operations for SeaOrmStorage
//!
//! These run without their own timeout; the `Storage` impl wraps each one.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr,
    sea_query::OnConflict,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{is_not_inserted, is_unique_violation, new_active_model};
use crate::errors::{Result, TinylinkError};

use migration::entities::url;

impl SeaOrmStorage {
    pub(super) async fn insert_url(&self, code: &str, original: &str, owner_id: &str) -> Result<()> {
        let result = url::Entity::insert(new_active_model(code, original, owner_id))
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => {
                debug!("Short URL stored: {} (owner {})", code, owner_id);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(TinylinkError::conflict(format!(
                "short code {} already exists",
                code
            ))),
            Err(e) => Err(TinylinkError::database_operation(format!(
                "failed to insert short URL '{}': {}",
                code, e
            ))),
        }
    }

    /// All-or-nothing batch insert. Rows whose code already exists are skipped.
    pub(super) async fn insert_batch(
        &self,
        urls: &HashMap<String, String>,
        owner_id: &str,
    ) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await.map_err(|e| {
            TinylinkError::database_operation(format!("failed to begin transaction: {}", e))
        })?;

        let mut inserted = 0usize;
        for (code, original) in urls {
            // 每行一个 savepoint：唯一约束冲突在 PostgreSQL 上会中止整个事务
            let savepoint = txn.begin().await.map_err(|e| {
                TinylinkError::database_operation(format!("failed to open savepoint: {}", e))
            })?;

            let result = url::Entity::insert(new_active_model(code, original, owner_id))
                .on_conflict(
                    OnConflict::column(url::Column::ShortUrl)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&savepoint)
                .await;

            match result {
                Ok(_) => {
                    savepoint.commit().await.map_err(|e| {
                        TinylinkError::database_operation(format!(
                            "failed to release savepoint: {}",
                            e
                        ))
                    })?;
                    inserted += 1;
                }
                Err(e) if is_not_inserted(&e) || is_unique_violation(&e) => {
                    savepoint.rollback().await.map_err(|e| {
                        TinylinkError::database_operation(format!(
                            "failed to roll back savepoint: {}",
                            e
                        ))
                    })?;
                    debug!("Skipping existing short code {}", code);
                }
                Err(e) => {
                    // txn 在 drop 时回滚
                    return Err(TinylinkError::database_operation(format!(
                        "batch insert failed at '{}': {}",
                        code, e
                    )));
                }
            }
        }

        txn.commit().await.map_err(|e| {
            TinylinkError::database_operation(format!("failed to commit transaction: {}", e))
        })?;

        info!(
            "Batch stored {} of {} short URLs for {}",
            inserted,
            urls.len(),
            owner_id
        );
        Ok(())
    }

    /// Tombstone `(code, owner)`. Zero matched rows is not an error.
    pub(super) async fn mark_deleted(&self, code: &str, owner_id: &str) -> Result<()> {
        let result = url::Entity::update_many()
            .col_expr(url::Column::IsDeleted, Expr::value(true))
            .filter(url::Column::ShortUrl.eq(code))
            .filter(url::Column::UserId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TinylinkError::database_operation(format!(
                    "failed to delete short URL '{}': {}",
                    code, e
                ))
            })?;

        if result.rows_affected == 0 {
            debug!("Delete of {} by {} matched nothing", code, owner_id);
        } else {
            debug!("Deleted {} for {}", code, owner_id);
        }
        Ok(())
    }
}
