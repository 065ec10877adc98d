//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, EntityTrait, ExprTrait, FromQueryResult, QueryFilter, QuerySelect,
    sea_query::{Expr, Func},
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::model_to_stored;
use crate::errors::{Result, TinylinkError};
use crate::storage::models::{Stats, StoredUrl};

use migration::entities::url;

/// 用于统计查询的结果结构体（DSL 聚合查询）
#[derive(Debug, FromQueryResult)]
struct StatsResult {
    total_urls: i64,
    total_users: i64,
}

impl SeaOrmStorage {
    pub(super) async fn find_url(&self, code: &str) -> Result<String> {
        let model = url::Entity::find_by_id(code)
            .one(&self.db)
            .await
            .map_err(|e| {
                TinylinkError::database_operation(format!(
                    "failed to look up short code '{}': {}",
                    code, e
                ))
            })?;

        match model {
            None => Err(TinylinkError::not_found(format!(
                "short code {} not found",
                code
            ))),
            Some(model) if model.is_deleted => Err(TinylinkError::deleted(format!(
                "short code {} has been deleted",
                code
            ))),
            Some(model) => Ok(model.original_url),
        }
    }

    pub(super) async fn find_by_owner(&self, owner_id: &str) -> Result<HashMap<String, StoredUrl>> {
        let models = url::Entity::find()
            .filter(url::Column::UserId.eq(owner_id))
            .all(&self.db)
            .await
            .map_err(|e| {
                TinylinkError::database_operation(format!(
                    "failed to list URLs of '{}': {}",
                    owner_id, e
                ))
            })?;

        if models.is_empty() {
            return Err(TinylinkError::not_found(format!(
                "no URLs stored for owner {}",
                owner_id
            )));
        }

        debug!("Loaded {} URLs for {}", models.len(), owner_id);
        Ok(models.into_iter().map(model_to_stored).collect())
    }

    /// 统计（SeaORM DSL 聚合查询），已删除的记录也计入
    pub(super) async fn aggregate_stats(&self) -> Result<Stats> {
        let result = url::Entity::find()
            .select_only()
            // COUNT(short_url)
            .column_as(url::Column::ShortUrl.count(), "total_urls")
            // COUNT(DISTINCT user_id)
            .column_as(
                Expr::from(Func::count_distinct(Expr::col(url::Column::UserId))),
                "total_users",
            )
            .into_model::<StatsResult>()
            .one(&self.db)
            .await
            .map_err(|e| {
                TinylinkError::database_operation(format!("stats query failed: {}", e))
            })?;

        Ok(result
            .map(|stats| Stats {
                total_urls: Ord::max(stats.total_urls, 0) as usize,
                total_users: Ord::max(stats.total_users, 0) as usize,
            })
            .unwrap_or_default())
    }
}
