use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use crate::errors::{Result, TinylinkError};
use crate::storage::Storage;

/// 备份超时时间（秒）
const BACKUP_TIMEOUT_SECS: u64 = 30;

/// Flush storage state before the process exits.
pub async fn shutdown(storage: &dyn Storage) -> Result<()> {
    match timeout(Duration::from_secs(BACKUP_TIMEOUT_SECS), storage.backup()).await {
        Ok(Ok(())) => {
            info!("{} storage backed up", storage.backend_name());
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Backup of {} storage failed: {}", storage.backend_name(), e);
            Err(e)
        }
        Err(_) => {
            error!(
                "Backup timed out after {} seconds",
                BACKUP_TIMEOUT_SECS
            );
            Err(TinylinkError::timeout(format!(
                "backup exceeded {}s",
                BACKUP_TIMEOUT_SECS
            )))
        }
    }
}
