use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{DeletionPipeline, ShorteningService};
use crate::storage::{Storage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub service: Arc<ShorteningService>,
    pub pipeline: Arc<DeletionPipeline>,
}

/// 准备启动上下文：选择存储后端并装配服务
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let service = Arc::new(ShorteningService::with_scheme(
        Arc::clone(&storage),
        config.shortener.code_scheme,
    ));
    let pipeline = Arc::new(service.deletion_pipeline(config.deletion.workers));

    debug!(
        "Code scheme: {}, deletion workers: {}",
        service.scheme(),
        pipeline.workers()
    );
    info!(
        "Startup completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        service,
        pipeline,
    })
}
