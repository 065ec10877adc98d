//! Bulk deletion pipeline
//!
//! A generator task feeds codes through a one-slot channel; the consumer keeps
//! up to `workers` deletions in flight and records every outcome. Cancelling
//! the token stops both stages: in-flight deletions finish, everything not
//! yet started is reported as skipped.

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::{Result, TinylinkError};
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct DeletionFailure {
    pub code: String,
    pub error: TinylinkError,
}

/// Per-code outcome of a pipeline run, each list in input order.
#[derive(Debug, Clone, Default)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<DeletionFailure>,
    /// Never attempted because the run was cancelled
    pub skipped: Vec<String>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    /// Collapse to a single outcome: the first failure, else `Cancelled` if
    /// anything was skipped, else the deleted codes.
    pub fn into_result(self) -> Result<Vec<String>> {
        if let Some(failure) = self.failed.into_iter().next() {
            return Err(failure.error);
        }
        if !self.skipped.is_empty() {
            return Err(TinylinkError::cancelled(format!(
                "{} deletion(s) not attempted",
                self.skipped.len()
            )));
        }
        Ok(self.deleted)
    }
}

pub struct DeletionPipeline {
    storage: Arc<dyn Storage>,
    workers: usize,
}

impl DeletionPipeline {
    pub fn new(storage: Arc<dyn Storage>, workers: usize) -> Self {
        Self {
            storage,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn run(
        &self,
        codes: Vec<String>,
        owner_id: &str,
        cancel: &CancellationToken,
    ) -> DeletionReport {
        let total = codes.len();
        if total == 0 {
            return DeletionReport::default();
        }

        let (tx, mut rx) = mpsc::channel::<(usize, String)>(1);

        let generator_cancel = cancel.clone();
        let generator_codes = codes.clone();
        let generator = tokio::spawn(async move {
            for item in generator_codes.into_iter().enumerate() {
                tokio::select! {
                    biased;
                    _ = generator_cancel.cancelled() => break,
                    sent = tx.send(item) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let mut attempted = vec![false; total];
        let mut outcomes: Vec<(usize, String, Result<()>)> = Vec::with_capacity(total);
        let mut in_flight = FuturesUnordered::new();
        let mut cancelled = false;
        let mut channel_open = true;

        loop {
            if in_flight.is_empty() && (cancelled || !channel_open) {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    rx.close();
                    debug!("Deletion for {} cancelled, draining {} in flight", owner_id, in_flight.len());
                }
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    outcomes.push(outcome);
                }
                received = rx.recv(), if channel_open && !cancelled && in_flight.len() < self.workers => {
                    match received {
                        Some((index, code)) => {
                            attempted[index] = true;
                            let storage = Arc::clone(&self.storage);
                            let owner = owner_id.to_owned();
                            in_flight.push(async move {
                                let result = storage.delete(&code, &owner).await;
                                (index, code, result)
                            });
                        }
                        None => channel_open = false,
                    }
                }
                else => break,
            }
        }

        drop(rx);
        if let Err(e) = generator.await {
            warn!("Deletion generator task failed: {}", e);
        }

        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = DeletionReport::default();
        for (_, code, result) in outcomes {
            match result {
                Ok(()) => report.deleted.push(code),
                Err(error) => {
                    warn!("Failed to delete {} for {}: {}", code, owner_id, error);
                    report.failed.push(DeletionFailure { code, error });
                }
            }
        }
        report.skipped = codes
            .into_iter()
            .zip(attempted)
            .filter_map(|(code, attempted)| (!attempted).then_some(code))
            .collect();

        info!(
            "Deletion for {}: {} deleted, {} failed, {} skipped",
            owner_id,
            report.deleted.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }
}
