//! Delete command

use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::interfaces::cli::CliError;
use crate::services::DeletionPipeline;

pub async fn delete_links(
    pipeline: &DeletionPipeline,
    codes: Vec<String>,
    owner: &str,
) -> Result<(), CliError> {
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    let listener = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping remaining deletions");
                signal_cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let report = pipeline.run(codes, owner, &cancel).await;
    listener.abort();

    for code in &report.deleted {
        println!("{} Deleted: {}", "✓".bold().green(), code.cyan());
    }
    for failure in &report.failed {
        println!(
            "{} Failed: {} ({})",
            "✗".bold().red(),
            failure.code.cyan(),
            failure.error.format_simple().red()
        );
    }
    for code in &report.skipped {
        println!("{} Skipped: {}", "-".dimmed(), code.dimmed());
    }

    if report.is_complete() {
        return Ok(());
    }
    Err(CliError::CommandError(format!(
        "{} of {} deletions did not complete",
        report.failed.len() + report.skipped.len(),
        report.attempted() + report.skipped.len()
    )))
}
